//! Carousel configuration resolver
//!
//! A [`CarouselConfig`] is built by folding an ordered list of [`Override`]s
//! over an immutable base record. The list is assembled from three layers,
//! applied left to right:
//!
//! 1. type defaults for the carousel type (`default`, `centered`, `peek`,
//!    `cards`)
//! 2. the preset, a single-field shorthand (`loop`, `scroll`, `contain`,
//!    `dragFree`, `snaps`)
//! 3. explicit user fields: the scroll step always equals the effective
//!    number of visible items, and the user's loop flag is re-applied unless
//!    the preset itself forces loop on
//!
//! A configuration is never mutated. Any change produces a new instance.

use serde::{Deserialize, Serialize};

use crate::block::BlockData;
use crate::config::DEFAULT_AUTOPLAY_DELAY_MS;
use crate::viewport::ViewportState;

/// Visual and behavioral template supplying base configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarouselType {
    Default,
    Centered,
    Peek,
    Cards,
}

impl CarouselType {
    /// Parse a type name; unknown names fall back to `Default`
    pub fn from_name(name: &str) -> Self {
        match name {
            "centered" => CarouselType::Centered,
            "peek" => CarouselType::Peek,
            "cards" => CarouselType::Cards,
            _ => CarouselType::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CarouselType::Default => "default",
            CarouselType::Centered => "centered",
            CarouselType::Peek => "peek",
            CarouselType::Cards => "cards",
        }
    }
}

impl std::fmt::Display for CarouselType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named shorthand that sets one carousel behavior flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Preset {
    Loop,
    Scroll,
    Contain,
    DragFree,
    Snaps,
}

impl Preset {
    /// Parse a preset name; unknown names yield no preset
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "loop" => Some(Preset::Loop),
            "scroll" => Some(Preset::Scroll),
            "contain" => Some(Preset::Contain),
            "dragFree" => Some(Preset::DragFree),
            "snaps" => Some(Preset::Snaps),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Start,
    Center,
    End,
}

/// Scroll containment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContainScroll {
    /// Leave containment to the carousel engine's own default
    Auto,
    TrimSnaps,
    KeepSnaps,
}

/// Resolved, read-only carousel runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselConfig {
    pub carousel_type: CarouselType,
    pub alignment: Align,
    pub loop_enabled: bool,
    pub scroll_step: u32,
    pub contain_scroll: ContainScroll,
    pub drag_free: bool,
    pub skip_snaps: bool,
    pub autoplay_enabled: bool,
    pub autoplay_delay_ms: u64,
}

impl CarouselConfig {
    /// The layer-zero record every resolution starts from
    pub fn base() -> Self {
        Self {
            carousel_type: CarouselType::Default,
            alignment: Align::Start,
            loop_enabled: true,
            scroll_step: 1,
            contain_scroll: ContainScroll::Auto,
            drag_free: false,
            skip_snaps: false,
            autoplay_enabled: false,
            autoplay_delay_ms: DEFAULT_AUTOPLAY_DELAY_MS,
        }
    }
}

/// A single field override
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Override {
    Type(CarouselType),
    Align(Align),
    Loop(bool),
    ScrollStep(u32),
    ContainScroll(ContainScroll),
    DragFree(bool),
    SkipSnaps(bool),
    Autoplay { enabled: bool, delay_ms: u64 },
}

impl Override {
    /// Apply this override, returning a new configuration
    pub fn apply(self, config: CarouselConfig) -> CarouselConfig {
        match self {
            Override::Type(carousel_type) => CarouselConfig {
                carousel_type,
                ..config
            },
            Override::Align(alignment) => CarouselConfig { alignment, ..config },
            Override::Loop(loop_enabled) => CarouselConfig {
                loop_enabled,
                ..config
            },
            Override::ScrollStep(step) => CarouselConfig {
                scroll_step: step.max(1),
                ..config
            },
            Override::ContainScroll(contain_scroll) => CarouselConfig {
                contain_scroll,
                ..config
            },
            Override::DragFree(drag_free) => CarouselConfig { drag_free, ..config },
            Override::SkipSnaps(skip_snaps) => CarouselConfig {
                skip_snaps,
                ..config
            },
            Override::Autoplay { enabled, delay_ms } => CarouselConfig {
                autoplay_enabled: enabled,
                autoplay_delay_ms: delay_ms,
                ..config
            },
        }
    }
}

/// Explicit per-instance settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserOverrides {
    /// The user's loop flag; `None` means "not set" and defaults to true
    pub loop_enabled: Option<bool>,
    /// Current effective number of visible items
    pub effective_items_visible: u32,
    pub autoplay_enabled: bool,
    pub autoplay_delay_ms: u64,
}

impl Default for UserOverrides {
    fn default() -> Self {
        Self {
            loop_enabled: None,
            effective_items_visible: 1,
            autoplay_enabled: false,
            autoplay_delay_ms: DEFAULT_AUTOPLAY_DELAY_MS,
        }
    }
}

impl UserOverrides {
    /// Collect the user layer from block data and the current viewport
    pub fn from_block(block: &BlockData, viewport: &ViewportState, fallback_delay_ms: u64) -> Self {
        Self {
            loop_enabled: block.loop_enabled,
            effective_items_visible: viewport.effective_items_visible,
            autoplay_enabled: block.autoplay,
            autoplay_delay_ms: parse_autoplay_delay(block, fallback_delay_ms),
        }
    }

    fn loop_or_default(&self) -> bool {
        self.loop_enabled.unwrap_or(true)
    }
}

/// Autoplay delay from block data; missing, zero or unparseable values fall
/// back to `fallback_ms`
pub fn parse_autoplay_delay(block: &BlockData, fallback_ms: u64) -> u64 {
    match block.autoplay_delay.as_ref().map(|d| d.as_int()) {
        Some(Some(ms)) if ms > 0 => ms as u64,
        Some(_) => {
            tracing::warn!(
                "Unusable autoplay delay {:?}, using {}ms",
                block.autoplay_delay,
                fallback_ms
            );
            fallback_ms
        }
        None => fallback_ms,
    }
}

/// Layer 1: base configuration for a carousel type
pub fn type_layer(carousel_type: CarouselType, user: &UserOverrides) -> Vec<Override> {
    let mut layer = vec![Override::Type(carousel_type)];
    match carousel_type {
        CarouselType::Default => {
            layer.push(Override::Align(Align::Start));
            layer.push(Override::Loop(user.loop_or_default()));
        }
        CarouselType::Centered => {
            layer.push(Override::Align(Align::Center));
            layer.push(Override::Loop(true));
        }
        CarouselType::Peek => {
            layer.push(Override::Align(Align::Start));
            layer.push(Override::Loop(true));
        }
        CarouselType::Cards => {
            layer.push(Override::Align(Align::Start));
            layer.push(Override::Loop(false));
            layer.push(Override::ContainScroll(ContainScroll::TrimSnaps));
        }
    }
    layer
}

/// Layer 2: the single-field override of a preset
pub fn preset_layer(preset: Option<Preset>) -> Vec<Override> {
    match preset {
        Some(Preset::Loop) => vec![Override::Loop(true)],
        Some(Preset::Scroll) => vec![Override::ScrollStep(1)],
        Some(Preset::Contain) => vec![Override::ContainScroll(ContainScroll::TrimSnaps)],
        Some(Preset::DragFree) => vec![Override::DragFree(true)],
        Some(Preset::Snaps) => vec![Override::SkipSnaps(false)],
        None => Vec::new(),
    }
}

/// Layer 3: explicit user fields, re-applied last
pub fn user_layer(preset: Option<Preset>, user: &UserOverrides) -> Vec<Override> {
    let mut layer = Vec::with_capacity(3);
    if preset != Some(Preset::Loop) {
        layer.push(Override::Loop(user.loop_or_default()));
    }
    layer.push(Override::ScrollStep(user.effective_items_visible));
    layer.push(Override::Autoplay {
        enabled: user.autoplay_enabled,
        delay_ms: user.autoplay_delay_ms,
    });
    layer
}

/// Fold overrides left to right over the base record
pub fn apply_overrides<I>(overrides: I) -> CarouselConfig
where
    I: IntoIterator<Item = Override>,
{
    overrides
        .into_iter()
        .fold(CarouselConfig::base(), |config, o| o.apply(config))
}

/// Resolve a carousel configuration from its three layers
pub fn resolve(carousel_type: &str, preset: Option<&str>, user: &UserOverrides) -> CarouselConfig {
    let carousel_type = CarouselType::from_name(carousel_type);
    let preset = preset.and_then(Preset::from_name);

    tracing::debug!(
        carousel_type = %carousel_type,
        preset = ?preset,
        items_visible = user.effective_items_visible,
        "Resolving carousel configuration"
    );

    let overrides = type_layer(carousel_type, user)
        .into_iter()
        .chain(preset_layer(preset))
        .chain(user_layer(preset, user));

    apply_overrides(overrides)
}

/// Resolve the configuration for persisted block data
pub fn resolve_block(block: &BlockData, viewport: &ViewportState, fallback_delay_ms: u64) -> CarouselConfig {
    let user = UserOverrides::from_block(block, viewport, fallback_delay_ms);
    resolve(block.carousel_type_name(), block.preset.as_deref(), &user)
}
