//! Responsive extent tracking
//!
//! Derives how many slides are visible at once from the viewport width and
//! the block's "slides to show" setting. A narrow viewport always shows a
//! single slide.

use serde::Serialize;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::block::BlockData;
use crate::config::DEFAULT_BREAKPOINT_PX;

/// Source of the current viewport width
///
/// Injected into the tracker instead of reading ambient global state.
/// `None` means there is no viewport (e.g. server-side rendering), which
/// counts as wide.
pub trait ViewportObserver {
    fn current_width(&self) -> Option<u32>;
}

/// A viewport whose width is set explicitly
#[derive(Debug, Default)]
pub struct FixedViewport {
    width: AtomicU32,
}

impl FixedViewport {
    pub fn new(width: u32) -> Self {
        Self {
            width: AtomicU32::new(width),
        }
    }

    /// Change the width; `0` means "no viewport"
    pub fn set_width(&self, width: u32) {
        self.width.store(width, Ordering::Relaxed);
    }
}

impl ViewportObserver for FixedViewport {
    fn current_width(&self) -> Option<u32> {
        match self.width.load(Ordering::Relaxed) {
            0 => None,
            width => Some(width),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportState {
    pub is_narrow: bool,
    pub effective_items_visible: u32,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            is_narrow: false,
            effective_items_visible: 1,
        }
    }
}

/// Compute the viewport state for a narrow flag and configured count
pub fn compute(is_narrow: bool, slides_to_show: u32) -> ViewportState {
    ViewportState {
        is_narrow,
        effective_items_visible: if is_narrow { 1 } else { slides_to_show.max(1) },
    }
}

/// Parse the block's slides-to-show value: integer prefix, default 1,
/// clamped to at least 1
pub fn parse_slides_to_show(block: &BlockData) -> u32 {
    let parsed = block.slides_to_show.as_ref().and_then(|v| v.as_int());
    match parsed {
        Some(n) if n >= 1 => u32::try_from(n).unwrap_or(u32::MAX),
        Some(0) | None => 1,
        Some(n) => {
            tracing::warn!("Negative slides to show ({}), clamping to 1", n);
            1
        }
    }
}

/// Tracks the viewport and recomputes the effective items visible
///
/// The initial state is computed synchronously at construction, so the
/// first render already uses the right extent. Resize events are only
/// honored while the tracker is attached.
#[derive(Debug, Clone)]
pub struct ResponsiveExtentTracker {
    breakpoint_px: u32,
    slides_to_show: u32,
    state: ViewportState,
    attached: bool,
}

impl ResponsiveExtentTracker {
    pub fn new(observer: &dyn ViewportObserver, slides_to_show: u32, breakpoint_px: u32) -> Self {
        let breakpoint_px = if breakpoint_px == 0 {
            DEFAULT_BREAKPOINT_PX
        } else {
            breakpoint_px
        };
        let is_narrow = is_narrow(observer.current_width(), breakpoint_px);

        Self {
            breakpoint_px,
            slides_to_show: slides_to_show.max(1),
            state: compute(is_narrow, slides_to_show),
            attached: true,
        }
    }

    pub fn state(&self) -> ViewportState {
        self.state
    }

    /// Handle a resize event
    ///
    /// Returns the new state if it changed. Recomputing with an unchanged
    /// width is a no-op.
    pub fn on_resize(&mut self, width: Option<u32>) -> Option<ViewportState> {
        if !self.attached {
            tracing::debug!("Ignoring resize on detached tracker");
            return None;
        }
        self.update(compute(is_narrow(width, self.breakpoint_px), self.slides_to_show))
    }

    /// Re-read the observer, as on initial mount
    pub fn poll(&mut self, observer: &dyn ViewportObserver) -> Option<ViewportState> {
        self.on_resize(observer.current_width())
    }

    /// Change the configured count; returns the new state if it changed
    pub fn set_slides_to_show(&mut self, slides_to_show: u32) -> Option<ViewportState> {
        self.slides_to_show = slides_to_show.max(1);
        self.update(compute(self.state.is_narrow, self.slides_to_show))
    }

    /// Re-attach after a teardown
    pub fn attach(&mut self, observer: &dyn ViewportObserver) -> Option<ViewportState> {
        self.attached = true;
        self.poll(observer)
    }

    /// Stop reacting to resize events
    pub fn detach(&mut self) {
        self.attached = false;
    }

    fn update(&mut self, next: ViewportState) -> Option<ViewportState> {
        if next == self.state {
            return None;
        }
        tracing::debug!(
            narrow = next.is_narrow,
            items_visible = next.effective_items_visible,
            "Viewport extent changed"
        );
        self.state = next;
        Some(next)
    }
}

fn is_narrow(width: Option<u32>, breakpoint_px: u32) -> bool {
    width.is_some_and(|w| w <= breakpoint_px)
}
