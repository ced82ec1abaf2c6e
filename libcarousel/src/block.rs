//! Persisted block data
//!
//! The only durable state of a carousel: one flat record as stored by the
//! page editor. Deserialization is lenient because these records are written
//! by several generations of the editing form: nulls become defaults and
//! numeric fields accept numbers or strings.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::Path;

use crate::error::{ConfigError, Result};
use crate::types::ManualSlide;

/// Deserialize `null` as the type's default value
pub fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A number as typed into a form: either a JSON number or a string
///
/// Any other JSON shape is kept as `Other` so one bad field never rejects the
/// whole block; it reads as no value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Int(i64),
    Float(f64),
    Text(String),
    Other(Value),
}

impl NumericInput {
    /// Integer value using leading-digits parsing
    ///
    /// `"3 slides"` parses as 3, `"2.9"` as 2 and `"abc"` as `None`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            NumericInput::Int(n) => Some(*n),
            NumericInput::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            NumericInput::Float(_) => None,
            NumericInput::Text(s) => parse_int_prefix(s),
            NumericInput::Other(value) => {
                tracing::warn!("Ignoring non-numeric value {}", value);
                None
            }
        }
    }
}

impl From<i64> for NumericInput {
    fn from(value: i64) -> Self {
        NumericInput::Int(value)
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        NumericInput::Text(value.to_string())
    }
}

fn parse_int_prefix(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// The persisted carousel block record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carousel_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,

    #[serde(rename = "loop", default, skip_serializing_if = "Option::is_none")]
    pub loop_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slides_to_show: Option<NumericInput>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub autoplay: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoplay_delay: Option<NumericInput>,

    /// Text alignment inside slides (left, center, right)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub is_full_width: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub hide_arrows: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub hide_dots: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub hide_buttons: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub hide_description: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub clickable_slides: bool,

    /// Display mode, rendered as a `mode-*` class
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub equal_height: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub use_listing: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub append_manual_slides: bool,

    #[serde(default, deserialize_with = "null_as_default")]
    pub show_effective_date: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_button_text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_on: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<NumericInput>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub slides: Vec<ManualSlide>,
}

impl BlockData {
    /// Parse block data from a JSON document
    pub fn from_json_str(content: &str) -> Result<Self> {
        let block = serde_json::from_str(content).map_err(ConfigError::JsonError)?;
        Ok(block)
    }

    /// Load block data from a file, choosing the format by extension
    ///
    /// `.toml` files are parsed as TOML, everything else as JSON.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        if is_toml {
            let block = toml::from_str(&content).map_err(ConfigError::ParseError)?;
            Ok(block)
        } else {
            Self::from_json_str(&content)
        }
    }

    /// Carousel type name, `"default"` when unset
    pub fn carousel_type_name(&self) -> &str {
        self.carousel_type.as_deref().unwrap_or("default")
    }

    /// Text alignment name, `"left"` when unset
    pub fn alignment_name(&self) -> &str {
        self.alignment.as_deref().unwrap_or("left")
    }
}
