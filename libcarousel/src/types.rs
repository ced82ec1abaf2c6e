//! Core types for the carousel engine
//!
//! Reference fields arrive from persisted block data and search results in
//! several shapes (absent, a single object, a list of objects, or garbage).
//! They are normalized into [`Ref`] at ingestion so the rest of the engine
//! only ever matches on one known shape.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Content type tag for downloadable files
pub const TYPE_FILE: &str = "File";
/// Content type tag for external links
pub const TYPE_LINK: &str = "Link";
/// Content type tag for images
pub const TYPE_IMAGE: &str = "Image";

/// A reference field normalized at ingestion
///
/// JSON `null`, a missing field, or any non-object scalar becomes `None`.
/// An object becomes `Single`, an array becomes `List` (non-object elements
/// are dropped).
#[derive(Debug, Clone, PartialEq)]
pub enum Ref<T> {
    None,
    Single(Box<T>),
    List(Vec<T>),
}

impl<T> Default for Ref<T> {
    fn default() -> Self {
        Ref::None
    }
}

impl<T> Ref<T> {
    pub fn single(item: T) -> Self {
        Ref::Single(Box::new(item))
    }

    /// The referenced item: the single value, or the first list element
    pub fn first(&self) -> Option<&T> {
        match self {
            Ref::None => None,
            Ref::Single(item) => Some(item.as_ref()),
            Ref::List(items) => items.first(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.first().is_none()
    }

    /// Collapse a list into its first element
    pub fn into_single(self) -> Self {
        match self {
            Ref::List(items) => match items.into_iter().next() {
                Some(item) => Ref::single(item),
                None => Ref::None,
            },
            other => other,
        }
    }

    /// Wrap the reference into list form, as object browser widgets expect
    pub fn into_list(self) -> Self {
        match self {
            Ref::None => Ref::List(Vec::new()),
            Ref::Single(item) => Ref::List(vec![*item]),
            list => list,
        }
    }
}

impl<T> From<Option<T>> for Ref<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(item) => Ref::single(item),
            None => Ref::None,
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Ref<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Ref::from_value(value))
    }
}

impl<T: DeserializeOwned> Ref<T> {
    /// Normalize an arbitrary JSON value into a reference
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(_) => match serde_json::from_value(value) {
                Ok(item) => Ref::single(item),
                Err(e) => {
                    tracing::warn!("Ignoring malformed reference: {}", e);
                    Ref::None
                }
            },
            Value::Array(values) => Ref::List(
                values
                    .into_iter()
                    .filter(Value::is_object)
                    .filter_map(|v| serde_json::from_value(v).ok())
                    .collect(),
            ),
            _ => Ref::None,
        }
    }
}

impl<T: Serialize> Serialize for Ref<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Ref::None => serializer.serialize_none(),
            Ref::Single(item) => item.serialize(serializer),
            Ref::List(items) => items.serialize(serializer),
        }
    }
}

/// A content object as seen through a reference or a search result
///
/// Object browser references, media references and catalog search results
/// all share this shape: an identifier, a type tag and optional metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(rename = "@id", default)]
    pub id: String,

    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub type_tag: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Publication date as delivered by the provider (ISO 8601)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective: Option<String>,

    /// Target of an external link object
    #[serde(
        rename = "remoteUrl",
        alias = "getRemoteUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub remote_url: Option<String>,

    /// Direct download URL for media without an identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download: Option<String>,

    /// Name of the image field holding the lead image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_field: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_scales: Option<Value>,

    #[serde(default, skip_serializing_if = "Ref::is_none")]
    pub preview_image: Ref<ContentItem>,

    #[serde(default, skip_serializing_if = "Ref::is_none")]
    pub lead_image: Ref<ContentItem>,

    #[serde(default, skip_serializing_if = "Ref::is_none")]
    pub image: Ref<ContentItem>,
}

impl ContentItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, type_tag: impl Into<String>) -> Self {
        self.type_tag = Some(type_tag.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn is_type(&self, type_tag: &str) -> bool {
        self.type_tag.as_deref() == Some(type_tag)
    }
}

/// Media reference (image fields)
pub type MediaRef = ContentItem;

/// Link reference (object browser link fields, or a whole listing item)
pub type LinkRef = ContentItem;

/// Where a slide came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Manual,
    Listing,
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::Manual => write!(f, "manual"),
            Origin::Listing => write!(f, "listing"),
        }
    }
}

/// A manually authored slide as persisted in block data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualSlide {
    #[serde(default, deserialize_with = "crate::block::null_as_default")]
    pub heading: String,

    #[serde(default, deserialize_with = "crate::block::null_as_default")]
    pub content: String,

    #[serde(default)]
    pub image: Ref<MediaRef>,

    #[serde(default)]
    pub link: Ref<LinkRef>,

    #[serde(default, deserialize_with = "crate::block::null_as_default")]
    pub button_text: String,
}

/// A normalized, render-ready slide
///
/// Produced by [`crate::slides::reduce`]. Identity is positional: the index
/// in the resolved sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideRecord {
    pub heading: String,
    pub content: String,
    pub image: Option<MediaRef>,
    pub link: Option<LinkRef>,
    pub button_text: String,
    pub effective_date: Option<String>,
    pub origin: Origin,
}
