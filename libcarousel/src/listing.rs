//! Content listing queries
//!
//! Builds search requests from block data and defines the seam to the
//! external content search provider. Results arrive asynchronously and are
//! fed back into slide reduction by the caller.
//!
//! # Example
//!
//! ```no_run
//! use libcarousel::block::BlockData;
//! use libcarousel::listing::{build_request, ContentSearchProvider};
//!
//! # async fn example(provider: &dyn ContentSearchProvider) -> libcarousel::Result<()> {
//! let block = BlockData::from_json_str(r#"{"useListing": true, "query": "news"}"#)?;
//! if let Some(request) = build_request(&block, "block-1") {
//!     let results = provider.search(&request).await?;
//!     println!("{} items", results.items.len());
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::block::BlockData;
use crate::error::Result;
use crate::types::ContentItem;

pub mod mock;

pub const DEFAULT_SORT_ON: &str = "sortable_title";
pub const DEFAULT_SORT_ORDER: &str = "ascending";

/// Metadata every listing query asks the provider for
pub const LISTING_METADATA_FIELDS: [&str; 5] = [
    "title",
    "description",
    "image_field",
    "image_scales",
    "effective",
];

/// Options sent along with a search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    pub sort_on: String,
    pub sort_order: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b_size: Option<u64>,
    pub metadata_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
    /// Additional filters taken from the block's query object
    #[serde(flatten)]
    pub filters: Map<String, Value>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            sort_on: DEFAULT_SORT_ON.to_string(),
            sort_order: DEFAULT_SORT_ORDER.to_string(),
            b_size: None,
            metadata_fields: LISTING_METADATA_FIELDS.iter().map(|f| f.to_string()).collect(),
            query: None,
            filters: Map::new(),
        }
    }
}

impl SearchOptions {
    /// Merge a parameter from the block's query object
    ///
    /// Known options are overwritten when the value has the right shape;
    /// everything else becomes a filter.
    fn merge_param(&mut self, key: String, value: Value) {
        match (key.as_str(), &value) {
            ("sort_on", Value::String(s)) => self.sort_on = s.clone(),
            ("sort_order", Value::String(s)) => self.sort_order = s.clone(),
            ("b_size", v) if v.as_u64().is_some() => self.b_size = v.as_u64(),
            ("metadata_fields", Value::Array(fields)) => {
                self.metadata_fields = fields
                    .iter()
                    .filter_map(|f| f.as_str().map(str::to_string))
                    .collect();
            }
            _ => {
                self.filters.insert(key, value);
            }
        }
    }
}

/// A search dispatched to the content search provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub search_term: String,
    pub options: SearchOptions,
    /// Key under which the provider delivers the result (the block id)
    pub request_key: String,
}

/// A result set returned by the provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub items: Vec<ContentItem>,
    #[serde(default, rename = "items_total", skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl SearchResults {
    pub fn new(items: Vec<ContentItem>) -> Self {
        let total = Some(items.len());
        Self { items, total }
    }

    /// Parse a provider response: either `{"items": [...]}` or a bare array
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(content).map_err(crate::error::ConfigError::JsonError)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(_) => {
                let items: Vec<ContentItem> = serde_json::from_value(value)
                    .map_err(crate::error::ConfigError::JsonError)?;
                Ok(Self::new(items))
            }
            Value::Object(_) => {
                let results = serde_json::from_value(value)
                    .map_err(crate::error::ConfigError::JsonError)?;
                Ok(results)
            }
            other => Err(crate::error::SearchError::MalformedResponse(format!(
                "expected an object or array, got {}",
                other
            ))
            .into()),
        }
    }
}

/// The external content search provider
#[async_trait]
pub trait ContentSearchProvider: Send + Sync {
    /// Run a search and return the matching items
    ///
    /// # Errors
    ///
    /// Returns a `SearchError` if the provider cannot serve the request.
    async fn search(&self, request: &SearchRequest) -> Result<SearchResults>;

    /// Provider name, for logging
    fn name(&self) -> &str;
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Build the listing search for a block, if one is needed
///
/// Returns `None` when listing mode is off or the block has no query.
///
/// Query forms:
/// - an object: its `query` array becomes `options.query`, every other key
///   is merged into the options; the search term is empty
/// - a string: used as the search term
/// - anything else: passed through as `options.query`
pub fn build_request(block: &BlockData, request_key: &str) -> Option<SearchRequest> {
    if !block.use_listing {
        return None;
    }
    let query = block.query.as_ref().filter(|q| is_truthy(q))?;

    let mut options = SearchOptions {
        sort_on: block
            .sort_on
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SORT_ON.to_string()),
        sort_order: block
            .sort_order
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SORT_ORDER.to_string()),
        ..Default::default()
    };

    if let Some(limit) = block.limit.as_ref().and_then(|l| l.as_int()) {
        if limit > 0 {
            options.b_size = Some(limit as u64);
        }
    }

    let search_term = match query {
        Value::Object(map) => {
            for (key, value) in map {
                if key == "query" {
                    if value.is_array() {
                        options.query = Some(value.clone());
                    }
                } else {
                    options.merge_param(key.clone(), value.clone());
                }
            }
            String::new()
        }
        Value::String(term) => term.clone(),
        other => {
            options.query = Some(other.clone());
            String::new()
        }
    };

    Some(SearchRequest {
        search_term,
        options,
        request_key: request_key.to_string(),
    })
}
