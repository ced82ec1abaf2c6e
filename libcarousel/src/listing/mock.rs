//! Mock search provider for testing
//!
//! A configurable in-memory provider that can serve canned results, fail,
//! or delay. It records every request so tests can verify what was asked.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{Result, SearchError};
use crate::listing::{ContentSearchProvider, SearchRequest, SearchResults};
use crate::types::ContentItem;

/// Configuration for mock provider behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub name: String,

    /// Items returned on success
    pub items: Vec<ContentItem>,

    /// Error to return instead of results
    pub error: Option<SearchError>,

    /// Delay before completing a search (simulates network latency)
    pub delay: Duration,

    /// Requests received so far
    pub requests: Arc<Mutex<Vec<SearchRequest>>>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            items: Vec::new(),
            error: None,
            delay: Duration::from_millis(0),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Mock content search provider
pub struct MockSearchProvider {
    config: MockConfig,
}

impl MockSearchProvider {
    pub fn new(config: MockConfig) -> Self {
        Self { config }
    }

    /// A provider that always returns `items`
    pub fn with_items(items: Vec<ContentItem>) -> Self {
        Self::new(MockConfig {
            items,
            ..Default::default()
        })
    }

    /// A provider that always fails with `error`
    pub fn failing(error: SearchError) -> Self {
        Self::new(MockConfig {
            error: Some(error),
            ..Default::default()
        })
    }

    /// A provider that answers after `delay`
    pub fn with_delay(items: Vec<ContentItem>, delay: Duration) -> Self {
        Self::new(MockConfig {
            items,
            delay,
            ..Default::default()
        })
    }

    /// Number of searches received
    pub fn call_count(&self) -> usize {
        self.requests().len()
    }

    /// Every request received, oldest first
    pub fn requests(&self) -> Vec<SearchRequest> {
        match self.config.requests.lock() {
            Ok(requests) => requests.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl ContentSearchProvider for MockSearchProvider {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResults> {
        match self.config.requests.lock() {
            Ok(mut requests) => requests.push(request.clone()),
            Err(poisoned) => poisoned.into_inner().push(request.clone()),
        }

        if !self.config.delay.is_zero() {
            sleep(self.config.delay).await;
        }

        if let Some(error) = &self.config.error {
            return Err(error.clone().into());
        }

        let mut items = self.config.items.clone();
        if let Some(limit) = request.options.b_size {
            items.truncate(limit as usize);
        }
        Ok(SearchResults::new(items))
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::SearchOptions;

    fn request(b_size: Option<u64>) -> SearchRequest {
        SearchRequest {
            search_term: String::new(),
            options: SearchOptions {
                b_size,
                ..Default::default()
            },
            request_key: "block".to_string(),
        }
    }

    #[tokio::test]
    async fn test_returns_items_and_records_request() {
        let provider = MockSearchProvider::with_items(vec![
            ContentItem::new("/a"),
            ContentItem::new("/b"),
        ]);

        let results = provider.search(&request(None)).await.unwrap();
        assert_eq!(results.items.len(), 2);
        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.requests()[0].request_key, "block");
    }

    #[tokio::test]
    async fn test_respects_batch_size() {
        let provider = MockSearchProvider::with_items(vec![
            ContentItem::new("/a"),
            ContentItem::new("/b"),
            ContentItem::new("/c"),
        ]);

        let results = provider.search(&request(Some(2))).await.unwrap();
        assert_eq!(results.items.len(), 2);
    }

    #[tokio::test]
    async fn test_failure() {
        let provider = MockSearchProvider::failing(SearchError::Unavailable("down".to_string()));
        let err = provider.search(&request(None)).await.unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert_eq!(provider.call_count(), 1);
    }
}
