//! Integration tests for CarouselSession
//!
//! Drives a session through editing, listing delivery, resizing and
//! navigation the way a host page would.

use std::time::Duration;

use libcarousel::block::BlockData;
use libcarousel::error::SearchError;
use libcarousel::events::CarouselEvent;
use libcarousel::listing::mock::MockSearchProvider;
use libcarousel::listing::{build_request, ContentSearchProvider, SearchResults};
use libcarousel::schema::{apply_field_change, carousel_schema};
use libcarousel::{CarouselSession, Config, ContentItem, FixedViewport, Origin};
use serde_json::json;

fn items(prefix: &str, n: usize) -> Vec<ContentItem> {
    (0..n)
        .map(|i| {
            ContentItem::new(format!("/{}/{}", prefix, i)).with_title(format!("{} {}", prefix, i))
        })
        .collect()
}

fn setup_session(block: serde_json::Value, width: u32) -> (CarouselSession, FixedViewport) {
    let viewport = FixedViewport::new(width);
    let block: BlockData = serde_json::from_value(block).unwrap();
    let session = CarouselSession::with_request_key(block, Config::default(), &viewport, "block-1");
    (session, viewport)
}

#[tokio::test]
async fn test_editing_workflow_switches_modes() {
    let (mut session, _viewport) = setup_session(
        json!({"slides": [{"heading": "Manual"}], "slidesToShow": 2}),
        1280,
    );
    assert_eq!(session.slides().len(), 1);

    // The editor turns on listing mode; the schema follows
    let block = apply_field_change(session.block(), "useListing", json!(true)).unwrap();
    let block = apply_field_change(&block, "query", json!("news")).unwrap();
    assert!(carousel_schema(&block).has_field("query"));
    assert!(!carousel_schema(&block).has_field("slides"));
    session.update_block(block);

    // No results yet: manual slides stay visible
    assert_eq!(session.slides()[0].origin, Origin::Manual);

    let provider = MockSearchProvider::with_items(items("news", 5));
    session.refresh_listing(&provider).await.unwrap();
    assert_eq!(session.slides().len(), 5);
    assert_eq!(session.navigation().page_count, 3);

    // Appending manual slides puts them after the listing
    let block = apply_field_change(session.block(), "appendManualSlides", json!(true)).unwrap();
    assert!(carousel_schema(&block).has_field("slides"));
    session.update_block(block);
    let origins: Vec<Origin> = session.slides().iter().map(|s| s.origin).collect();
    assert_eq!(origins.len(), 6);
    assert_eq!(origins[5], Origin::Manual);
    assert_eq!(session.navigation().page_count, 3);
}

#[tokio::test]
async fn test_last_delivered_results_win() {
    let (mut session, _viewport) = setup_session(json!({"useListing": true, "query": "news"}), 1280);
    let request = build_request(session.block(), session.request_key()).unwrap();

    let slow = MockSearchProvider::with_delay(items("slow", 2), Duration::from_millis(50));
    let fast = MockSearchProvider::with_delay(items("fast", 4), Duration::from_millis(5));

    // The first query resolves after the second one
    let (slow_results, fast_results) = tokio::join!(slow.search(&request), fast.search(&request));
    session.apply_listing(fast_results.unwrap());
    session.apply_listing(slow_results.unwrap());

    assert_eq!(session.slides().len(), 2);
    assert_eq!(session.slides()[0].heading, "slow 0");
}

#[tokio::test]
async fn test_failed_refresh_emits_event_and_keeps_slides() {
    let (mut session, _viewport) = setup_session(json!({"useListing": true, "query": "news"}), 1280);
    session.apply_listing(SearchResults::new(items("news", 3)));
    let mut events = session.subscribe();

    let provider = MockSearchProvider::failing(SearchError::Unavailable("offline".to_string()));
    let err = session.refresh_listing(&provider).await.unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert_eq!(session.slides().len(), 3);

    assert!(matches!(
        events.recv().await.unwrap(),
        CarouselEvent::ListingRequested { .. }
    ));
    match events.recv().await.unwrap() {
        CarouselEvent::ListingFailed { request_key, error } => {
            assert_eq!(request_key, "block-1");
            assert!(error.contains("offline"));
        }
        other => panic!("Unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn test_resize_emits_viewport_and_navigation_events() {
    let (mut session, _viewport) = setup_session(
        json!({"slidesToShow": 3, "slides": [{}, {}, {}, {}, {}, {}]}),
        1280,
    );
    let mut events = session.subscribe();

    session.on_resize(Some(1024));
    session.on_resize(Some(600));

    assert_eq!(
        events.recv().await.unwrap(),
        CarouselEvent::ViewportChanged {
            is_narrow: true,
            effective_items_visible: 1
        }
    );
    assert!(matches!(
        events.recv().await.unwrap(),
        CarouselEvent::ConfigResolved { scroll_step: 1, .. }
    ));
    assert_eq!(
        events.recv().await.unwrap(),
        CarouselEvent::Navigated {
            selected_index: 0,
            page_count: 6
        }
    );
}

#[tokio::test]
async fn test_navigation_through_session() {
    let (mut session, _viewport) = setup_session(
        json!({"loop": false, "slidesToShow": 2, "slides": [{}, {}, {}, {}, {}]}),
        1280,
    );

    let mut events = session.subscribe();
    assert_eq!(session.next().selected_index, 1);
    assert_eq!(session.next().selected_index, 2);
    assert_eq!(session.next().selected_index, 2);
    assert_eq!(session.jump_to(7).selected_index, 2);
    assert_eq!(session.previous().selected_index, 1);

    let selected: Vec<usize> = std::iter::from_fn(|| events.try_recv().ok())
        .filter_map(|event| match event {
            CarouselEvent::Navigated { selected_index, .. } => Some(selected_index),
            _ => None,
        })
        .collect();
    assert_eq!(selected, [1, 2, 1]);

    let view = session.render();
    assert!(view.show_arrows);
    assert!(view.show_dots);
    assert!(!view.config.loop_enabled);
}
