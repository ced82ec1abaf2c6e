//! Carousel session facade
//!
//! [`CarouselSession`] owns everything one carousel instance needs: the
//! block data, the responsive extent tracker, the latest listing results,
//! the resolved runtime configuration and the navigation controller. Every
//! input change recomputes the derived state and keeps the controller in
//! step with it.
//!
//! # Example
//!
//! ```no_run
//! use libcarousel::block::BlockData;
//! use libcarousel::session::CarouselSession;
//! use libcarousel::viewport::FixedViewport;
//! use libcarousel::Config;
//!
//! # fn example() -> libcarousel::Result<()> {
//! let block = BlockData::from_json_str(r#"{"carouselType": "cards", "slidesToShow": 2}"#)?;
//! let viewport = FixedViewport::new(1280);
//! let mut session = CarouselSession::new(block, Config::default(), &viewport);
//!
//! session.next();
//! let view = session.render();
//! println!("{} slides on {} pages", view.slides.len(), view.navigation.page_count);
//! # Ok(())
//! # }
//! ```

use serde::Serialize;

use crate::block::BlockData;
use crate::config::Config;
use crate::controller::{CarouselController, NavAction, NavigationState};
use crate::dates::format_effective_date;
use crate::error::Result;
use crate::events::{CarouselEvent, EventBus, EventReceiver};
use crate::links::{button_link, click_action, resolve_href, resolve_image, ButtonLink, ClickAction};
use crate::listing::{build_request, ContentSearchProvider, SearchResults};
use crate::resolver::{resolve_block, CarouselConfig};
use crate::slides::{reduce, SourceMode};
use crate::types::{Origin, SlideRecord};
use crate::viewport::{parse_slides_to_show, ResponsiveExtentTracker, ViewportObserver, ViewportState};

/// A slide with every render decision made
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedSlide {
    pub heading: String,
    /// Empty when descriptions are hidden
    pub content: String,
    pub href: String,
    pub image_url: String,
    pub clickable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click: Option<ClickAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button: Option<ButtonLink>,
    /// Formatted effective date, when enabled and known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_label: Option<String>,
    pub origin: Origin,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselView {
    pub config: CarouselConfig,
    pub viewport: ViewportState,
    pub navigation: NavigationState,
    pub show_arrows: bool,
    pub show_dots: bool,
    /// Text alignment inside slides
    pub text_alignment: String,
    pub full_width: bool,
    pub equal_height: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    pub slides: Vec<RenderedSlide>,
}

/// One carousel instance
pub struct CarouselSession {
    request_key: String,
    block: BlockData,
    settings: Config,
    tracker: ResponsiveExtentTracker,
    listing: Option<SearchResults>,
    slides: Vec<SlideRecord>,
    resolved: CarouselConfig,
    controller: CarouselController,
    event_bus: EventBus,
}

impl CarouselSession {
    /// Create a session with a generated request key
    pub fn new(block: BlockData, settings: Config, observer: &dyn ViewportObserver) -> Self {
        let request_key = uuid::Uuid::new_v4().to_string();
        Self::with_request_key(block, settings, observer, request_key)
    }

    /// Create a session whose listing searches use `request_key`
    ///
    /// The extent is computed from the observer before the first render and
    /// the controller starts out initialized.
    pub fn with_request_key(
        block: BlockData,
        settings: Config,
        observer: &dyn ViewportObserver,
        request_key: impl Into<String>,
    ) -> Self {
        let tracker = ResponsiveExtentTracker::new(
            observer,
            parse_slides_to_show(&block),
            settings.viewport.breakpoint_px,
        );
        let resolved = resolve_block(&block, &tracker.state(), settings.defaults.autoplay_delay_ms);
        let slides = Self::reduce_slides(&block, &settings, None);
        let mut controller = CarouselController::new(
            slides.len(),
            tracker.state().effective_items_visible as usize,
            resolved.loop_enabled,
        );
        controller.initialize();

        Self {
            request_key: request_key.into(),
            block,
            settings,
            tracker,
            listing: None,
            slides,
            resolved,
            controller,
            event_bus: EventBus::default(),
        }
    }

    pub fn request_key(&self) -> &str {
        &self.request_key
    }

    pub fn block(&self) -> &BlockData {
        &self.block
    }

    pub fn settings(&self) -> &Config {
        &self.settings
    }

    /// The ordered, normalized slide sequence
    pub fn slides(&self) -> &[SlideRecord] {
        &self.slides
    }

    /// The resolved runtime configuration
    pub fn config(&self) -> &CarouselConfig {
        &self.resolved
    }

    pub fn viewport(&self) -> ViewportState {
        self.tracker.state()
    }

    pub fn navigation(&self) -> NavigationState {
        self.controller.navigation()
    }

    pub fn controller(&self) -> &CarouselController {
        &self.controller
    }

    /// Advance one page
    pub fn next(&mut self) -> NavigationState {
        self.navigate(NavAction::Next)
    }

    /// Go back one page
    pub fn previous(&mut self) -> NavigationState {
        self.navigate(NavAction::Previous)
    }

    /// Jump to a page; out-of-range indices are ignored
    pub fn jump_to(&mut self, index: i64) -> NavigationState {
        self.navigate(NavAction::JumpTo(index))
    }

    /// Latest delivered listing results
    pub fn listing(&self) -> Option<&SearchResults> {
        self.listing.as_ref()
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.event_bus.subscribe()
    }

    /// Replace the block data after an edit
    pub fn update_block(&mut self, block: BlockData) {
        if let Some(state) = self.tracker.set_slides_to_show(parse_slides_to_show(&block)) {
            self.emit_viewport(state);
        }
        self.block = block;
        self.recompute();
    }

    /// Handle a viewport resize
    pub fn on_resize(&mut self, width: Option<u32>) {
        if let Some(state) = self.tracker.on_resize(width) {
            self.emit_viewport(state);
            self.recompute();
        }
    }

    /// Deliver listing results
    ///
    /// Results are applied in delivery order; the last delivery wins.
    pub fn apply_listing(&mut self, results: SearchResults) {
        self.event_bus.emit(CarouselEvent::ListingReceived {
            request_key: self.request_key.clone(),
            item_count: results.items.len(),
        });
        self.listing = Some(results);
        self.recompute();
    }

    /// Run the block's listing search and apply the results
    ///
    /// Returns the number of items delivered, or `None` when the block
    /// needs no search (listing off or no query), in which case any earlier
    /// results are dropped.
    ///
    /// # Errors
    ///
    /// Returns the provider's error. Previously delivered results stay in
    /// place so the carousel keeps showing them.
    pub async fn refresh_listing(
        &mut self,
        provider: &dyn ContentSearchProvider,
    ) -> Result<Option<usize>> {
        let Some(request) = build_request(&self.block, &self.request_key) else {
            if self.listing.take().is_some() {
                self.recompute();
            }
            return Ok(None);
        };

        self.event_bus.emit(CarouselEvent::ListingRequested {
            request_key: request.request_key.clone(),
            search_term: request.search_term.clone(),
        });

        match provider.search(&request).await {
            Ok(results) => {
                let count = results.items.len();
                tracing::debug!(provider = provider.name(), count, "Listing results received");
                self.apply_listing(results);
                Ok(Some(count))
            }
            Err(e) => {
                tracing::warn!(
                    provider = provider.name(),
                    "Listing search failed, keeping previous results: {}",
                    e
                );
                self.event_bus.emit(CarouselEvent::ListingFailed {
                    request_key: request.request_key,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Detach from the viewport and release the carousel engine
    pub fn teardown(&mut self) {
        self.tracker.detach();
        self.controller.teardown();
    }

    /// Re-attach after a teardown
    pub fn remount(&mut self, observer: &dyn ViewportObserver) {
        if let Some(state) = self.tracker.attach(observer) {
            self.emit_viewport(state);
        }
        self.controller.initialize();
        self.recompute();
    }

    /// Make every render decision for the current state
    pub fn render(&self) -> CarouselView {
        let host = self.settings.host();
        let block = &self.block;

        let slides = self
            .slides
            .iter()
            .map(|slide| {
                let click = click_action(slide, block.clickable_slides, host);
                let date_label = slide
                    .effective_date
                    .as_deref()
                    .filter(|_| block.show_effective_date)
                    .map(format_effective_date)
                    .filter(|label| !label.is_empty());

                RenderedSlide {
                    heading: slide.heading.clone(),
                    content: if block.hide_description {
                        String::new()
                    } else {
                        slide.content.clone()
                    },
                    href: resolve_href(slide.link.as_ref()),
                    image_url: resolve_image(slide),
                    clickable: click.is_some(),
                    click,
                    button: button_link(slide, block.hide_buttons, host),
                    date_label,
                    origin: slide.origin,
                }
            })
            .collect();

        CarouselView {
            config: self.resolved.clone(),
            viewport: self.tracker.state(),
            navigation: self.controller.navigation(),
            show_arrows: self.controller.show_arrows(block.hide_arrows),
            show_dots: self.controller.show_dots(block.hide_dots),
            text_alignment: block.alignment_name().to_string(),
            full_width: block.is_full_width,
            equal_height: block.equal_height,
            mode: block.mode.clone().filter(|m| !m.is_empty()),
            slides,
        }
    }

    fn reduce_slides(
        block: &BlockData,
        settings: &Config,
        listing: Option<&SearchResults>,
    ) -> Vec<SlideRecord> {
        let button_text = block
            .listing_button_text
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(settings.defaults.listing_button_text.as_str());

        reduce(
            &block.slides,
            listing.map(|results| results.items.as_slice()),
            SourceMode {
                use_listing: block.use_listing,
                append_manual_slides: block.append_manual_slides,
            },
            Some(button_text),
        )
    }

    fn recompute(&mut self) {
        self.slides = Self::reduce_slides(&self.block, &self.settings, self.listing.as_ref());

        let viewport = self.tracker.state();
        let resolved = resolve_block(&self.block, &viewport, self.settings.defaults.autoplay_delay_ms);
        if resolved != self.resolved {
            self.event_bus.emit(CarouselEvent::ConfigResolved {
                carousel_type: resolved.carousel_type.to_string(),
                loop_enabled: resolved.loop_enabled,
                scroll_step: resolved.scroll_step,
            });
        }
        self.resolved = resolved;

        let before = self.controller.navigation();
        self.controller.set_loop(self.resolved.loop_enabled);
        let after = self
            .controller
            .set_dimensions(self.slides.len(), viewport.effective_items_visible as usize);
        self.emit_navigation(before, after);
    }

    fn navigate(&mut self, action: NavAction) -> NavigationState {
        let before = self.controller.navigation();
        let after = self.controller.dispatch(action);
        self.emit_navigation(before, after);
        after
    }

    fn emit_navigation(&self, before: NavigationState, after: NavigationState) {
        if after != before {
            self.event_bus.emit(CarouselEvent::Navigated {
                selected_index: after.selected_index,
                page_count: after.page_count,
            });
        }
    }

    fn emit_viewport(&self, state: ViewportState) {
        self.event_bus.emit(CarouselEvent::ViewportChanged {
            is_narrow: state.is_narrow,
            effective_items_visible: state.effective_items_visible,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use crate::listing::mock::MockSearchProvider;
    use crate::types::{ContentItem, ManualSlide};
    use crate::viewport::FixedViewport;
    use serde_json::json;

    fn block(value: serde_json::Value) -> BlockData {
        serde_json::from_value(value).unwrap()
    }

    fn manual_slides(n: usize) -> serde_json::Value {
        json!((0..n)
            .map(|i| json!({"heading": format!("Slide {}", i)}))
            .collect::<Vec<_>>())
    }

    fn news(n: usize) -> Vec<ContentItem> {
        (0..n)
            .map(|i| ContentItem::new(format!("/news/{}", i)).with_title(format!("News {}", i)))
            .collect()
    }

    #[test]
    fn test_initial_state_uses_viewport() {
        let viewport = FixedViewport::new(500);
        let session = CarouselSession::with_request_key(
            block(json!({"slidesToShow": 3, "slides": manual_slides(6)})),
            Config::default(),
            &viewport,
            "b1",
        );

        assert_eq!(session.request_key(), "b1");
        assert!(session.viewport().is_narrow);
        assert_eq!(session.config().scroll_step, 1);
        assert_eq!(session.navigation().page_count, 6);
    }

    #[test]
    fn test_generated_request_keys_differ() {
        let viewport = FixedViewport::default();
        let a = CarouselSession::new(BlockData::default(), Config::default(), &viewport);
        let b = CarouselSession::new(BlockData::default(), Config::default(), &viewport);
        assert_ne!(a.request_key(), b.request_key());
    }

    #[test]
    fn test_resize_recomputes_pages() {
        let viewport = FixedViewport::new(1280);
        let mut session = CarouselSession::with_request_key(
            block(json!({"slidesToShow": 3, "slides": manual_slides(10)})),
            Config::default(),
            &viewport,
            "b1",
        );
        assert_eq!(session.navigation().page_count, 4);
        session.jump_to(3);

        session.on_resize(Some(700));
        assert_eq!(session.config().scroll_step, 1);
        assert_eq!(session.navigation().page_count, 10);
        assert_eq!(session.navigation().selected_index, 3);

        session.on_resize(Some(1280));
        assert_eq!(session.navigation().page_count, 4);
        assert_eq!(session.navigation().selected_index, 3);
    }

    #[test]
    fn test_edit_keeps_page_valid_in_new_layout() {
        let viewport = FixedViewport::new(1280);
        let mut session = CarouselSession::with_request_key(
            block(json!({"slidesToShow": 3, "slides": manual_slides(9)})),
            Config::default(),
            &viewport,
            "b1",
        );
        session.jump_to(2);

        session.update_block(block(json!({"slidesToShow": 1, "slides": manual_slides(3)})));
        assert_eq!(
            session.navigation(),
            NavigationState {
                selected_index: 2,
                page_count: 3
            }
        );
    }

    #[test]
    fn test_navigation_emits_events() {
        let viewport = FixedViewport::new(1280);
        let mut session = CarouselSession::with_request_key(
            block(json!({"loop": false, "slides": manual_slides(3)})),
            Config::default(),
            &viewport,
            "b1",
        );
        let mut events = session.subscribe();

        session.next();
        assert_eq!(
            events.try_recv().unwrap(),
            CarouselEvent::Navigated {
                selected_index: 1,
                page_count: 3
            }
        );

        session.jump_to(2);
        session.next();
        session.jump_to(9);
        assert!(matches!(
            events.try_recv().unwrap(),
            CarouselEvent::Navigated {
                selected_index: 2,
                ..
            }
        ));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_update_block_switches_to_listing() {
        let viewport = FixedViewport::new(1280);
        let mut session = CarouselSession::with_request_key(
            block(json!({"slides": manual_slides(2)})),
            Config::default(),
            &viewport,
            "b1",
        );
        session.apply_listing(SearchResults::new(news(3)));
        assert_eq!(session.slides().len(), 2);

        let mut data = session.block().clone();
        data.use_listing = true;
        session.update_block(data);
        assert_eq!(session.slides().len(), 3);
        assert_eq!(session.slides()[0].origin, Origin::Listing);
    }

    #[tokio::test]
    async fn test_refresh_listing_applies_results() {
        let viewport = FixedViewport::new(1280);
        let mut session = CarouselSession::with_request_key(
            block(json!({"useListing": true, "query": "news", "limit": 2})),
            Config::default(),
            &viewport,
            "b1",
        );
        let mut events = session.subscribe();
        let provider = MockSearchProvider::with_items(news(5));

        let count = session.refresh_listing(&provider).await.unwrap();
        assert_eq!(count, Some(2));
        assert_eq!(session.slides().len(), 2);
        assert_eq!(provider.requests()[0].request_key, "b1");
        assert_eq!(provider.requests()[0].search_term, "news");

        assert!(matches!(
            events.recv().await.unwrap(),
            CarouselEvent::ListingRequested { .. }
        ));
        assert_eq!(
            events.recv().await.unwrap(),
            CarouselEvent::ListingReceived {
                request_key: "b1".to_string(),
                item_count: 2
            }
        );
    }

    #[tokio::test]
    async fn test_refresh_listing_failure_keeps_results() {
        let viewport = FixedViewport::new(1280);
        let mut session = CarouselSession::with_request_key(
            block(json!({"useListing": true, "query": "news"})),
            Config::default(),
            &viewport,
            "b1",
        );
        session.apply_listing(SearchResults::new(news(3)));

        let provider = MockSearchProvider::failing(SearchError::Unavailable("down".to_string()));
        assert!(session.refresh_listing(&provider).await.is_err());
        assert_eq!(session.slides().len(), 3);
    }

    #[tokio::test]
    async fn test_refresh_without_query_clears_results() {
        let viewport = FixedViewport::new(1280);
        let mut session = CarouselSession::with_request_key(
            block(json!({"useListing": true, "slides": manual_slides(1)})),
            Config::default(),
            &viewport,
            "b1",
        );
        session.apply_listing(SearchResults::new(news(3)));
        assert_eq!(session.slides().len(), 3);

        let provider = MockSearchProvider::with_items(news(3));
        assert_eq!(session.refresh_listing(&provider).await.unwrap(), None);
        assert_eq!(provider.call_count(), 0);
        assert_eq!(session.slides().len(), 1);
        assert_eq!(session.slides()[0].origin, Origin::Manual);
    }

    #[test]
    fn test_render_decisions() {
        let viewport = FixedViewport::new(1280);
        let settings = Config {
            site: crate::config::SiteConfig {
                host: Some("www.example.org".to_string()),
            },
            ..Default::default()
        };
        let mut session = CarouselSession::with_request_key(
            block(json!({
                "useListing": true,
                "clickableSlides": true,
                "hideDescription": true,
                "showEffectiveDate": true,
                "listingButtonText": "Open",
            })),
            settings,
            &viewport,
            "b1",
        );
        session.apply_listing(SearchResults::new(vec![
            ContentItem {
                description: Some("Hidden".to_string()),
                effective: Some("2024-03-05T10:00:00+00:00".to_string()),
                ..ContentItem::new("https://www.example.org/news/1")
            },
            ContentItem {
                type_tag: Some("Link".to_string()),
                remote_url: Some("https://ext.example/x".to_string()),
                ..ContentItem::new("/links/ext")
            },
        ]));

        let view = session.render();
        assert_eq!(view.slides.len(), 2);
        assert!(view.show_arrows);
        assert!(view.show_dots);

        let first = &view.slides[0];
        assert_eq!(first.content, "");
        assert_eq!(first.date_label.as_deref(), Some("March 5, 2024"));
        assert_eq!(
            first.click,
            Some(ClickAction::Navigate("https://www.example.org/news/1".to_string()))
        );
        assert_eq!(first.button.as_ref().unwrap().label, "Open");

        let second = &view.slides[1];
        assert_eq!(second.href, "https://ext.example/x");
        assert!(second.button.as_ref().unwrap().external);
        assert_eq!(second.date_label, None);
    }

    #[test]
    fn test_single_slide_hides_controls() {
        let viewport = FixedViewport::new(1280);
        let session = CarouselSession::with_request_key(
            BlockData {
                slides: vec![ManualSlide::default()],
                ..Default::default()
            },
            Config::default(),
            &viewport,
            "b1",
        );
        let view = session.render();
        assert!(!view.show_arrows);
        assert!(!view.show_dots);
        assert_eq!(view.text_alignment, "left");
    }

    #[test]
    fn test_teardown_and_remount() {
        let viewport = FixedViewport::new(1280);
        let mut session = CarouselSession::with_request_key(
            block(json!({"slidesToShow": 2, "slides": manual_slides(4)})),
            Config::default(),
            &viewport,
            "b1",
        );
        session.teardown();
        session.on_resize(Some(500));
        assert!(!session.viewport().is_narrow);
        assert_eq!(session.next().selected_index, 0);

        viewport.set_width(500);
        session.remount(&viewport);
        assert!(session.viewport().is_narrow);
        assert_eq!(session.navigation().page_count, 4);
        assert_eq!(session.next().selected_index, 1);
    }
}
