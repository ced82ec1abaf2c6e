//! Carousel lifecycle events
//!
//! An in-process event bus that lets hosts observe a carousel session
//! (listing requests, viewport changes, navigation) without polling it.
//!
//! The bus uses `tokio::sync::broadcast`. Emitting never blocks: with no
//! subscribers the event is dropped, and lagging subscribers miss the
//! oldest events.
//!
//! # Example
//!
//! ```no_run
//! use libcarousel::events::{CarouselEvent, EventBus};
//!
//! # async fn example() {
//! let event_bus = EventBus::new(100);
//! let mut receiver = event_bus.subscribe();
//!
//! event_bus.emit(CarouselEvent::ListingRequested {
//!     request_key: "block-1".to_string(),
//!     search_term: "news".to_string(),
//! });
//!
//! if let Ok(event) = receiver.recv().await {
//!     println!("Received: {:?}", event);
//! }
//! # }
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Event receiver type alias
pub type EventReceiver = broadcast::Receiver<CarouselEvent>;

/// Event bus for distributing carousel events
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CarouselEvent>,
}

impl EventBus {
    /// Create a new event bus
    ///
    /// `capacity` is the number of events buffered per subscriber before
    /// the oldest are dropped.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to events emitted from now on
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Emit an event to all subscribers
    pub fn emit(&self, event: CarouselEvent) {
        // Err only means nobody is listening
        let _ = self.sender.send(event);
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

/// Events emitted by a carousel session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CarouselEvent {
    /// A listing search was dispatched
    ListingRequested {
        request_key: String,
        search_term: String,
    },

    /// Listing results were delivered
    ListingReceived {
        request_key: String,
        item_count: usize,
    },

    /// The listing search failed; previous results are kept
    ListingFailed { request_key: String, error: String },

    /// The effective number of visible items changed
    ViewportChanged {
        is_narrow: bool,
        effective_items_visible: u32,
    },

    /// The runtime configuration was re-resolved
    ConfigResolved {
        carousel_type: String,
        loop_enabled: bool,
        scroll_step: u32,
    },

    /// The selected page or page count changed
    Navigated {
        selected_index: usize,
        page_count: usize,
    },
}
