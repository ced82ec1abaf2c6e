//! Carousel - slide resolution and configuration for content carousels
//!
//! This library turns persisted carousel block data into an ordered sequence
//! of render-ready slides and a resolved runtime configuration, and keeps
//! navigation state consistent as the viewport and the data change.

pub mod block;
pub mod config;
pub mod controller;
pub mod dates;
pub mod error;
pub mod events;
pub mod links;
pub mod listing;
pub mod logging;
pub mod resolver;
pub mod schema;
pub mod session;
pub mod slides;
pub mod types;
pub mod viewport;

// Re-export commonly used types
pub use block::BlockData;
pub use config::Config;
pub use controller::{CarouselController, NavigationState};
pub use error::{CarouselError, Result};
pub use listing::{ContentSearchProvider, SearchRequest, SearchResults};
pub use resolver::CarouselConfig;
pub use session::{CarouselSession, CarouselView, RenderedSlide};
pub use types::{ContentItem, ManualSlide, Origin, Ref, SlideRecord};
pub use viewport::{FixedViewport, ViewportObserver, ViewportState};
