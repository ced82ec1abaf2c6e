//! Slide source reduction
//!
//! Merges manually authored slides and listing results into one ordered
//! sequence of [`SlideRecord`]s. The output depends only on the inputs:
//! listing order is preserved from the provider and manual order from
//! authoring.

use crate::config::DEFAULT_LISTING_BUTTON_TEXT;
use crate::types::{ContentItem, ManualSlide, Origin, SlideRecord};

/// How slide sources are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceMode {
    pub use_listing: bool,
    pub append_manual_slides: bool,
}

/// Normalize an authored slide
pub fn normalize_manual(slide: &ManualSlide) -> SlideRecord {
    SlideRecord {
        heading: slide.heading.clone(),
        content: slide.content.clone(),
        image: slide.image.first().cloned(),
        link: slide.link.first().cloned(),
        button_text: slide.button_text.clone(),
        effective_date: None,
        origin: Origin::Manual,
    }
}

/// Normalize a listing result; the item itself becomes the slide's link
pub fn normalize_listing(item: &ContentItem, button_text: Option<&str>) -> SlideRecord {
    let button_text = button_text
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_LISTING_BUTTON_TEXT);

    SlideRecord {
        heading: item.title.clone().unwrap_or_default(),
        content: item.description.clone().unwrap_or_default(),
        image: None,
        link: Some(item.clone()),
        button_text: button_text.to_string(),
        effective_date: item.effective.clone().filter(|d| !d.is_empty()),
        origin: Origin::Listing,
    }
}

/// Reduce slide sources into one ordered sequence
///
/// - listing disabled: the manual slides
/// - listing enabled with results: the listing slides, followed by the
///   manual slides when `append_manual_slides` is set
/// - listing enabled without results: the manual slides, so an empty query
///   never renders an empty carousel
pub fn reduce(
    manual: &[ManualSlide],
    listing: Option<&[ContentItem]>,
    mode: SourceMode,
    listing_button_text: Option<&str>,
) -> Vec<SlideRecord> {
    let listing = listing.filter(|items| !items.is_empty());

    match (mode.use_listing, listing) {
        (true, Some(items)) => {
            let listing_slides = items
                .iter()
                .map(|item| normalize_listing(item, listing_button_text));

            if mode.append_manual_slides {
                listing_slides
                    .chain(manual.iter().map(normalize_manual))
                    .collect()
            } else {
                listing_slides.collect()
            }
        }
        (true, None) => {
            tracing::debug!("Listing returned no results, falling back to manual slides");
            manual.iter().map(normalize_manual).collect()
        }
        (false, _) => manual.iter().map(normalize_manual).collect(),
    }
}
