//! Link and media resolution
//!
//! Derives the navigable URL and the image URL of a slide. Every function
//! here is total: malformed or missing references resolve to `"#"` (links)
//! or an empty string (images).

use serde::Serialize;

use crate::types::{ContentItem, LinkRef, Origin, SlideRecord, TYPE_FILE, TYPE_IMAGE, TYPE_LINK};

/// Href used for slides without a usable link
pub const NO_LINK: &str = "#";

const DOWNLOAD_SUFFIX: &str = "/@@download/file";
const IMAGES_VIEW: &str = "/@@images/";

/// Resolve the href of a link reference
pub fn resolve_href(link: Option<&LinkRef>) -> String {
    let Some(item) = link else {
        return NO_LINK.to_string();
    };

    if item.is_type(TYPE_LINK) {
        if let Some(remote) = item.remote_url.as_deref().filter(|u| !u.is_empty()) {
            return remote.to_string();
        }
    }

    if item.id.is_empty() {
        return NO_LINK.to_string();
    }

    if item.is_type(TYPE_FILE) {
        format!("{}{}", item.id, DOWNLOAD_SUFFIX)
    } else {
        item.id.clone()
    }
}

/// Whether a URL leaves the current site
///
/// Absolute http(s) URLs are external unless they contain the current host
/// name. With no known host every absolute URL is external.
pub fn is_external(url: &str, current_host: Option<&str>) -> bool {
    let lower = url.to_ascii_lowercase();
    if !(lower.starts_with("http://") || lower.starts_with("https://")) {
        return false;
    }

    match current_host.filter(|h| !h.is_empty()) {
        Some(host) => !lower.contains(&host.to_ascii_lowercase()),
        None => true,
    }
}

fn rendition_url(id: &str, field: &str) -> String {
    format!("{}{}{}", id, IMAGES_VIEW, field)
}

/// Resolve an image reference: its rendition, or its download URL
fn media_url(image: Option<&ContentItem>) -> String {
    match image {
        Some(image) if !image.id.is_empty() => rendition_url(&image.id, "image"),
        Some(image) => image.download.clone().unwrap_or_default(),
        None => String::new(),
    }
}

/// Image URL from the metadata of a content item
///
/// Checked in order: image scales with an image field, preview image, lead
/// image, then the generic image field.
pub fn content_image_url(item: &ContentItem) -> String {
    let image_field = item.image_field.as_deref().filter(|f| !f.is_empty());
    if let (Some(_), Some(field)) = (&item.image_scales, image_field) {
        return rendition_url(&item.id, field);
    }

    if let Some(preview) = item.preview_image.first() {
        return rendition_url(&preview.id, "image");
    }

    if let Some(lead) = item.lead_image.first() {
        return rendition_url(&lead.id, "image");
    }

    media_url(item.image.first())
}

/// Resolve the background image of a slide
pub fn resolve_image(slide: &SlideRecord) -> String {
    match slide.origin {
        Origin::Listing => match slide.link.as_ref() {
            Some(item) if item.is_type(TYPE_IMAGE) && !item.id.is_empty() => {
                rendition_url(&item.id, "image")
            }
            Some(item) => content_image_url(item),
            None => String::new(),
        },
        Origin::Manual => media_url(slide.image.as_ref()),
    }
}

/// What a click on a slide does
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "url", rename_all = "snake_case")]
pub enum ClickAction {
    /// Open in a new browsing context without a referrer
    OpenExternal(String),
    /// Navigate the current context
    Navigate(String),
}

/// Decide the click behavior of a slide
///
/// Returns `None` when slides are not clickable or the slide has no link.
pub fn click_action(slide: &SlideRecord, clickable: bool, current_host: Option<&str>) -> Option<ClickAction> {
    if !clickable {
        return None;
    }

    let href = resolve_href(slide.link.as_ref());
    if href.is_empty() || href == NO_LINK {
        return None;
    }

    if is_external(&href, current_host) {
        Some(ClickAction::OpenExternal(href))
    } else {
        Some(ClickAction::Navigate(href))
    }
}

/// A call-to-action button on a slide
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonLink {
    pub href: String,
    pub label: String,
    pub external: bool,
}

/// Decide whether a slide shows a button, and where it points
pub fn button_link(slide: &SlideRecord, hide_buttons: bool, current_host: Option<&str>) -> Option<ButtonLink> {
    if hide_buttons {
        return None;
    }

    let label = slide.button_text.trim();
    if label.is_empty() {
        return None;
    }

    let href = resolve_href(slide.link.as_ref());
    let external = is_external(&href, current_host);

    Some(ButtonLink {
        href,
        label: label.to_string(),
        external,
    })
}
