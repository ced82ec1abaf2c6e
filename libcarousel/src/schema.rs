//! Editing form schema
//!
//! The form renderer is an external collaborator: it receives a declarative
//! schema and reports field changes back. This module keeps the schema's
//! field list consistent with the block's current mode and applies reported
//! changes to block data.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::block::BlockData;
use crate::error::{CarouselError, Result};
use crate::types::ManualSlide;

/// Fields that only make sense when slides come from a listing
pub const LISTING_FIELDS: [&str; 6] = [
    "query",
    "sortOn",
    "sortOrder",
    "limit",
    "listingButtonText",
    "appendManualSlides",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fieldset {
    pub id: String,
    pub title: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub title: String,
    pub fieldsets: Vec<Fieldset>,
    pub properties: Map<String, Value>,
    #[serde(default)]
    pub required: Vec<String>,
}

impl Schema {
    /// Field ids of the first fieldset
    pub fn fields(&self) -> &[String] {
        self.fieldsets
            .first()
            .map(|f| f.fields.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields().iter().any(|f| f == field)
    }
}

fn slide_schema() -> Value {
    json!({
        "title": "Slide",
        "titleField": "heading",
        "fieldsets": [{
            "id": "default",
            "title": "Default",
            "fields": ["heading", "content", "image", "link", "buttonText"],
        }],
        "properties": {
            "heading": {"title": "Heading", "type": "string"},
            "content": {"title": "Content", "type": "text"},
            "image": {
                "title": "Image",
                "widget": "object_browser",
                "mode": "image",
                "allowExternals": false,
            },
            "link": {
                "title": "Link",
                "widget": "object_browser",
                "mode": "link",
                "allowExternals": true,
                "multi": false,
                "default": null,
            },
            "buttonText": {"title": "Button text", "type": "string"},
        },
        "required": [],
    })
}

/// The mode-independent schema
pub fn base_schema() -> Schema {
    let fields = [
        "slides",
        "carouselType",
        "preset",
        "slidesToShow",
        "autoplay",
        "autoplayDelay",
        "alignment",
        "mode",
        "isFullWidth",
        "equalHeight",
        "loop",
        "hideArrows",
        "hideDots",
        "hideButtons",
        "hideDescription",
        "clickableSlides",
    ];

    let properties = json!({
        "slides": {"title": "Slides", "widget": "object_list", "schema": slide_schema()},
        "carouselType": {
            "title": "Carousel type",
            "choices": [
                ["default", "Default"],
                ["centered", "Centered"],
                ["peek", "Peek"],
                ["cards", "Cards"],
            ],
            "default": "default",
        },
        "preset": {
            "title": "Preset",
            "choices": [
                ["loop", "Loop"],
                ["scroll", "Scroll one at a time"],
                ["contain", "Contain scroll"],
                ["dragFree", "Drag free"],
                ["snaps", "Snap to slides"],
            ],
        },
        "slidesToShow": {"title": "Slides to show", "type": "number", "default": 1},
        "autoplay": {"title": "Autoplay", "type": "boolean"},
        "autoplayDelay": {"title": "Autoplay delay (ms)", "type": "number", "default": 8000},
        "alignment": {
            "title": "Text alignment",
            "widget": "align",
            "actions": ["left", "center", "right"],
            "default": "left",
        },
        "mode": {"title": "Display mode", "type": "string"},
        "isFullWidth": {"title": "Full width carousel", "type": "boolean", "default": false},
        "equalHeight": {"title": "Equal slide height", "type": "boolean", "default": false},
        "loop": {"title": "Loop infinitely", "type": "boolean", "default": true},
        "hideArrows": {"title": "Hide arrows", "type": "boolean"},
        "hideDots": {"title": "Hide dots", "type": "boolean"},
        "hideButtons": {"title": "Hide buttons", "type": "boolean", "default": false},
        "hideDescription": {"title": "Hide description", "type": "boolean", "default": false},
        "clickableSlides": {"title": "Make slides clickable", "type": "boolean", "default": false},
    });

    Schema {
        title: "Carousel".to_string(),
        fieldsets: vec![Fieldset {
            id: "default".to_string(),
            title: "Default".to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }],
        properties: match properties {
            Value::Object(map) => map,
            _ => Map::new(),
        },
        required: Vec::new(),
    }
}

fn listing_properties() -> Map<String, Value> {
    let properties = json!({
        "query": {"title": "Query", "widget": "querystring"},
        "sortOn": {"title": "Sort on", "type": "string", "default": "sortable_title"},
        "sortOrder": {
            "title": "Sort order",
            "type": "string",
            "choices": [["ascending", "Ascending"], ["descending", "Descending"]],
            "default": "ascending",
        },
        "limit": {"title": "Limit", "type": "number", "default": 5},
        "listingButtonText": {"title": "Button text", "type": "string", "default": "Read more"},
        "appendManualSlides": {
            "title": "Append manual slides",
            "type": "boolean",
            "default": false,
        },
    });
    match properties {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn push_field(fields: &mut Vec<String>, field: &str) {
    if !fields.iter().any(|f| f == field) {
        fields.push(field.to_string());
    }
}

/// Adjust a schema to the block's current mode
///
/// Listing toggles are always present. Listing mode adds the query fields
/// and hides `slides` unless manual slides are appended; manual mode hides
/// the query fields and puts `slides` first.
pub fn enhance(mut schema: Schema, block: &BlockData) -> Schema {
    let Some(fieldset) = schema.fieldsets.first_mut() else {
        tracing::warn!("Schema has no fieldsets, leaving it unchanged");
        return schema;
    };

    push_field(&mut fieldset.fields, "useListing");
    push_field(&mut fieldset.fields, "showEffectiveDate");
    schema.properties.insert(
        "useListing".to_string(),
        json!({"title": "Use listing source", "type": "boolean", "default": false}),
    );
    schema.properties.insert(
        "showEffectiveDate".to_string(),
        json!({"title": "Show effective date", "type": "boolean", "default": false}),
    );

    if block.use_listing {
        for field in LISTING_FIELDS {
            push_field(&mut fieldset.fields, field);
        }
        schema.properties.extend(listing_properties());

        if block.append_manual_slides {
            if !fieldset.fields.iter().any(|f| f == "slides") {
                fieldset.fields.insert(0, "slides".to_string());
            }
        } else {
            fieldset.fields.retain(|f| f != "slides");
        }
    } else {
        fieldset
            .fields
            .retain(|f| !LISTING_FIELDS.contains(&f.as_str()));
        if !fieldset.fields.iter().any(|f| f == "slides") {
            fieldset.fields.insert(0, "slides".to_string());
        }
    }

    schema
}

/// The schema for a block in its current mode
pub fn carousel_schema(block: &BlockData) -> Schema {
    enhance(base_schema(), block)
}

/// Block data as the form renderer expects it: slide links as lists
pub fn form_data(block: &BlockData) -> Value {
    let mut value = serde_json::to_value(block).unwrap_or_else(|_| json!({}));

    let slides: Vec<ManualSlide> = block
        .slides
        .iter()
        .cloned()
        .map(|slide| ManualSlide {
            link: slide.link.clone().into_list(),
            ..slide
        })
        .collect();

    if let Value::Object(map) = &mut value {
        map.insert(
            "slides".to_string(),
            serde_json::to_value(slides).unwrap_or_else(|_| json!([])),
        );
    }
    value
}

/// Apply a field change reported by the form renderer
///
/// Slide links arrive as lists from the object browser and are stored as a
/// single reference.
///
/// # Errors
///
/// Returns `CarouselError::InvalidInput` if the value does not fit the
/// field.
pub fn apply_field_change(block: &BlockData, field_id: &str, value: Value) -> Result<BlockData> {
    if field_id == "slides" {
        let slides: Vec<ManualSlide> = match value {
            Value::Array(_) => serde_json::from_value(value)
                .map_err(|e| CarouselError::InvalidInput(format!("slides: {}", e)))?,
            _ => Vec::new(),
        };
        let slides = slides
            .into_iter()
            .map(|slide| ManualSlide {
                link: slide.link.clone().into_single(),
                ..slide
            })
            .collect();
        return Ok(BlockData {
            slides,
            ..block.clone()
        });
    }

    let mut data = serde_json::to_value(block)
        .map_err(|e| CarouselError::InvalidInput(e.to_string()))?;
    if let Value::Object(map) = &mut data {
        map.insert(field_id.to_string(), value);
    }

    serde_json::from_value(data)
        .map_err(|e| CarouselError::InvalidInput(format!("{}: {}", field_id, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContentItem, Ref};

    #[test]
    fn test_manual_mode_fields() {
        let schema = carousel_schema(&BlockData::default());
        assert_eq!(schema.fields()[0], "slides");
        assert!(schema.has_field("useListing"));
        assert!(schema.has_field("showEffectiveDate"));
        assert!(!schema.has_field("query"));
        assert!(!schema.has_field("appendManualSlides"));
    }

    #[test]
    fn test_listing_mode_fields() {
        let block = BlockData {
            use_listing: true,
            ..Default::default()
        };
        let schema = carousel_schema(&block);
        assert!(!schema.has_field("slides"));
        for field in LISTING_FIELDS {
            assert!(schema.has_field(field), "missing {}", field);
            assert!(schema.properties.contains_key(field));
        }
    }

    #[test]
    fn test_listing_mode_with_appended_slides() {
        let block = BlockData {
            use_listing: true,
            append_manual_slides: true,
            ..Default::default()
        };
        let schema = carousel_schema(&block);
        assert_eq!(schema.fields()[0], "slides");
        assert!(schema.has_field("query"));
    }

    #[test]
    fn test_enhance_is_idempotent() {
        let block = BlockData {
            use_listing: true,
            ..Default::default()
        };
        let once = carousel_schema(&block);
        let twice = enhance(once.clone(), &block);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_switching_back_to_manual() {
        let listing = BlockData {
            use_listing: true,
            ..Default::default()
        };
        let schema = enhance(carousel_schema(&listing), &BlockData::default());
        assert_eq!(schema.fields()[0], "slides");
        assert!(!schema.has_field("sortOn"));
    }

    #[test]
    fn test_enhance_without_fieldsets() {
        let schema = Schema {
            title: "Empty".to_string(),
            fieldsets: Vec::new(),
            properties: Map::new(),
            required: Vec::new(),
        };
        assert_eq!(enhance(schema.clone(), &BlockData::default()), schema);
    }

    #[test]
    fn test_slides_change_collapses_links() {
        let block = apply_field_change(
            &BlockData::default(),
            "slides",
            json!([
                {"heading": "A", "link": [{"@id": "/a"}, {"@id": "/ignored"}]},
                {"heading": "B", "link": []},
            ]),
        )
        .unwrap();

        assert_eq!(block.slides[0].link, Ref::single(ContentItem::new("/a")));
        assert_eq!(block.slides[1].link, Ref::None);
    }

    #[test]
    fn test_slides_change_with_non_list() {
        let block = BlockData {
            slides: vec![ManualSlide::default()],
            ..Default::default()
        };
        let block = apply_field_change(&block, "slides", json!(null)).unwrap();
        assert!(block.slides.is_empty());
    }

    #[test]
    fn test_scalar_field_change() {
        let block = apply_field_change(&BlockData::default(), "useListing", json!(true)).unwrap();
        assert!(block.use_listing);

        let block = apply_field_change(&block, "slidesToShow", json!("3")).unwrap();
        assert_eq!(block.slides_to_show.and_then(|v| v.as_int()), Some(3));
    }

    #[test]
    fn test_invalid_field_change() {
        let err = apply_field_change(&BlockData::default(), "useListing", json!("maybe"))
            .unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_form_data_wraps_links() {
        let block = BlockData {
            slides: vec![
                ManualSlide {
                    link: Ref::single(ContentItem::new("/a")),
                    ..Default::default()
                },
                ManualSlide::default(),
            ],
            ..Default::default()
        };
        let data = form_data(&block);
        assert_eq!(data["slides"][0]["link"], json!([{"@id": "/a"}]));
        assert_eq!(data["slides"][1]["link"], json!([]));
    }
}
