//! Render elements returned by formatters.
//!
//! Plugins return structured render elements (never raw HTML). The Kernel
//! dispatches each element to the template registered under its `#theme` key.

use serde::{Deserialize, Serialize};

use crate::cache::CacheMetadata;
use crate::types::{FieldItem, ItemAttributes};

/// Theme key of the responsive image formatter template.
pub const RESPONSIVE_IMAGE_FORMATTER_THEME: &str = "responsive_image_formatter";

/// One rendered image field item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsiveImageElement {
    #[serde(rename = "#theme")]
    pub theme: String,
    #[serde(rename = "#item")]
    pub item: FieldItem,
    /// Attributes detached from the item for this element's template.
    #[serde(rename = "#item_attributes", default)]
    pub item_attributes: ItemAttributes,
    /// Resolved responsive image style ID, empty when the style is missing.
    #[serde(rename = "#responsive_image_style_id", default)]
    pub responsive_image_style_id: String,
    #[serde(rename = "#url", skip_serializing_if = "Option::is_none", default)]
    pub url: Option<String>,
    #[serde(rename = "#cache", default)]
    pub cache: CacheMetadata,
}

impl ResponsiveImageElement {
    pub fn new(item: FieldItem, item_attributes: ItemAttributes) -> Self {
        Self {
            theme: RESPONSIVE_IMAGE_FORMATTER_THEME.to_string(),
            item,
            item_attributes,
            responsive_image_style_id: String::new(),
            url: None,
            cache: CacheMetadata::default(),
        }
    }

    pub fn style(mut self, style_id: impl Into<String>) -> Self {
        self.responsive_image_style_id = style_id.into();
        self
    }

    pub fn url(mut self, url: Option<String>) -> Self {
        self.url = url;
        self
    }

    pub fn cache(mut self, cache: CacheMetadata) -> Self {
        self.cache = cache;
        self
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_render_keys() {
        let element = ResponsiveImageElement::new(FieldItem::default().alt("A"), ItemAttributes::new())
            .style("wide_banner");
        let json = serde_json::to_value(&element).unwrap();

        assert_eq!(json["#theme"], "responsive_image_formatter");
        assert_eq!(json["#responsive_image_style_id"], "wide_banner");
        assert_eq!(json["#item"]["alt"], "A");
        assert!(json.get("#url").is_none());
    }
}
