//! Preprocessing for `responsive_image_formatter` elements.
//!
//! Turns a [`ResponsiveImageElement`] plus the style and file it refers to
//! into the variables the `<picture>` template reads: one `<source>` per
//! breakpoint and a fallback `<img>` source.

use std::collections::BTreeMap;

use serde::Serialize;
use tera::Context as TeraContext;
use vetrina_sdk::image::{EMPTY_IMAGE, ImageMapping, ImageStyle, ORIGINAL_IMAGE, ResponsiveImageStyle};
use vetrina_sdk::render::ResponsiveImageElement;
use vetrina_sdk::storage::UrlGenerator;
use vetrina_sdk::types::FileInfo;

/// A 1x1 transparent GIF, served for breakpoints mapped to [`EMPTY_IMAGE`].
pub const EMPTY_IMAGE_DATA_URI: &str =
    "data:image/gif;base64,R0lGODlhAQABAIAAAP///wAAACH5BAEAAAAALAAAAAABAAEAAAICRAEAOw==";

/// One `<source>` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PictureSource {
    pub media: String,
    pub srcset: String,
    pub sizes: String,
}

/// Template variables derived from the element's style and file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Picture {
    pub sources: Vec<PictureSource>,
    pub fallback_src: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Resolves image style URLs for one file.
struct DerivativeUrls<'a> {
    file: &'a FileInfo,
    image_styles: &'a BTreeMap<String, ImageStyle>,
    urls: &'a dyn UrlGenerator,
}

impl DerivativeUrls<'_> {
    /// URL of the file processed by `style_id`.
    ///
    /// Missing styles and [`ORIGINAL_IMAGE`] fall back to the original file.
    fn url(&self, style_id: &str) -> String {
        if style_id == EMPTY_IMAGE {
            return EMPTY_IMAGE_DATA_URI.to_string();
        }
        match self.image_styles.get(style_id) {
            Some(style) if style_id != ORIGINAL_IMAGE => {
                self.urls.file_url(&style.derivative_uri(&self.file.uri))
            }
            _ => self.urls.file_url(&self.file.uri),
        }
    }

    fn dimensions(
        &self,
        style_id: &str,
        width: Option<u32>,
        height: Option<u32>,
    ) -> (Option<u32>, Option<u32>) {
        match self.image_styles.get(style_id) {
            Some(style) => style.transform_dimensions(width, height),
            None => (width, height),
        }
    }
}

/// Build the `<picture>` variables for `element`.
///
/// `style` is `None` when the element has no resolved style; the picture
/// then holds only the original file.
pub fn build_picture(
    element: &ResponsiveImageElement,
    style: Option<&ResponsiveImageStyle>,
    image_styles: &BTreeMap<String, ImageStyle>,
    file: &FileInfo,
    urls: &dyn UrlGenerator,
) -> Picture {
    let derivatives = DerivativeUrls {
        file,
        image_styles,
        urls,
    };
    let (item_width, item_height) = (element.item.width, element.item.height);

    let Some(style) = style else {
        return Picture {
            sources: Vec::new(),
            fallback_src: derivatives.url(ORIGINAL_IMAGE),
            width: item_width,
            height: item_height,
        };
    };

    // Group mappings by breakpoint, keeping first-seen breakpoint order.
    let mut breakpoints: Vec<(&str, Vec<_>)> = Vec::new();
    for mapping in style
        .image_style_mappings
        .iter()
        .filter(|m| m.image_mapping.is_valid())
    {
        match breakpoints
            .iter_mut()
            .find(|(id, _)| *id == mapping.breakpoint_id)
        {
            Some((_, mappings)) => mappings.push(mapping),
            None => breakpoints.push((mapping.breakpoint_id.as_str(), vec![mapping])),
        }
    }

    let sources = breakpoints
        .into_iter()
        .map(|(_, mappings)| {
            let mut srcset = Vec::new();
            let mut sizes = String::new();
            for mapping in &mappings {
                match &mapping.image_mapping {
                    ImageMapping::ImageStyle { image_style } => {
                        srcset.push(format!(
                            "{} {}",
                            derivatives.url(image_style),
                            mapping.multiplier
                        ));
                    }
                    ImageMapping::Sizes {
                        sizes: mapping_sizes,
                        sizes_image_styles,
                    } => {
                        sizes = mapping_sizes.clone();
                        for image_style in sizes_image_styles {
                            let url = derivatives.url(image_style);
                            match derivatives.dimensions(image_style, item_width, item_height).0 {
                                Some(w) => srcset.push(format!("{url} {w}w")),
                                None => srcset.push(url),
                            }
                        }
                    }
                }
            }
            PictureSource {
                media: mappings
                    .first()
                    .map(|m| m.media_query.clone())
                    .unwrap_or_default(),
                srcset: srcset.join(", "),
                sizes,
            }
        })
        .collect();

    let fallback = style.fallback_image_style.as_str();
    let (fallback_src, (width, height)) = if fallback.is_empty() {
        (derivatives.url(ORIGINAL_IMAGE), (item_width, item_height))
    } else {
        (
            derivatives.url(fallback),
            derivatives.dimensions(fallback, item_width, item_height),
        )
    };

    Picture {
        sources,
        fallback_src,
        width,
        height,
    }
}

/// Tera context for the responsive image template.
pub fn picture_context(element: &ResponsiveImageElement, picture: &Picture) -> TeraContext {
    let mut context = TeraContext::new();
    context.insert("item", &element.item);
    context.insert("item_attributes", &element.item_attributes);
    context.insert("url", &element.url);
    context.insert("sources", &picture.sources);
    context.insert("fallback_src", &picture.fallback_src);
    context.insert("width", &picture.width);
    context.insert("height", &picture.height);
    context
}
