//! Image style and responsive image style configuration entities.
//!
//! An [`ImageStyle`] is a named effect chain (scale, crop, ...). A
//! [`ResponsiveImageStyle`] maps breakpoints to image styles so one image
//! field can serve a different derivative per viewport.

use serde::{Deserialize, Serialize};

use crate::storage::StoredEntity;

/// Maximum allowed dimension (width or height) produced by an effect.
pub const MAX_DIMENSION: u32 = 4096;

/// Pseudo image style: render nothing for this breakpoint.
pub const EMPTY_IMAGE: &str = "_empty image_";

/// Pseudo image style: use the original, unprocessed file.
pub const ORIGINAL_IMAGE: &str = "_original image_";

/// A single image effect in a style's effect chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEffect {
    #[serde(rename = "type")]
    pub effect_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl ImageEffect {
    pub fn new(effect_type: &str, width: Option<u32>, height: Option<u32>) -> Self {
        Self {
            effect_type: effect_type.into(),
            width,
            height,
        }
    }

    /// Output dimensions of this effect for an input of the given size.
    ///
    /// Unknown input dimensions stay unknown unless the effect fixes them.
    fn transform(&self, width: Option<u32>, height: Option<u32>) -> (Option<u32>, Option<u32>) {
        match self.effect_type.as_str() {
            "scale" => {
                let w = self.width.or(width).map(clamp_dim);
                let h = match (self.height, w, width, height) {
                    (Some(h), ..) => Some(h),
                    // Maintain aspect ratio
                    (None, Some(w), Some(src_w), Some(src_h)) => {
                        let ratio = f64::from(w) / f64::from(src_w.max(1));
                        Some((f64::from(src_h) * ratio) as u32)
                    }
                    _ => height,
                };
                (w, h.map(clamp_dim))
            }
            "crop" | "resize" => (
                self.width.or(width).map(clamp_dim),
                self.height.or(height).map(clamp_dim),
            ),
            _ => (width, height),
        }
    }
}

/// Clamp a dimension to [`MAX_DIMENSION`].
fn clamp_dim(v: u32) -> u32 {
    v.min(MAX_DIMENSION)
}

/// A named, reusable image transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageStyle {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub effects: Vec<ImageEffect>,
}

impl ImageStyle {
    /// Config name prefix used for cache tags and export filenames.
    pub const CONFIG_PREFIX: &'static str = "image.style";

    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            effects: Vec::new(),
        }
    }

    pub fn effect(mut self, effect: ImageEffect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Storage URI of this style's derivative of `uri`.
    ///
    /// `public://images/a.jpg` becomes `public://styles/<style>/images/a.jpg`.
    /// URIs without a scheme are treated as relative to the public scheme.
    pub fn derivative_uri(&self, uri: &str) -> String {
        let (scheme, path) = uri.split_once("://").unwrap_or(("public", uri));
        format!("{scheme}://styles/{}/{}", self.id, path.trim_start_matches('/'))
    }

    /// Dimensions of the derivative produced from an original of the given size.
    pub fn transform_dimensions(
        &self,
        width: Option<u32>,
        height: Option<u32>,
    ) -> (Option<u32>, Option<u32>) {
        self.effects
            .iter()
            .fold((width, height), |(w, h), effect| effect.transform(w, h))
    }
}

impl StoredEntity for ImageStyle {
    const ENTITY_TYPE: &'static str = "image_style";

    fn id(&self) -> String {
        self.id.clone()
    }

    fn label(&self) -> String {
        self.label.clone()
    }

    fn cache_tags(&self) -> Vec<String> {
        vec![format!("config:{}.{}", Self::CONFIG_PREFIX, self.id)]
    }
}

/// What a breakpoint maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageMapping {
    /// One image style for the breakpoint/multiplier pair.
    ImageStyle { image_style: String },
    /// A `sizes` attribute plus the image styles offered in `srcset`.
    Sizes {
        sizes: String,
        #[serde(default)]
        sizes_image_styles: Vec<String>,
    },
}

impl ImageMapping {
    /// A mapping is usable when it references at least one image style.
    pub fn is_valid(&self) -> bool {
        match self {
            Self::ImageStyle { image_style } => !image_style.is_empty(),
            Self::Sizes {
                sizes,
                sizes_image_styles,
            } => !sizes.is_empty() && !sizes_image_styles.is_empty(),
        }
    }

    /// Image style IDs this mapping references.
    pub fn image_style_ids(&self) -> Vec<&str> {
        match self {
            Self::ImageStyle { image_style } => vec![image_style.as_str()],
            Self::Sizes {
                sizes_image_styles, ..
            } => sizes_image_styles.iter().map(String::as_str).collect(),
        }
    }
}

/// A breakpoint/multiplier pair and the image style(s) it uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageStyleMapping {
    pub breakpoint_id: String,
    /// Media query of the breakpoint. Empty matches every viewport.
    #[serde(default)]
    pub media_query: String,
    #[serde(default = "default_multiplier")]
    pub multiplier: String,
    pub image_mapping: ImageMapping,
}

fn default_multiplier() -> String {
    "1x".to_string()
}

impl ImageStyleMapping {
    pub fn image_style(breakpoint_id: &str, media_query: &str, image_style: &str) -> Self {
        Self {
            breakpoint_id: breakpoint_id.into(),
            media_query: media_query.into(),
            multiplier: default_multiplier(),
            image_mapping: ImageMapping::ImageStyle {
                image_style: image_style.into(),
            },
        }
    }

    pub fn sizes(breakpoint_id: &str, media_query: &str, sizes: &str, image_styles: &[&str]) -> Self {
        Self {
            breakpoint_id: breakpoint_id.into(),
            media_query: media_query.into(),
            multiplier: default_multiplier(),
            image_mapping: ImageMapping::Sizes {
                sizes: sizes.into(),
                sizes_image_styles: image_styles.iter().map(|s| s.to_string()).collect(),
            },
        }
    }

    pub fn multiplier(mut self, multiplier: &str) -> Self {
        self.multiplier = multiplier.into();
        self
    }
}

/// A named set of breakpoint to image style mappings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsiveImageStyle {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub breakpoint_group: String,
    /// Image style for browsers without `<picture>` support.
    #[serde(default)]
    pub fallback_image_style: String,
    #[serde(default)]
    pub image_style_mappings: Vec<ImageStyleMapping>,
}

impl ResponsiveImageStyle {
    /// Config name prefix used for cache tags and export filenames.
    pub const CONFIG_PREFIX: &'static str = "responsive_image.styles";

    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            breakpoint_group: String::new(),
            fallback_image_style: String::new(),
            image_style_mappings: Vec::new(),
        }
    }

    pub fn breakpoint_group(mut self, group: impl Into<String>) -> Self {
        self.breakpoint_group = group.into();
        self
    }

    pub fn fallback(mut self, image_style: impl Into<String>) -> Self {
        self.fallback_image_style = image_style.into();
        self
    }

    pub fn mapping(mut self, mapping: ImageStyleMapping) -> Self {
        self.image_style_mappings.push(mapping);
        self
    }

    /// Whether at least one usable mapping exists.
    pub fn has_image_style_mappings(&self) -> bool {
        self.image_style_mappings
            .iter()
            .any(|m| m.image_mapping.is_valid())
    }

    /// Every image style this style references: the fallback first, then each
    /// mapping's styles. De-duplicated, first-seen order, empty IDs dropped.
    pub fn image_style_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        let referenced = std::iter::once(self.fallback_image_style.as_str()).chain(
            self.image_style_mappings
                .iter()
                .flat_map(|m| m.image_mapping.image_style_ids()),
        );
        for id in referenced {
            if !id.is_empty() && !ids.iter().any(|existing| existing == id) {
                ids.push(id.to_string());
            }
        }
        ids
    }
}

impl StoredEntity for ResponsiveImageStyle {
    const ENTITY_TYPE: &'static str = "responsive_image_style";

    fn id(&self) -> String {
        self.id.clone()
    }

    fn label(&self) -> String {
        self.label.clone()
    }

    fn cache_tags(&self) -> Vec<String> {
        vec![format!("config:{}.{}", Self::CONFIG_PREFIX, self.id)]
    }
}
