//! Theme engine and template rendering.
//!
//! Provides Tera-based rendering of render elements, dispatched by each
//! element's `#theme` key.

mod engine;
mod render;

pub use engine::ThemeEngine;
pub use render::{EMPTY_IMAGE_DATA_URI, Picture, PictureSource, build_picture, picture_context};
