//! Vetrina Plugin SDK
//!
//! Types and host capability traits shared by the Kernel and its plugins.
//! Plugins never reach into kernel internals: everything they need from the
//! host (entity storage, variables, URL generation) arrives through the
//! traits in [`storage`], injected at construction time.

pub mod cache;
pub mod form;
pub mod image;
pub mod render;
pub mod storage;
pub mod types;

pub mod prelude {
    pub use crate::cache::{CacheMetadata, merge_tags};
    pub use crate::form::SelectElement;
    pub use crate::image::{ImageEffect, ImageMapping, ImageStyle, ImageStyleMapping, ResponsiveImageStyle};
    pub use crate::render::{RESPONSIVE_IMAGE_FORMATTER_THEME, ResponsiveImageElement};
    pub use crate::storage::{EntityStorage, StoredEntity, UrlGenerator, Variables};
    pub use crate::types::*;
}
