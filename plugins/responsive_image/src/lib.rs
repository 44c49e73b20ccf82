//! Responsive image plugin for Vetrina.
//!
//! Provides the `responsive_image` field formatter, which renders image
//! fields through a responsive image style: one `<picture>` per file, with a
//! derivative per breakpoint.

mod formatter;
mod settings;

pub use formatter::ResponsiveImageFormatter;
pub use settings::{FormatterSettings, ImageLink, SettingsError, SettingsForm};

/// Formatter plugin ID.
pub const FORMATTER_ID: &str = "responsive_image";

/// Field types the formatter can display.
pub const FIELD_TYPES: &[&str] = &["image"];
