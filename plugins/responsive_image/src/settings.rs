//! Formatter settings and their validation errors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vetrina_sdk::form::SelectElement;

/// Where a rendered image links to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageLink {
    /// No link. Stored configuration may also spell this as an empty string.
    #[default]
    #[serde(alias = "")]
    None,
    /// The owning entity's canonical URL.
    Content,
    /// The original file.
    File,
}

impl ImageLink {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Content => "content",
            Self::File => "file",
        }
    }

    /// Summary line describing the link target, if any.
    pub fn summary(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Content => Some("Linked to content"),
            Self::File => Some("Linked to file"),
        }
    }
}

impl fmt::Display for ImageLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageLink {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "none" => Ok(Self::None),
            "content" => Ok(Self::Content),
            "file" => Ok(Self::File),
            other => Err(SettingsError::UnknownLinkTarget(other.to_string())),
        }
    }
}

/// Settings of one formatter instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatterSettings {
    /// Responsive image style ID. Empty until configured.
    #[serde(default)]
    pub responsive_image_style: String,
    #[serde(default)]
    pub image_link: ImageLink,
}

impl FormatterSettings {
    pub fn new(responsive_image_style: impl Into<String>) -> Self {
        Self {
            responsive_image_style: responsive_image_style.into(),
            image_link: ImageLink::None,
        }
    }

    pub fn link(mut self, image_link: ImageLink) -> Self {
        self.image_link = image_link;
        self
    }
}

/// The formatter's settings form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsForm {
    pub responsive_image_style: SelectElement,
    pub image_link: SelectElement,
}

/// Configuration-time settings errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("a responsive image style must be selected")]
    MissingStyle,

    #[error("responsive image style '{0}' does not exist")]
    UnknownStyle(String),

    #[error("responsive image style '{0}' has no image style mappings")]
    StyleWithoutMappings(String),

    #[error("unknown image link target '{0}' (expected none, content or file)")]
    UnknownLinkTarget(String),

    #[error("failed to load responsive image styles")]
    Storage(#[from] anyhow::Error),
}
