//! File URLs and canonical entity URLs.
//!
//! Stored files are addressed by scheme URIs (`public://images/a.jpg`).
//! [`SiteUrls`] turns those, and persisted entities, into public URLs.

use vetrina_sdk::storage::UrlGenerator;
use vetrina_sdk::types::HostEntity;

use crate::config::Config;

/// URL scheme of publicly served files.
pub const PUBLIC_SCHEME: &str = "public://";

/// URL generator for the site.
#[derive(Debug, Clone)]
pub struct SiteUrls {
    /// Base URL for canonical entity links.
    site_url: String,
    /// Base URL for public file access.
    files_url: String,
}

impl SiteUrls {
    pub fn new(site_url: impl Into<String>, files_url: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into().trim_end_matches('/').to_string(),
            files_url: files_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.site_url, &config.files_url)
    }
}

impl UrlGenerator for SiteUrls {
    fn entity_url(&self, entity: &HostEntity) -> Option<String> {
        let id = entity.id?;
        Some(format!("{}/{}/{id}", self.site_url, entity.entity_type))
    }

    fn file_url(&self, uri: &str) -> String {
        if let Some(path) = uri.strip_prefix(PUBLIC_SCHEME) {
            return format!("{}/{}", self.files_url, path.trim_start_matches('/'));
        }
        // Absolute URLs and unknown schemes are served as-is.
        uri.to_string()
    }
}
