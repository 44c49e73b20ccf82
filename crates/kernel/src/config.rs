//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use url::Url;

/// Kernel configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory of YAML config files to import at startup (VETRINA_CONFIG_DIR).
    pub config_dir: Option<PathBuf>,

    /// Base URL for serving public files (default: /files).
    pub files_url: String,

    /// Public site URL for canonical entity links (default: http://localhost:3000).
    pub site_url: String,

    /// Directory of Tera templates overriding the built-in ones.
    pub template_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: None,
            files_url: "/files".to_string(),
            site_url: "http://localhost:3000".to_string(),
            template_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let config_dir = env::var("VETRINA_CONFIG_DIR").ok().map(PathBuf::from);

        let files_url = env::var("FILES_URL").unwrap_or_else(|_| "/files".to_string());

        let site_url =
            env::var("SITE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
        Url::parse(&site_url).context("SITE_URL must be an absolute URL")?;

        let template_dir = env::var("TEMPLATE_DIR").ok().map(PathBuf::from);

        Ok(Self {
            config_dir,
            files_url,
            site_url: site_url.trim_end_matches('/').to_string(),
            template_dir,
        })
    }
}
