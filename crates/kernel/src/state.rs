//! Application state shared by the CLI and the plugins it wires up.

use std::sync::Arc;

use anyhow::{Context, Result};
use mailchimp::ConfigurationAccessCheck;
use responsive_image::{FormatterSettings, ResponsiveImageFormatter};
use tracing::{debug, info, warn};
use vetrina_sdk::image::{ImageStyle, ResponsiveImageStyle};
use vetrina_sdk::render::ResponsiveImageElement;
use vetrina_sdk::storage::EntityStorage;
use vetrina_sdk::types::FileInfo;

use crate::config::Config;
use crate::config_storage::MemoryEntityStorage;
use crate::config_storage::yaml::{ConfigOpResult, import_config};
use crate::error::KernelResult;
use crate::file::SiteUrls;
use crate::theme::{ThemeEngine, build_picture, picture_context};
use crate::variables::VariableStore;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    responsive_image_styles: Arc<MemoryEntityStorage<ResponsiveImageStyle>>,
    image_styles: Arc<MemoryEntityStorage<ImageStyle>>,
    files: Arc<MemoryEntityStorage<FileInfo>>,
    variables: Arc<VariableStore>,
    urls: Arc<SiteUrls>,
    theme: ThemeEngine,
}

impl AppState {
    /// Create state from configuration, importing `config_dir` if set.
    pub async fn new(config: &Config) -> Result<Self> {
        let theme = match &config.template_dir {
            Some(dir) => ThemeEngine::with_template_dir(dir)?,
            None => ThemeEngine::new()?,
        };
        let state = Self::with_parts(SiteUrls::from_config(config), theme);

        if let Some(dir) = &config.config_dir {
            let result = state
                .import(dir)
                .await
                .with_context(|| format!("failed to import config from {}", dir.display()))?;
            for warning in &result.warnings {
                warn!(%warning, "config import");
            }
        }

        info!(
            responsive_image_styles = state.inner.responsive_image_styles.len(),
            image_styles = state.inner.image_styles.len(),
            files = state.inner.files.len(),
            "application state ready"
        );
        Ok(state)
    }

    /// Empty state with the built-in templates and default URLs.
    pub fn in_memory() -> Result<Self> {
        Ok(Self::with_parts(
            SiteUrls::from_config(&Config::default()),
            ThemeEngine::new()?,
        ))
    }

    fn with_parts(urls: SiteUrls, theme: ThemeEngine) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                responsive_image_styles: Arc::new(MemoryEntityStorage::new()),
                image_styles: Arc::new(MemoryEntityStorage::new()),
                files: Arc::new(MemoryEntityStorage::new()),
                variables: Arc::new(VariableStore::new()),
                urls: Arc::new(urls),
                theme,
            }),
        }
    }

    /// Import YAML config files from `dir`.
    pub async fn import(&self, dir: &std::path::Path) -> Result<ConfigOpResult> {
        import_config(self, dir).await
    }

    pub fn responsive_image_styles(&self) -> &MemoryEntityStorage<ResponsiveImageStyle> {
        &self.inner.responsive_image_styles
    }

    pub fn image_styles(&self) -> &MemoryEntityStorage<ImageStyle> {
        &self.inner.image_styles
    }

    pub fn files(&self) -> &MemoryEntityStorage<FileInfo> {
        &self.inner.files
    }

    pub fn variables(&self) -> &VariableStore {
        &self.inner.variables
    }

    pub fn urls(&self) -> &SiteUrls {
        &self.inner.urls
    }

    pub fn theme(&self) -> &ThemeEngine {
        &self.inner.theme
    }

    /// A responsive image formatter backed by this state's stores.
    pub fn responsive_image_formatter(
        &self,
        settings: FormatterSettings,
    ) -> ResponsiveImageFormatter {
        ResponsiveImageFormatter::new(
            settings,
            self.inner.responsive_image_styles.clone(),
            self.inner.image_styles.clone(),
            self.inner.files.clone(),
            self.inner.urls.clone(),
        )
    }

    /// The Mailchimp configuration route's access check.
    pub fn mailchimp_access_check(&self) -> ConfigurationAccessCheck {
        ConfigurationAccessCheck::new(self.inner.variables.clone())
    }

    /// Render formatter output to HTML, one `<picture>` per element.
    ///
    /// Elements whose file has disappeared since formatting are skipped.
    pub async fn render_html(&self, elements: &[ResponsiveImageElement]) -> KernelResult<String> {
        let mut html = Vec::with_capacity(elements.len());

        for element in elements {
            let file = match element.item.target_id {
                Some(id) => self.inner.files.load(&id.to_string()).await?,
                None => None,
            };
            let Some(file) = file else {
                debug!(target_id = ?element.item.target_id, "skipping element without file");
                continue;
            };

            let style = if element.responsive_image_style_id.is_empty() {
                None
            } else {
                self.inner
                    .responsive_image_styles
                    .load(&element.responsive_image_style_id)
                    .await?
            };
            let image_styles = match &style {
                Some(style) => {
                    self.inner
                        .image_styles
                        .load_multiple(&style.image_style_ids())
                        .await?
                }
                None => Default::default(),
            };

            let picture = build_picture(
                element,
                style.as_ref(),
                &image_styles,
                &file,
                self.inner.urls.as_ref(),
            );
            html.push(
                self.inner
                    .theme
                    .render(&element.theme, &picture_context(element, &picture))?,
            );
        }

        Ok(html.join("\n"))
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
