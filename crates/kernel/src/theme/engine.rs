//! Theme engine: Tera templates dispatched by theme key.

use std::path::Path;

use anyhow::{Context, Result};
use tera::{Context as TeraContext, Tera};
use tracing::debug;

use crate::error::{KernelError, KernelResult};

/// Built-in template for `responsive_image_formatter` elements.
const RESPONSIVE_IMAGE_FORMATTER_TEMPLATE: &str = r#"{% if url %}<a href="{{ url }}">{% endif %}<picture>
{%- for source in sources %}<source{% if source.media %} media="{{ source.media }}"{% endif %} srcset="{{ source.srcset }}"{% if source.sizes %} sizes="{{ source.sizes }}"{% endif %}>{% endfor -%}
<img src="{{ fallback_src }}" alt="{{ item.alt }}"{% if item.title %} title="{{ item.title }}"{% endif %}{% if width %} width="{{ width }}"{% endif %}{% if height %} height="{{ height }}"{% endif %}{% for name, value in item_attributes %} {{ name }}="{{ value }}"{% endfor %}>
</picture>{% if url %}</a>{% endif %}"#;

/// Theme engine for rendering templates.
pub struct ThemeEngine {
    /// Tera template engine instance.
    tera: Tera,
}

impl ThemeEngine {
    /// Create a theme engine with only the built-in templates.
    pub fn new() -> Result<Self> {
        Ok(Self {
            tera: Self::builtin()?,
        })
    }

    /// Create a theme engine whose templates in `template_dir` take
    /// precedence over the built-in ones.
    pub fn with_template_dir(template_dir: &Path) -> Result<Self> {
        let pattern = template_dir.join("**/*.html");
        let pattern_str = pattern
            .to_str()
            .context("invalid template directory path")?;

        let mut tera = Tera::new(pattern_str).context("failed to initialize Tera templates")?;
        // `extend` keeps templates already present, so overrides win.
        tera.extend(&Self::builtin()?)
            .context("failed to add built-in templates")?;

        let template_names: Vec<_> = tera.get_template_names().collect();
        debug!(count = template_names.len(), dir = %template_dir.display(), "loaded templates");

        Ok(Self { tera })
    }

    fn builtin() -> Result<Tera> {
        let mut tera = Tera::default();
        tera.add_raw_template(
            &Self::template_for_theme(vetrina_sdk::render::RESPONSIVE_IMAGE_FORMATTER_THEME),
            RESPONSIVE_IMAGE_FORMATTER_TEMPLATE,
        )
        .context("failed to register responsive image template")?;
        Ok(tera)
    }

    /// Template file name for a theme key.
    pub fn template_for_theme(theme: &str) -> String {
        format!("{theme}.html")
    }

    /// Whether a template is registered for the theme key.
    pub fn has_theme(&self, theme: &str) -> bool {
        self.tera
            .get_template_names()
            .any(|name| name == Self::template_for_theme(theme))
    }

    /// Render the template registered under `theme`.
    pub fn render(&self, theme: &str, context: &TeraContext) -> KernelResult<String> {
        if !self.has_theme(theme) {
            return Err(KernelError::MissingTemplate(theme.to_string()));
        }
        let html = self
            .tera
            .render(&Self::template_for_theme(theme), context)
            .with_context(|| format!("failed to render theme: {theme}"))?;
        Ok(html)
    }

    /// Get a mutable reference to Tera (for adding templates at runtime).
    pub fn tera_mut(&mut self) -> &mut Tera {
        &mut self.tera
    }
}

impl std::fmt::Debug for ThemeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeEngine").finish()
    }
}
