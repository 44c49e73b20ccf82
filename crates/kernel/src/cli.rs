//! `vetrina` command-line interface.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use responsive_image::{FormatterSettings, ImageLink};
use uuid::Uuid;
use vetrina_sdk::types::{Account, AttributedItem, FieldItem, FieldItemList, HostEntity};

use crate::config::Config;
use crate::error::{KernelError, KernelResult};
use crate::state::AppState;

/// Render image fields through responsive image styles.
#[derive(Parser, Debug)]
#[command(name = "vetrina", author, version, about, long_about = None)]
pub struct Cli {
    /// Directory of YAML config files (overrides VETRINA_CONFIG_DIR).
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List responsive image styles selectable in the formatter.
    Styles,

    /// Print the formatter settings summary.
    Summary {
        #[arg(long, default_value = "")]
        style: String,
        #[arg(long, default_value = "none")]
        link: String,
    },

    /// Check formatter settings before saving them.
    Validate {
        #[arg(long, default_value = "")]
        style: String,
    },

    /// Format file IDs as an image field and print the render elements.
    Render {
        #[arg(long, default_value = "")]
        style: String,
        #[arg(long, default_value = "none")]
        link: String,
        /// Type of the field being displayed.
        #[arg(long, default_value = "image")]
        field_type: String,
        /// Owning entity as `type` (unsaved) or `type/uuid`.
        #[arg(long, default_value = "item")]
        entity: String,
        /// Attribute set on every item, as `name=value`.
        #[arg(long = "attr")]
        attrs: Vec<String>,
        /// Print HTML instead of JSON render elements.
        #[arg(long)]
        html: bool,
        /// File IDs, one per field item.
        files: Vec<Uuid>,
    },

    /// Evaluate the Mailchimp settings access check.
    Access,
}

/// Parse `type` or `type/uuid` into a host entity.
pub fn parse_entity(value: &str) -> KernelResult<HostEntity> {
    match value.split_once('/') {
        None if !value.is_empty() => Ok(HostEntity::unsaved(value)),
        Some((entity_type, id)) if !entity_type.is_empty() => {
            let id = Uuid::parse_str(id).map_err(|e| {
                KernelError::InvalidArgument(format!("invalid entity id '{id}': {e}"))
            })?;
            Ok(HostEntity::saved(entity_type, id))
        }
        _ => Err(KernelError::InvalidArgument(format!(
            "invalid entity '{value}', expected TYPE or TYPE/UUID"
        ))),
    }
}

/// Parse a `name=value` attribute.
pub fn parse_attr(value: &str) -> KernelResult<(String, String)> {
    match value.split_once('=') {
        Some((name, attr)) if !name.is_empty() => Ok((name.to_string(), attr.to_string())),
        _ => Err(KernelError::InvalidArgument(format!(
            "invalid attribute '{value}', expected NAME=VALUE"
        ))),
    }
}

/// Reject fields the responsive image formatter cannot display.
pub fn check_field_type(field_type: &str) -> KernelResult<()> {
    if responsive_image::FIELD_TYPES.contains(&field_type) {
        return Ok(());
    }
    Err(KernelError::InvalidArgument(format!(
        "formatter '{}' cannot display '{field_type}' fields (supported: {})",
        responsive_image::FORMATTER_ID,
        responsive_image::FIELD_TYPES.join(", ")
    )))
}

fn settings(style: &str, link: &str) -> KernelResult<FormatterSettings> {
    Ok(FormatterSettings::new(style).link(link.parse::<ImageLink>()?))
}

/// Run a parsed command line, returning what to print.
pub async fn run(cli: Cli, mut config: Config) -> Result<String> {
    if cli.config_dir.is_some() {
        config.config_dir = cli.config_dir;
    }
    let state = AppState::new(&config)
        .await
        .context("failed to initialize application state")?;

    match cli.command {
        Command::Styles => {
            let formatter = state.responsive_image_formatter(FormatterSettings::default());
            let options = formatter.style_options().await?;
            Ok(options
                .into_iter()
                .map(|(id, label)| format!("{id}\t{label}"))
                .collect::<Vec<_>>()
                .join("\n"))
        }
        Command::Summary { style, link } => {
            let formatter = state.responsive_image_formatter(settings(&style, &link)?);
            Ok(formatter.summary().await?.join("\n"))
        }
        Command::Validate { style } => {
            let formatter = state.responsive_image_formatter(FormatterSettings::new(style));
            formatter.validate_settings().await.map_err(KernelError::from)?;
            Ok("ok".to_string())
        }
        Command::Render {
            style,
            link,
            field_type,
            entity,
            attrs,
            html,
            files,
        } => {
            check_field_type(&field_type)?;
            let attrs = attrs
                .iter()
                .map(|a| parse_attr(a))
                .collect::<KernelResult<Vec<_>>>()?;
            let mut items = FieldItemList::new(parse_entity(&entity)?);
            for id in files {
                let item = attrs.iter().fold(
                    AttributedItem::from(FieldItem::new(id)),
                    |item, (name, value)| item.attr(name, value),
                );
                items = items.item(item);
            }

            let formatter = state.responsive_image_formatter(settings(&style, &link)?);
            let elements = formatter.render(items).await?;
            if html {
                Ok(state.render_html(&elements).await?)
            } else {
                serde_json::to_string_pretty(&elements).context("failed to serialize elements")
            }
        }
        Command::Access => {
            let result = state.mailchimp_access_check().access(&Account::anonymous());
            Ok(format!("{result:?}"))
        }
    }
}
