//! YAML config import.
//!
//! Reads one YAML file per entity from a directory and saves the entities
//! into the kernel's stores. File naming: `{prefix}.{id}.yml` (or `.yaml`):
//!
//! | Prefix | Entity |
//! |--------|--------|
//! | `responsive_image.styles` | [`ResponsiveImageStyle`] |
//! | `image.style` | [`ImageStyle`] |
//! | `file` | [`FileInfo`] |
//! | `variable` | site variable (`key` + `value`) |
//!
//! Import is idempotent: saving replaces existing entities, so re-running an
//! import converges to the directory's content. Files that fail to parse
//! are skipped and reported as warnings rather than aborting the import, as
//! are unreadable files and symlinks.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use vetrina_sdk::image::{EMPTY_IMAGE, ImageStyle, ORIGINAL_IMAGE, ResponsiveImageStyle};
use vetrina_sdk::storage::StoredEntity;
use vetrina_sdk::types::FileInfo;

use crate::error::{KernelError, KernelResult};
use crate::state::AppState;

/// Maximum config file size (10 MB). Larger files are skipped during import
/// to prevent unbounded memory allocation.
const MAX_CONFIG_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Kinds of config files, in import order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ConfigKind {
    Variable,
    ImageStyle,
    ResponsiveImageStyle,
    File,
}

impl ConfigKind {
    const ALL: [ConfigKind; 4] = [
        ConfigKind::Variable,
        ConfigKind::ImageStyle,
        ConfigKind::ResponsiveImageStyle,
        ConfigKind::File,
    ];

    fn prefix(self) -> &'static str {
        match self {
            Self::Variable => "variable",
            Self::ImageStyle => ImageStyle::CONFIG_PREFIX,
            Self::ResponsiveImageStyle => ResponsiveImageStyle::CONFIG_PREFIX,
            Self::File => FileInfo::ENTITY_TYPE,
        }
    }
}

/// Variable YAML representation.
///
/// The key is stored in both the filename and the file content so that
/// import can warn when they disagree.
#[derive(Serialize, Deserialize)]
struct VarYaml {
    key: String,
    value: serde_json::Value,
}

/// Result summary for a config import.
#[derive(Debug, Default)]
pub struct ConfigOpResult {
    pub counts: BTreeMap<String, usize>,
    pub warnings: Vec<String>,
}

impl ConfigOpResult {
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    fn count(&mut self, kind: ConfigKind) {
        *self.counts.entry(kind.prefix().to_string()).or_default() += 1;
    }
}

/// Parse the config kind and entity ID from a config filename.
///
/// Returns `None` if the filename doesn't match the expected pattern or the
/// prefix is unrecognized.
fn parse_config_filename(filename: &str) -> Option<(ConfigKind, &str)> {
    let stem = filename
        .strip_suffix(".yml")
        .or_else(|| filename.strip_suffix(".yaml"))?;

    ConfigKind::ALL.into_iter().find_map(|kind| {
        let id = stem.strip_prefix(kind.prefix())?.strip_prefix('.')?;
        (!id.is_empty()).then_some((kind, id))
    })
}

/// Deserialize one config file.
fn parse_yaml<T: DeserializeOwned>(filename: &str, contents: &str) -> KernelResult<T> {
    serde_yml::from_str(contents).map_err(|e| KernelError::InvalidConfigFile {
        path: filename.to_string(),
        message: e.to_string(),
    })
}

/// Warn when the ID inside a file disagrees with its filename.
fn check_id(filename: &str, filename_id: &str, content_id: &str, warnings: &mut Vec<String>) {
    if filename_id != content_id {
        warnings.push(format!(
            "{filename}: ID '{content_id}' does not match filename ID '{filename_id}'"
        ));
    }
}

/// Import config entities from YAML files in `dir` into `state`'s stores.
pub async fn import_config(state: &AppState, dir: &Path) -> Result<ConfigOpResult> {
    info!(dir = %dir.display(), "Starting config import");

    let mut result = ConfigOpResult::default();
    let mut files: Vec<(ConfigKind, String, String)> = Vec::new();

    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("failed to read directory {}", dir.display()))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some((kind, id)) = parse_config_filename(filename) else {
            if filename.ends_with(".yml") || filename.ends_with(".yaml") {
                warn!(file = %filename, "skipping file with unrecognized config prefix");
                result
                    .warnings
                    .push(format!("{filename}: unrecognized config prefix"));
            }
            continue;
        };

        // Skip symlinks to prevent reading files outside the config directory
        let metadata = match tokio::fs::symlink_metadata(&path).await {
            Ok(m) => m,
            Err(e) => {
                warn!(file = %filename, error = %e, "skipping config file");
                result
                    .warnings
                    .push(format!("{filename}: failed to read metadata: {e}"));
                continue;
            }
        };
        if metadata.file_type().is_symlink() {
            warn!(file = %filename, "skipping symlink");
            result.warnings.push(format!("{filename}: skipping symlink"));
            continue;
        }

        let size = metadata.len();
        if size > MAX_CONFIG_FILE_SIZE {
            result.warnings.push(format!(
                "{filename}: file size {size} exceeds {MAX_CONFIG_FILE_SIZE} byte limit"
            ));
            continue;
        }

        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) => {
                warn!(file = %filename, error = %e, "skipping unreadable config file");
                result
                    .warnings
                    .push(format!("{filename}: failed to read: {e}"));
                continue;
            }
        };
        files.push((kind, filename.to_string(), contents));
        debug!(file = %filename, id = %id, "read config file");
    }

    // Dependency order first, then filename for a stable result.
    files.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));

    for (kind, filename, contents) in &files {
        let Some((_, id)) = parse_config_filename(filename) else {
            continue;
        };
        if let Err(e) = import_one(state, *kind, filename, id, contents, &mut result.warnings) {
            warn!(error = %e, "skipping invalid config file");
            result.warnings.push(e.to_string());
            continue;
        }
        result.count(*kind);
    }

    check_references(state, &mut result.warnings).await?;

    info!(
        total = result.total(),
        warnings = result.warnings.len(),
        "Config import complete"
    );
    Ok(result)
}

fn import_one(
    state: &AppState,
    kind: ConfigKind,
    filename: &str,
    id: &str,
    contents: &str,
    warnings: &mut Vec<String>,
) -> KernelResult<()> {
    match kind {
        ConfigKind::Variable => {
            let var: VarYaml = parse_yaml(filename, contents)?;
            check_id(filename, id, &var.key, warnings);
            state.variables().set(&var.key, var.value);
        }
        ConfigKind::ImageStyle => {
            let style: ImageStyle = parse_yaml(filename, contents)?;
            check_id(filename, id, &style.id, warnings);
            state.image_styles().save(style);
        }
        ConfigKind::ResponsiveImageStyle => {
            let style: ResponsiveImageStyle = parse_yaml(filename, contents)?;
            check_id(filename, id, &style.id, warnings);
            state.responsive_image_styles().save(style);
        }
        ConfigKind::File => {
            let file: FileInfo = parse_yaml(filename, contents)?;
            check_id(filename, id, &file.id.to_string(), warnings);
            state.files().save(file);
        }
    }
    Ok(())
}

/// Warn about responsive image styles that reference missing image styles.
///
/// Not an error: rendering tolerates missing image styles. The
/// `_empty image_` and `_original image_` placeholders are never stored.
async fn check_references(state: &AppState, warnings: &mut Vec<String>) -> Result<()> {
    use vetrina_sdk::storage::EntityStorage;

    let known: HashSet<String> = state.image_styles().load_all().await?.into_keys().collect();
    for (id, style) in state.responsive_image_styles().load_all().await? {
        for image_style in style.image_style_ids() {
            if image_style == EMPTY_IMAGE || image_style == ORIGINAL_IMAGE {
                continue;
            }
            if !known.contains(&image_style) {
                warnings.push(format!(
                    "responsive image style '{id}' references missing image style '{image_style}'"
                ));
            }
        }
    }
    Ok(())
}
