//! Host capability traits.
//!
//! The Kernel implements these; plugins receive them as trait objects through
//! their constructors. Keep the interfaces small: every extra method is one
//! more thing every host has to provide.

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{FileInfo, HostEntity};

/// An entity that can live in an [`EntityStorage`].
pub trait StoredEntity: Clone + Send + Sync + 'static {
    /// Entity type machine name (e.g., "image_style").
    const ENTITY_TYPE: &'static str;

    /// Machine name or ID, unique within the entity type.
    fn id(&self) -> String;

    fn label(&self) -> String;

    /// Tags invalidated whenever this entity changes.
    fn cache_tags(&self) -> Vec<String> {
        vec![format!("{}:{}", Self::ENTITY_TYPE, self.id())]
    }
}

/// Named-entity storage for a single entity type.
#[async_trait]
pub trait EntityStorage<E: StoredEntity>: Send + Sync {
    /// Load one entity. Returns `None` if it doesn't exist.
    async fn load(&self, id: &str) -> Result<Option<E>>;

    /// Load the given entities, keyed by ID.
    ///
    /// IDs that don't exist are absent from the result. An empty `ids`
    /// slice loads nothing.
    async fn load_multiple(&self, ids: &[String]) -> Result<BTreeMap<String, E>>;

    /// Load every entity of this type, keyed by ID.
    async fn load_all(&self) -> Result<BTreeMap<String, E>>;
}

/// Read access to site variables (key/value configuration).
pub trait Variables: Send + Sync {
    fn get(&self, name: &str) -> Option<serde_json::Value>;
}

/// URL generation for entities and stored files.
pub trait UrlGenerator: Send + Sync {
    /// Canonical URL of a persisted entity. `None` for unsaved entities.
    fn entity_url(&self, entity: &HostEntity) -> Option<String>;

    /// Public URL for a storage URI.
    fn file_url(&self, uri: &str) -> String;
}

impl StoredEntity for FileInfo {
    const ENTITY_TYPE: &'static str = "file";

    fn id(&self) -> String {
        self.id.to_string()
    }

    fn label(&self) -> String {
        self.filename.clone()
    }
}
