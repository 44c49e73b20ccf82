//! Entity storage for config entities and file records.
//!
//! All reads go through the SDK's [`EntityStorage`] trait so plugins never
//! depend on how the kernel keeps its entities. This kernel keeps them in
//! memory, filled from YAML files by [`yaml::import_config`].
//!
//! # Usage
//!
//! ```ignore
//! let styles = MemoryEntityStorage::<ImageStyle>::new();
//! styles.save(ImageStyle::new("thumbnail", "Thumbnail"));
//! let thumbnail = styles.load("thumbnail").await?;
//! ```

pub mod yaml;

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;
use vetrina_sdk::storage::{EntityStorage, StoredEntity};

/// In-memory storage for one entity type, keyed by entity ID.
pub struct MemoryEntityStorage<E> {
    entities: RwLock<BTreeMap<String, E>>,
}

impl<E: StoredEntity> MemoryEntityStorage<E> {
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(BTreeMap::new()),
        }
    }

    /// Save an entity (insert or replace).
    pub fn save(&self, entity: E) {
        let id = entity.id();
        debug!(entity_type = E::ENTITY_TYPE, id = %id, "saving entity");
        self.entities.write().insert(id, entity);
    }

    /// Delete an entity by ID.
    ///
    /// Returns `true` if an entity was deleted, `false` if it didn't exist.
    pub fn delete(&self, id: &str) -> bool {
        let deleted = self.entities.write().remove(id).is_some();
        if deleted {
            debug!(entity_type = E::ENTITY_TYPE, id = %id, "deleted entity");
        }
        deleted
    }

    pub fn len(&self) -> usize {
        self.entities.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.read().is_empty()
    }
}

impl<E: StoredEntity> Default for MemoryEntityStorage<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: StoredEntity> EntityStorage<E> for MemoryEntityStorage<E> {
    async fn load(&self, id: &str) -> Result<Option<E>> {
        Ok(self.entities.read().get(id).cloned())
    }

    async fn load_multiple(&self, ids: &[String]) -> Result<BTreeMap<String, E>> {
        if ids.is_empty() {
            return Ok(BTreeMap::new());
        }
        let entities = self.entities.read();
        Ok(ids
            .iter()
            .filter_map(|id| entities.get(id).map(|e| (id.clone(), e.clone())))
            .collect())
    }

    async fn load_all(&self) -> Result<BTreeMap<String, E>> {
        Ok(self.entities.read().clone())
    }
}

impl<E> std::fmt::Debug for MemoryEntityStorage<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEntityStorage")
            .field("len", &self.entities.read().len())
            .finish()
    }
}
