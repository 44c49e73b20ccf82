//! Vetrina test utilities.
//!
//! Helpers for plugin and kernel tests: in-memory host doubles that count
//! their lookups, fixture builders for image styles and files, and
//! assertion utilities.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;
use vetrina_sdk::prelude::*;

/// Create an authenticated test account.
pub fn test_user(permissions: &[&str]) -> Account {
    Account {
        id: Uuid::now_v7(),
        authenticated: true,
        permissions: permissions.iter().map(|s| s.to_string()).collect(),
    }
}

/// Create an anonymous test account.
pub fn anonymous_user() -> Account {
    Account::anonymous()
}

/// Lookup counters for a [`FixtureStorage`].
#[derive(Debug, Default)]
pub struct LookupCounts {
    load: AtomicUsize,
    load_multiple: AtomicUsize,
    load_all: AtomicUsize,
}

impl LookupCounts {
    pub fn load(&self) -> usize {
        self.load.load(Ordering::SeqCst)
    }

    pub fn load_multiple(&self) -> usize {
        self.load_multiple.load(Ordering::SeqCst)
    }

    pub fn load_all(&self) -> usize {
        self.load_all.load(Ordering::SeqCst)
    }

    /// Sum of all lookups of any kind.
    pub fn total(&self) -> usize {
        self.load() + self.load_multiple() + self.load_all()
    }
}

/// In-memory entity storage that records every lookup.
pub struct FixtureStorage<E> {
    entities: RwLock<BTreeMap<String, E>>,
    counts: LookupCounts,
}

impl<E: StoredEntity> FixtureStorage<E> {
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(BTreeMap::new()),
            counts: LookupCounts::default(),
        }
    }

    /// Create a storage pre-filled with `entities`.
    pub fn with(entities: impl IntoIterator<Item = E>) -> Self {
        let storage = Self::new();
        for entity in entities {
            storage.insert(entity);
        }
        storage
    }

    pub fn insert(&self, entity: E) {
        self.entities.write().insert(entity.id(), entity);
    }

    /// Remove an entity, returning whether it existed.
    pub fn remove(&self, id: &str) -> bool {
        self.entities.write().remove(id).is_some()
    }

    pub fn counts(&self) -> &LookupCounts {
        &self.counts
    }
}

impl<E: StoredEntity> Default for FixtureStorage<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: StoredEntity> EntityStorage<E> for FixtureStorage<E> {
    async fn load(&self, id: &str) -> Result<Option<E>> {
        self.counts.load.fetch_add(1, Ordering::SeqCst);
        Ok(self.entities.read().get(id).cloned())
    }

    async fn load_multiple(&self, ids: &[String]) -> Result<BTreeMap<String, E>> {
        self.counts.load_multiple.fetch_add(1, Ordering::SeqCst);
        let entities = self.entities.read();
        Ok(ids
            .iter()
            .filter_map(|id| entities.get(id).map(|e| (id.clone(), e.clone())))
            .collect())
    }

    async fn load_all(&self) -> Result<BTreeMap<String, E>> {
        self.counts.load_all.fetch_add(1, Ordering::SeqCst);
        Ok(self.entities.read().clone())
    }
}

/// In-memory site variables.
#[derive(Debug, Default)]
pub struct FixtureVariables {
    values: RwLock<HashMap<String, serde_json::Value>>,
}

impl FixtureVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, name: &str, value: serde_json::Value) {
        self.values.write().insert(name.to_string(), value);
    }
}

impl Variables for FixtureVariables {
    fn get(&self, name: &str) -> Option<serde_json::Value> {
        self.values.read().get(name).cloned()
    }
}

/// URL generator with fixed, predictable output.
///
/// Entities map to `/<entity_type>/<id>`, `public://` URIs to `/files/...`.
#[derive(Debug, Default)]
pub struct FixtureUrls;

impl UrlGenerator for FixtureUrls {
    fn entity_url(&self, entity: &HostEntity) -> Option<String> {
        entity
            .id
            .map(|id| format!("/{}/{id}", entity.entity_type))
    }

    fn file_url(&self, uri: &str) -> String {
        match uri.strip_prefix("public://") {
            Some(path) => format!("/files/{path}"),
            None => uri.to_string(),
        }
    }
}

/// Image style fixtures.
pub mod fixtures {
    use uuid::Uuid;
    use vetrina_sdk::prelude::*;

    /// `crop_16x9` and `crop_4x3` image styles.
    pub fn crop_styles() -> Vec<ImageStyle> {
        vec![
            ImageStyle::new("crop_16x9", "Crop 16:9")
                .effect(ImageEffect::new("crop", Some(1600), Some(900))),
            ImageStyle::new("crop_4x3", "Crop 4:3")
                .effect(ImageEffect::new("crop", Some(800), Some(600))),
        ]
    }

    /// `wide_banner`: wide viewports get `crop_16x9`, narrow ones `crop_4x3`.
    pub fn wide_banner() -> ResponsiveImageStyle {
        ResponsiveImageStyle::new("wide_banner", "Wide banner")
            .breakpoint_group("default_theme")
            .mapping(ImageStyleMapping::image_style(
                "default_theme.wide",
                "(min-width: 960px)",
                "crop_16x9",
            ))
            .mapping(ImageStyleMapping::image_style(
                "default_theme.narrow",
                "",
                "crop_4x3",
            ))
    }

    /// A responsive image style with no mappings at all.
    pub fn unmapped(id: &str) -> ResponsiveImageStyle {
        ResponsiveImageStyle::new(id, format!("Unmapped {id}"))
    }

    /// A file stored under `public://images/<name>`.
    pub fn test_file(name: &str) -> FileInfo {
        FileInfo::new(Uuid::now_v7(), format!("public://images/{name}"))
    }

    /// A field item list on a saved `item` entity referencing `files`.
    pub fn field_items(files: &[FileInfo]) -> FieldItemList {
        files.iter().fold(
            FieldItemList::new(HostEntity::saved("item", Uuid::now_v7())),
            |list, file| list.item(FieldItem::new(file.id).alt(file.filename.clone())),
        )
    }
}

/// Assertion helpers.
pub mod assert {
    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that a string does not contain a substring.
    pub fn not_contains(haystack: &str, needle: &str) {
        assert!(
            !haystack.contains(needle),
            "Expected string to NOT contain '{needle}'\nActual: {haystack}"
        );
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_builder() {
        let user = test_user(&["access content", "administer mailchimp"]);
        assert!(user.authenticated);
        assert!(user.has_permission("administer mailchimp"));
        assert!(!user.has_permission("administer site"));
    }

    #[test]
    fn test_anonymous_user() {
        let user = anonymous_user();
        assert!(!user.authenticated);
        assert_eq!(user.id, Uuid::nil());
    }

    #[tokio::test]
    async fn fixture_storage_counts_lookups() {
        let storage = FixtureStorage::with(fixtures::crop_styles());

        assert!(storage.load("crop_16x9").await.unwrap().is_some());
        assert!(storage.load("missing").await.unwrap().is_none());
        let found = storage
            .load_multiple(&["crop_4x3".to_string(), "missing".to_string()])
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(storage.counts().load(), 2);
        assert_eq!(storage.counts().load_multiple(), 1);
        assert_eq!(storage.counts().total(), 3);
    }

    #[tokio::test]
    async fn fixture_storage_remove() {
        let storage = FixtureStorage::with(fixtures::crop_styles());
        assert!(storage.remove("crop_4x3"));
        assert!(!storage.remove("crop_4x3"));
        assert_eq!(storage.load_all().await.unwrap().len(), 1);
    }

    #[test]
    fn fixture_urls() {
        let urls = FixtureUrls;
        assert_eq!(urls.file_url("public://images/a.jpg"), "/files/images/a.jpg");
        assert!(urls.entity_url(&HostEntity::unsaved("item")).is_none());
    }

    #[test]
    fn fixture_variables() {
        let vars = FixtureVariables::new();
        assert!(vars.get("site_name").is_none());
        vars.set("site_name", serde_json::json!("Vetrina"));
        assert_eq!(vars.get("site_name").unwrap(), "Vetrina");
    }

    #[test]
    fn test_assertions() {
        assert::contains("hello world", "world");
        assert::not_contains("hello world", "foo");
    }
}
