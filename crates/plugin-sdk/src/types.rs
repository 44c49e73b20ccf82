//! Core types for Vetrina plugins.
//!
//! These types describe what the host hands to a plugin at request time:
//! the entity that owns a field, the field's items, the files they point at,
//! and the account the request runs as.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display attributes assigned to a field item by an earlier render pass
/// (e.g. `class`, `loading`, `data-*`).
pub type ItemAttributes = BTreeMap<String, String>;

/// The content entity a field belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostEntity {
    /// Entity type machine name (e.g., "item", "user").
    pub entity_type: String,

    /// Entity ID. `None` until the entity has been saved.
    #[serde(default)]
    pub id: Option<Uuid>,

    /// Human-readable label.
    #[serde(default)]
    pub label: String,
}

impl HostEntity {
    /// An entity that has not been saved yet.
    pub fn unsaved(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: None,
            label: String::new(),
        }
    }

    /// A persisted entity with a stable ID.
    pub fn saved(entity_type: impl Into<String>, id: Uuid) -> Self {
        Self {
            entity_type: entity_type.into(),
            id: Some(id),
            label: String::new(),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Whether the entity lacks a stable identity.
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }
}

/// One value of a multi-value image field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldItem {
    /// ID of the referenced file. Empty items have no target.
    #[serde(default)]
    pub target_id: Option<Uuid>,

    /// Alternative text.
    #[serde(default)]
    pub alt: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl FieldItem {
    pub fn new(target_id: Uuid) -> Self {
        Self {
            target_id: Some(target_id),
            ..Self::default()
        }
    }

    pub fn alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = alt.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

/// A field item travelling together with its display attributes.
///
/// The attributes are kept beside the item rather than on it, so a formatter
/// can hand them to its own template and the generic field template never
/// sees them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributedItem {
    pub item: FieldItem,
    #[serde(default)]
    pub attributes: ItemAttributes,
}

impl AttributedItem {
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

impl From<FieldItem> for AttributedItem {
    fn from(item: FieldItem) -> Self {
        Self {
            item,
            attributes: ItemAttributes::new(),
        }
    }
}

/// The ordered values of one field on one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldItemList {
    pub entity: HostEntity,
    #[serde(default)]
    pub items: Vec<AttributedItem>,
}

impl FieldItemList {
    pub fn new(entity: HostEntity) -> Self {
        Self {
            entity,
            items: Vec::new(),
        }
    }

    /// Append an item (with or without attributes).
    pub fn item(mut self, item: impl Into<AttributedItem>) -> Self {
        self.items.push(item.into());
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Stored file metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub id: Uuid,
    pub filename: String,
    /// Storage URI, e.g. `public://images/photo.jpg`.
    pub uri: String,
    #[serde(default)]
    pub filemime: String,
}

impl FileInfo {
    pub fn new(id: Uuid, uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let filename = uri.rsplit('/').next().unwrap_or_default().to_string();
        Self {
            id,
            filename,
            uri,
            filemime: String::new(),
        }
    }
}

/// The account a request runs as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub authenticated: bool,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Account {
    pub fn anonymous() -> Self {
        Self {
            id: Uuid::nil(),
            authenticated: false,
            permissions: Vec::new(),
        }
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

/// Access control result returned by access checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessResult {
    /// Explicitly grant access.
    Grant,
    /// Explicitly deny access.
    Deny,
    /// No opinion (let other checks decide).
    Neutral,
}

impl AccessResult {
    /// `Grant` when the condition holds, `Deny` otherwise.
    pub fn allowed_if(condition: bool) -> Self {
        if condition { Self::Grant } else { Self::Deny }
    }

    pub fn is_allowed(self) -> bool {
        self == Self::Grant
    }
}

/// Menu route definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuDefinition {
    pub path: String,
    pub title: String,
    pub permission: String,
    pub parent: Option<String>,
    /// Named access check the router runs before serving the route.
    pub access_check: Option<String>,
}

impl MenuDefinition {
    pub fn new(path: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            permission: "access content".into(),
            parent: None,
            access_check: None,
        }
    }

    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = permission.into();
        self
    }

    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn access_check(mut self, check: impl Into<String>) -> Self {
        self.access_check = Some(check.into());
        self
    }
}

/// Permission definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionDefinition {
    pub name: String,
    pub description: String,
}

impl PermissionDefinition {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}
