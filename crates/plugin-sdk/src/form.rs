//! Form element types for plugin settings forms.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A select list element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectElement {
    pub title: String,
    /// Options as (value, label) pairs, in display order.
    pub options: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub required: bool,
    /// Label of the leading "no selection" option, if offered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_option: Option<String>,
}

impl SelectElement {
    pub fn new(title: impl Into<String>, options: Vec<(String, String)>) -> Self {
        Self {
            title: title.into(),
            options,
            default_value: None,
            required: false,
            empty_option: None,
        }
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn empty_option(mut self, label: impl Into<String>) -> Self {
        self.empty_option = Some(label.into());
        self
    }

    /// Whether `value` is one of the offered options.
    pub fn has_option(&self, value: &str) -> bool {
        self.options.iter().any(|(v, _)| v == value)
    }
}
