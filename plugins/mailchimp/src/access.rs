//! Access check for the Mailchimp settings page.

use std::sync::Arc;

use tracing::debug;
use vetrina_sdk::storage::Variables;
use vetrina_sdk::types::{AccessResult, Account};

use crate::SETTINGS_VARIABLE;

/// Grants access only once a Mailchimp API key has been provided.
pub struct ConfigurationAccessCheck {
    variables: Arc<dyn Variables>,
}

impl ConfigurationAccessCheck {
    pub fn new(variables: Arc<dyn Variables>) -> Self {
        Self { variables }
    }

    /// The configured API key, if it is a non-empty string.
    pub fn api_key(&self) -> Option<String> {
        self.variables
            .get(SETTINGS_VARIABLE)?
            .get("api_key")?
            .as_str()
            .filter(|key| !key.is_empty())
            .map(str::to_string)
    }

    /// Run the check for `account`.
    ///
    /// Only the presence of the key matters; the account itself is not
    /// inspected. Never returns [`AccessResult::Neutral`].
    pub fn access(&self, _account: &Account) -> AccessResult {
        let result = AccessResult::allowed_if(self.api_key().is_some());
        if !result.is_allowed() {
            debug!("mailchimp API key not configured, denying settings access");
        }
        result
    }
}
