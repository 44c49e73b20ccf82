//! Mailchimp plugin for Vetrina.
//!
//! Only the settings page is provided here. It stays locked until an API
//! key has been configured, enforced by [`ConfigurationAccessCheck`].

mod access;

pub use access::ConfigurationAccessCheck;

use vetrina_sdk::types::{MenuDefinition, PermissionDefinition};

/// Variable holding the plugin's settings object.
pub const SETTINGS_VARIABLE: &str = "mailchimp.settings";

/// Name the settings route uses to refer to [`ConfigurationAccessCheck`].
pub const ACCESS_CHECK_ID: &str = "mailchimp_configuration_access_check";

/// Path of the guarded settings page.
pub const SETTINGS_PATH: &str = "/admin/config/services/mailchimp";

/// Permissions provided by the Mailchimp plugin.
pub fn perm() -> Vec<PermissionDefinition> {
    vec![PermissionDefinition::new(
        "administer mailchimp",
        "Configure Mailchimp lists and API access",
    )]
}

/// Menu routes provided by the Mailchimp plugin.
pub fn menu() -> Vec<MenuDefinition> {
    vec![
        MenuDefinition::new(SETTINGS_PATH, "Mailchimp")
            .permission("administer mailchimp")
            .parent("/admin/config/services")
            .access_check(ACCESS_CHECK_ID),
    ]
}
