//! Common settings for organizations
//!
//! Organizations carry an open-ended key-value settings map (string key to
//! arbitrary JSON value) for locale, branding flags, and similar tenant-wide
//! configuration. A handful of well-known keys get typed accessors.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Well-known setting key: default UI locale for the organization.
pub const KEY_DEFAULT_LOCALE: &str = "default_locale";

/// Well-known setting key: branding configuration object.
pub const KEY_BRANDING: &str = "branding";

/// Arbitrary key-value common settings for an organization.
///
/// Reading an unknown key returns `None`, which is an explicit "absent"
/// result rather than an error.
///
/// # Examples
///
/// ```
/// use tenant_org::settings::CommonSettings;
/// use serde_json::json;
///
/// let mut settings = CommonSettings::default();
/// settings.set("default_locale", json!("en"));
/// assert_eq!(settings.get("default_locale"), Some(&json!("en")));
/// assert_eq!(settings.get("missing"), None);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct CommonSettings(HashMap<String, serde_json::Value>);

impl CommonSettings {
    /// Creates an empty settings map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a setting value; `None` when the key is absent.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// Set a setting value, returning the previous value if any.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Option<serde_json::Value> {
        self.0.insert(key.into(), value)
    }

    /// Remove a setting, returning its value if it was present.
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.0.remove(key)
    }

    /// Check whether the map holds no settings.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of settings present.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Snapshot of all settings.
    pub fn as_map(&self) -> &HashMap<String, serde_json::Value> {
        &self.0
    }

    /// The organization's default locale, if configured as a string.
    pub fn default_locale(&self) -> Option<&str> {
        self.get(KEY_DEFAULT_LOCALE).and_then(|v| v.as_str())
    }

    /// The organization's branding object, if configured.
    pub fn branding(&self) -> Option<&serde_json::Value> {
        self.get(KEY_BRANDING)
    }
}

impl FromIterator<(String, serde_json::Value)> for CommonSettings {
    fn from_iter<T: IntoIterator<Item = (String, serde_json::Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
