//! Provider configuration resolution.
//!
//! A "provider" is the block of connection parameters a task supplies
//! for the device it targets: host, port, credentials, timeouts, and a
//! handful of OS-specific switches. This module defines the per-OS
//! schemas describing that block, the registry that looks schemas up by
//! network OS name, and the resolver that merges a schema with the
//! task's argument tiers and fallback strategies into a finished
//! [`ProviderConfig`].

mod fallback;
mod registry;
mod resolver;
mod schema;
pub mod schemas;

pub use fallback::{FallbackContext, FallbackError, FallbackStrategy};
pub use registry::{SchemaRegistry, lookup};
pub use resolver::resolve;
pub use schema::{PROVIDER_KEY, ProviderSchema, SchemaEntry, ValueKind};

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use indexmap::IndexMap;
use serde_json::Value;

/// A resolved provider configuration.
///
/// Every key the schema declares, except the reserved `provider` key,
/// is present after resolution; keys no tier could fill hold
/// `Value::Null`. Downstream consumers must tolerate null fields, as
/// the descriptor layer applies its own final defaults. Values flagged
/// sensitive by the schema are redacted from `Debug` output.
#[derive(Clone, Default)]
pub struct ProviderConfig {
    values: IndexMap<String, Value>,
    sensitive: HashSet<String>,
}

impl ProviderConfig {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: &str, value: Value, sensitive: bool) {
        if sensitive {
            self.sensitive.insert(key.to_string());
        }
        self.values.insert(key.to_string(), value);
    }

    /// Get a resolved value. `Some(Value::Null)` means the key resolved
    /// to nothing; `None` means the schema never declared it.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Get a resolved value only if it is present and non-null.
    pub fn get_defined(&self, key: &str) -> Option<&Value> {
        self.get(key).filter(|value| !value.is_null())
    }

    /// Number of resolved keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether the configuration is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate keys in schema declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Iterate resolved entries in schema declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Render the configuration as a JSON object for forwarding to the
    /// downstream command.
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.values
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }

    /// Target host.
    pub fn host(&self) -> Option<&str> {
        self.str_value("host")
    }

    /// Target port.
    pub fn port(&self) -> Option<u16> {
        match self.get_defined("port")? {
            Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Login username.
    pub fn username(&self) -> Option<&str> {
        self.str_value("username")
    }

    /// Login password.
    pub fn password(&self) -> Option<&str> {
        self.str_value("password")
    }

    /// Path to the SSH private key.
    pub fn ssh_keyfile(&self) -> Option<PathBuf> {
        self.str_value("ssh_keyfile").map(PathBuf::from)
    }

    /// Whether to enter the privileged exec mode.
    pub fn authorize(&self) -> Option<bool> {
        match self.get_defined("authorize")? {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_i64().map(|n| n != 0),
            Value::String(s) => truthy(s),
            _ => None,
        }
    }

    /// Enable-mode password.
    pub fn auth_pass(&self) -> Option<&str> {
        self.str_value("auth_pass")
    }

    /// Transport timeout.
    pub fn timeout(&self) -> Option<Duration> {
        match self.get_defined("timeout")? {
            Value::Number(n) => n.as_u64().map(Duration::from_secs),
            Value::String(s) => s.trim().parse().ok().map(Duration::from_secs),
            _ => None,
        }
    }

    fn str_value(&self, key: &str) -> Option<&str> {
        self.get_defined(key)?.as_str()
    }
}

/// Interpret the boolean spellings accepted on argument surfaces and in
/// environment fallbacks.
fn truthy(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, value) in &self.values {
            if self.sensitive.contains(key) && !value.is_null() {
                map.entry(key, &"<redacted>");
            } else {
                map.entry(key, value);
            }
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> ProviderConfig {
        let mut config = ProviderConfig::new();
        config.insert("host", json!("10.0.0.1"), false);
        config.insert("port", json!(8022), false);
        config.insert("username", json!("admin"), false);
        config.insert("password", json!("hunter2"), true);
        config.insert("authorize", json!("yes"), false);
        config.insert("timeout", Value::Null, false);
        config
    }

    #[test]
    fn test_typed_accessors() {
        let config = config();
        assert_eq!(config.host(), Some("10.0.0.1"));
        assert_eq!(config.port(), Some(8022));
        assert_eq!(config.username(), Some("admin"));
        assert_eq!(config.password(), Some("hunter2"));
        assert_eq!(config.authorize(), Some(true));
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_null_is_present_but_undefined() {
        let config = config();
        assert!(config.get("timeout").is_some());
        assert!(config.get_defined("timeout").is_none());
        assert!(config.get("ssh_keyfile").is_none());
    }

    #[test]
    fn test_string_coercions() {
        let mut config = ProviderConfig::new();
        config.insert("port", json!("2222"), false);
        config.insert("authorize", json!("0"), false);
        config.insert("timeout", json!("15"), false);

        assert_eq!(config.port(), Some(2222));
        assert_eq!(config.authorize(), Some(false));
        assert_eq!(config.timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_debug_redacts_sensitive_values() {
        let rendered = format!("{:?}", config());
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("10.0.0.1"));
    }

    #[test]
    fn test_to_value_round_trip() {
        let value = config().to_value();
        assert_eq!(value["host"], json!("10.0.0.1"));
        assert_eq!(value["password"], json!("hunter2"));
        assert_eq!(value["timeout"], Value::Null);
    }
}
