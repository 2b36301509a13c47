//! Built-in provider schemas.
//!
//! Each supported network OS contributes one schema file describing the
//! argument surface its command modules accept. The universal connection
//! keys live in a shared base so per-OS files only declare what differs.

pub mod common;
pub mod eos;
pub mod ios;
pub mod junos;
pub mod nxos;

use super::fallback::FallbackStrategy;
use super::schema::{PROVIDER_KEY, ProviderSchema, SchemaEntry, ValueKind};

/// Transport timeout in seconds applied when no tier supplies one.
const DEFAULT_TIMEOUT_SECS: i64 = 10;

/// Universal connection keys shared by every network OS.
fn base(name: &str) -> ProviderSchema {
    ProviderSchema::new(name)
        .with_entry("host", SchemaEntry::new(ValueKind::Str))
        .with_entry("port", SchemaEntry::new(ValueKind::Int))
        .with_entry(
            "username",
            SchemaEntry::new(ValueKind::Str)
                .with_fallback(FallbackStrategy::env_var("NETPERSIST_USERNAME")),
        )
        .with_entry(
            "password",
            SchemaEntry::new(ValueKind::Str)
                .with_fallback(FallbackStrategy::env_var("NETPERSIST_PASSWORD"))
                .sensitive(),
        )
        .with_entry(
            "ssh_keyfile",
            SchemaEntry::new(ValueKind::Path)
                .with_fallback(FallbackStrategy::env_var("NETPERSIST_SSH_KEYFILE")),
        )
        .with_entry(
            "timeout",
            SchemaEntry::new(ValueKind::Int)
                .with_fallback(FallbackStrategy::constant(DEFAULT_TIMEOUT_SECS)),
        )
        .with_entry(PROVIDER_KEY, SchemaEntry::new(ValueKind::Dict))
}

/// Enable-mode keys shared by the platforms with a privileged exec mode.
fn with_enable_keys(schema: ProviderSchema) -> ProviderSchema {
    schema
        .with_entry(
            "authorize",
            SchemaEntry::new(ValueKind::Bool)
                .with_fallback(FallbackStrategy::env_var("NETPERSIST_AUTHORIZE")),
        )
        .with_entry(
            "auth_pass",
            SchemaEntry::new(ValueKind::Str)
                .with_fallback(FallbackStrategy::env_var("NETPERSIST_AUTH_PASS"))
                .sensitive(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_declares_universal_keys() {
        let schema = base("test");
        for key in ["host", "port", "username", "password", "ssh_keyfile", "timeout"] {
            assert!(schema.contains(key), "missing universal key {key}");
        }
        assert!(schema.contains(PROVIDER_KEY));
    }

    #[test]
    fn test_secrets_are_sensitive() {
        let schema = with_enable_keys(base("test"));
        assert!(schema.get("password").unwrap().sensitive);
        assert!(schema.get("auth_pass").unwrap().sensitive);
        assert!(!schema.get("username").unwrap().sensitive);
    }
}
