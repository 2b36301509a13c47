//! Global schema registry for looking up provider schemas by network OS.
//!
//! The set of known network OS names is closed at startup: built-ins are
//! registered when the registry is first touched, and embedders may add
//! their own schemas with [`SchemaRegistry::register`] before resolving
//! tasks. There is no dynamic loading.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;

use super::schema::ProviderSchema;
use super::schemas;
use crate::error::{ProviderError, Result};

/// Global schema registry.
static REGISTRY: Lazy<RwLock<SchemaRegistry>> = Lazy::new(|| {
    let mut registry = SchemaRegistry::new();
    registry.register_builtin_schemas();
    RwLock::new(registry)
});

/// Registry mapping network OS names to provider schemas.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, ProviderSchema>,
}

impl SchemaRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            schemas: HashMap::new(),
        }
    }

    /// Get the global registry.
    pub fn global() -> &'static RwLock<SchemaRegistry> {
        &REGISTRY
    }

    /// Register built-in schemas.
    fn register_builtin_schemas(&mut self) {
        for schema in [
            schemas::common::schema(),
            schemas::ios::schema(),
            schemas::eos::schema(),
            schemas::junos::schema(),
            schemas::nxos::schema(),
        ] {
            self.schemas.insert(schema.name.clone(), schema);
        }
    }

    /// Register a provider schema.
    pub fn register(&mut self, schema: ProviderSchema) -> Result<()> {
        if self.schemas.contains_key(&schema.name) {
            return Err(ProviderError::AlreadyRegistered {
                name: schema.name.clone(),
            }
            .into());
        }
        self.schemas.insert(schema.name.clone(), schema);
        Ok(())
    }

    /// Get a schema by network OS name.
    pub fn get(&self, name: &str) -> Option<&ProviderSchema> {
        self.schemas.get(name)
    }

    /// Check if a schema is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// List all registered network OS names.
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.schemas.keys()
    }
}

/// Fetch a copy of the schema for `name` from the global registry.
pub fn lookup(name: &str) -> Result<ProviderSchema> {
    let registry = SchemaRegistry::global()
        .read()
        .map_err(|_| ProviderError::RegistryLock)?;

    registry
        .get(name)
        .cloned()
        .ok_or_else(|| ProviderError::UnknownNetworkOs {
            name: name.to_string(),
        }.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::provider::schema::{SchemaEntry, ValueKind};

    #[test]
    fn test_builtins_registered() {
        let registry = SchemaRegistry::global().read().unwrap();
        for name in ["common", "ios", "eos", "junos", "nxos"] {
            assert!(registry.contains(name), "builtin '{name}' missing");
        }
    }

    #[test]
    fn test_lookup_known_os() {
        let schema = lookup("ios").unwrap();
        assert_eq!(schema.name, "ios");
    }

    #[test]
    fn test_lookup_unknown_os() {
        let err = lookup("vyos").unwrap_err();
        match err {
            Error::Provider(ProviderError::UnknownNetworkOs { name }) => {
                assert_eq!(name, "vyos");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_register_rejects_duplicate() {
        let mut registry = SchemaRegistry::new();
        let schema =
            ProviderSchema::new("lab").with_entry("host", SchemaEntry::new(ValueKind::Str));

        registry.register(schema.clone()).unwrap();
        let err = registry.register(schema).unwrap_err();
        match err {
            Error::Provider(ProviderError::AlreadyRegistered { name }) => {
                assert_eq!(name, "lab");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_register_then_get() {
        let mut registry = SchemaRegistry::new();
        registry
            .register(
                ProviderSchema::new("lab").with_entry("host", SchemaEntry::new(ValueKind::Str)),
            )
            .unwrap();

        assert!(registry.contains("lab"));
        assert!(registry.get("lab").unwrap().contains("host"));
        assert_eq!(registry.names().count(), 1);
    }
}
