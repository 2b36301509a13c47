//! Provider schema definitions.
//!
//! A schema declares, for one network OS, the ordered set of provider
//! keys the resolver must fill in, together with each key's value kind,
//! fallback strategy, and sensitivity.

use indexmap::IndexMap;

use super::fallback::FallbackStrategy;

/// Reserved key naming the nested provider block inside task arguments.
///
/// It may appear in a schema (the nested block is itself an argument)
/// but is never resolved as a provider value.
pub const PROVIDER_KEY: &str = "provider";

/// Declared value kind of a schema entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Free-form string
    Str,
    /// Integer
    Int,
    /// Boolean
    Bool,
    /// Filesystem path
    Path,
    /// Nested mapping
    Dict,
}

/// A single provider schema entry.
#[derive(Debug, Clone)]
pub struct SchemaEntry {
    /// Declared value kind.
    pub kind: ValueKind,

    /// Fallback consulted when no argument tier supplies a value.
    pub fallback: FallbackStrategy,

    /// Sensitive values are redacted from resolved-config Debug output.
    pub sensitive: bool,
}

impl SchemaEntry {
    /// Create an entry with no fallback.
    pub fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            fallback: FallbackStrategy::None,
            sensitive: false,
        }
    }

    /// Attach a fallback strategy.
    pub fn with_fallback(mut self, fallback: FallbackStrategy) -> Self {
        self.fallback = fallback;
        self
    }

    /// Mark the value as sensitive.
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }
}

/// Ordered provider schema for one network OS.
#[derive(Debug, Clone)]
pub struct ProviderSchema {
    /// Network OS name this schema belongs to.
    pub name: String,

    /// Schema entries in declaration order.
    pub entries: IndexMap<String, SchemaEntry>,
}

impl ProviderSchema {
    /// Create an empty schema for the given network OS.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: IndexMap::new(),
        }
    }

    /// Add an entry. Later entries with the same key replace earlier ones.
    pub fn with_entry(mut self, key: impl Into<String>, entry: SchemaEntry) -> Self {
        self.entries.insert(key.into(), entry);
        self
    }

    /// Get an entry by key.
    pub fn get(&self, key: &str) -> Option<&SchemaEntry> {
        self.entries.get(key)
    }

    /// Check whether the schema declares a key.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate entries in declaration order, excluding the reserved
    /// `provider` key.
    pub fn resolvable_entries(&self) -> impl Iterator<Item = (&str, &SchemaEntry)> {
        self.entries
            .iter()
            .filter(|(key, _)| key.as_str() != PROVIDER_KEY)
            .map(|(key, entry)| (key.as_str(), entry))
    }
}
