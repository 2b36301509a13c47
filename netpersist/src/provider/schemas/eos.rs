//! Arista EOS provider schema.
//!
//! EOS command modules can also reach the device over its HTTP API, so
//! the schema carries the API transport keys alongside the CLI ones.

use crate::provider::fallback::FallbackStrategy;
use crate::provider::schema::{ProviderSchema, SchemaEntry, ValueKind};

/// Create the EOS provider schema.
pub fn schema() -> ProviderSchema {
    super::with_enable_keys(super::base("eos"))
        .with_entry("use_ssl", SchemaEntry::new(ValueKind::Bool))
        .with_entry("validate_certs", SchemaEntry::new(ValueKind::Bool))
        .with_entry(
            "transport",
            SchemaEntry::new(ValueKind::Str).with_fallback(FallbackStrategy::constant("cli")),
        )
}
