//! Cisco NX-OS provider schema.

use crate::provider::fallback::FallbackStrategy;
use crate::provider::schema::{ProviderSchema, SchemaEntry, ValueKind};

/// Create the NX-OS provider schema.
pub fn schema() -> ProviderSchema {
    super::base("nxos")
        .with_entry("use_ssl", SchemaEntry::new(ValueKind::Bool))
        .with_entry("validate_certs", SchemaEntry::new(ValueKind::Bool))
        .with_entry(
            "transport",
            SchemaEntry::new(ValueKind::Str).with_fallback(FallbackStrategy::constant("cli")),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nxos_schema() {
        let schema = schema();
        assert_eq!(schema.name, "nxos");
        assert!(schema.contains("use_ssl"));
        assert!(schema.contains("transport"));
        // NX-OS runs commands from the default prompt, no enable keys
        assert!(!schema.contains("authorize"));
    }
}
