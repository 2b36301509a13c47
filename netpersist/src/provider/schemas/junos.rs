//! Juniper Junos provider schema.
//!
//! Junos has no enable mode, so the escalation keys are absent.

use crate::provider::fallback::FallbackStrategy;
use crate::provider::schema::{ProviderSchema, SchemaEntry, ValueKind};

/// Create the Junos provider schema.
pub fn schema() -> ProviderSchema {
    super::base("junos").with_entry(
        "transport",
        SchemaEntry::new(ValueKind::Str).with_fallback(FallbackStrategy::constant("cli")),
    )
}
