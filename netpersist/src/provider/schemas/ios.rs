//! Cisco IOS provider schema.

use crate::provider::schema::ProviderSchema;

/// Create the IOS provider schema.
pub fn schema() -> ProviderSchema {
    super::with_enable_keys(super::base("ios"))
}
