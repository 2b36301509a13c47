//! OS-independent provider schema.
//!
//! Used while the network OS is still unknown at bootstrap time, before
//! live discovery has populated the fact. Only the universal connection
//! keys are declared.

use crate::provider::schema::ProviderSchema;

/// Name the common schema is registered under.
pub const NAME: &str = "common";

/// Create the common provider schema.
pub fn schema() -> ProviderSchema {
    super::base(NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_schema() {
        let schema = schema();
        assert_eq!(schema.name, "common");
        assert!(schema.contains("host"));
        assert!(schema.contains("timeout"));
        // No OS-specific keys on the common schema
        assert!(!schema.contains("authorize"));
        assert!(!schema.contains("transport"));
    }
}
