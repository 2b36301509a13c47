//! Provider resolution precedence chain.

use log::debug;
use serde_json::{Map, Value};

use super::ProviderConfig;
use super::fallback::FallbackContext;
use super::schema::ProviderSchema;

/// Resolve a provider configuration from its argument tiers.
///
/// For every schema key except the reserved `provider` key, the first
/// tier holding the key wins: values already present in the nested
/// provider block (`existing`), then explicit per-key overrides, then
/// sibling task arguments given outside the provider block, then the
/// key's fallback strategy. Presence decides, not truthiness: a key
/// deliberately set to null in a higher tier stays null and silences
/// the fallback. Keys no tier can fill resolve to null; this function
/// never fails.
pub fn resolve(
    schema: &ProviderSchema,
    explicit: &Map<String, Value>,
    sibling: &Map<String, Value>,
    existing: &Map<String, Value>,
    ctx: &FallbackContext,
) -> ProviderConfig {
    let mut config = ProviderConfig::new();

    for (key, entry) in schema.resolvable_entries() {
        let value = if let Some(value) = existing.get(key) {
            value.clone()
        } else if let Some(value) = explicit.get(key) {
            value.clone()
        } else if let Some(value) = sibling.get(key) {
            value.clone()
        } else if entry.fallback.is_none() {
            Value::Null
        } else {
            match entry.fallback.evaluate(ctx) {
                Ok(value) => value,
                Err(err) => {
                    debug!("provider key '{key}' fallback did not resolve: {err}");
                    Value::Null
                }
            }
        };

        config.insert(key, value, entry.sensitive);
    }

    config
}
