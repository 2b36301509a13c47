//! Fallback strategies for provider schema keys.
//!
//! A schema key may declare one fallback, consulted only after every
//! argument tier has come up empty. Evaluation is dispatched through a
//! fixed switch over the strategy variants, and failure is always soft:
//! the resolver maps an unresolved fallback to null and moves on.

use std::collections::HashMap;
use std::env;

use serde_json::Value;
use thiserror::Error;

/// Fallback strategy attached to a provider schema key.
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackStrategy {
    /// Read the value from an environment variable.
    EnvVar { name: String },

    /// Read the value from the caller-supplied lookup table.
    Lookup { key: String },

    /// Use a fixed value.
    Constant { value: Value },

    /// No fallback declared for this key.
    None,
}

impl FallbackStrategy {
    /// Environment variable fallback.
    pub fn env_var(name: impl Into<String>) -> Self {
        Self::EnvVar { name: name.into() }
    }

    /// Lookup table fallback.
    pub fn lookup(key: impl Into<String>) -> Self {
        Self::Lookup { key: key.into() }
    }

    /// Constant value fallback.
    pub fn constant(value: impl Into<Value>) -> Self {
        Self::Constant {
            value: value.into(),
        }
    }

    /// Check whether a fallback is declared at all.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Evaluate the strategy against the given context.
    ///
    /// Reads are side-effect-free and idempotent, so evaluation is safe
    /// to run concurrently from multiple resolving tasks.
    pub fn evaluate(&self, ctx: &FallbackContext) -> Result<Value, FallbackError> {
        match self {
            Self::EnvVar { name } => ctx
                .env_var(name)
                .map(Value::String)
                .ok_or_else(|| FallbackError::EnvVarUnset { name: name.clone() }),

            Self::Lookup { key } => ctx
                .lookup(key)
                .cloned()
                .ok_or_else(|| FallbackError::LookupMissing { key: key.clone() }),

            Self::Constant { value } => Ok(value.clone()),

            Self::None => Err(FallbackError::NotConfigured),
        }
    }
}

/// Soft errors from fallback evaluation.
///
/// These never cross the resolver boundary; they are logged and mapped
/// to a null value.
#[derive(Error, Debug, PartialEq)]
pub enum FallbackError {
    /// Environment variable is not set
    #[error("environment variable '{name}' is not set")]
    EnvVarUnset { name: String },

    /// No entry in the lookup table
    #[error("no lookup value for key '{key}'")]
    LookupMissing { key: String },

    /// The key declares no fallback
    #[error("no fallback strategy configured")]
    NotConfigured,
}

/// Context handed to fallback evaluation.
///
/// Carries an optional environment snapshot so tests and embedding
/// applications can pin the environment instead of mutating the process,
/// plus the table consulted by [`FallbackStrategy::Lookup`].
#[derive(Debug, Clone, Default)]
pub struct FallbackContext {
    env: Option<HashMap<String, String>>,
    lookups: HashMap<String, Value>,
}

impl FallbackContext {
    /// Create a context that reads the live process environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace live environment reads with a fixed snapshot.
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Add a value for lookup fallbacks.
    pub fn with_lookup(mut self, key: impl Into<String>, value: Value) -> Self {
        self.lookups.insert(key.into(), value);
        self
    }

    fn env_var(&self, name: &str) -> Option<String> {
        match &self.env {
            Some(snapshot) => snapshot.get(name).cloned(),
            None => env::var(name).ok(),
        }
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        self.lookups.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_constant_always_resolves() {
        let ctx = FallbackContext::new();
        let strategy = FallbackStrategy::constant(22);
        assert_eq!(strategy.evaluate(&ctx), Ok(json!(22)));
    }

    #[test]
    fn test_env_var_from_snapshot() {
        let ctx = FallbackContext::new().with_env([("NETPERSIST_USERNAME", "admin")]);
        let strategy = FallbackStrategy::env_var("NETPERSIST_USERNAME");
        assert_eq!(strategy.evaluate(&ctx), Ok(json!("admin")));
    }

    #[test]
    fn test_env_var_snapshot_shadows_process_env() {
        // PATH is set in the process env, but the snapshot doesn't have it
        let ctx = FallbackContext::new().with_env([("OTHER", "x")]);
        let strategy = FallbackStrategy::env_var("PATH");
        assert_eq!(
            strategy.evaluate(&ctx),
            Err(FallbackError::EnvVarUnset {
                name: "PATH".to_string()
            })
        );
    }

    #[test]
    fn test_env_var_reads_process_env_without_snapshot() {
        let ctx = FallbackContext::new();
        let strategy = FallbackStrategy::env_var("PATH");
        assert!(strategy.evaluate(&ctx).is_ok());
    }

    #[test]
    fn test_env_var_unset_is_soft() {
        let ctx = FallbackContext::new().with_env::<_, String, String>([]);
        let strategy = FallbackStrategy::env_var("NETPERSIST_PASSWORD");
        let err = strategy.evaluate(&ctx).unwrap_err();
        assert_eq!(
            err,
            FallbackError::EnvVarUnset {
                name: "NETPERSIST_PASSWORD".to_string()
            }
        );
    }

    #[test]
    fn test_lookup_hit_and_miss() {
        let ctx = FallbackContext::new().with_lookup("ssh_keyfile", json!("/keys/lab"));

        assert_eq!(
            FallbackStrategy::lookup("ssh_keyfile").evaluate(&ctx),
            Ok(json!("/keys/lab"))
        );
        assert_eq!(
            FallbackStrategy::lookup("missing").evaluate(&ctx),
            Err(FallbackError::LookupMissing {
                key: "missing".to_string()
            })
        );
    }

    #[test]
    fn test_none_reports_not_configured() {
        let ctx = FallbackContext::new();
        assert!(FallbackStrategy::None.is_none());
        assert_eq!(
            FallbackStrategy::None.evaluate(&ctx),
            Err(FallbackError::NotConfigured)
        );
    }
}
