//! Resolve a provider configuration from layered argument tiers.
//!
//! Shows how the nested provider block, the task's own arguments, and
//! the schema fallbacks merge into one finished configuration, and how
//! sensitive values stay redacted in debug output.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example resolve_provider
//!
//! # Let the password come from the environment fallback
//! NETPERSIST_PASSWORD=hunter2 cargo run --example resolve_provider
//! ```

use netpersist::provider::{self, FallbackContext};
use serde_json::{Map, json};

fn main() -> Result<(), netpersist::Error> {
    // Initialize logging (set RUST_LOG=debug to watch fallback evaluation)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let schema = provider::lookup("eos")?;

    // The task's own top-level arguments
    let mut sibling = Map::new();
    sibling.insert("username".to_string(), json!("operator"));
    sibling.insert("command".to_string(), json!("show version"));

    // The nested provider block wins over top-level siblings
    let mut nested = Map::new();
    nested.insert("host".to_string(), json!("10.0.0.1"));
    nested.insert("username".to_string(), json!("admin"));

    let resolved = provider::resolve(
        &schema,
        &Map::new(),
        &sibling,
        &nested,
        &FallbackContext::new(),
    );

    println!("Resolved provider for '{}':", schema.name);
    println!("{resolved:#?}");
    println!();

    println!("host      = {:?}", resolved.host());
    println!("username  = {:?}", resolved.username());
    println!("timeout   = {:?}", resolved.timeout());
    println!("transport = {:?}", resolved.get_defined("transport"));
    for key in ["password", "auth_pass"] {
        match resolved.get_defined(key) {
            Some(_) => println!("{key} is set (redacted above)"),
            None => println!("{key} is not set"),
        }
    }

    Ok(())
}
