//! # Netpersist
//!
//! Persistent session bootstrap and provider resolution for network
//! device automation.
//!
//! Netpersist covers the ground between "a task wants to run a command
//! on a device" and "an authenticated, exec-mode session is ready to
//! carry it": resolving connection credentials from layered argument
//! sources, deriving a stable key so tasks share one long-lived session
//! per device and account, and opening or recovering that session over
//! a local daemon socket.
//!
//! ## Features
//!
//! - Tiered provider resolution (nested block, overrides, task
//!   arguments, schema fallbacks) with presence semantics
//! - Per-OS provider schemas behind a global registry (ios, eos,
//!   junos, nxos out of the box)
//! - Deterministic session keys so concurrent tasks converge on one
//!   session per device and account
//! - Advisory-locked bootstrap: probe, open, or recover from a
//!   configuration-mode prompt
//! - Length-prefixed Unix socket transport to the session daemon
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use netpersist::provider::{self, FallbackContext};
//! use netpersist::{ConnectionDefaults, ConnectionDescriptor, SessionManager};
//! use netpersist::transport::UnixSocketTransport;
//! use serde_json::{Map, json};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), netpersist::Error> {
//!     let schema = provider::lookup("ios")?;
//!
//!     let mut nested = Map::new();
//!     nested.insert("host".to_string(), json!("10.0.0.1"));
//!     nested.insert("username".to_string(), json!("admin"));
//!
//!     let resolved = provider::resolve(
//!         &schema,
//!         &Map::new(),
//!         &Map::new(),
//!         &nested,
//!         &FallbackContext::new(),
//!     );
//!
//!     let descriptor =
//!         ConnectionDescriptor::from_provider(&resolved, ConnectionDefaults::new(), None)?;
//!
//!     let manager = SessionManager::new()?;
//!     let handle = manager
//!         .deriver()
//!         .derive(&descriptor.host, descriptor.port, &descriptor.user);
//!
//!     let mut transport =
//!         UnixSocketTransport::connect(handle.path(), descriptor.timeout).await?;
//!     let bootstrap = manager.ensure_session(descriptor, &mut transport).await?;
//!     println!("session ready at {}", bootstrap.handle);
//!     Ok(())
//! }
//! ```

pub mod descriptor;
pub mod error;
pub mod netos;
pub mod provider;
pub mod session;
pub mod task;
pub mod transport;

// Re-export main types for convenience
pub use descriptor::{ConnectionDefaults, ConnectionDescriptor};
pub use error::Error;
pub use provider::{
    FallbackContext, FallbackStrategy, ProviderConfig, ProviderSchema, SchemaRegistry,
};
pub use session::{SessionBootstrap, SessionHandle, SessionKeyDeriver, SessionManager, SessionState};
pub use task::{
    CommandDispatcher, CommandIndex, Facts, StaticCommandIndex, TaskArgs, TaskInvocation,
    TaskResult, TaskRunner,
};
pub use transport::{CommandOutput, Transport, UnixSocketTransport};
