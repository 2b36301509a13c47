//! Persistent session bootstrap.
//!
//! Turning a connection descriptor into a usable device session walks
//! a short state machine: derive the session key, serialize on the
//! per-key advisory lock, probe any existing session, and either open
//! a fresh shell or recover the existing one back to the exec prompt.

mod ansi;
mod key;
mod lock;
mod manager;
mod probe;

pub use key::{SessionHandle, SessionKeyDeriver};
pub use lock::SessionLock;
pub use manager::{SessionBootstrap, SessionManager};
pub use probe::SessionProbe;

use std::fmt;

/// Observed state of a session at probe time.
///
/// Never stored between bootstraps: recomputed from the artifact and
/// the live probe every time, so sessions terminated externally cannot
/// leave stale state behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session artifact exists at the derived key.
    Absent,
    /// Session is open and sitting at the exec prompt.
    OpenReady,
    /// Session is open but stuck at a configuration-mode prompt.
    OpenWrongMode,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::OpenReady => write!(f, "open and ready"),
            Self::OpenWrongMode => write!(f, "open in config mode"),
        }
    }
}
