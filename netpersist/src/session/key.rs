//! Session key derivation.
//!
//! Every task targeting the same device over the same account must land
//! on the same long-lived session. The key is a pure function of the
//! connection attributes that define "same device, same account": host,
//! port, and remote user. Nothing non-deterministic participates, so
//! any two processes derive the same handle independently.

use std::fmt;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::{Result, SessionError};

/// Directory under the user's home holding all session state.
const BASE_DIR_NAME: &str = ".netpersist";

/// Subdirectory of the base holding per-connection session artifacts.
const CONTROL_SUBDIR: &str = "pc";

/// Hex digits kept from the digest. The artifact is a Unix socket, and
/// `sun_path` leaves little more than a hundred bytes for the whole
/// path, so the name stays short.
const DIGEST_WIDTH: usize = 20;

/// Derives stable session handles from connection attributes.
#[derive(Debug, Clone)]
pub struct SessionKeyDeriver {
    base_dir: PathBuf,
}

impl SessionKeyDeriver {
    /// Create a deriver rooted at `$HOME/.netpersist`.
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir().ok_or(SessionError::HomeDirUnavailable)?;
        Ok(Self::with_base_dir(home.join(BASE_DIR_NAME)))
    }

    /// Create a deriver rooted at an explicit base directory.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Base directory for session state.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Directory holding the session artifacts.
    pub fn control_dir(&self) -> PathBuf {
        self.base_dir.join(CONTROL_SUBDIR)
    }

    /// Derive the handle for a `(host, port, user)` connection triple.
    ///
    /// Deterministic: the same triple always derives the same handle,
    /// across tasks and across processes. Any attribute changing yields
    /// a different handle, so sessions for distinct endpoints or
    /// accounts never collide.
    pub fn derive(&self, host: &str, port: u16, user: &str) -> SessionHandle {
        let mut hasher = Sha256::new();
        hasher.update(format!("{host}-{port}-{user}").as_bytes());
        let digest = hasher.finalize();

        let mut name = String::with_capacity(DIGEST_WIDTH);
        for byte in digest.iter().take(DIGEST_WIDTH / 2) {
            name.push_str(&format!("{byte:02x}"));
        }

        SessionHandle(self.control_dir().join(name))
    }
}

/// Opaque identifier naming one persistent session.
///
/// Wraps the filesystem path of the session artifact (the daemon's
/// listening socket). Tasks sharing a connection triple share a handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionHandle(PathBuf);

impl SessionHandle {
    /// Path of the session artifact.
    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Check whether the session artifact exists on disk.
    pub fn exists(&self) -> bool {
        self.0.exists()
    }

    /// Path of the advisory lock file co-located with the artifact.
    pub(crate) fn lock_path(&self) -> PathBuf {
        self.0.with_extension("lock")
    }
}

impl fmt::Display for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.display().fmt(f)
    }
}
