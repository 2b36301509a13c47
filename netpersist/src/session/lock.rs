//! Advisory locking for the session-open critical section.
//!
//! Two tasks that derive the same session key must not both conclude
//! the session is absent and open it twice. The probe-and-open window
//! is serialized by an exclusive `flock` on a lock file co-located with
//! the session artifact. The artifact itself never carries the lock:
//! it is the daemon's socket, and probing it has to stay lock-free.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{Result, SessionError};

/// Exclusive advisory lock over one session's bootstrap window.
///
/// Held from just before the probe until the session is known open and
/// ready. Released on drop; the kernel also releases it if the process
/// dies, so a crashed holder never wedges later tasks.
#[derive(Debug)]
pub struct SessionLock {
    file: File,
    path: PathBuf,
}

impl SessionLock {
    /// Acquire the lock, blocking until any current holder releases it.
    ///
    /// The flock call runs on the blocking thread pool so a contended
    /// session never stalls the async executor.
    pub async fn acquire(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let lock_path = path.clone();

        let file = tokio::task::spawn_blocking(move || -> io::Result<File> {
            let file = OpenOptions::new()
                .create(true)
                .read(true)
                .write(true)
                .open(&lock_path)?;
            flock(&file, libc::LOCK_EX)?;
            Ok(file)
        })
        .await
        .map_err(|err| SessionError::Lock {
            source: io::Error::other(err),
        })?
        .map_err(|err| SessionError::Lock { source: err })?;

        debug!("acquired session lock {}", path.display());
        Ok(Self { file, path })
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        if let Err(err) = flock(&self.file, libc::LOCK_UN) {
            warn!(
                "failed to release session lock {}: {err}",
                self.path.display()
            );
        }
    }
}

fn flock(file: &File, operation: libc::c_int) -> io::Result<()> {
    // SAFETY: the fd is owned by `file` and stays open for the call
    let rc = unsafe { libc::flock(file.as_raw_fd(), operation) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}
