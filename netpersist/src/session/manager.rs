//! Session bootstrap state machine.

use log::{debug, warn};
use tokio::fs;

use super::SessionState;
use super::key::{SessionHandle, SessionKeyDeriver};
use super::lock::SessionLock;
use super::probe::SessionProbe;
use crate::descriptor::ConnectionDescriptor;
use crate::error::{Result, SessionError, TransportError};
use crate::transport::{CommandOutput, EXIT_COMMAND, OPEN_SHELL_COMMAND, Transport};

/// Outcome of a successful bootstrap.
#[derive(Debug)]
pub struct SessionBootstrap {
    /// Handle naming the open session.
    pub handle: SessionHandle,
    /// The connection descriptor, with native escalation bypassed
    /// where it applied.
    pub descriptor: ConnectionDescriptor,
    /// Whether an already-open session was reused.
    pub reused: bool,
}

/// Walks a descriptor to an open, exec-mode session.
///
/// The walk is derive, lock, probe, then open or recover. Session
/// state is never stored between walks; it is recomputed from the
/// artifact and the live probe every time, so sessions terminated
/// behind our back cannot leave stale bookkeeping around.
#[derive(Debug, Clone)]
pub struct SessionManager {
    deriver: SessionKeyDeriver,
}

impl SessionManager {
    /// Create a manager deriving handles under `$HOME/.netpersist`.
    pub fn new() -> Result<Self> {
        Ok(Self {
            deriver: SessionKeyDeriver::new()?,
        })
    }

    /// Create a manager using the given deriver.
    pub fn with_deriver(deriver: SessionKeyDeriver) -> Self {
        Self { deriver }
    }

    /// The key deriver this manager uses.
    pub fn deriver(&self) -> &SessionKeyDeriver {
        &self.deriver
    }

    /// Ensure an open, exec-mode session for `descriptor`.
    ///
    /// Consumes the descriptor and hands it back in the bootstrap
    /// result; the native-escalation bypass may rewrite its escalation
    /// fields, everything else passes through untouched. Every
    /// transport exchange is bounded by the descriptor's timeout.
    pub async fn ensure_session(
        &self,
        descriptor: ConnectionDescriptor,
        transport: &mut dyn Transport,
    ) -> Result<SessionBootstrap> {
        let descriptor = descriptor.bypass_native_escalation();
        let handle = self
            .deriver
            .derive(&descriptor.host, descriptor.port, &descriptor.user);

        fs::create_dir_all(self.deriver.control_dir())
            .await
            .map_err(SessionError::Io)?;

        // Hold the lock across probe and open so a racing task observes
        // the opened session instead of opening a second one.
        let _lock = SessionLock::acquire(handle.lock_path()).await?;

        let state = SessionProbe::new(descriptor.timeout)
            .probe(handle.exists(), transport)
            .await?;

        let reused = match state {
            SessionState::Absent => {
                debug!("no session at {handle}, opening shell");
                let output = self.exchange(transport, OPEN_SHELL_COMMAND, &descriptor).await?;
                if !output.success() {
                    return Err(SessionError::OpenFailed {
                        status: output.status,
                        stdout: output.stdout,
                        stderr: output.stderr,
                    }
                    .into());
                }
                false
            }
            SessionState::OpenWrongMode => {
                debug!("session {handle} is in config mode, sending exit");
                // Best effort: one exit, and any residual mode problem
                // surfaces from the dispatched command instead
                match self.exchange(transport, EXIT_COMMAND, &descriptor).await {
                    Ok(output) if !output.success() => {
                        warn!("exit from config mode returned status {}", output.status);
                    }
                    Err(err) => warn!("exit from config mode failed: {err}"),
                    Ok(_) => {}
                }
                true
            }
            SessionState::OpenReady => true,
        };

        Ok(SessionBootstrap {
            handle,
            descriptor,
            reused,
        })
    }

    async fn exchange(
        &self,
        transport: &mut dyn Transport,
        command: &str,
        descriptor: &ConnectionDescriptor,
    ) -> Result<CommandOutput> {
        tokio::time::timeout(descriptor.timeout, transport.exec_command(command))
            .await
            .map_err(|_| TransportError::Timeout(descriptor.timeout))?
    }
}
