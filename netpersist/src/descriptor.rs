//! Connection descriptor construction.
//!
//! The descriptor is the fully-specified set of connection attributes
//! one task uses: resolved provider values overlaid on the play-level
//! defaults, with hard defaults closing the remaining gaps. It is built
//! once per task invocation and never mutated afterwards.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::{Result, TaskError};
use crate::provider::ProviderConfig;

/// Port applied when neither the provider nor the defaults name one.
pub const DEFAULT_PORT: u16 = 22;

/// Transport timeout applied when neither the provider nor the defaults
/// name one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Escalation method the session transport performs natively.
const NATIVE_ESCALATION: &str = "enable";

/// Fully-specified connection attributes for one task.
#[derive(Debug)]
pub struct ConnectionDescriptor {
    /// Target host (hostname or IP address).
    pub host: String,

    /// Target port.
    pub port: u16,

    /// Login username.
    pub user: String,

    /// Login password.
    pub password: Option<SecretString>,

    /// Path to the SSH private key.
    pub private_key_path: Option<PathBuf>,

    /// Bound applied to every transport call made on behalf of this task.
    pub timeout: Duration,

    /// Whether privilege escalation is requested.
    pub escalate: bool,

    /// Escalation method (e.g. `sudo`, `enable`).
    pub escalate_method: Option<String>,

    /// Escalation secret (enable-mode password).
    pub escalate_secret: Option<SecretString>,

    /// Network OS, when already known.
    pub network_os: Option<String>,
}

impl ConnectionDescriptor {
    /// Build a descriptor by overlaying a resolved provider on the
    /// play-level defaults.
    ///
    /// Precedence per attribute: provider value, then default, then the
    /// hard default where one exists. Host and username have no hard
    /// default and must come from one of the two tiers. Escalation is
    /// sourced from the provider alone: the device's `authorize` flag
    /// and `auth_pass` secret, never the play's own escalation secret.
    pub fn from_provider(
        provider: &ProviderConfig,
        defaults: ConnectionDefaults,
        network_os: Option<String>,
    ) -> Result<Self> {
        let host = provider
            .host()
            .map(str::to_string)
            .or(defaults.host)
            .ok_or(TaskError::MissingConnectionArg { name: "host" })?;

        let user = provider
            .username()
            .map(str::to_string)
            .or(defaults.user)
            .ok_or(TaskError::MissingConnectionArg { name: "username" })?;

        Ok(Self {
            host,
            port: provider.port().or(defaults.port).unwrap_or(DEFAULT_PORT),
            user,
            password: provider
                .password()
                .map(|p| SecretString::from(p.to_string()))
                .or(defaults.password),
            private_key_path: provider.ssh_keyfile().or(defaults.private_key_path),
            timeout: provider
                .timeout()
                .or(defaults.timeout)
                .unwrap_or(DEFAULT_TIMEOUT),
            escalate: provider.authorize().unwrap_or(false),
            escalate_method: defaults.escalate_method,
            escalate_secret: provider
                .auth_pass()
                .map(|p| SecretString::from(p.to_string())),
            network_os,
        })
    }

    /// Native enable-mode entry is performed by the session transport
    /// itself, so the generic escalation step stands down for it.
    pub(crate) fn bypass_native_escalation(mut self) -> Self {
        if self.escalate_method.as_deref() == Some(NATIVE_ESCALATION) {
            self.escalate = false;
            self.escalate_method = None;
        }
        self
    }
}

/// Play-level connection settings a resolved provider overlays.
#[derive(Debug)]
pub struct ConnectionDefaults {
    /// Connection mode the task was started with. Session bootstrap
    /// requires `"local"`.
    pub connection: String,

    /// Default target host.
    pub host: Option<String>,

    /// Default target port.
    pub port: Option<u16>,

    /// Default login username.
    pub user: Option<String>,

    /// Default login password.
    pub password: Option<SecretString>,

    /// Default SSH private key path.
    pub private_key_path: Option<PathBuf>,

    /// Default transport timeout.
    pub timeout: Option<Duration>,

    /// Escalation method requested by the play.
    pub escalate_method: Option<String>,
}

impl ConnectionDefaults {
    /// Create defaults for the local connection mode.
    pub fn new() -> Self {
        Self {
            connection: "local".to_string(),
            host: None,
            port: None,
            user: None,
            password: None,
            private_key_path: None,
            timeout: None,
            escalate_method: None,
        }
    }

    /// Set the connection mode.
    pub fn with_connection(mut self, connection: impl Into<String>) -> Self {
        self.connection = connection.into();
        self
    }

    /// Set the default host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the default port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the default username.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Set the default password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::from(password.into()));
        self
    }

    /// Set the default private key path.
    pub fn with_private_key(mut self, path: impl Into<PathBuf>) -> Self {
        self.private_key_path = Some(path.into());
        self
    }

    /// Set the default transport timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the play-level escalation method.
    pub fn with_escalation_method(mut self, method: impl Into<String>) -> Self {
        self.escalate_method = Some(method.into());
        self
    }
}

impl Default for ConnectionDefaults {
    fn default() -> Self {
        Self::new()
    }
}
