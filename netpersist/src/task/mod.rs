//! Task surface: arguments, facts, results, and the collaborators a
//! task run is dispatched through.

mod runner;

pub use runner::{TaskInvocation, TaskRunner};

use std::collections::HashSet;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, SessionError, TaskError};
use crate::netos::NETWORK_OS_KEY;
use crate::provider::PROVIDER_KEY;
use crate::session::SessionBootstrap;

/// Arguments given to one task.
///
/// A JSON object; may carry a nested `provider` object and a
/// `network_os` hint alongside the action's own arguments.
#[derive(Debug, Clone, Default)]
pub struct TaskArgs {
    args: Map<String, Value>,
}

impl TaskArgs {
    /// Create an empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing argument object.
    pub fn from_map(args: Map<String, Value>) -> Self {
        Self { args }
    }

    /// Add one argument.
    pub fn with_arg(mut self, key: impl Into<String>, value: Value) -> Self {
        self.args.insert(key.into(), value);
        self
    }

    /// Look up an argument.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.args.get(key)
    }

    /// Look up a string argument.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key)?.as_str()
    }

    /// The nested provider block, when present and an object.
    pub fn provider(&self) -> Option<&Map<String, Value>> {
        self.get(PROVIDER_KEY)?.as_object()
    }

    /// The underlying argument object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.args
    }
}

/// Facts cached across tasks targeting the same device.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Facts {
    values: Map<String, Value>,
}

impl Facts {
    /// Create an empty fact set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a fact.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Record a fact.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// The cached network OS, when present and non-empty.
    pub fn network_os(&self) -> Option<&str> {
        self.get(NETWORK_OS_KEY)?.as_str().filter(|os| !os.is_empty())
    }

    /// Whether no facts are recorded.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Result record handed back to the caller.
///
/// Failures are part of this record, never panics or leaked errors:
/// a task that cannot proceed reports `failed` with a message.
#[derive(Debug, Serialize)]
pub struct TaskResult {
    /// Whether the task failed.
    pub failed: bool,
    /// Failure message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    /// Raw transport status behind a session-open failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
    /// Output of the dispatched command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_result: Option<Value>,
    /// Facts recorded for later tasks.
    #[serde(skip_serializing_if = "Facts::is_empty")]
    pub facts: Facts,
}

impl TaskResult {
    pub(crate) fn success(module_result: Value, facts: Facts) -> Self {
        Self {
            failed: false,
            msg: None,
            status: None,
            module_result: Some(module_result),
            facts,
        }
    }

    pub(crate) fn from_error(err: &Error) -> Self {
        let status = match err {
            Error::Session(SessionError::OpenFailed { status, .. }) => Some(*status),
            _ => None,
        };
        Self {
            failed: true,
            msg: Some(err.to_string()),
            status,
            module_result: None,
            facts: Facts::new(),
        }
    }
}

/// Looks up the device-OS-specific implementation of a task action.
pub trait CommandIndex: Send + Sync {
    /// Name of the command implementing `action` on `network_os`, or
    /// `None` when that OS has no implementation of the action.
    fn implementation(&self, network_os: &str, action: &str) -> Option<String>;
}

/// Runs a looked-up command against a bootstrapped session.
#[async_trait]
pub trait CommandDispatcher: Send + Sync {
    /// Dispatch `command` with the forwarded arguments.
    async fn dispatch(
        &self,
        command: &str,
        args: &Map<String, Value>,
        bootstrap: &SessionBootstrap,
    ) -> std::result::Result<Value, TaskError>;
}

/// Command index over a fixed set of available command names.
///
/// Implements the `<network_os>_<suffix>` naming convention: the task
/// action `net_command` on OS `ios` resolves to `ios_command` when
/// that name is in the set.
#[derive(Debug, Clone, Default)]
pub struct StaticCommandIndex {
    commands: HashSet<String>,
}

impl StaticCommandIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an available command name.
    pub fn with_command(mut self, name: impl Into<String>) -> Self {
        self.commands.insert(name.into());
        self
    }
}

impl CommandIndex for StaticCommandIndex {
    fn implementation(&self, network_os: &str, action: &str) -> Option<String> {
        let suffix = action.strip_prefix("net_").unwrap_or(action);
        let candidate = format!("{network_os}_{suffix}");
        self.commands.contains(&candidate).then_some(candidate)
    }
}
