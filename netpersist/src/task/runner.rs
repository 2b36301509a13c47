//! Task orchestration.
//!
//! One task run strings the layers together: validate the connection
//! mode, select the network OS, resolve the provider configuration,
//! build the connection descriptor, bootstrap the session, and dispatch
//! the OS-specific command with the resolved provider substituted into
//! its arguments.

use std::sync::Arc;

use log::debug;
use serde_json::{Map, Value};

use super::{CommandDispatcher, CommandIndex, Facts, TaskArgs, TaskResult};
use crate::descriptor::{ConnectionDefaults, ConnectionDescriptor};
use crate::error::{Error, Result, TaskError};
use crate::netos::{self, NETWORK_OS_KEY};
use crate::provider::{self, FallbackContext, PROVIDER_KEY, ProviderConfig, schemas};
use crate::session::SessionManager;
use crate::transport::Transport;

/// Everything one task run needs.
#[derive(Debug)]
pub struct TaskInvocation {
    /// Action name of the task, e.g. `net_command`.
    pub action: String,
    /// Task arguments, possibly carrying a nested provider block.
    pub args: TaskArgs,
    /// Facts cached by earlier tasks against the same device.
    pub facts: Facts,
    /// Play-level connection defaults.
    pub defaults: ConnectionDefaults,
    /// Per-key provider overrides, applied ahead of task arguments.
    pub overrides: Map<String, Value>,
}

impl TaskInvocation {
    /// Create an invocation of `action` with empty arguments.
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            args: TaskArgs::new(),
            facts: Facts::new(),
            defaults: ConnectionDefaults::new(),
            overrides: Map::new(),
        }
    }

    /// Set the task arguments.
    pub fn with_args(mut self, args: TaskArgs) -> Self {
        self.args = args;
        self
    }

    /// Set the cached facts.
    pub fn with_facts(mut self, facts: Facts) -> Self {
        self.facts = facts;
        self
    }

    /// Set the play-level connection defaults.
    pub fn with_defaults(mut self, defaults: ConnectionDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Add a provider override for one key.
    pub fn with_override(mut self, key: impl Into<String>, value: Value) -> Self {
        self.overrides.insert(key.into(), value);
        self
    }
}

/// Orchestrates one task from arguments to result.
pub struct TaskRunner {
    index: Arc<dyn CommandIndex>,
    dispatcher: Arc<dyn CommandDispatcher>,
    manager: SessionManager,
    fallback_ctx: FallbackContext,
}

impl TaskRunner {
    /// Create a runner over the given collaborators.
    pub fn new(
        index: Arc<dyn CommandIndex>,
        dispatcher: Arc<dyn CommandDispatcher>,
        manager: SessionManager,
    ) -> Self {
        Self {
            index,
            dispatcher,
            manager,
            fallback_ctx: FallbackContext::new(),
        }
    }

    /// Use a specific fallback context for provider resolution.
    pub fn with_fallback_context(mut self, ctx: FallbackContext) -> Self {
        self.fallback_ctx = ctx;
        self
    }

    /// Run one task against the given transport.
    ///
    /// Failures never escape as errors or panics: whatever goes wrong
    /// comes back as a structured failed result.
    pub async fn run(
        &self,
        invocation: TaskInvocation,
        transport: &mut dyn Transport,
    ) -> TaskResult {
        match self.try_run(invocation, transport).await {
            Ok(result) => result,
            Err(err) => TaskResult::from_error(&err),
        }
    }

    async fn try_run(
        &self,
        invocation: TaskInvocation,
        transport: &mut dyn Transport,
    ) -> Result<TaskResult> {
        if invocation.defaults.connection != "local" {
            return Err(TaskError::InvalidConnection {
                mode: invocation.defaults.connection.clone(),
            }
            .into());
        }

        let network_os = netos::select(&invocation.args, &invocation.facts);

        // The OS-independent schema bridges bootstrap while the OS is
        // still unknown.
        let schema = match &network_os {
            Some(os) => provider::lookup(os)?,
            None => provider::lookup(schemas::common::NAME)?,
        };

        let empty = Map::new();
        let nested = invocation.args.provider().unwrap_or(&empty);
        let resolved = provider::resolve(
            &schema,
            &invocation.overrides,
            invocation.args.as_map(),
            nested,
            &self.fallback_ctx,
        );
        debug!("resolved provider for schema '{}'", schema.name);

        let descriptor = ConnectionDescriptor::from_provider(
            &resolved,
            invocation.defaults,
            network_os.clone(),
        )?;
        let bootstrap = self.manager.ensure_session(descriptor, transport).await?;

        // Unknown OS dispatches the action itself; its generic
        // implementation performs discovery against the open session.
        // A missing implementation fails the task but keeps the OS fact.
        let command = match &network_os {
            Some(os) => match self.index.implementation(os, &invocation.action) {
                Some(command) => command,
                None => {
                    let err = Error::Task(TaskError::MissingImplementation {
                        network_os: os.clone(),
                    });
                    let mut result = TaskResult::from_error(&err);
                    result.facts.set(NETWORK_OS_KEY, Value::String(os.clone()));
                    return Ok(result);
                }
            },
            None => invocation.action.clone(),
        };

        let forwarded = forwarded_args(&invocation.args, &resolved);
        let module_result = self
            .dispatcher
            .dispatch(&command, &forwarded, &bootstrap)
            .await
            .map_err(Error::Task)?;

        let mut facts = Facts::new();
        if let Some(os) = network_os {
            facts.set(NETWORK_OS_KEY, Value::String(os));
        }

        Ok(TaskResult::success(module_result, facts))
    }
}

/// Arguments forwarded to the dispatched command: the task's own
/// arguments with the resolved provider substituted in and the
/// `network_os` hint stripped.
fn forwarded_args(args: &TaskArgs, provider: &ProviderConfig) -> Map<String, Value> {
    let mut forwarded = args.as_map().clone();
    forwarded.remove(NETWORK_OS_KEY);
    forwarded.insert(PROVIDER_KEY.to_string(), provider.to_value());
    forwarded
}
