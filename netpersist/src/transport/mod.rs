//! Transport layer for the persistent session.
//!
//! Below the session bootstrap sits a black box that executes one line
//! of text and returns status, stdout, and stderr. The bootstrap drives
//! it with three wire commands and never assumes anything else about
//! the underlying protocol.

mod socket;

pub use socket::{EXEC_PREFIX, UnixSocketTransport};

use async_trait::async_trait;

use crate::error::Result;

/// Wire command that opens the device shell behind the session.
pub const OPEN_SHELL_COMMAND: &str = "open_shell()";

/// Wire command that reports the current device prompt.
pub const PROMPT_COMMAND: &str = "prompt()";

/// Wire command that leaves the current prompt mode.
pub const EXIT_COMMAND: &str = "exit";

/// Output of one transport command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit status; 0 is success.
    pub status: i32,

    /// Captured stdout.
    pub stdout: String,

    /// Captured stderr.
    pub stderr: String,
}

impl CommandOutput {
    /// Build a successful output carrying the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Check whether the command succeeded.
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// A line-oriented command channel to the persistent session.
#[async_trait]
pub trait Transport: Send {
    /// Execute one line of text and return its output.
    async fn exec_command(&mut self, command: &str) -> Result<CommandOutput>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;

    use async_trait::async_trait;

    use super::{CommandOutput, Transport};
    use crate::error::{Error, Result};

    /// Scripted transport double: pops one response per command and
    /// records every command it was asked to execute.
    pub(crate) struct MockTransport {
        responses: VecDeque<Result<CommandOutput>>,
        pub(crate) commands: Vec<String>,
    }

    impl MockTransport {
        pub(crate) fn new() -> Self {
            Self {
                responses: VecDeque::new(),
                commands: Vec::new(),
            }
        }

        pub(crate) fn respond(mut self, output: CommandOutput) -> Self {
            self.responses.push_back(Ok(output));
            self
        }

        pub(crate) fn respond_err(mut self, err: Error) -> Self {
            self.responses.push_back(Err(err));
            self
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn exec_command(&mut self, command: &str) -> Result<CommandOutput> {
            self.commands.push(command.to_string());
            match self.responses.pop_front() {
                Some(response) => response,
                None => panic!("unscripted command: {command}"),
            }
        }
    }
}
