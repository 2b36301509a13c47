//! Shell state probing over an existing session.

use std::time::Duration;

use log::debug;
use memchr::memrchr;
use once_cell::sync::Lazy;
use regex::bytes::Regex;

use super::SessionState;
use super::ansi;
use crate::error::{Result, TransportError};
use crate::transport::{PROMPT_COMMAND, Transport};

/// Pattern matching a configuration-mode prompt tail such as
/// `router(config)#` or `switch(config-if)#`.
static CONFIG_PROMPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\)#\s*$").expect("config prompt pattern compiles"));

/// Probes whether an existing session is alive and at the exec prompt.
#[derive(Debug, Clone)]
pub struct SessionProbe {
    timeout: Duration,
    config_pattern: Regex,
}

impl SessionProbe {
    /// Create a probe bounded by the connection's transport timeout.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            config_pattern: CONFIG_PROMPT.clone(),
        }
    }

    /// Override the configuration-mode prompt pattern.
    pub fn with_config_pattern(mut self, pattern: Regex) -> Self {
        self.config_pattern = pattern;
        self
    }

    /// Determine the state of the session behind `transport`.
    ///
    /// `existing` says whether the session artifact is on disk; when it
    /// is not there is nothing to ask, and the state is `Absent`
    /// without touching the transport. Transport failures propagate:
    /// a dead or unreachable session is an error, never mistaken for
    /// an absent or misplaced one.
    pub async fn probe(
        &self,
        existing: bool,
        transport: &mut dyn Transport,
    ) -> Result<SessionState> {
        if !existing {
            return Ok(SessionState::Absent);
        }

        let output = tokio::time::timeout(self.timeout, transport.exec_command(PROMPT_COMMAND))
            .await
            .map_err(|_| TransportError::Timeout(self.timeout))??;

        let state = self.classify(output.stdout.as_bytes());
        debug!("session prompt probe: {state}");
        Ok(state)
    }

    /// Classify a raw prompt report by its last non-empty line.
    fn classify(&self, raw: &[u8]) -> SessionState {
        let text = ansi::strip(raw);
        if self.config_pattern.is_match(last_line(&text)) {
            SessionState::OpenWrongMode
        } else {
            SessionState::OpenReady
        }
    }
}

/// Isolate the last non-empty line of probe output.
fn last_line(text: &[u8]) -> &[u8] {
    let trimmed = text.trim_ascii_end();
    match memrchr(b'\n', trimmed) {
        Some(pos) => &trimmed[pos + 1..],
        None => trimmed,
    }
}
