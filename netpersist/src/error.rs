//! Error types for netpersist.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Troubleshooting reference included in session-open failures.
pub const TROUBLESHOOTING_URL: &str =
    "https://github.com/netpersist/netpersist/wiki/Troubleshooting#unable-to-open-shell";

/// Main error type for netpersist operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Provider schema or resolution errors
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Session bootstrap errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Task orchestration errors
    #[error("Task error: {0}")]
    Task(#[from] TaskError),
}

/// Provider schema and registry errors.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// No schema registered for the requested network OS
    #[error("No provider schema registered for network OS '{name}'")]
    UnknownNetworkOs { name: String },

    /// A schema with the same name is already registered
    #[error("Provider schema '{name}' is already registered")]
    AlreadyRegistered { name: String },

    /// The global registry lock was poisoned
    #[error("Failed to acquire schema registry lock")]
    RegistryLock,
}

/// Session bootstrap errors (key derivation, locking, open/recover).
#[derive(Error, Debug)]
pub enum SessionError {
    /// Home directory could not be determined for the session base dir
    #[error("Could not determine a home directory for session state")]
    HomeDirUnavailable,

    /// The transport returned non-zero status on session open
    #[error("Unable to open shell on the remote session (status {status}); see {} for troubleshooting", TROUBLESHOOTING_URL)]
    OpenFailed {
        status: i32,
        stdout: String,
        stderr: String,
    },

    /// Advisory session lock could not be acquired
    #[error("Failed to acquire session lock: {source}")]
    Lock {
        #[source]
        source: io::Error,
    },

    /// I/O error while preparing session state on disk
    #[error("Session I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Transport layer errors (session socket connection, framing).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to the session socket
    #[error("Connection failed to session socket {}: {source}", .path.display())]
    ConnectionFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The session socket never started listening
    #[error("Timeout waiting for session socket {} to start ({waited:?})", .path.display())]
    SocketWaitTimeout { path: PathBuf, waited: std::time::Duration },

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Connection was closed unexpectedly
    #[error("Connection closed")]
    Closed,

    /// Malformed frame on the wire
    #[error("Invalid frame: {message}")]
    Frame { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Task orchestration errors (connection mode, dispatch lookup).
#[derive(Error, Debug)]
pub enum TaskError {
    /// Task started with a connection mode other than local
    #[error("Invalid connection '{mode}': session bootstrap requires connection=local")]
    InvalidConnection { mode: String },

    /// No command implementation exists for the selected network OS
    #[error("Could not find a command implementation for network OS '{network_os}'")]
    MissingImplementation { network_os: String },

    /// A required connection argument is missing from provider and defaults
    #[error("Missing connection argument '{name}'")]
    MissingConnectionArg { name: &'static str },

    /// The command dispatcher reported a failure
    #[error("Command dispatch failed: {message}")]
    Dispatch { message: String },
}

/// Result type alias using netpersist's Error.
pub type Result<T> = std::result::Result<T, Error>;
