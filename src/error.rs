//! Error types used by the gamevisor runtime.
//!
//! This module defines three error enums with distinct propagation rules:
//!
//! - [`RunError`] — errors that end the whole run (launch failure, the
//!   process's own exit condition).
//! - [`RelayError`] — a pump's underlying stream closed or errored; contained
//!   to that pump, the rest of the run continues.
//! - [`HookError`] — a collaborator call (announce/upload) failed; caught and
//!   logged at the call site, never propagated.
//!
//! All types provide `as_label()` for short stable identifiers in logs.

use std::process::ExitStatus;

use thiserror::Error;

/// # Errors that terminate the supervised run.
///
/// Only the child process's own fate is allowed to end the run: either it
/// could not be started, or it exited and its status is surfaced here.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RunError {
    /// The server executable could not be started.
    #[error("failed to launch {command}: {source}")]
    Launch {
        /// The command that failed to start.
        command: String,
        /// The underlying spawn error.
        source: std::io::Error,
    },

    /// Waiting on the child process failed.
    #[error("failed to wait for the server process: {source}")]
    Wait {
        /// The underlying wait error.
        source: std::io::Error,
    },

    /// The server exited with a non-zero or signaled status.
    #[error("server exited with {status}")]
    Exited {
        /// The child's exit status.
        status: ExitStatus,
    },
}

impl RunError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RunError::Launch { .. } => "run_launch_failed",
            RunError::Wait { .. } => "run_wait_failed",
            RunError::Exited { .. } => "run_server_exited",
        }
    }
}

/// # Errors raised inside a single relay pump.
///
/// A `RelayError` ends the pump it occurred in and nothing else; the other
/// pumps and the idle scheduler keep running until the process itself exits.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RelayError {
    /// Reading the next line from the source stream failed.
    #[error("stream read failed: {source}")]
    Read {
        /// The underlying read error.
        source: std::io::Error,
    },

    /// Forwarding bytes to the destination stream failed.
    #[error("stream write failed: {source}")]
    Write {
        /// The underlying write error.
        source: std::io::Error,
    },
}

impl RelayError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RelayError::Read { .. } => "relay_read_failed",
            RelayError::Write { .. } => "relay_write_failed",
        }
    }
}

/// # Errors returned by external collaborators.
///
/// Announce and upload calls are best-effort. Handlers publish these as
/// [`EventKind::HookFailed`](crate::EventKind::HookFailed) and move on; a
/// failed announcement must never abort the supervisor.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum HookError {
    /// A notification could not be delivered.
    #[error("announce failed: {reason}")]
    Announce {
        /// Human-readable failure description.
        reason: String,
    },

    /// The latest save artifact could not be persisted.
    #[error("save upload failed: {reason}")]
    Upload {
        /// Human-readable failure description.
        reason: String,
    },
}

impl HookError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            HookError::Announce { .. } => "hook_announce_failed",
            HookError::Upload { .. } => "hook_upload_failed",
        }
    }
}
