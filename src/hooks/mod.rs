//! # Collaborator seam: announcements and save archiving.
//!
//! The supervisor reacts to log lines by calling out to external
//! collaborators — a chat channel for announcements and durable storage for
//! save artifacts. [`Hooks`] is the narrow contract for those calls; the
//! supervisor never depends on how they are delivered.
//!
//! Every method is best-effort: the caller catches the returned
//! [`HookError`], publishes it as a
//! [`HookFailed`](crate::EventKind::HookFailed) event, and carries on. A dead
//! webhook must never take the server down with it.
//!
//! Ships with two implementations:
//! - [`ServerHooks`]: webhook announcements plus filesystem save archiving.
//! - [`NullHooks`]: does nothing; for tests and demos.

mod server;

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::error::HookError;

pub use server::ServerHooks;

/// External collaborator calls made by the line handlers.
///
/// `players` snapshots are sorted; at most one of `joined`/`left` is set per
/// presence call (neither means a full roster announcement).
#[async_trait]
pub trait Hooks: Send + Sync + 'static {
    /// Sends a free-form notification.
    async fn announce(&self, message: &str) -> Result<(), HookError>;

    /// Resolves this host's externally reachable address and announces it.
    async fn announce_ready(&self) -> Result<(), HookError>;

    /// Announces a presence change (or the full roster when neither
    /// `joined` nor `left` is set).
    async fn announce_presence(
        &self,
        players: &BTreeSet<String>,
        joined: Option<&str>,
        left: Option<&str>,
    ) -> Result<(), HookError>;

    /// Persists the most recently modified save artifact to durable storage.
    async fn upload_latest_save(&self) -> Result<(), HookError>;
}

/// Collaborator that does nothing. For tests and demos.
pub struct NullHooks;

#[async_trait]
impl Hooks for NullHooks {
    async fn announce(&self, _message: &str) -> Result<(), HookError> {
        Ok(())
    }

    async fn announce_ready(&self) -> Result<(), HookError> {
        Ok(())
    }

    async fn announce_presence(
        &self,
        _players: &BTreeSet<String>,
        _joined: Option<&str>,
        _left: Option<&str>,
    ) -> Result<(), HookError> {
        Ok(())
    }

    async fn upload_latest_save(&self) -> Result<(), HookError> {
        Ok(())
    }
}
