//! # Production collaborator: webhook chat plus filesystem save archive.
//!
//! [`ServerHooks`] delivers announcements to an optional chat webhook as JSON
//! `{"content": …}` payloads and archives the newest `*.zip` from the saves
//! directory into a durable archive directory. Without a webhook configured,
//! announcements fall back to stdout so a misconfigured channel stays
//! visible.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;

use crate::error::HookError;
use crate::hooks::Hooks;

/// Webhook announcements and newest-save archiving.
pub struct ServerHooks {
    webhook_url: Option<String>,
    client: reqwest::Client,
    saves_dir: PathBuf,
    archive_dir: PathBuf,
    host_label: Option<String>,
}

impl ServerHooks {
    /// Creates hooks that archive saves from `saves_dir` into `archive_dir`.
    pub fn new(saves_dir: impl Into<PathBuf>, archive_dir: impl Into<PathBuf>) -> Self {
        Self {
            webhook_url: None,
            client: reqwest::Client::new(),
            saves_dir: saves_dir.into(),
            archive_dir: archive_dir.into(),
            host_label: None,
        }
    }

    /// Sets the chat webhook URL; without one, announcements are dropped.
    pub fn with_webhook(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    /// Sets a stable hostname to include in the readiness announcement next
    /// to the resolved address.
    pub fn with_host_label(mut self, label: impl Into<String>) -> Self {
        self.host_label = Some(label.into());
        self
    }
}

#[async_trait]
impl Hooks for ServerHooks {
    async fn announce(&self, message: &str) -> Result<(), HookError> {
        let Some(url) = &self.webhook_url else {
            println!("{}", dropped_announcement(message));
            return Ok(());
        };
        let payload = serde_json::json!({ "content": message });
        let response = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| HookError::Announce {
                reason: e.to_string(),
            })?;
        let status = response.status();
        if status.as_u16() >= 300 {
            return Err(HookError::Announce {
                reason: format!("webhook returned {status}"),
            });
        }
        Ok(())
    }

    async fn announce_ready(&self) -> Result<(), HookError> {
        let address =
            reachable_address().unwrap_or_else(|| "unknown".to_string());
        let message = match &self.host_label {
            Some(label) => format!("Server is ready at: `{address}` (`{label}`)"),
            None => format!("Server is ready at: `{address}`"),
        };
        self.announce(&message).await
    }

    async fn announce_presence(
        &self,
        players: &BTreeSet<String>,
        joined: Option<&str>,
        left: Option<&str>,
    ) -> Result<(), HookError> {
        self.announce(&presence_line(players, joined, left)).await
    }

    async fn upload_latest_save(&self) -> Result<(), HookError> {
        let newest = newest_save(&self.saves_dir).map_err(|e| HookError::Upload {
            reason: format!("scanning {}: {e}", self.saves_dir.display()),
        })?;
        let Some(save) = newest else {
            return Err(HookError::Upload {
                reason: format!("no save files in {}", self.saves_dir.display()),
            });
        };
        let name = save
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "world.zip".into());
        tokio::fs::create_dir_all(&self.archive_dir)
            .await
            .map_err(|e| HookError::Upload {
                reason: format!("creating {}: {e}", self.archive_dir.display()),
            })?;
        let dest = self.archive_dir.join(name);
        tokio::fs::copy(&save, &dest)
            .await
            .map_err(|e| HookError::Upload {
                reason: format!("copying {} to {}: {e}", save.display(), dest.display()),
            })?;
        Ok(())
    }
}

/// Line printed in place of an announcement when no webhook is configured.
fn dropped_announcement(message: &str) -> String {
    format!("[announce] no webhook configured: {message}")
}

/// Formats one presence announcement: player count, then either the join or
/// leave marker with the name, or the sorted roster for a plain update.
fn presence_line(
    players: &BTreeSet<String>,
    joined: Option<&str>,
    left: Option<&str>,
) -> String {
    let person = if let Some(name) = joined {
        format!(":star2: {name}")
    } else if let Some(name) = left {
        format!(":comet: {name}")
    } else {
        players.iter().cloned().collect::<Vec<_>>().join(", ")
    };
    format!("[`{:2}`] {person}", players.len())
}

/// Returns the most recently modified `*.zip` under `dir`, if any.
fn newest_save(dir: &Path) -> std::io::Result<Option<PathBuf>> {
    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("zip") {
            continue;
        }
        let modified = entry.metadata()?.modified()?;
        let newer = match &newest {
            Some((best, _)) => modified > *best,
            None => true,
        };
        if newer {
            newest = Some((modified, path));
        }
    }
    Ok(newest.map(|(_, path)| path))
}

/// Best-effort resolution of this host's outward-facing address: a connected
/// UDP socket's local address, without sending any packets.
fn reachable_address() -> Option<String> {
    let socket = std::net::UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect(("10.255.255.255", 1)).ok()?;
    Some(socket.local_addr().ok()?.ip().to_string())
}
