use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::observers::Observe;

/// Base observer that logs events to stdout.
///
/// Useful for demos and for watching a live run from the console.
pub struct LogWriter;

#[async_trait]
impl Observe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::ServerReady => {
                println!("[ready]");
            }
            EventKind::PlayerJoined => {
                if let (Some(player), Some(roster)) = (&e.player, e.roster) {
                    println!("[join] player={player} roster={roster}");
                }
            }
            EventKind::PlayerLeft => {
                if let (Some(player), Some(roster)) = (&e.player, e.roster) {
                    println!("[leave] player={player} roster={roster}");
                }
            }
            EventKind::IdleArmed => {
                println!("[idle] next_check_ms={:?}", e.delay_ms);
            }
            EventKind::QuitScheduled => {
                println!("[quit-scheduled] drain_ms={:?}", e.delay_ms);
            }
            EventKind::QuitSent => {
                println!("[quit-sent]");
            }
            EventKind::SaveFinished => {
                println!("[saved]");
            }
            EventKind::RelayClosed => {
                println!("[relay-closed] stream={:?} err={:?}", e.stream, e.reason);
            }
            EventKind::HookFailed => {
                println!("[hook-failed] err={:?}", e.reason);
            }
            EventKind::ProcessExited => {
                println!("[exited] status={:?}", e.reason);
            }
        }
    }
}
