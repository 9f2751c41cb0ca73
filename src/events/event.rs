//! # Runtime events emitted while sitting on a server process.
//!
//! [`EventKind`] classifies what happened; [`Event`] carries the metadata
//! (player name, stream label, delays, reasons) plus a wall-clock timestamp
//! and a globally monotonic sequence number.
//!
//! ## Ordering guarantees
//! Line handlers run fire-and-forget, so events for two rapid log lines may
//! be published out of order. Use `seq` to restore a total order when needed.
//!
//! ## Example
//! ```rust
//! use gamevisor::{Event, EventKind};
//!
//! let ev = Event::now(EventKind::PlayerJoined)
//!     .with_player("Alice")
//!     .with_roster(1);
//!
//! assert_eq!(ev.kind, EventKind::PlayerJoined);
//! assert_eq!(ev.player.as_deref(), Some("Alice"));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Server lifecycle ===
    /// The server's state machine reached "in game"; it is accepting players.
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ServerReady,

    /// The server process exited; this is the terminal event for the run.
    ///
    /// Sets:
    /// - `reason`: the exit status, rendered
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    ProcessExited,

    // === Presence ===
    /// A player joined the game.
    ///
    /// Sets:
    /// - `player`: the player's display name
    /// - `roster`: number of players now connected
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    PlayerJoined,

    /// A player left the game.
    ///
    /// Sets:
    /// - `player`: the player's display name
    /// - `roster`: number of players still connected
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    PlayerLeft,

    // === Idle shutdown ===
    /// The idle scheduler armed a timed wait until the current deadline.
    ///
    /// Sets:
    /// - `delay_ms`: remaining wait before the next shutdown check
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    IdleArmed,

    /// The server drained; the shutdown deadline was re-armed to drain-wait.
    ///
    /// Sets:
    /// - `delay_ms`: the drain-wait grace period
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    QuitScheduled,

    /// The idle deadline passed with no players; the quit command was
    /// written to the server's stdin.
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    QuitSent,

    // === Saves ===
    /// The server finished writing a save to disk.
    ///
    /// Sets:
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    SaveFinished,

    // === Plumbing ===
    /// A relay pump ended (EOF, closed stream, or read/write error).
    ///
    /// Sets:
    /// - `stream`: pump label (`input`, `stdout`, `stderr`, `stdin-writer`)
    /// - `reason`: error description, if the pump ended on an error
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    RelayClosed,

    /// A collaborator call (announce/upload) failed; the run continues.
    ///
    /// Sets:
    /// - `reason`: failure description
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    HookFailed,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Player display name, if applicable.
    pub player: Option<Arc<str>>,
    /// Pump label, for relay events.
    pub stream: Option<Arc<str>>,
    /// Human-readable reason (errors, exit statuses).
    pub reason: Option<Arc<str>>,
    /// Delay in milliseconds (idle waits, drain grace).
    pub delay_ms: Option<u64>,
    /// Connected player count after the change.
    pub roster: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// the next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            player: None,
            stream: None,
            reason: None,
            delay_ms: None,
            roster: None,
        }
    }

    /// Attaches a player name.
    #[inline]
    pub fn with_player(mut self, player: impl Into<Arc<str>>) -> Self {
        self.player = Some(player.into());
        self
    }

    /// Attaches a pump label.
    #[inline]
    pub fn with_stream(mut self, stream: impl Into<Arc<str>>) -> Self {
        self.stream = Some(stream.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u64::MAX)) as u64;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches the connected player count.
    #[inline]
    pub fn with_roster(mut self, n: usize) -> Self {
        self.roster = Some(n.min(u32::MAX as usize) as u32);
        self
    }
}
