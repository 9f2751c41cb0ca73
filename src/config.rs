//! # Runtime configuration for the supervisor.
//!
//! Provides [`Config`], the centralized settings consumed by
//! [`Supervisor`](crate::Supervisor): the server command line, the two idle
//! grace periods, and the event-bus capacity.
//!
//! How the two waits interact:
//! - `start_wait` arms the very first shutdown deadline at launch, giving
//!   players time to join a freshly started server.
//! - `drain_wait` re-arms the deadline every time the last player leaves.
//!
//! While at least one player is connected, the deadline is not consulted.

use std::path::PathBuf;
use std::time::Duration;

/// Settings for one supervised server run.
///
/// ## Field semantics
/// - `command` / `args`: the server executable and its argument list
/// - `start_wait`: grace period after launch before the idle countdown can
///   first fire (`0s` = eligible immediately)
/// - `drain_wait`: grace period after the last player leaves (`0s` = shut
///   down as soon as the server drains)
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by the Bus)
#[derive(Clone, Debug)]
pub struct Config {
    /// Path to the server executable.
    pub command: PathBuf,

    /// Arguments passed to the server executable.
    pub args: Vec<String>,

    /// Grace period after launch before the idle countdown can first fire.
    pub start_wait: Duration,

    /// Grace period after the last player leaves before shutdown.
    pub drain_wait: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow observers that lag behind more than `bus_capacity` events will
    /// skip older items. Minimum value is 1 (enforced by the Bus).
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the full command line as a display string, for error messages.
    pub fn command_line(&self) -> String {
        let mut line = self.command.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `command = bin/x64/factorio`, `args = ["--start-server", "saves/world.zip"]`
    ///   (the headless server launched from its install directory)
    /// - `start_wait = 10min` (time for the first player to show up)
    /// - `drain_wait = 1min` (time for players to come back after the last leave)
    /// - `bus_capacity = 256`
    fn default() -> Self {
        Self {
            command: PathBuf::from("bin/x64/factorio"),
            args: vec!["--start-server".into(), "saves/world.zip".into()],
            start_wait: Duration::from_secs(10 * 60),
            drain_wait: Duration::from_secs(60),
            bus_capacity: 256,
        }
    }
}
