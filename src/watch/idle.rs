//! # Idle shutdown scheduler.
//!
//! A two-state timer loop deciding when the server should be told to quit:
//!
//! - **Counting**: a deadline is active; sleep until it. Every wake re-reads
//!   the shared deadline, so a leave handler moving it forward just extends
//!   the countdown.
//! - **Suspended**: the deadline passed but players are connected; the
//!   deadline is not consulted again until the emptiness signal fires (the
//!   leave handler that drained the set also re-armed the deadline).
//!
//! When a deadline passes with no players connected, the scheduler writes
//! the quit command into the child-stdin channel and stops.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{self, Instant};

use crate::events::{Bus, Event, EventKind};
use crate::watch::state::SitterState;

/// Terminal command written to the server's stdin on scheduled shutdown.
pub(crate) const QUIT_COMMAND: &[u8] = b"/quit\n";

/// The idle countdown loop; one per run.
pub(crate) struct IdleTimer {
    state: Arc<SitterState>,
    bus: Bus,
    stdin: mpsc::Sender<Vec<u8>>,
}

impl IdleTimer {
    pub fn new(state: Arc<SitterState>, bus: Bus, stdin: mpsc::Sender<Vec<u8>>) -> Self {
        Self { state, bus, stdin }
    }

    /// Runs until a deadline passes with the player set empty, then sends
    /// the quit command and returns.
    pub async fn run(self) {
        loop {
            let deadline = self.state.deadline().await;
            let now = Instant::now();
            if deadline > now {
                self.bus
                    .publish(Event::now(EventKind::IdleArmed).with_delay(deadline - now));
                time::sleep_until(deadline).await;
                continue;
            }
            if self.state.has_players().await {
                self.state.emptied().await;
                continue;
            }
            break;
        }
        self.bus.publish(Event::now(EventKind::QuitSent));
        let _ = self.stdin.send(QUIT_COMMAND.to_vec()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn timer(
        state: &Arc<SitterState>,
    ) -> (IdleTimer, mpsc::Receiver<Vec<u8>>) {
        let (tx, rx) = mpsc::channel(1);
        let t = IdleTimer::new(state.clone(), Bus::new(16), tx);
        (t, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_after_start_wait_with_no_players() {
        let state = Arc::new(SitterState::new(Duration::from_secs(2)));
        let (idle, mut rx) = timer(&state);
        let started = Instant::now();

        tokio::spawn(idle.run());
        let sent = rx.recv().await.expect("quit command sent");

        assert_eq!(sent, QUIT_COMMAND);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(2), "fired early: {elapsed:?}");
        assert!(elapsed < Duration::from_secs(3), "fired late: {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_defers_quit_until_drain_after_leave() {
        let state = Arc::new(SitterState::new(Duration::from_secs(2)));
        let (idle, mut rx) = timer(&state);
        let started = Instant::now();
        tokio::spawn(idle.run());

        // join at t=1, leave at t=1.5 with a 3s drain
        time::sleep(Duration::from_millis(1000)).await;
        state.add_player("Alice").await;
        time::sleep(Duration::from_millis(500)).await;
        state.remove_player("Alice").await;
        state.arm_drain(Duration::from_secs(3)).await;

        rx.recv().await.expect("quit command sent");
        let elapsed = started.elapsed();
        assert!(
            elapsed >= Duration::from_millis(4500),
            "quit must wait out the drain period, fired at {elapsed:?}"
        );
        assert!(elapsed < Duration::from_millis(5500), "fired late: {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_suspends_while_players_present() {
        let state = Arc::new(SitterState::new(Duration::from_secs(1)));
        state.add_player("Alice").await;
        let (idle, mut rx) = timer(&state);
        tokio::spawn(idle.run());

        // Deadline long gone, but a player holds the line.
        time::sleep(Duration::from_secs(60)).await;
        assert!(rx.try_recv().is_err(), "must not quit while occupied");

        state.remove_player("Alice").await;
        state.arm_drain(Duration::from_secs(2)).await;
        let before_drain = Instant::now();
        rx.recv().await.expect("quit command sent");
        assert!(before_drain.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_empty_signal_does_not_quit_occupied_server() {
        let state = Arc::new(SitterState::new(Duration::from_secs(1)));
        // Leave-then-join before the scheduler ever waits: the Notify permit
        // is stale by the time the deadline passes.
        state.arm_drain(Duration::from_secs(1)).await;
        state.add_player("Bob").await;

        let (idle, mut rx) = timer(&state);
        tokio::spawn(idle.run());

        time::sleep(Duration::from_secs(30)).await;
        assert!(rx.try_recv().is_err(), "stale signal must not trigger quit");
    }
}
