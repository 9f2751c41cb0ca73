//! # Fire-and-forget reactions to classified log lines.
//!
//! [`Handlers::dispatch`] classifies one decoded stdout line and, on a
//! match, spawns the reaction as an independent task, returning immediately
//! — relay throughput is never gated by handler latency (a slow webhook
//! cannot stall server I/O). Reactions:
//!
//! - ready → publish [`ServerReady`](EventKind::ServerReady), announce the
//!   host's reachable address.
//! - join → add to the player set, announce with the join marker.
//! - leave → remove from the set, announce with the leave marker; if the
//!   set drained, re-arm the deadline to drain-wait and raise the emptiness
//!   signal.
//! - saved → archive the newest save under the upload guard; at most one
//!   upload runs at a time.
//!
//! Announce reactions race the run's cancellation token. A save upload does
//! not: cancellation only suppresses an upload that has not started yet —
//! once the guard is held the upload runs to completion, and the task
//! tracker waits it out at shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::error::HookError;
use crate::events::{Bus, Event, EventKind};
use crate::hooks::Hooks;
use crate::watch::matcher::{LineEvent, LineMatcher};
use crate::watch::state::SitterState;

/// Dispatch tap shared by the stdout pump and the supervisor.
#[derive(Clone)]
pub(crate) struct Handlers {
    state: Arc<SitterState>,
    hooks: Arc<dyn Hooks>,
    bus: Bus,
    matcher: Arc<LineMatcher>,
    tracker: TaskTracker,
    token: CancellationToken,
    drain_wait: Duration,
    uploading: Arc<Mutex<()>>,
}

impl Handlers {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        state: Arc<SitterState>,
        hooks: Arc<dyn Hooks>,
        bus: Bus,
        matcher: Arc<LineMatcher>,
        tracker: TaskTracker,
        token: CancellationToken,
        drain_wait: Duration,
    ) -> Self {
        Self {
            state,
            hooks,
            bus,
            matcher,
            tracker,
            token,
            drain_wait,
            uploading: Arc::new(Mutex::new(())),
        }
    }

    /// Classifies `line`; on a match, spawns the reaction and returns at
    /// once. Unmatched lines do nothing here — the relay already forwarded
    /// them.
    pub fn dispatch(&self, line: &str) {
        let Some(event) = self.matcher.classify(line) else {
            return;
        };
        let this = self.clone();
        let token = self.token.clone();
        self.tracker.spawn(async move {
            match event {
                // An upload that takes the guard must finish; cancellation
                // only stops uploads that have not started.
                LineEvent::Saved => {
                    if !token.is_cancelled() {
                        this.on_saved().await;
                    }
                }
                other => {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => {}
                        _ = this.react(other) => {}
                    }
                }
            }
        });
    }

    async fn react(&self, event: LineEvent) {
        match event {
            LineEvent::Ready => self.on_ready().await,
            LineEvent::Joined(name) => self.on_joined(&name).await,
            LineEvent::Left(name) => self.on_left(&name).await,
            LineEvent::Saved => self.on_saved().await,
        }
    }

    async fn on_ready(&self) {
        self.bus.publish(Event::now(EventKind::ServerReady));
        self.log_failure(self.hooks.announce_ready().await);
    }

    async fn on_joined(&self, name: &str) {
        let roster = self.state.add_player(name).await;
        self.bus.publish(
            Event::now(EventKind::PlayerJoined)
                .with_player(name)
                .with_roster(roster.len()),
        );
        self.log_failure(
            self.hooks
                .announce_presence(&roster, Some(name), None)
                .await,
        );
    }

    async fn on_left(&self, name: &str) {
        let roster = self.state.remove_player(name).await;
        self.bus.publish(
            Event::now(EventKind::PlayerLeft)
                .with_player(name)
                .with_roster(roster.len()),
        );
        self.log_failure(
            self.hooks
                .announce_presence(&roster, None, Some(name))
                .await,
        );
        if roster.is_empty() {
            self.state.arm_drain(self.drain_wait).await;
            self.bus
                .publish(Event::now(EventKind::QuitScheduled).with_delay(self.drain_wait));
        }
    }

    async fn on_saved(&self) {
        self.bus.publish(Event::now(EventKind::SaveFinished));
        let _guard = self.uploading.lock().await;
        self.log_failure(self.hooks.upload_latest_save().await);
    }

    /// Waits for the upload guard once, so an in-flight save archive
    /// completes before the run returns.
    pub async fn settle_uploads(&self) {
        let _guard = self.uploading.lock().await;
    }

    fn log_failure(&self, result: Result<(), HookError>) {
        if let Err(e) = result {
            self.bus.publish(
                Event::now(EventKind::HookFailed)
                    .with_stream(e.as_label())
                    .with_reason(e.to_string()),
            );
        }
    }
}
