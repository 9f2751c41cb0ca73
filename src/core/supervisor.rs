//! # Supervisor: owns the child process and every activity around it.
//!
//! [`Supervisor::run`] is the whole lifetime of one server run:
//!
//! ```text
//! run()
//!   ├─► observer_listener(): Bus.subscribe() ─► Observe::on_event   (fire-and-forget)
//!   ├─► launch(): spawn the server with piped stdio
//!   ├─► JoinSet:
//!   │     ├─ feed_stdin   (sole owner of the child's stdin)
//!   │     ├─ pump_input   (external input ──► stdin channel)
//!   │     ├─ pump_output  (child stdout ──► external output, + dispatch tap)
//!   │     ├─ pump_output  (child stderr ──► external errors, no dispatch)
//!   │     └─ IdleTimer    (idle/drain countdown, writes /quit)
//!   ├─► child.wait()      (the only deterministic terminal signal)
//!   └─► on exit: cancel token, abort pumps, drain handler tasks,
//!       settle the upload guard, surface the exit status
//! ```
//!
//! ## Rules
//! - Only the child's own exit (or a failed launch) ends the run; pump and
//!   hook failures are contained to their activity.
//! - A non-zero or signaled exit is surfaced as [`RunError::Exited`]; the
//!   caller decides how to react (crash vs shutdown notification).
//! - A save upload that has started is never cancelled: the task tracker
//!   waits it out, and shutdown acquires the upload guard once more before
//!   `run()` returns.

use std::process::Stdio;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::config::Config;
use crate::error::{RelayError, RunError};
use crate::events::{Bus, Event, EventKind};
use crate::hooks::Hooks;
use crate::observers::Observe;
use crate::watch::{
    feed_stdin, pump_input, pump_output, Handlers, IdleTimer, LineMatcher, SitterState,
};

/// Capacity of the child-stdin channel; writers are few and chunks small.
const STDIN_CHANNEL_CAPACITY: usize = 32;

/// Supervises exactly one server process from launch to exit.
pub struct Supervisor {
    /// Runtime configuration for this run.
    pub cfg: Config,
    /// Event bus shared with pumps, handlers, and the scheduler.
    pub bus: Bus,
    hooks: Arc<dyn Hooks>,
    observer: Arc<dyn Observe>,
}

impl Supervisor {
    /// Creates a supervisor with the given config, collaborator, and
    /// observer.
    pub fn new(cfg: Config, hooks: Arc<dyn Hooks>, observer: Arc<dyn Observe>) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        Self {
            cfg,
            bus,
            hooks,
            observer,
        }
    }

    /// Runs the server to completion, relaying the process's stdio.
    ///
    /// Returns `Ok(())` on a clean exit, [`RunError::Exited`] otherwise.
    pub async fn run(&self) -> Result<(), RunError> {
        self.run_with_io(tokio::io::stdin(), tokio::io::stdout(), tokio::io::stderr())
            .await
    }

    /// Like [`run`](Supervisor::run), with explicit external streams.
    pub async fn run_with_io<I, O, E>(
        &self,
        input: I,
        output: O,
        errors: E,
    ) -> Result<(), RunError>
    where
        I: AsyncRead + Unpin + Send + 'static,
        O: AsyncWrite + Unpin + Send + 'static,
        E: AsyncWrite + Unpin + Send + 'static,
    {
        self.observer_listener();

        let mut child = self.launch()?;
        let stdin = child.stdin.take().expect("stdin piped");
        let stdout = child.stdout.take().expect("stdout piped");
        let stderr = child.stderr.take().expect("stderr piped");

        let state = Arc::new(SitterState::new(self.cfg.start_wait));
        let token = CancellationToken::new();
        let tracker = TaskTracker::new();
        let (stdin_tx, stdin_rx) = mpsc::channel::<Vec<u8>>(STDIN_CHANNEL_CAPACITY);

        let handlers = Handlers::new(
            state.clone(),
            self.hooks.clone(),
            self.bus.clone(),
            Arc::new(LineMatcher::game_patterns()),
            tracker.clone(),
            token.clone(),
            self.cfg.drain_wait,
        );

        let mut set = JoinSet::new();
        {
            let bus = self.bus.clone();
            set.spawn(async move {
                report_pump(&bus, "stdin-writer", feed_stdin(stdin, stdin_rx).await);
            });
        }
        {
            let bus = self.bus.clone();
            let tx = stdin_tx.clone();
            set.spawn(async move {
                report_pump(&bus, "input", pump_input(input, tx).await);
            });
        }
        {
            let bus = self.bus.clone();
            let tap = handlers.clone();
            set.spawn(async move {
                let res = pump_output(stdout, output, |line| tap.dispatch(line)).await;
                report_pump(&bus, "stdout", res);
            });
        }
        {
            let bus = self.bus.clone();
            set.spawn(async move {
                let res = pump_output(stderr, errors, |_| {}).await;
                report_pump(&bus, "stderr", res);
            });
        }
        set.spawn(IdleTimer::new(state, self.bus.clone(), stdin_tx).run());

        let status = child.wait().await.map_err(|source| RunError::Wait { source })?;
        self.bus.publish(
            Event::now(EventKind::ProcessExited).with_reason(status.to_string()),
        );

        token.cancel();
        set.abort_all();
        while set.join_next().await.is_some() {}
        tracker.close();
        tracker.wait().await;
        handlers.settle_uploads().await;

        if status.success() {
            Ok(())
        } else {
            Err(RunError::Exited { status })
        }
    }

    /// Spawns the server with all three stdio streams piped.
    fn launch(&self) -> Result<Child, RunError> {
        Command::new(&self.cfg.command)
            .args(&self.cfg.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunError::Launch {
                command: self.cfg.command_line(),
                source,
            })
    }

    /// Subscribes to the bus and forwards events to the observer
    /// (fire-and-forget).
    fn observer_listener(&self) {
        let mut rx = self.bus.subscribe();
        let obs = self.observer.clone();
        tokio::spawn(async move {
            while let Ok(ev) = rx.recv().await {
                obs.on_event(&ev).await;
            }
        });
    }
}

/// Publishes the end of one pump, with the error if it died on one.
fn report_pump(bus: &Bus, stream: &'static str, res: Result<(), RelayError>) {
    let ev = Event::now(EventKind::RelayClosed).with_stream(stream);
    match res {
        Ok(()) => bus.publish(ev),
        Err(e) => bus.publish(ev.with_reason(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::testing::{HookCall, RecordingHooks};
    use crate::watch::QUIT_COMMAND;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;

    struct QuietObserver;

    #[async_trait]
    impl Observe for QuietObserver {
        async fn on_event(&self, _event: &Event) {}
    }

    fn cat_config() -> Config {
        Config {
            command: "cat".into(),
            args: vec![],
            start_wait: Duration::from_secs(2),
            drain_wait: Duration::from_millis(200),
            bus_capacity: 64,
        }
    }

    #[tokio::test]
    async fn test_launch_failure_is_fatal() {
        let cfg = Config {
            command: "/nonexistent/gamevisor-test-server".into(),
            ..cat_config()
        };
        let sup = Supervisor::new(cfg, Arc::new(RecordingHooks::default()), Arc::new(QuietObserver));
        let err = sup.run().await.expect_err("launch must fail");
        assert_eq!(err.as_label(), "run_launch_failed");
    }

    #[tokio::test]
    async fn test_nonzero_exit_surfaces_as_failure() {
        let cfg = Config {
            command: "false".into(),
            ..cat_config()
        };
        let sup = Supervisor::new(cfg, Arc::new(RecordingHooks::default()), Arc::new(QuietObserver));
        let (input, _keep_input) = tokio::io::duplex(64);
        let (output, _keep_output) = tokio::io::duplex(64);
        let (errors, _keep_errors) = tokio::io::duplex(64);
        let err = sup
            .run_with_io(input, output, errors)
            .await
            .expect_err("non-zero exit must surface");
        assert_eq!(err.as_label(), "run_server_exited");
    }

    // The child exits while a slow upload is still in flight; run() must not
    // return until the upload has finished.
    #[tokio::test]
    async fn test_in_flight_upload_completes_before_run_returns() {
        let hooks = Arc::new(RecordingHooks::with_upload_delay(Duration::from_millis(800)));
        let cfg = Config {
            start_wait: Duration::from_millis(300),
            ..cat_config()
        };
        let sup = Supervisor::new(cfg, hooks.clone(), Arc::new(QuietObserver));

        let (mut script, input) = tokio::io::duplex(1024);
        let (output, _keep_output) = tokio::io::duplex(4096);
        let (errors, _keep_errors) = tokio::io::duplex(64);

        let started = std::time::Instant::now();
        let run = tokio::spawn(async move { sup.run_with_io(input, output, errors).await });

        script
            .write_all(b" 123.456 Info AppManagerStates.cpp:1546: Saving finished\n")
            .await
            .expect("write saved line");
        drop(script); // idle deadline now ends the child mid-upload

        let result = tokio::time::timeout(Duration::from_secs(10), run)
            .await
            .expect("run must finish")
            .expect("join");
        result.expect("cat exits cleanly after /quit and EOF");

        assert!(
            hooks.calls().contains(&HookCall::Upload),
            "the started upload must finish before run() returns"
        );
        assert!(
            started.elapsed() >= Duration::from_millis(800),
            "run() returned without waiting out the upload"
        );
    }

    // End-to-end against a real child: `cat` echoes the scripted input back
    // on stdout, so the relay, dispatch, presence tracking, drain countdown,
    // and quit command all run against live pipes.
    #[tokio::test]
    async fn test_supervises_echo_server_end_to_end() {
        let hooks = Arc::new(RecordingHooks::default());
        let sup = Supervisor::new(cat_config(), hooks.clone(), Arc::new(QuietObserver));
        let mut events = sup.bus.subscribe();

        let (mut script, input) = tokio::io::duplex(1024);
        let (output, mut echoed) = tokio::io::duplex(4096);
        let (errors, _keep_errors) = tokio::io::duplex(64);

        let run = tokio::spawn(async move { sup.run_with_io(input, output, errors).await });

        script
            .write_all(b"2024-01-01 10:00:00 [JOIN] Alice joined the game\n")
            .await
            .expect("write join");
        tokio::time::sleep(Duration::from_millis(300)).await;
        script
            .write_all(b"2024-01-01 10:00:05 [LEAVE] Alice left the game\n")
            .await
            .expect("write leave");
        drop(script); // external input closed

        // Drain the external output so the stdout pump never stalls.
        let drain = tokio::spawn(async move {
            use tokio::io::AsyncReadExt;
            let mut sink = Vec::new();
            let _ = echoed.read_to_end(&mut sink).await;
            sink
        });

        let result = tokio::time::timeout(Duration::from_secs(10), run)
            .await
            .expect("run must finish")
            .expect("join");
        result.expect("cat exits cleanly after /quit and EOF");

        let calls = hooks.calls();
        assert_eq!(
            calls,
            vec![
                HookCall::Presence {
                    roster: vec!["Alice".to_string()],
                    joined: Some("Alice".to_string()),
                    left: None,
                },
                HookCall::Presence {
                    roster: vec![],
                    joined: None,
                    left: Some("Alice".to_string()),
                },
            ]
        );

        // The quit command went down the wire and came back out verbatim.
        let forwarded = drain.await.expect("join drain");
        let text = String::from_utf8_lossy(&forwarded);
        assert!(
            text.contains("[JOIN] Alice joined the game"),
            "relay must forward server output verbatim: {text}"
        );
        assert!(
            text.contains(std::str::from_utf8(QUIT_COMMAND).expect("utf8")),
            "quit command should be echoed by cat: {text}"
        );

        // QuitSent must have been published before the process exited.
        let mut saw_quit = false;
        while let Ok(ev) = events.try_recv() {
            if ev.kind == EventKind::QuitSent {
                saw_quit = true;
            }
        }
        assert!(saw_quit, "idle scheduler should have requested the quit");
    }
}
