//! # gamevisor
//!
//! **Gamevisor** sits on a single long-running game-server process for its
//! entire lifetime: it relays the process's console, watches its log stream
//! for a small fixed set of lines (server ready, player joined/left, world
//! saved), and decides when the server should shut down because nobody is
//! playing.
//!
//! ## Architecture
//! ```text
//!   external stdin ──► input pump ──┐
//!                                   ▼
//!                            stdin channel ──► stdin writer ──► server stdin
//!                                   ▲
//!                       IdleTimer ──┘ ("/quit" when the idle deadline fires)
//!
//!   server stdout ──► output pump ──► external stdout
//!                          │
//!                          ▼ (decoded line)
//!                    LineMatcher ──► Handlers (fire-and-forget tasks)
//!                                       │
//!                   ┌───────────────────┼─────────────────────┐
//!                   ▼                   ▼                     ▼
//!             SitterState        Hooks (announce,        Bus ──► Observe
//!          (players, deadline)    save archive)         (runtime events)
//!
//!   server stderr ──► output pump ──► external stderr   (no dispatch)
//! ```
//!
//! The supervisor owns the child process; its exit is the terminal event for
//! the whole run. Everything else — pumps, the idle scheduler, in-flight
//! line handlers — is cancelled when the process goes away.
//!
//! ## Idle shutdown
//! The deadline starts at *launch + start-wait*. While players are
//! connected it is suspended; when the last player leaves it re-arms to
//! *now + drain-wait*. When a deadline passes with the server empty, the
//! scheduler writes `/quit` to the server's stdin and the server winds
//! itself down.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use gamevisor::{Config, LogWriter, ServerHooks, Supervisor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::default();
//!     cfg.start_wait = Duration::from_secs(10 * 60);
//!     cfg.drain_wait = Duration::from_secs(60);
//!
//!     let hooks = ServerHooks::new("saves", "archive")
//!         .with_webhook("https://chat.example/webhook");
//!
//!     let sup = Supervisor::new(cfg, Arc::new(hooks), Arc::new(LogWriter));
//!     match sup.run().await {
//!         Ok(()) => println!("server shut down"),
//!         Err(e) => eprintln!("server run failed: {e}"),
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod hooks;
mod observers;
mod watch;

// ---- Public re-exports ----

pub use config::Config;
pub use core::Supervisor;
pub use error::{HookError, RelayError, RunError};
pub use events::{Bus, Event, EventKind};
pub use hooks::{Hooks, NullHooks, ServerHooks};
pub use observers::{LogWriter, Observe};
pub use watch::{LineEvent, LineKind, LineMatcher};
