//! Supervises `cat` as a stand-in server: whatever you type is "server
//! output", `[JOIN]`/`[LEAVE]` lines drive the presence tracking, and the
//! idle scheduler quits the session after a short empty period.
//!
//! Try pasting:
//! `2024-01-01 10:00:00 [JOIN] Alice joined the game`

use std::sync::Arc;
use std::time::Duration;

use gamevisor::{Config, LogWriter, NullHooks, Supervisor};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config {
        command: "cat".into(),
        args: vec![],
        start_wait: Duration::from_secs(30),
        drain_wait: Duration::from_secs(10),
        bus_capacity: 64,
    };

    let sup = Supervisor::new(cfg, Arc::new(NullHooks), Arc::new(LogWriter));
    match sup.run().await {
        Ok(()) => println!("session closed cleanly"),
        Err(e) => eprintln!("session failed ({}): {e}", e.as_label()),
    }
    Ok(())
}
