//! Line watching: the dispatch table, the shared sitter state, the relay
//! pumps, the handlers they feed, and the idle shutdown scheduler.

mod handlers;
mod idle;
mod matcher;
mod relay;
mod state;

pub use matcher::{LineEvent, LineKind, LineMatcher};

pub(crate) use handlers::Handlers;
pub(crate) use idle::{IdleTimer, QUIT_COMMAND};
pub(crate) use relay::{feed_stdin, pump_input, pump_output};
pub(crate) use state::SitterState;
