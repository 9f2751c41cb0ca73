//! Observer seam for runtime events.
//!
//! The supervisor subscribes one [`Observe`] implementation to the event bus
//! and forwards every published [`Event`](crate::Event) to it. [`LogWriter`]
//! is the built-in observer that prints events to stdout.

mod log;
mod observe;

pub use log::LogWriter;
pub use observe::Observe;
