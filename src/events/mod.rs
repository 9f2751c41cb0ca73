//! Runtime event system: the broadcast [`Bus`] and the [`Event`] records
//! published on it by the pumps, the handlers, the idle scheduler, and the
//! supervisor.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
