//! Supervisor lifecycle: launching the child process and wiring the pumps,
//! handlers, and idle scheduler around it.

mod supervisor;

pub use supervisor::Supervisor;
