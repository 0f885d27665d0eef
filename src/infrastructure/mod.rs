//! Infrastructure Module
//!
//! Engine boundaries and process-level plumbing.
//!
//! ## Modules
//!
//! - [`hci`] - HCI engine command/event surface and the status code table
//! - [`gap`] - GAP scanning engine command/event surface
//! - [`logging`] - tracing subscriber setup (console + rolling file)

pub mod gap;
pub mod hci;
pub mod logging;

pub use gap::{GapBackend, GapCommand, GapEngine, GapEvent};
pub use hci::{HciBackend, HciCommand, HciEngine, HciEvent};
