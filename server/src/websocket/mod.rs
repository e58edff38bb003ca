//! WebSocket support for live notices.
//!
//! Console clients keep a WebSocket open per session and receive notices
//! (refresh failures and similar) as they happen, instead of polling.

mod manager;
mod protocol;

pub use manager::ConnectionManager;
pub use protocol::*;
