//! Request handlers for list queries and live notices.

mod list;
mod websocket;

pub use list::*;
pub use websocket::*;
