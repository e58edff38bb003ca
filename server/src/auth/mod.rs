//! Bearer credentials for console sessions.

mod credentials;
mod middleware;

pub use credentials::*;
pub use middleware::*;
