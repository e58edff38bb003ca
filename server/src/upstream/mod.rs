//! Upstream access-control backend.
//!
//! The backend owns the records; this service only reads full snapshots of
//! them. Mutations go to the backend directly and are observed here on the
//! next refresh.

mod client;

pub use client::*;
