//! Error types for the console engine.

use thiserror::Error;

/// All possible errors from the console engine.
///
/// Navigation and query inputs never fail: out-of-range pages clamp and
/// unknown filter keys are ignored. Only configuration and adapter problems
/// surface here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("no key extractor configured")]
    MissingKeyExtractor,
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
