//! # Error
//!
//! Centralized error handling for the Phoneboard engine.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all pb-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Resource genuinely does not exist (e.g., remote 404 on a single-item
    /// fetch). Distinct from `Remote`: a missing item never triggers cache
    /// fallback.
    #[error("{0} not found with ID {1}")]
    NotFound(&'static str, String),

    /// No authenticated identity for a mutation. Rejected locally, before
    /// any network call.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Client-side validation failure (e.g., empty title, too many images).
    #[error("validation error: {0}")]
    Validation(String),

    /// Transport or server failure talking to the remote store.
    #[error("remote store error: {0}")]
    Remote(String),

    /// Local cache read/write or serialization failure.
    #[error("cache error: {0}")]
    Cache(String),

    /// Operation requires the remote store and the session is degraded
    /// (e.g., delete while in cache mode).
    #[error("operation unavailable offline: {0}")]
    Unavailable(String),
}

/// A specialized Result type for Phoneboard logic.
pub type Result<T> = std::result::Result<T, Error>;
