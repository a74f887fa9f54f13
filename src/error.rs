//! Error types for the category encoder.

use thiserror::Error;

/// Error variants for encoder construction, encoding and restore.
#[derive(Debug, Error)]
pub enum Error {
    /// `w` is zero or even.
    #[error("w must be an odd positive integer, got {w}")]
    InvalidWidth {
        /// The rejected number of active bits.
        w: usize,
    },

    /// `n` leaves too little room to separate representations.
    #[error("n must be strictly greater than 6*w (w = {w}), got {n}")]
    InvalidSize {
        /// The rejected total number of bits.
        n: usize,
        /// The number of active bits it was checked against.
        w: usize,
    },

    /// A dynamically typed value was neither missing nor a string.
    #[error("expected a string category but got {0}")]
    UnexpectedType(&'static str),

    /// A caller-provided output buffer does not span the full bit universe.
    #[error("output buffer has {actual} bits, expected {expected}")]
    OutputLength {
        /// Width of the encoder.
        expected: usize,
        /// Length of the buffer passed in.
        actual: usize,
    },

    /// Persisted state violates an encoder invariant.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// Snapshot (de)serialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O error occurred while reading or writing a snapshot.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for encoder operations.
pub type Result<T> = std::result::Result<T, Error>;
