//! Core result and error types.

use thiserror::Error;

/// Core error type encompassing all engine faults.
///
/// No stage self-recovers: any of these propagates unmodified to the call
/// boundary, which surfaces one descriptive failure and aborts. Partial or
/// possibly-corrupted output is never returned.
#[derive(Debug, Error)]
pub enum Error {
    /// A literal could not be encoded for the target grammar.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// Invalid hexadecimal in seed.
    #[error("invalid hexadecimal in seed")]
    InvalidSeedHex,

    /// Invalid seed length.
    #[error("invalid seed length: expected 64 hex chars, got {0}")]
    InvalidSeedLength(usize),

    /// The name allocator exceeded its retry budget without finding an
    /// unused, non-reserved identifier.
    #[error("name allocation exhausted after {attempts} attempts")]
    NameExhaustion {
        /// Number of generation attempts made before giving up.
        attempts: usize,
    },

    /// Unexpected fault inside a pipeline stage.
    #[error("transform failed: {0}")]
    Transform(String),
}

/// Core result type
pub type Result<T> = std::result::Result<T, Error>;
