// In: src/error.rs

//! This module defines the single, unified error type for the entire pzpack library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PzError {
    // =========================================================================
    // === High-Level, Semantic Errors (Specific to our library's logic)
    // =========================================================================
    /// The input PDF carries no usable probability mass (all-zero or negative
    /// densities, or non-finite samples). Raised on the encode side only.
    #[error("Degenerate input PDF: {0}")]
    DegenerateInput(String),

    /// The CDF handed to the quantile extractor is not monotonic. This is an
    /// internal invariant violation (a bug in the CDF builder), but it is a
    /// checked, reported condition rather than a process-aborting assertion.
    #[error("Quantile extraction failed: {0}")]
    QuantileExtraction(String),

    /// Decode-side: byte length mismatch, unknown format version, or a corrupt
    /// header/payload.
    #[error("Record format error: {0}")]
    RecordFormat(String),

    /// Encode-side: the quantile set cannot be represented within the fixed
    /// packet size, or a delta exceeds the wide-encoding range.
    #[error("Record capacity exceeded: {0}")]
    RecordCapacity(String),

    /// Encode-side self-check: the freshly built packet does not decode back
    /// to the original quantiles within the configured tolerance.
    #[error("Packet validation failed: {0}")]
    ValidationFailed(String),

    /// A caller-supplied argument (grid, config field) is malformed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the underlying I/O subsystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the Serde JSON library, typically during config or
    /// record-stats serialization.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}
