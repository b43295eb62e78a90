//! This file is the root of the `pzpack` Rust crate.
//!
//! pzpack converts numerically sampled redshift probability density functions
//! into fixed-size, lossy-but-bounded-error binary records suitable for bulk
//! columnar storage (one fixed-width record per astronomical object), and
//! reconstructs approximate PDFs from those records on demand.
//!
//! The crate is organized as a set of pure, stateless kernels (`kernels`)
//! composed by a thin orchestration layer (`pipeline`), with the byte-level
//! record contract isolated in `record`. Tabular file I/O, column selection
//! and command-line surfaces live in external collaborators, not here.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
pub mod config;
pub mod kernels;
pub mod pipeline;
pub mod record;
pub mod types;

mod error;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================
pub use crate::config::{BoundaryPolicy, CodecConfig, ScalePolicy};
pub use crate::error::PzError;
pub use crate::pipeline::{decoder, encoder};
pub use crate::record::packet::{analyze, EncodedRecord, RecordStats};
pub use crate::types::{Cdf, DecodedPdf, GriddedPdf, GridSpec, QuantileSet};

/// Turns on verbose logging of the encoder's per-record decisions.
/// Intended for diagnostics from host pipelines; safe to call repeatedly.
pub fn enable_verbose_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}
