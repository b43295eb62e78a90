// In: src/kernels/mod.rs

//! This module serves as the public API for the collection of all pure,
//! stateless numerical kernels of the codec.
//!
//! Each sub-module is a distinct transform that the `pipeline` layer composes
//! into the full encode/decode paths. The kernels hold no state and share
//! nothing; they are the "toolbox" of the pzpack system.

//==================================================================================
// 1. Module Declarations
//==================================================================================

/// Interpolation and quadrature helpers on monotonic sample grids.
pub mod grid;

/// PDF -> CDF construction (trapezoidal and histogram-edge variants).
pub mod cdf;

/// CDF inversion at a fixed sequence of probability levels.
pub mod quantile;

/// Quantized-delta payload encoding with a wide-escape form.
pub mod delta;

/// Piecewise-linear CDF differentiation back onto an output grid.
pub mod reconstruct;

/// Point estimates (mode, mean, credible intervals, ...) from quantiles.
pub mod stats;

// The `pipeline` layer is the designated consumer of these kernels and calls
// them via their full path (e.g., `kernels::cdf::from_histogram`). No function
// re-exports here; the dependency graph stays explicit.
