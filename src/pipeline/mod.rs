// In: src/pipeline/mod.rs

//! The high-level orchestration layer: composes the pure kernels into the
//! full encode path (PDF -> CDF -> quantiles -> record) and decode path
//! (record -> quantiles -> PDF on an output grid), plus the batch variants
//! with per-record failure isolation.

pub mod decoder;
pub mod encoder;

#[cfg(test)]
mod tests;
