// In: src/pipeline/decoder.rs

//! The decode orchestrator: fixed-size record -> quantile set ->
//! reconstructed PDF (or random samples) on the caller's terms.

use log::warn;
use rand::Rng;

use crate::error::PzError;
use crate::kernels::reconstruct;
use crate::record::packet;
use crate::types::{DecodedPdf, GridSpec, QuantileSet};

//==================================================================================
// 1. Single-Record Decode API
//==================================================================================

/// Recovers the quantile set stored in a record.
pub fn decode_record(bytes: &[u8]) -> Result<QuantileSet, PzError> {
    packet::decode_quantiles(bytes)
}

/// Reconstructs the PDF stored in a record onto the requested output grid.
pub fn decode_pdf(bytes: &[u8], spec: &GridSpec) -> Result<DecodedPdf, PzError> {
    let quantiles = packet::decode_quantiles(bytes)?;
    reconstruct::pdf_on_grid(&quantiles, spec)
}

/// Draws `n` random redshifts from the PDF stored in a record.
pub fn decode_samples<R: Rng + ?Sized>(
    bytes: &[u8],
    n: usize,
    rng: &mut R,
) -> Result<Vec<f64>, PzError> {
    let quantiles = packet::decode_quantiles(bytes)?;
    Ok(reconstruct::sample(&quantiles, n, rng))
}

//==================================================================================
// 2. Batch Decode API
//==================================================================================

/// Decodes a batch of records onto one shared output grid.
///
/// Null records and corrupt rows become all-zero density rows (the latter
/// with a warning); sibling rows are unaffected. Every returned row has the
/// grid's length.
pub fn decode_batch(records: &[&[u8]], spec: &GridSpec) -> Result<Vec<Vec<f64>>, PzError> {
    spec.check()?;
    let n_bins = spec.centers().len();
    let rows = records
        .iter()
        .enumerate()
        .map(|(i, bytes)| {
            if bytes.iter().all(|&b| b == 0) {
                return vec![0.0; n_bins];
            }
            match decode_pdf(bytes, spec) {
                Ok(pdf) => pdf.density,
                Err(e) => {
                    warn!("source {}: {}; returning a zero row", i, e);
                    vec![0.0; n_bins]
                }
            }
        })
        .collect();
    Ok(rows)
}
