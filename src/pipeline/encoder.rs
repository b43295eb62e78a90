// In: src/pipeline/encoder.rs

//! The encode orchestrator.
//!
//! A single record is produced by an adaptive loop: starting from
//! `ini_quantiles` levels, the encoder grows the quantile set by 2 while the
//! delta payload still fits the fixed packet, and on a capacity (or
//! validation) failure falls back to the densest packet that worked. The
//! result is the best quantile resolution the fixed record size can hold for
//! this particular PDF.
//!
//! Batch encoding isolates per-record failures: a degenerate source yields a
//! null record and a warning, never an abort of its siblings.

use log::{debug, warn};

use crate::config::{CodecConfig, ScalePolicy};
use crate::error::PzError;
use crate::kernels::{cdf, delta, quantile};
use crate::record::format::HEADER_LEN;
use crate::record::packet::{self, EncodedRecord};
use crate::types::{GriddedPdf, QuantileSet};

//==================================================================================
// 1. Single-Record Encode API
//==================================================================================

/// Encodes one uniformly binned PDF histogram into a fixed-size record.
pub fn encode_histogram(
    z_grid: &[f64],
    density: &[f64],
    cfg: &CodecConfig,
) -> Result<EncodedRecord, PzError> {
    cfg.check()?;
    let c = cdf::from_histogram(z_grid, density)?;
    encode_adaptive(cfg, |m| quantile::extract(&c, m, cfg.boundary_policy))
}

/// Encodes one continuously sampled PDF (trapezoidal integration on its own
/// grid, which need not be uniform) into a fixed-size record.
pub fn encode_pdf(pdf: &GriddedPdf, cfg: &CodecConfig) -> Result<EncodedRecord, PzError> {
    cfg.check()?;
    let c = cdf::from_pdf(pdf)?;
    encode_adaptive(cfg, |m| quantile::extract(&c, m, cfg.boundary_policy))
}

/// Encodes a PDF given as random redshift samples drawn from it.
pub fn encode_samples(samples: &[f64], cfg: &CodecConfig) -> Result<EncodedRecord, PzError> {
    cfg.check()?;
    encode_adaptive(cfg, |m| quantile::from_samples(samples, m))
}

//==================================================================================
// 2. Batch Encode API
//==================================================================================

/// Encodes a batch of histogram rows sharing one redshift grid.
///
/// A row that cannot be encoded (no probability mass, capacity exhaustion)
/// becomes a null record and is logged; sibling rows are unaffected.
pub fn encode_batch(
    z_grid: &[f64],
    rows: &[Vec<f64>],
    cfg: &CodecConfig,
) -> Result<Vec<EncodedRecord>, PzError> {
    cfg.check()?;
    let records = rows
        .iter()
        .enumerate()
        .map(|(i, row)| match encode_histogram(z_grid, row, cfg) {
            Ok(record) => record,
            Err(e) => {
                warn!("source {}: {}; writing a null record", i, e);
                EncodedRecord::null(cfg.packet_size)
            }
        })
        .collect();
    Ok(records)
}

//==================================================================================
// 3. Internal Helpers
//==================================================================================

/// The adaptive level-count loop shared by all encode entry points.
fn encode_adaptive<F>(cfg: &CodecConfig, mut quantiles_for: F) -> Result<EncodedRecord, PzError>
where
    F: FnMut(usize) -> Result<QuantileSet, PzError>,
{
    let capacity = cfg.packet_size - HEADER_LEN;
    let mut m = cfg.ini_quantiles;
    let mut last_good: Option<EncodedRecord> = None;

    loop {
        let quantiles = quantiles_for(m)?;
        match try_encode(&quantiles.z, cfg) {
            Ok((payload_len, record)) => {
                if payload_len == capacity {
                    // The packet is exactly full; no denser set can fit.
                    return Ok(record);
                }
                debug!(
                    "encoded {} levels in {} payload bytes, trying {}",
                    m,
                    payload_len,
                    m + 2
                );
                last_good = Some(record);
                m += 2;
            }
            Err(e @ PzError::RecordCapacity(_)) | Err(e @ PzError::ValidationFailed(_)) => {
                // A denser set no longer fits: fall back to the last packet
                // that did, or retry sparser if there is none yet.
                if let Some(record) = last_good.take() {
                    return Ok(record);
                }
                if m < 6 {
                    return Err(e);
                }
                debug!("{} levels failed ({}), retrying with {}", m, e, m - 2);
                m -= 2;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Derives the quantization step per policy and builds one candidate packet,
/// optionally self-validating it.
fn try_encode(
    quantiles: &[f64],
    cfg: &CodecConfig,
) -> Result<(usize, EncodedRecord), PzError> {
    let m = quantiles.len();
    let capacity = cfg.packet_size - HEADER_LEN;
    // Payload bytes left over once every interior delta takes its narrow
    // byte; each escape costs two of them.
    let spare = capacity.saturating_sub(m.saturating_sub(2));
    let max_wide = spare / 2;

    let eps = match cfg.scale_policy {
        ScalePolicy::Adaptive => delta::derive_eps_adaptive(quantiles, max_wide),
        ScalePolicy::FromDomain { zmax } => delta::derive_eps_from_domain(zmax, m),
    };

    let (payload_len, record) = packet::encode_quantiles(quantiles, eps, cfg.packet_size)?;
    if cfg.validate {
        validate_roundtrip(quantiles, &record, cfg.tolerance)?;
    }
    Ok((payload_len, record))
}

/// Decodes a freshly built packet back and compares the interior quantiles
/// against the source, within the configured tolerance.
fn validate_roundtrip(
    quantiles: &[f64],
    record: &EncodedRecord,
    tolerance: f64,
) -> Result<(), PzError> {
    let recovered = packet::decode_quantiles(record.as_bytes())?;
    if recovered.len() != quantiles.len() {
        return Err(PzError::ValidationFailed(format!(
            "packet decodes to {} quantiles, expected {}",
            recovered.len(),
            quantiles.len()
        )));
    }
    let m = quantiles.len();
    let max_shift = quantiles[1..m - 1]
        .iter()
        .zip(&recovered.z[1..m - 1])
        .map(|(a, b)| (a - b).abs())
        .fold(0.0f64, f64::max);
    if max_shift > tolerance {
        return Err(PzError::ValidationFailed(format!(
            "quantile shift {:.6} exceeds tolerance {:.6}",
            max_shift, tolerance
        )));
    }
    Ok(())
}
