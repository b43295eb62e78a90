// In: src/kernels/delta.rs

//! The pure, stateless kernels for quantized-delta encoding of a quantile
//! sequence into a byte payload, and the exact algebraic inverse.
//!
//! Consecutive quantile differences are non-negative by construction, so each
//! delta is quantized to `round(delta / eps)` steps and stored as a single
//! byte in `0..=254`. A delta whose step count would reach the reserved
//! sentinel byte is stored in the wide escape form instead: the sentinel
//! followed by the step count as a big-endian u16. The escape is a tagged
//! variant ([`DeltaCode`]), required whenever the narrow byte range is
//! reached, so the sentinel never collides with valid data.
//!
//! The encoder quantizes against a *running reconstructed* previous value, so
//! the per-quantile round-trip error is bounded by `eps / 2` and never
//! accumulates along the sequence. Rounding is `f64::round`
//! (half-away-from-zero), a fixed convention that makes re-encoding the same
//! quantile set byte-idempotent.

use crate::error::PzError;
use crate::record::format::{
    EPS_QUANTUM, ESCAPE_SENTINEL, MAX_NARROW_STEPS, MAX_WIDE_STEPS,
};

//==================================================================================
// 1. The Tagged Delta Code
//==================================================================================

/// One encoded quantile delta: either a single narrow byte or the wide
/// escape form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaCode {
    /// Step count in `0..=254`, stored as one byte.
    Narrow(u8),
    /// Step count in `255..=65535`, stored as the sentinel byte followed by a
    /// big-endian u16.
    Wide(u16),
}

impl DeltaCode {
    /// The quantized step count this code carries.
    pub fn steps(&self) -> u32 {
        match *self {
            DeltaCode::Narrow(b) => b as u32,
            DeltaCode::Wide(w) => w as u32,
        }
    }

    /// Encoded size in bytes: 1 for the narrow form, 3 for the escape form.
    pub fn encoded_len(&self) -> usize {
        match *self {
            DeltaCode::Narrow(_) => 1,
            DeltaCode::Wide(_) => 3,
        }
    }
}

//==================================================================================
// 2. Quantization (Encode Direction)
//==================================================================================

/// Quantizes a non-decreasing quantile slice into delta codes against the
/// given anchor.
///
/// Fails with [`PzError::RecordCapacity`] when a delta exceeds the wide
/// encoding range (the scale derivation is expected to prevent this).
pub fn quantize(quantiles: &[f64], anchor: f64, eps: f64) -> Result<Vec<DeltaCode>, PzError> {
    let mut codes = Vec::with_capacity(quantiles.len());
    let mut prev = anchor;
    for &z in quantiles {
        // The anchor is floor-quantized, so float fuzz can make the first
        // residual marginally negative; clamp to zero.
        let steps = ((z - prev) / eps).round().max(0.0);
        if steps > MAX_WIDE_STEPS as f64 {
            return Err(PzError::RecordCapacity(format!(
                "delta of {:.6} needs {} steps of eps={:.6}, wide limit is {}",
                z - prev,
                steps,
                eps,
                MAX_WIDE_STEPS
            )));
        }
        let steps = steps as u32;
        codes.push(if steps <= MAX_NARROW_STEPS {
            DeltaCode::Narrow(steps as u8)
        } else {
            DeltaCode::Wide(steps as u16)
        });
        prev += steps as f64 * eps;
    }
    Ok(codes)
}

/// Serializes delta codes into `buf`.
pub fn write_payload(codes: &[DeltaCode], buf: &mut Vec<u8>) {
    for code in codes {
        match *code {
            DeltaCode::Narrow(b) => buf.push(b),
            DeltaCode::Wide(w) => {
                buf.push(ESCAPE_SENTINEL);
                buf.extend_from_slice(&w.to_be_bytes());
            }
        }
    }
}

//==================================================================================
// 3. Dequantization (Decode Direction)
//==================================================================================

/// Parses a payload back into step counts.
///
/// A run of zero bytes extending to the end of the payload is packet padding,
/// not data, and terminates the parse. A sentinel byte whose two-byte
/// extension is cut off by the end of the payload is a corrupt record.
pub fn read_payload(payload: &[u8]) -> Result<Vec<u32>, PzError> {
    let mut steps = Vec::new();
    let mut i = 0;
    while i < payload.len() {
        let b = payload[i];
        if b == 0 && payload[i..].iter().all(|&x| x == 0) {
            break; // only trailing padding remains
        }
        if b == ESCAPE_SENTINEL {
            if i + 3 > payload.len() {
                return Err(PzError::RecordFormat(
                    "escape code truncated at end of payload".to_string(),
                ));
            }
            let w = u16::from_be_bytes([payload[i + 1], payload[i + 2]]);
            steps.push(w as u32);
            i += 3;
        } else {
            steps.push(b as u32);
            i += 1;
        }
    }
    Ok(steps)
}

/// Running sum from the anchor: the exact inverse of [`quantize`].
pub fn accumulate(anchor: f64, steps: &[u32], eps: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(steps.len() + 1);
    let mut z = anchor;
    out.push(z);
    for &s in steps {
        z += s as f64 * eps;
        out.push(z);
    }
    out
}

//==================================================================================
// 4. Scale (eps) Derivation
//==================================================================================

/// Rounds a positive value up to the next representable eps quantum.
pub fn ceil_to_quantum(x: f64) -> f64 {
    ((x / EPS_QUANTUM).ceil()).max(0.0) * EPS_QUANTUM
}

/// Derives the per-record quantization step from the observed quantile gaps.
///
/// Picks the smallest representable `eps` such that at most `max_wide` gaps
/// need the escape form, and the largest gap still fits the wide encoding.
/// `quantiles` is the full set including both endpoints; only the gaps that
/// end up in the payload (everything except the final gap to the top
/// endpoint, which lives in the header) are considered.
pub fn derive_eps_adaptive(quantiles: &[f64], max_wide: usize) -> f64 {
    let m = quantiles.len();
    if m < 3 {
        return EPS_QUANTUM;
    }
    let mut gaps: Vec<f64> = (0..m - 2).map(|i| quantiles[i + 1] - quantiles[i]).collect();
    gaps.sort_by(f64::total_cmp);

    let eps_narrow = if max_wide >= gaps.len() {
        EPS_QUANTUM
    } else {
        // The (max_wide + 1)-th largest gap must stay narrow.
        ceil_to_quantum(gaps[gaps.len() - 1 - max_wide] / MAX_NARROW_STEPS as f64)
    };
    let eps_wide = ceil_to_quantum(gaps[gaps.len() - 1] / MAX_WIDE_STEPS as f64);

    EPS_QUANTUM.max(eps_narrow).max(eps_wide)
}

/// Derives a run-level quantization step from the declared domain `[0, zmax]`
/// and the level count: deltas up to four times the even-level spacing of a
/// domain-filling PDF stay in the narrow byte range.
pub fn derive_eps_from_domain(zmax: f64, m: usize) -> f64 {
    let levels = m.max(2);
    let eps = ceil_to_quantum(4.0 * zmax / (MAX_NARROW_STEPS as f64 * (levels - 1) as f64));
    EPS_QUANTUM.max(eps)
}
