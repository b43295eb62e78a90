// In: src/kernels/quantile.rs

//! Inverts a CDF at a fixed sequence of evenly spaced probability levels.
//!
//! Interior levels are located by bracketing the CDF samples and
//! interpolating linearly. A flat CDF segment that sits exactly on a level
//! (several zero-density bins in a row) resolves to the midpoint of the flat
//! run, which keeps the extracted quantiles non-decreasing. The two endpoint
//! levels follow the configured [`BoundaryPolicy`].

use crate::config::BoundaryPolicy;
use crate::error::PzError;
use crate::kernels::grid;
use crate::types::{Cdf, QuantileSet};

/// Extracts `m` quantiles (levels `linspace(0, 1, m)`) from a CDF.
///
/// Fails with [`PzError::QuantileExtraction`] if the CDF is not monotonic;
/// that is an internal invariant violation of the CDF builder, reported as a
/// checked condition rather than a panic.
pub fn extract(cdf: &Cdf, m: usize, policy: BoundaryPolicy) -> Result<QuantileSet, PzError> {
    if m < 2 {
        return Err(PzError::InvalidArgument(format!(
            "need at least 2 quantile levels, got {}",
            m
        )));
    }
    if cdf.len() < 2 {
        return Err(PzError::QuantileExtraction(
            "CDF has fewer than two samples".to_string(),
        ));
    }
    if cdf.f.windows(2).any(|w| w[1] < w[0]) {
        return Err(PzError::QuantileExtraction(
            "CDF is not monotonically non-decreasing".to_string(),
        ));
    }

    let z = &cdf.z;
    let f = &cdf.f;
    let last = z.len() - 1;
    let levels = grid::linspace(0.0, 1.0, m);
    let mut out = Vec::with_capacity(m);

    // Bottom endpoint, per policy.
    out.push(match policy {
        BoundaryPolicy::DomainBounds => z[0],
        // Last grid point where the CDF is still zero: the start of support.
        BoundaryPolicy::FirstSupport => {
            let j = f.partition_point(|&v| v <= 0.0);
            z[j.saturating_sub(1)]
        }
    });

    for &q in &levels[1..m - 1] {
        out.push(invert_at(z, f, q));
    }

    // Top endpoint, symmetric treatment of the upper tail.
    out.push(match policy {
        BoundaryPolicy::DomainBounds => z[last],
        // First grid point where the CDF reaches one: the end of support.
        BoundaryPolicy::FirstSupport => {
            let j = f.partition_point(|&v| v < 1.0);
            z[j.min(last)]
        }
    });

    Ok(QuantileSet::new(out))
}

/// Inverts the CDF at a single interior level `q` (0 < q < 1).
fn invert_at(z: &[f64], f: &[f64], q: f64) -> f64 {
    let lo = f.partition_point(|&v| v < q);
    let hi = f.partition_point(|&v| v <= q);
    if hi > lo {
        // The CDF sits exactly at q over samples lo..hi: a flat segment.
        // Resolve to its midpoint.
        0.5 * (z[lo] + z[hi - 1])
    } else {
        // f[lo-1] < q < f[lo]; lo >= 1 because f starts at zero.
        let j = lo.min(f.len() - 1).max(1);
        let t = (q - f[j - 1]) / (f[j] - f[j - 1]);
        z[j - 1] + t * (z[j] - z[j - 1])
    }
}

/// Quantiles of a finite set of redshift samples drawn from the underlying
/// PDF (e.g. posterior samples from an MCMC photometric-redshift fit).
///
/// Non-finite samples are discarded; fails with [`PzError::DegenerateInput`]
/// when fewer than two finite samples remain.
pub fn from_samples(samples: &[f64], m: usize) -> Result<QuantileSet, PzError> {
    if m < 2 {
        return Err(PzError::InvalidArgument(format!(
            "need at least 2 quantile levels, got {}",
            m
        )));
    }
    let mut sorted: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.len() < 2 {
        return Err(PzError::DegenerateInput(format!(
            "only {} finite samples available",
            sorted.len()
        )));
    }
    sorted.sort_by(f64::total_cmp);

    // Linear-interpolation quantiles over the order statistics.
    let n = sorted.len();
    let levels = grid::linspace(0.0, 1.0, m);
    let z = levels
        .iter()
        .map(|&q| {
            let pos = q * (n - 1) as f64;
            let j = (pos.floor() as usize).min(n - 2);
            let t = pos - j as f64;
            sorted[j] + t * (sorted[j + 1] - sorted[j])
        })
        .collect();
    Ok(QuantileSet::new(z))
}
