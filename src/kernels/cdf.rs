// In: src/kernels/cdf.rs

//! Builds a monotonic, unit-normalized CDF from a sampled PDF.
//!
//! Two builders are provided. `from_pdf` treats the input as point samples of
//! a continuous density and integrates with the trapezoidal rule on the input
//! grid. `from_histogram` treats the input as a uniformly binned histogram
//! whose mass accumulates at bin *edges*, which is how photometric-redshift
//! catalogs usually tabulate P(z).
//!
//! Policy: negative densities are clamped to zero before integration. This is
//! a documented transformation, not a silent one; the clamp count is logged at
//! debug level.

use log::debug;

use crate::error::PzError;
use crate::kernels::grid;
use crate::types::{Cdf, GriddedPdf};

/// Builds a CDF by cumulative trapezoidal integration of a sampled density.
///
/// The output grid matches the input grid exactly: `f[0] == 0.0` and
/// `f[last] == 1.0` after normalization. Fails with
/// [`PzError::DegenerateInput`] when the total integral is not positive.
pub fn from_pdf(pdf: &GriddedPdf) -> Result<Cdf, PzError> {
    let density = clamp_negative(pdf.density());
    let mut f = grid::cumtrapz(pdf.z(), &density);

    let total = *f.last().unwrap_or(&0.0);
    if !(total > 0.0) || !total.is_finite() {
        return Err(PzError::DegenerateInput(format!(
            "total probability mass is {}",
            total
        )));
    }

    for v in f.iter_mut() {
        *v /= total;
    }
    // Pin the top endpoint so downstream exact comparisons against 1.0 hold.
    if let Some(top) = f.last_mut() {
        *top = 1.0;
    }

    Ok(Cdf {
        z: pdf.z().to_vec(),
        f,
    })
}

/// Builds a CDF on bin edges from a uniformly binned PDF histogram.
///
/// Leading and trailing zero-density bins are trimmed first, so the CDF spans
/// only the support of the PDF. A histogram whose mass sits in a single bin
/// degenerates to a two-point CDF across that bin, which quantile extraction
/// then turns into an even ramp.
///
/// The grid is assumed uniform; the bin width is taken from the first two
/// grid points.
pub fn from_histogram(z_grid: &[f64], density: &[f64]) -> Result<Cdf, PzError> {
    if z_grid.len() != density.len() {
        return Err(PzError::InvalidArgument(format!(
            "grid has {} samples but density has {}",
            z_grid.len(),
            density.len()
        )));
    }
    if z_grid.len() < 2 {
        return Err(PzError::InvalidArgument(
            "a histogram needs at least two bins".to_string(),
        ));
    }

    let density = clamp_negative(density);
    let first = density.iter().position(|&p| p > 0.0);
    let last = density.iter().rposition(|&p| p > 0.0);
    let (imin, imax) = match (first, last) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return Err(PzError::DegenerateInput(
                "histogram carries no positive density".to_string(),
            ))
        }
    };

    let dz = z_grid[1] - z_grid[0];
    let z = &z_grid[imin..=imax];
    let p = &density[imin..=imax];

    // CDF at the bin edges: f[0] = 0, then f[i+1] = f[i] + p[i] * dz.
    let mut edges = Vec::with_capacity(z.len() + 1);
    let mut f = Vec::with_capacity(z.len() + 1);
    edges.push(z[0] - 0.5 * dz);
    f.push(0.0);
    let mut acc = 0.0;
    for i in 0..z.len() {
        acc += p[i] * dz;
        edges.push(z[i] + 0.5 * dz);
        f.push(acc);
    }

    let total = acc;
    if !(total > 0.0) || !total.is_finite() {
        return Err(PzError::DegenerateInput(format!(
            "total probability mass is {}",
            total
        )));
    }
    for v in f.iter_mut() {
        *v /= total;
    }
    if let Some(top) = f.last_mut() {
        *top = 1.0;
    }

    Ok(Cdf { z: edges, f })
}

/// Clamps negative density samples to zero so the cumulative integral stays
/// monotonic.
fn clamp_negative(density: &[f64]) -> Vec<f64> {
    let clamped = density.iter().filter(|&&p| p < 0.0).count();
    if clamped > 0 {
        debug!("clamped {} negative density samples to zero", clamped);
    }
    density.iter().map(|&p| p.max(0.0)).collect()
}
