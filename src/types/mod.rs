// In: src/types/mod.rs

//! The pure value types that flow between the codec stages.
//!
//! Every stage of the encode/decode pipeline consumes its input by reference
//! and produces a new owned output; none of these types carry shared mutable
//! state, so records can be processed on parallel threads with zero
//! coordination.

use crate::error::PzError;
use crate::kernels::grid;

//==================================================================================
// 1. Encode-side inputs
//==================================================================================

/// A sampled probability density function on an arbitrary monotonically
/// increasing redshift grid. The density need not be normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct GriddedPdf {
    z: Vec<f64>,
    density: Vec<f64>,
}

impl GriddedPdf {
    /// Builds a `GriddedPdf`, checking the structural invariants: matching
    /// lengths, at least two samples, and a strictly increasing grid.
    /// Negative densities are allowed here; the CDF builder clamps them.
    pub fn new(z: Vec<f64>, density: Vec<f64>) -> Result<Self, PzError> {
        if z.len() != density.len() {
            return Err(PzError::InvalidArgument(format!(
                "grid has {} samples but density has {}",
                z.len(),
                density.len()
            )));
        }
        if z.len() < 2 {
            return Err(PzError::InvalidArgument(
                "a PDF needs at least two grid samples".to_string(),
            ));
        }
        if z.windows(2).any(|w| w[1] <= w[0]) {
            return Err(PzError::InvalidArgument(
                "redshift grid must be strictly increasing".to_string(),
            ));
        }
        Ok(Self { z, density })
    }

    pub fn z(&self) -> &[f64] {
        &self.z
    }

    pub fn density(&self) -> &[f64] {
        &self.density
    }

    pub fn len(&self) -> usize {
        self.z.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }
}

//==================================================================================
// 2. Intermediate representations
//==================================================================================

/// A cumulative distribution function sampled on a monotonic grid.
///
/// Invariants (upheld by the builders in `kernels::cdf`): `f` is
/// non-decreasing, `f[0] == 0.0` and `f[last] == 1.0`. Duplicate `f` values
/// across zero-density intervals are permitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Cdf {
    pub z: Vec<f64>,
    pub f: Vec<f64>,
}

impl Cdf {
    pub fn len(&self) -> usize {
        self.z.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }
}

/// The redshifts at which the CDF reaches each of a fixed sequence of
/// evenly spaced cumulative-probability levels (endpoints included).
///
/// The level sequence is implied by the length: `linspace(0, 1, len)`. The
/// values are non-decreasing because the CDF is monotonic.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileSet {
    pub z: Vec<f64>,
}

impl QuantileSet {
    pub fn new(z: Vec<f64>) -> Self {
        Self { z }
    }

    /// The cumulative-probability levels this set was extracted at.
    pub fn levels(&self) -> Vec<f64> {
        grid::linspace(0.0, 1.0, self.z.len())
    }

    pub fn len(&self) -> usize {
        self.z.len()
    }

    pub fn is_empty(&self) -> bool {
        self.z.is_empty()
    }
}

//==================================================================================
// 3. Decode-side outputs
//==================================================================================

/// A caller-requested regular output grid, expressed as bin centers:
/// `start, start + step, ..` up to and including `stop` (within half a step).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl GridSpec {
    pub fn new(start: f64, stop: f64, step: f64) -> Self {
        Self { start, stop, step }
    }

    pub fn check(&self) -> Result<(), PzError> {
        if !(self.step > 0.0) || !self.step.is_finite() {
            return Err(PzError::InvalidArgument(format!(
                "grid step must be positive and finite, got {}",
                self.step
            )));
        }
        if !(self.stop > self.start) {
            return Err(PzError::InvalidArgument(format!(
                "grid stop {} must exceed start {}",
                self.stop, self.start
            )));
        }
        Ok(())
    }

    /// The bin centers of the requested grid.
    pub fn centers(&self) -> Vec<f64> {
        grid::arange(self.start, self.stop + 0.5 * self.step, self.step)
    }

    /// The bin edges: one more than the centers, offset by half a step.
    pub fn edges(&self) -> Vec<f64> {
        let centers = self.centers();
        let mut edges = Vec::with_capacity(centers.len() + 1);
        edges.push(centers[0] - 0.5 * self.step);
        for &c in &centers {
            edges.push(c + 0.5 * self.step);
        }
        edges
    }
}

/// A reconstructed PDF on the caller's output grid. Produced fresh by every
/// decode; the integral is only approximately 1 at finite grid resolution and
/// is deliberately not renormalized.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPdf {
    pub z: Vec<f64>,
    pub density: Vec<f64>,
}

impl DecodedPdf {
    /// The total probability mass on this grid (sum of density times bin
    /// width). Useful for judging whether the grid resolution was adequate.
    pub fn mass(&self, step: f64) -> f64 {
        self.density.iter().sum::<f64>() * step
    }
}

//==================================================================================
// Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gridded_pdf_rejects_mismatched_lengths() {
        let result = GriddedPdf::new(vec![0.0, 1.0], vec![1.0]);
        assert!(matches!(result, Err(PzError::InvalidArgument(_))));
    }

    #[test]
    fn test_gridded_pdf_rejects_unsorted_grid() {
        let result = GriddedPdf::new(vec![0.0, 2.0, 1.0], vec![1.0, 1.0, 1.0]);
        assert!(matches!(result, Err(PzError::InvalidArgument(_))));
    }

    #[test]
    fn test_quantile_set_levels_are_unit_interval() {
        let q = QuantileSet::new(vec![0.0, 0.5, 1.0, 1.5, 2.0]);
        let levels = q.levels();
        assert_eq!(levels.len(), 5);
        assert_eq!(levels[0], 0.0);
        assert_eq!(levels[4], 1.0);
        assert!((levels[2] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_grid_spec_centers_and_edges() {
        let spec = GridSpec::new(0.0, 1.0, 0.25);
        let centers = spec.centers();
        assert_eq!(centers.len(), 5);
        assert!((centers[4] - 1.0).abs() < 1e-12);
        let edges = spec.edges();
        assert_eq!(edges.len(), 6);
        assert!((edges[0] + 0.125).abs() < 1e-12);
        assert!((edges[5] - 1.125).abs() < 1e-12);
    }

    #[test]
    fn test_grid_spec_rejects_inverted_range() {
        assert!(GridSpec::new(2.0, 1.0, 0.1).check().is_err());
        assert!(GridSpec::new(0.0, 1.0, 0.0).check().is_err());
    }
}
