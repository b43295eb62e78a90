// In: src/kernels/stats.rs

//! Point estimates computed directly from a quantile set, without ever
//! rebinning the PDF. Working in quantile space keeps these estimators cheap
//! (the records never have to be expanded onto a grid) and robust against the
//! redshift quantization of very narrow peaks.

use rand::Rng;

use crate::kernels::grid;
use crate::types::QuantileSet;

/// Mode of the PDF: the redshift of maximum probability density.
///
/// Estimated by sliding a window of fixed redshift `width` over the quantile
/// knots and finding where it swallows the most cumulative probability. More
/// robust against quantization of narrow peaks than differentiating the CDF.
pub fn zmode(quantiles: &QuantileSet, width: f64) -> f64 {
    let knots = quantiles.levels();
    let zq = &quantiles.z;

    let mut best_plus = (f64::NEG_INFINITY, 0usize);
    let mut best_minus = (f64::NEG_INFINITY, 0usize);
    for (i, (&z, &k)) in zq.iter().zip(&knots).enumerate() {
        let plus = grid::interp_one(z + width, zq, &knots, 0.0, 1.0) - k;
        let minus = k - grid::interp_one(z - width, zq, &knots, 0.0, 1.0);
        if plus > best_plus.0 {
            best_plus = (plus, i);
        }
        if minus > best_minus.0 {
            best_minus = (minus, i);
        }
    }

    if best_plus.0 > best_minus.0 {
        zq[best_plus.1] + 0.5 * width
    } else {
        zq[best_minus.1] - 0.5 * width
    }
}

/// Median redshift: the quantile at level 0.5.
pub fn zmedian(quantiles: &QuantileSet) -> f64 {
    let knots = quantiles.levels();
    grid::interp_one(0.5, &knots, &quantiles.z, quantiles.z[0], quantiles.z[quantiles.len() - 1])
}

/// Mean redshift: the integral of z over cumulative probability.
pub fn zmean(quantiles: &QuantileSet) -> f64 {
    let knots = quantiles.levels();
    grid::trapz(&knots, &quantiles.z)
}

/// Standard deviation of the redshift under the PDF.
pub fn zmean_err(quantiles: &QuantileSet) -> f64 {
    let knots = quantiles.levels();
    let mean = grid::trapz(&knots, &quantiles.z);
    let z2: Vec<f64> = quantiles.z.iter().map(|&z| z * z).collect();
    let ez2 = grid::trapz(&knots, &z2);
    (ez2 - mean * mean).max(0.0).sqrt()
}

/// A random redshift drawn with the PDF as the underlying distribution.
pub fn zrandom<R: Rng + ?Sized>(quantiles: &QuantileSet, rng: &mut R) -> f64 {
    let u: f64 = rng.random();
    let knots = quantiles.levels();
    grid::interp_one(u, &knots, &quantiles.z, quantiles.z[0], quantiles.z[quantiles.len() - 1])
}

/// The odds parameter: the probability that the true redshift lies within
/// `odds_window * (1 + zcenter)` of `zcenter`.
pub fn odds(quantiles: &QuantileSet, zcenter: f64, odds_window: f64) -> f64 {
    let knots = quantiles.levels();
    let half = odds_window * (1.0 + zcenter);
    let lo = grid::interp_one(zcenter - half, &quantiles.z, &knots, 0.0, 1.0);
    let hi = grid::interp_one(zcenter + half, &quantiles.z, &knots, 0.0, 1.0);
    hi - lo
}

/// The highest-posterior-density credible interval containing probability
/// `conf`: the narrowest redshift interval whose cumulative probability is
/// `conf`. With `zinside` given, the search is restricted to intervals whose
/// cumulative window covers that redshift.
pub fn hpdci(quantiles: &QuantileSet, conf: f64, zinside: Option<f64>) -> (f64, f64) {
    let knots = quantiles.levels();
    let zq = &quantiles.z;
    let knot_interval = 1.0 / (quantiles.len() - 1) as f64;

    let (qmin, qmax) = match zinside {
        Some(z) => {
            let qin = grid::interp_one(z, zq, &knots, 0.0, 1.0);
            ((qin - conf).max(0.0), (qin + conf).min(1.0))
        }
        None => (0.0, 1.0),
    };

    // Scan candidate windows [s, s + conf] on a sub-knot lattice.
    let scan_step = 0.2 * knot_interval;
    let starts = grid::arange(qmin, qmax - conf, scan_step);
    if starts.is_empty() {
        let center = zmedian(quantiles);
        return (center, center);
    }

    let mut best = (f64::INFINITY, 0.0, 0.0);
    for &s in &starts {
        let zlo = grid::interp_one(s, &knots, zq, zq[0], zq[zq.len() - 1]);
        let zhi = grid::interp_one(s + conf, &knots, zq, zq[0], zq[zq.len() - 1]);
        let width = zhi - zlo;
        if width < best.0 {
            best = (width, zlo, zhi);
        }
    }
    (best.1, best.2)
}

//==================================================================================
// Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Quantiles of a symmetric triangular-ish PDF centered at 0.5.
    fn symmetric_quantiles() -> QuantileSet {
        let m = 101;
        let z = grid::linspace(0.0, 1.0, m)
            .into_iter()
            .map(|q: f64| {
                // Inverse CDF of a symmetric distribution on [0, 1].
                if q < 0.5 {
                    0.5 * (2.0 * q).sqrt()
                } else {
                    1.0 - 0.5 * (2.0 * (1.0 - q)).sqrt()
                }
            })
            .collect();
        QuantileSet::new(z)
    }

    #[test]
    fn test_symmetric_pdf_median_equals_mean_at_center() {
        let q = symmetric_quantiles();
        assert!((zmedian(&q) - 0.5).abs() < 1e-6);
        assert!((zmean(&q) - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_mode_of_symmetric_pdf_is_near_center() {
        let q = symmetric_quantiles();
        assert!((zmode(&q, 0.005) - 0.5).abs() < 0.02);
    }

    #[test]
    fn test_uniform_pdf_stddev_matches_analytic_value() {
        let q = QuantileSet::new(grid::linspace(0.0, 1.0, 201));
        // Uniform on [0, 1]: sigma = 1 / sqrt(12).
        assert!((zmean_err(&q) - 1.0 / 12f64.sqrt()).abs() < 1e-3);
    }

    #[test]
    fn test_odds_of_wide_window_is_one() {
        let q = QuantileSet::new(grid::linspace(0.0, 1.0, 51));
        assert!((odds(&q, 0.5, 2.0) - 1.0).abs() < 1e-12);
        let narrow = odds(&q, 0.5, 0.03);
        // Uniform PDF: the window holds exactly its own width of probability.
        assert!((narrow - 2.0 * 0.03 * 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_hpdci_width_matches_uniform_pdf() {
        let q = QuantileSet::new(grid::linspace(0.0, 1.0, 101));
        let (lo, hi) = hpdci(&q, 0.68, None);
        assert!((hi - lo - 0.68).abs() < 0.01);
    }

    #[test]
    fn test_hpdci_around_inside_point_contains_it() {
        let q = symmetric_quantiles();
        let (lo, hi) = hpdci(&q, 0.68, Some(0.5));
        assert!(lo < 0.5 && 0.5 < hi);
        assert!(hi - lo < 1.0);
    }

    #[test]
    fn test_zrandom_is_inside_support() {
        let q = QuantileSet::new(grid::linspace(0.3, 0.7, 51));
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let z = zrandom(&q, &mut rng);
            assert!((0.3..=0.7).contains(&z));
        }
    }
}
