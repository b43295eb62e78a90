// In: src/kernels/grid.rs

//! Pure, stateless helpers for working with monotonic sample grids:
//! even spacing, monotone linear interpolation with clamped tails, and
//! trapezoidal quadrature. Everything else in the codec is built on these.

use num_traits::{Float, FromPrimitive};

//==================================================================================
// 1. Grid Construction
//==================================================================================

/// `n` evenly spaced values from `start` to `stop`, endpoints included.
/// With `n == 1` the single value is `start`.
pub fn linspace<T>(start: T, stop: T, n: usize) -> Vec<T>
where
    T: Float + FromPrimitive,
{
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![start];
    }
    let denom = T::from_usize(n - 1).unwrap_or_else(T::one);
    let span = stop - start;
    (0..n)
        .map(|i| {
            let t = T::from_usize(i).unwrap_or_else(T::zero) / denom;
            start + span * t
        })
        .collect()
}

/// Evenly spaced values from `start` (inclusive) towards `stop` (exclusive)
/// with the given positive `step`.
pub fn arange<T>(start: T, stop: T, step: T) -> Vec<T>
where
    T: Float + FromPrimitive,
{
    if !(step > T::zero()) || !(stop > start) {
        return Vec::new();
    }
    let count = ((stop - start) / step).ceil();
    let count = count.to_usize().unwrap_or(0);
    (0..count)
        .map(|i| start + step * T::from_usize(i).unwrap_or_else(T::zero))
        .collect()
}

//==================================================================================
// 2. Interpolation
//==================================================================================

/// Linear interpolation of `(xp, fp)` at a single point `x`, with `left` and
/// `right` fill values outside the sampled range.
///
/// `xp` must be non-decreasing. Duplicate `xp` values (a vertical segment,
/// e.g. repeated quantiles of a near-delta PDF) are handled by interpolating
/// from the last duplicate, so the result is always finite.
pub fn interp_one<T>(x: T, xp: &[T], fp: &[T], left: T, right: T) -> T
where
    T: Float,
{
    debug_assert_eq!(xp.len(), fp.len());
    if xp.is_empty() {
        return left;
    }
    if x < xp[0] {
        return left;
    }
    if x > xp[xp.len() - 1] {
        return right;
    }
    // First index whose abscissa exceeds x; the segment starts just before it.
    let j = xp.partition_point(|&v| v <= x);
    if j == 0 {
        return fp[0];
    }
    if j == xp.len() {
        return fp[xp.len() - 1];
    }
    let j0 = j - 1;
    // xp[j0] <= x < xp[j] guarantees a strictly positive denominator.
    let t = (x - xp[j0]) / (xp[j] - xp[j0]);
    fp[j0] + t * (fp[j] - fp[j0])
}

/// Vectorized form of [`interp_one`] over a slice of query points.
pub fn interp<T>(xs: &[T], xp: &[T], fp: &[T], left: T, right: T) -> Vec<T>
where
    T: Float,
{
    xs.iter()
        .map(|&x| interp_one(x, xp, fp, left, right))
        .collect()
}

//==================================================================================
// 3. Quadrature
//==================================================================================

/// Cumulative trapezoidal integral of `y` over `x`. The result has the same
/// length as the inputs, with a leading zero.
pub fn cumtrapz<T>(x: &[T], y: &[T]) -> Vec<T>
where
    T: Float + FromPrimitive,
{
    debug_assert_eq!(x.len(), y.len());
    let half = T::from_f64(0.5).unwrap_or_else(T::one);
    let mut out = Vec::with_capacity(x.len());
    let mut acc = T::zero();
    out.push(acc);
    for i in 1..x.len() {
        acc = acc + half * (y[i] + y[i - 1]) * (x[i] - x[i - 1]);
        out.push(acc);
    }
    out
}

/// Trapezoidal integral of `y` over `x`.
pub fn trapz<T>(x: &[T], y: &[T]) -> T
where
    T: Float + FromPrimitive,
{
    debug_assert_eq!(x.len(), y.len());
    let half = T::from_f64(0.5).unwrap_or_else(T::one);
    let mut acc = T::zero();
    for i in 1..x.len() {
        acc = acc + half * (y[i] + y[i - 1]) * (x[i] - x[i - 1]);
    }
    acc
}

//==================================================================================
// Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace_endpoints_and_spacing() {
        let v = linspace(0.0f64, 1.0, 5);
        assert_eq!(v.len(), 5);
        assert_eq!(v[0], 0.0);
        assert_eq!(v[4], 1.0);
        assert!((v[1] - 0.25).abs() < 1e-15);
    }

    #[test]
    fn test_linspace_degenerate_counts() {
        assert!(linspace(0.0f64, 1.0, 0).is_empty());
        assert_eq!(linspace(3.0f64, 9.0, 1), vec![3.0]);
    }

    #[test]
    fn test_arange_excludes_stop() {
        let v = arange(0.0f64, 1.0, 0.25);
        assert_eq!(v.len(), 4);
        assert!((v[3] - 0.75).abs() < 1e-15);
        assert!(arange(1.0f64, 0.0, 0.25).is_empty());
    }

    #[test]
    fn test_interp_interior_and_clamped_tails() {
        let xp = [0.0f64, 1.0, 2.0];
        let fp = [0.0f64, 10.0, 40.0];
        assert!((interp_one(0.5, &xp, &fp, -1.0, -2.0) - 5.0).abs() < 1e-12);
        assert!((interp_one(1.5, &xp, &fp, -1.0, -2.0) - 25.0).abs() < 1e-12);
        assert_eq!(interp_one(-0.1, &xp, &fp, -1.0, -2.0), -1.0);
        assert_eq!(interp_one(2.1, &xp, &fp, -1.0, -2.0), -2.0);
        assert_eq!(interp_one(2.0, &xp, &fp, -1.0, -2.0), 40.0);
    }

    #[test]
    fn test_interp_handles_duplicate_abscissae() {
        // Vertical segment at x = 1: interpolation proceeds from the last
        // duplicate and stays finite.
        let xp = [0.0f64, 1.0, 1.0, 2.0];
        let fp = [0.0f64, 0.4, 0.6, 1.0];
        let y = interp_one(1.5, &xp, &fp, 0.0, 1.0);
        assert!((y - 0.8).abs() < 1e-12);
        assert!(interp_one(1.0, &xp, &fp, 0.0, 1.0).is_finite());
    }

    #[test]
    fn test_cumtrapz_of_constant_is_linear() {
        let x = [0.0f64, 1.0, 2.0, 4.0];
        let y = [3.0f64, 3.0, 3.0, 3.0];
        let c = cumtrapz(&x, &y);
        assert_eq!(c[0], 0.0);
        assert!((c[1] - 3.0).abs() < 1e-12);
        assert!((c[3] - 12.0).abs() < 1e-12);
        assert!((trapz(&x, &y) - 12.0).abs() < 1e-12);
    }
}
