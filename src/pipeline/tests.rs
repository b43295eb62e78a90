// In: src/pipeline/tests.rs

//! End-to-end tests over the full encode/decode paths.

use crate::config::{BoundaryPolicy, CodecConfig, ScalePolicy};
use crate::error::PzError;
use crate::kernels::grid;
use crate::pipeline::{decoder, encoder};
use crate::record::format::HEADER_LEN;
use crate::record::packet;
use crate::types::{GriddedPdf, GridSpec};

/// A 701-bin histogram on [0, 7] that is uniform over [0, 1] and zero above.
fn uniform_histogram() -> (Vec<f64>, Vec<f64>) {
    let z: Vec<f64> = grid::linspace(0.0, 7.0, 701);
    let p: Vec<f64> = z.iter().map(|&zi| if zi <= 1.0 { 1.0 } else { 0.0 }).collect();
    (z, p)
}

#[test]
fn test_uniform_pdf_quantiles_track_levels() {
    let (z, p) = uniform_histogram();
    let cfg = CodecConfig::default();
    let record = encoder::encode_histogram(&z, &p, &cfg).unwrap();

    let recovered = decoder::decode_record(record.as_bytes()).unwrap();
    let levels = recovered.levels();
    // A linear CDF means the quantile at level q sits at redshift q, up to
    // half a bin of support trimming and the quantization step.
    for (zi, qi) in recovered.z.iter().zip(&levels) {
        assert!((zi - qi).abs() < 0.02, "z={} level={}", zi, qi);
    }

    let stats = packet::analyze(record.as_bytes()).unwrap();
    assert_eq!(stats.wide_deltas, 0);
}

#[test]
fn test_adaptive_loop_fills_the_packet() {
    let (z, p) = uniform_histogram();
    let cfg = CodecConfig::default();
    let record = encoder::encode_histogram(&z, &p, &cfg).unwrap();

    let stats = packet::analyze(record.as_bytes()).unwrap();
    // The encoder grew past the initial level count and left at most one
    // spare payload byte (levels move in steps of 2).
    assert!(stats.num_levels >= cfg.ini_quantiles);
    assert!(stats.payload_len >= cfg.packet_size - HEADER_LEN - 2);
}

#[test]
fn test_all_zero_pdf_fails_with_degenerate_input() {
    let z = grid::linspace(0.0, 7.0, 100);
    let p = vec![0.0; 100];
    let cfg = CodecConfig::default();
    assert!(matches!(
        encoder::encode_histogram(&z, &p, &cfg),
        Err(PzError::DegenerateInput(_))
    ));
}

#[test]
fn test_narrow_spike_against_wide_domain_uses_escape_path() {
    // A narrow Gaussian at z = 0.1 on a [0, 7] grid, encoded against the
    // full domain: the first interior delta spans the empty lead-in and must
    // take the wide form.
    let z: Vec<f64> = grid::linspace(0.0, 7.0, 1401);
    let p: Vec<f64> = z
        .iter()
        .map(|&zi| (-0.5 * ((zi - 0.1) / 0.01).powi(2)).exp())
        .collect();
    let pdf = GriddedPdf::new(z, p).unwrap();
    let cfg = CodecConfig {
        boundary_policy: BoundaryPolicy::DomainBounds,
        // Tight tolerance: a coarse eps that would absorb the lead-in gap
        // into narrow deltas fails validation instead.
        tolerance: 5e-5,
        ..CodecConfig::default()
    };
    let record = encoder::encode_pdf(&pdf, &cfg).unwrap();

    let stats = packet::analyze(record.as_bytes()).unwrap();
    assert!(stats.wide_deltas >= 1);

    let recovered = decoder::decode_record(record.as_bytes()).unwrap();
    assert!((recovered.z[0] - 0.0).abs() < 1e-9);
    assert!((recovered.z[recovered.len() - 1] - 7.0).abs() < 1e-9);
    // Interior quantiles cluster around the spike and survive the escape
    // path within the validation tolerance.
    let mid = recovered.z[recovered.len() / 2];
    assert!((mid - 0.1).abs() < 0.02, "mid quantile {}", mid);
}

#[test]
fn test_first_support_policy_concentrates_on_the_spike() {
    let z: Vec<f64> = grid::linspace(0.0, 7.0, 1401);
    let p: Vec<f64> = z
        .iter()
        .map(|&zi| (-0.5 * ((zi - 0.1) / 0.01).powi(2)).exp())
        .collect();
    let pdf = GriddedPdf::new(z, p).unwrap();
    let cfg = CodecConfig::default();
    let record = encoder::encode_pdf(&pdf, &cfg).unwrap();

    let recovered = decoder::decode_record(record.as_bytes()).unwrap();
    // With FirstSupport the whole quantile range hugs the spike's support.
    assert!(recovered.z[0] >= -0.01);
    assert!(*recovered.z.last().unwrap() < 0.7);
}

#[test]
fn test_encoding_is_deterministic_end_to_end() {
    let (z, p) = uniform_histogram();
    let cfg = CodecConfig::default();
    let a = encoder::encode_histogram(&z, &p, &cfg).unwrap();
    let b = encoder::encode_histogram(&z, &p, &cfg).unwrap();
    assert_eq!(a.as_bytes(), b.as_bytes());
}

#[test]
fn test_from_domain_scale_policy_keeps_deltas_narrow_and_even() {
    let (z, p) = uniform_histogram();
    let cfg = CodecConfig {
        scale_policy: ScalePolicy::FromDomain { zmax: 7.0 },
        ..CodecConfig::default()
    };
    let record = encoder::encode_histogram(&z, &p, &cfg).unwrap();

    let stats = packet::analyze(record.as_bytes()).unwrap();
    assert_eq!(stats.wide_deltas, 0);

    // Equal quantile spacing quantizes to at most two adjacent step counts.
    let payload = &record.as_bytes()[HEADER_LEN..HEADER_LEN + stats.payload_len];
    let mut distinct: Vec<u8> = payload.to_vec();
    distinct.sort_unstable();
    distinct.dedup();
    assert!(distinct.len() <= 2, "distinct payload bytes: {:?}", distinct);
}

#[test]
fn test_batch_isolates_degenerate_rows() {
    let z: Vec<f64> = grid::linspace(0.0, 1.0, 101);
    let uniform = vec![1.0; 101];
    let zeros = vec![0.0; 101];
    let triangle: Vec<f64> = z.iter().map(|&zi| 1.0 - (zi - 0.5).abs() * 2.0).collect();

    let cfg = CodecConfig::default();
    let records =
        encoder::encode_batch(&z, &[uniform, zeros, triangle], &cfg).unwrap();
    assert_eq!(records.len(), 3);
    assert!(!records[0].is_null());
    assert!(records[1].is_null());
    assert!(!records[2].is_null());

    let spec = GridSpec::new(0.0, 1.0, 0.05);
    let views: Vec<&[u8]> = records.iter().map(|r| r.as_bytes()).collect();
    let rows = decoder::decode_batch(&views, &spec).unwrap();
    assert_eq!(rows.len(), 3);
    let n_bins = spec.centers().len();
    assert!(rows.iter().all(|r| r.len() == n_bins));
    assert!(rows[1].iter().all(|&d| d == 0.0));
    let mass: f64 = rows[0].iter().sum::<f64>() * spec.step;
    assert!((mass - 1.0).abs() < 0.05, "mass = {}", mass);
}

#[test]
fn test_coarse_output_grid_keeps_unit_mass_within_tolerance() {
    let (z, p) = uniform_histogram();
    let cfg = CodecConfig::default();
    let record = encoder::encode_histogram(&z, &p, &cfg).unwrap();

    // Output bins far coarser than the quantile spacing.
    let spec = GridSpec::new(-0.25, 1.25, 0.25);
    let pdf = decoder::decode_pdf(record.as_bytes(), &spec).unwrap();
    assert_eq!(pdf.z.len(), spec.centers().len());
    assert!((pdf.mass(spec.step) - 1.0).abs() < 0.05, "mass = {}", pdf.mass(spec.step));
}

#[test]
fn test_encode_from_samples_recovers_the_median() {
    let samples: Vec<f64> = (0..2000).map(|i| 0.2 + 0.6 * i as f64 / 1999.0).collect();
    let cfg = CodecConfig::default();
    let record = encoder::encode_samples(&samples, &cfg).unwrap();

    let recovered = decoder::decode_record(record.as_bytes()).unwrap();
    let median = crate::kernels::stats::zmedian(&recovered);
    assert!((median - 0.5).abs() < 0.005, "median = {}", median);
}

#[test]
fn test_encode_pdf_on_non_uniform_grid() {
    // Denser sampling near the peak, sparser in the tail.
    let mut z: Vec<f64> = grid::linspace(0.0, 0.5, 200);
    z.extend(grid::linspace(0.51, 3.0, 60));
    let p: Vec<f64> = z
        .iter()
        .map(|&zi| (-0.5 * ((zi - 0.3) / 0.05).powi(2)).exp())
        .collect();
    let pdf = GriddedPdf::new(z, p).unwrap();
    let cfg = CodecConfig::default();
    let record = encoder::encode_pdf(&pdf, &cfg).unwrap();

    let recovered = decoder::decode_record(record.as_bytes()).unwrap();
    let median = crate::kernels::stats::zmedian(&recovered);
    assert!((median - 0.3).abs() < 0.01, "median = {}", median);
}

#[test]
fn test_decode_samples_stay_in_support() {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    let (z, p) = uniform_histogram();
    let cfg = CodecConfig::default();
    let record = encoder::encode_histogram(&z, &p, &cfg).unwrap();

    let mut rng = StdRng::seed_from_u64(11);
    let samples = decoder::decode_samples(record.as_bytes(), 300, &mut rng).unwrap();
    assert_eq!(samples.len(), 300);
    assert!(samples.iter().all(|&s| (-0.01..=1.01).contains(&s)));
}
