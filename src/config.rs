// In: src/config.rs

//! The single source of truth for all pzpack codec configuration.
//!
//! This module defines the unified `CodecConfig` struct, which is designed to be
//! created once at the application boundary (e.g., from a user's YAML file or
//! command-line flags) and then passed down through the system by shared
//! read-only reference. The configuration is fixed for the duration of a run;
//! the codec itself is stateless.

use serde::{Deserialize, Serialize};

use crate::error::PzError;
use crate::record::format;

//==================================================================================
// I. Core Configuration Enums
//==================================================================================

/// How the first and last quantile levels (q = 0 and q = 1) map onto the
/// input grid.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// **Default:** q = 0 maps to the start of the PDF's support (the last grid
    /// point where the CDF is still zero) and q = 1 to the end of support.
    /// Leading and trailing zero-density plateaus are excluded from the
    /// quantile range, which keeps all the encoding resolution on the region
    /// that actually carries probability mass.
    #[default]
    FirstSupport,

    /// q = 0 maps to the first grid point and q = 1 to the last, regardless of
    /// where the support starts. A PDF concentrated far from the grid
    /// boundaries will then produce large first/last deltas that fall back to
    /// the wide escape encoding.
    DomainBounds,
}

/// How the quantization step `eps` for the delta payload is derived.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ScalePolicy {
    /// **Default:** derive `eps` per record from the observed quantile gaps:
    /// the smallest representable step such that at most the spare packet
    /// bytes are spent on escape codes and the largest gap still fits the
    /// wide encoding. Gives the best precision each record can afford.
    Adaptive,

    /// Derive `eps` once from the declared redshift domain `[0, zmax]` and the
    /// level count, fixed for an entire run. All records in a batch then share
    /// the same resolution, at some precision cost for narrow PDFs.
    FromDomain {
        /// Upper bound of the redshift domain covered by the survey.
        zmax: f64,
    },
}

impl Default for ScalePolicy {
    fn default() -> Self {
        ScalePolicy::Adaptive
    }
}

//==================================================================================
// II. The Unified CodecConfig
//==================================================================================

/// The single, unified configuration for the pzpack encode path.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct CodecConfig {
    /// Fixed size of every encoded record in bytes. Must be a multiple of 4 so
    /// that records map cleanly onto 4-byte integer storage words in columnar
    /// stores.
    #[serde(default = "default_packet_size")]
    pub packet_size: usize,

    /// The number of quantile levels the adaptive encoder starts from. The
    /// encoder grows this in steps of 2 while the payload still fits, so the
    /// final record uses the densest quantile set the packet can hold.
    #[serde(default = "default_ini_quantiles")]
    pub ini_quantiles: usize,

    /// Endpoint mapping policy for q = 0 and q = 1.
    #[serde(default)]
    pub boundary_policy: BoundaryPolicy,

    /// Quantization-step derivation policy.
    #[serde(default)]
    pub scale_policy: ScalePolicy,

    /// If true, every freshly encoded packet is decoded back and compared
    /// against the source quantiles. Costs roughly 10% extra CPU; catches the
    /// rare pathological record where quantization shifts a quantile beyond
    /// `tolerance`.
    #[serde(default = "default_true")]
    pub validate: bool,

    /// Maximum permitted round-trip shift per quantile when `validate` is on.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            packet_size: default_packet_size(),
            ini_quantiles: default_ini_quantiles(),
            boundary_policy: BoundaryPolicy::default(),
            scale_policy: ScalePolicy::default(),
            validate: true,
            tolerance: default_tolerance(),
        }
    }
}

impl CodecConfig {
    /// Validates the config once at the boundary, before any records are
    /// processed.
    pub fn check(&self) -> Result<(), PzError> {
        if self.packet_size % 4 != 0 {
            return Err(PzError::InvalidArgument(format!(
                "packet_size must be a multiple of 4, got {}",
                self.packet_size
            )));
        }
        if self.packet_size < format::HEADER_LEN + 2 {
            return Err(PzError::InvalidArgument(format!(
                "packet_size {} leaves no room for a payload",
                self.packet_size
            )));
        }
        if self.ini_quantiles < 4 {
            return Err(PzError::InvalidArgument(format!(
                "ini_quantiles must be at least 4, got {}",
                self.ini_quantiles
            )));
        }
        if self.ini_quantiles > self.packet_size - format::HEADER_LEN + 2 {
            return Err(PzError::InvalidArgument(format!(
                "cannot fit {} quantiles in a {}-byte packet",
                self.ini_quantiles, self.packet_size
            )));
        }
        if !(self.tolerance > 0.0) {
            return Err(PzError::InvalidArgument(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if let ScalePolicy::FromDomain { zmax } = self.scale_policy {
            if !(zmax > 0.0) {
                return Err(PzError::InvalidArgument(format!(
                    "scale policy zmax must be positive, got {}",
                    zmax
                )));
            }
        }
        Ok(())
    }
}

/// Helper for `serde` to default the packet size.
fn default_packet_size() -> usize {
    format::DEFAULT_PACKET_SIZE
}

/// Helper for `serde` to default the initial quantile count.
fn default_ini_quantiles() -> usize {
    71
}

/// Helper for `serde` to default a boolean field to true.
fn default_true() -> bool {
    true
}

/// Helper for `serde` to default the validation tolerance.
fn default_tolerance() -> f64 {
    0.001
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let cfg = CodecConfig::default();
        cfg.check().unwrap();
        assert_eq!(cfg.packet_size, 80);
        assert_eq!(cfg.ini_quantiles, 71);
        assert!(cfg.validate);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let cfg: CodecConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, CodecConfig::default());

        let cfg: CodecConfig =
            serde_json::from_str(r#"{"packet_size": 40, "validate": false}"#).unwrap();
        assert_eq!(cfg.packet_size, 40);
        assert!(!cfg.validate);
        assert_eq!(cfg.boundary_policy, BoundaryPolicy::FirstSupport);
    }

    #[test]
    fn test_config_rejects_bad_packet_size() {
        let cfg = CodecConfig {
            packet_size: 42,
            ..CodecConfig::default()
        };
        assert!(matches!(cfg.check(), Err(PzError::InvalidArgument(_))));
    }

    #[test]
    fn test_config_rejects_oversized_quantile_count() {
        let cfg = CodecConfig {
            packet_size: 24,
            ini_quantiles: 71,
            ..CodecConfig::default()
        };
        assert!(matches!(cfg.check(), Err(PzError::InvalidArgument(_))));
    }
}
