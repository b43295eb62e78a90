// In: src/record/format.rs

//! Defines the on-disk layout of an encoded record. This is the single source
//! of truth for the byte-level contract that independent encoder and decoder
//! implementations must agree on.
//!
//! Record layout (format version 1), `packet_size` bytes total:
//!
//! ```text
//! byte 0      format version (1); an all-zero packet is a null record
//! byte 1      eps_code: quantization step, eps = eps_code * 1e-5
//! bytes 2..4  xmin_code (u16 LE): bottom quantile, z = code * 2e-4 - 0.01
//! bytes 4..6  xmax_code (u16 LE): top quantile, same scaling
//! bytes 6..   delta payload for the interior quantiles, zero-padded
//! ```
//!
//! Each payload entry is one byte in `0..=254`, or the escape sentinel `255`
//! followed by a big-endian u16. The derivation rules for the level sequence
//! and the anchor/eps quanta are part of the version: bumping any of them
//! means bumping `RECORD_VERSION`, so encoder and decoder built from
//! different versions can never silently misinterpret bytes.

use serde::Serialize;

use crate::error::PzError;

//==================================================================================
// Format Constants
//==================================================================================

/// The current version of the record format.
pub const RECORD_VERSION: u8 = 1;
/// Header length in bytes: version(1) + eps(1) + xmin(2) + xmax(2).
pub const HEADER_LEN: usize = 6;
/// Default fixed record size in bytes. Must be a multiple of 4.
pub const DEFAULT_PACKET_SIZE: usize = 80;

/// The reserved payload byte that tags the wide (two-byte) delta form.
pub const ESCAPE_SENTINEL: u8 = 0xFF;
/// Largest step count the narrow single-byte form can carry.
pub const MAX_NARROW_STEPS: u32 = 254;
/// Largest step count the wide escape form can carry.
pub const MAX_WIDE_STEPS: u32 = u16::MAX as u32;

/// Resolution of the quantization step stored in `eps_code`.
pub const EPS_QUANTUM: f64 = 1e-5;
/// Resolution of the endpoint anchors.
pub const ANCHOR_STEP: f64 = 2e-4;
/// Offset applied to the anchors, leaving headroom for slightly negative
/// redshifts from noisy fits.
pub const ANCHOR_OFFSET: f64 = 0.01;

//==================================================================================
// Anchor Codec
//==================================================================================

/// Quantizes a redshift to an anchor code, rounding down. Used for the bottom
/// endpoint so the recovered anchor never overshoots the first quantile.
pub fn encode_anchor_floor(z: f64) -> Result<u16, PzError> {
    anchor_code(((z + ANCHOR_OFFSET) / ANCHOR_STEP).floor(), z)
}

/// Quantizes a redshift to an anchor code, rounding up. Used for the top
/// endpoint so the recovered bound never undershoots the last quantile.
pub fn encode_anchor_ceil(z: f64) -> Result<u16, PzError> {
    anchor_code(((z + ANCHOR_OFFSET) / ANCHOR_STEP).ceil(), z)
}

/// The redshift an anchor code stands for.
pub fn decode_anchor(code: u16) -> f64 {
    code as f64 * ANCHOR_STEP - ANCHOR_OFFSET
}

fn anchor_code(scaled: f64, z: f64) -> Result<u16, PzError> {
    if !scaled.is_finite() || scaled < 0.0 || scaled > u16::MAX as f64 {
        return Err(PzError::RecordCapacity(format!(
            "redshift {} is outside the representable anchor range [{}, {}]",
            z,
            decode_anchor(0),
            decode_anchor(u16::MAX)
        )));
    }
    Ok(scaled as u16)
}

//==================================================================================
// Record Header
//==================================================================================

/// The parsed fixed-size header of an encoded record.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub version: u8,
    pub eps_code: u8,
    pub xmin_code: u16,
    pub xmax_code: u16,
}

impl RecordHeader {
    pub fn new(eps_code: u8, xmin_code: u16, xmax_code: u16) -> Self {
        Self {
            version: RECORD_VERSION,
            eps_code,
            xmin_code,
            xmax_code,
        }
    }

    /// The quantization step this record was encoded with.
    pub fn eps(&self) -> f64 {
        self.eps_code as f64 * EPS_QUANTUM
    }

    /// The bottom quantile (payload anchor).
    pub fn zmin(&self) -> f64 {
        decode_anchor(self.xmin_code)
    }

    /// The top quantile.
    pub fn zmax(&self) -> f64 {
        decode_anchor(self.xmax_code)
    }

    /// Writes the header into the first [`HEADER_LEN`] bytes of `buf`.
    pub fn write(&self, buf: &mut [u8]) {
        buf[0] = self.version;
        buf[1] = self.eps_code;
        buf[2..4].copy_from_slice(&self.xmin_code.to_le_bytes());
        buf[4..6].copy_from_slice(&self.xmax_code.to_le_bytes());
    }

    /// Parses and sanity-checks a header from the front of a record.
    pub fn read(bytes: &[u8]) -> Result<Self, PzError> {
        if bytes.len() < HEADER_LEN {
            return Err(PzError::RecordFormat(format!(
                "record of {} bytes is shorter than the {}-byte header",
                bytes.len(),
                HEADER_LEN
            )));
        }
        let version = bytes[0];
        if version != RECORD_VERSION {
            return Err(PzError::RecordFormat(format!(
                "unsupported record format version {} (expected {})",
                version, RECORD_VERSION
            )));
        }
        let eps_code = bytes[1];
        if eps_code == 0 {
            return Err(PzError::RecordFormat(
                "corrupt header: eps_code is zero".to_string(),
            ));
        }
        let xmin_code = u16::from_le_bytes([bytes[2], bytes[3]]);
        let xmax_code = u16::from_le_bytes([bytes[4], bytes[5]]);
        if xmax_code < xmin_code {
            return Err(PzError::RecordFormat(format!(
                "corrupt header: xmax code {} below xmin code {}",
                xmax_code, xmin_code
            )));
        }
        Ok(Self {
            version,
            eps_code,
            xmin_code,
            xmax_code,
        })
    }
}

//==================================================================================
// Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_write_read_roundtrip() {
        let header = RecordHeader::new(17, 55, 3200);
        let mut buf = [0u8; HEADER_LEN];
        header.write(&mut buf);
        let parsed = RecordHeader::read(&buf).unwrap();
        assert_eq!(parsed, header);
        assert!((parsed.eps() - 17e-5).abs() < 1e-12);
    }

    #[test]
    fn test_anchor_floor_and_ceil_bracket_the_value() {
        let z = 0.123456;
        let lo = decode_anchor(encode_anchor_floor(z).unwrap());
        let hi = decode_anchor(encode_anchor_ceil(z).unwrap());
        assert!(lo <= z && z <= hi);
        assert!(hi - lo <= ANCHOR_STEP + 1e-12);
    }

    #[test]
    fn test_anchor_handles_slightly_negative_redshift() {
        let code = encode_anchor_floor(-0.005).unwrap();
        assert!((decode_anchor(code) - -0.0050).abs() < ANCHOR_STEP);
    }

    #[test]
    fn test_anchor_rejects_out_of_range_redshift() {
        assert!(matches!(
            encode_anchor_ceil(20.0),
            Err(PzError::RecordCapacity(_))
        ));
        assert!(matches!(
            encode_anchor_floor(-0.5),
            Err(PzError::RecordCapacity(_))
        ));
    }

    #[test]
    fn test_header_rejects_bad_version_and_order() {
        let header = RecordHeader::new(5, 100, 200);
        let mut buf = [0u8; HEADER_LEN];
        header.write(&mut buf);

        let mut bad_version = buf;
        bad_version[0] = 9;
        assert!(matches!(
            RecordHeader::read(&bad_version),
            Err(PzError::RecordFormat(_))
        ));

        let swapped = RecordHeader::new(5, 300, 200);
        let mut buf2 = [0u8; HEADER_LEN];
        swapped.write(&mut buf2);
        assert!(matches!(
            RecordHeader::read(&buf2),
            Err(PzError::RecordFormat(_))
        ));
    }
}
