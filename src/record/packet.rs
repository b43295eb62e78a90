// In: src/record/packet.rs

//! Assembles and parses the fixed-width encoded record, and provides the
//! efficient metadata "peek" (`analyze`) that inspects a record without
//! reconstructing a PDF.

use serde::Serialize;

use crate::error::PzError;
use crate::kernels::delta::{self, DeltaCode};
use crate::record::format::{
    self, RecordHeader, EPS_QUANTUM, ESCAPE_SENTINEL, HEADER_LEN,
};
use crate::types::QuantileSet;

//==================================================================================
// The Encoded Record
//==================================================================================

/// A fixed-size encoded record, immutable once produced.
///
/// An all-zero buffer is the *null record*: the conventional placeholder for
/// a source whose PDF could not be encoded. It keeps batch columns rectangular
/// without a separate validity column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRecord {
    bytes: Vec<u8>,
}

impl EncodedRecord {
    /// The null record of the given size.
    pub fn null(packet_size: usize) -> Self {
        debug_assert_eq!(packet_size % 4, 0);
        Self {
            bytes: vec![0u8; packet_size],
        }
    }

    /// Wraps raw bytes coming back from storage, checking the structural
    /// contract (4-byte alignment of the total size, room for a header).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PzError> {
        if bytes.len() % 4 != 0 || bytes.len() < HEADER_LEN + 2 {
            return Err(PzError::RecordFormat(format!(
                "record length {} is not a supported packet size",
                bytes.len()
            )));
        }
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    /// Reassembles a record from the 4-byte integer words of a columnar store.
    pub fn from_words(words: &[i32]) -> Result<Self, PzError> {
        Self::from_bytes(bytemuck::cast_slice(words))
    }

    /// The record as 4-byte integer words, the shape columnar stores persist.
    /// Byte order within each word is the record's own (little-endian) layout.
    pub fn to_words(&self) -> Vec<i32> {
        bytemuck::pod_collect_to_vec(&self.bytes)
    }

    pub fn is_null(&self) -> bool {
        self.bytes.iter().all(|&b| b == 0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

//==================================================================================
// Encode / Decode
//==================================================================================

/// Encodes a quantile set into a fixed-size record with the given
/// quantization step.
///
/// Returns the payload length actually used together with the record; the
/// adaptive encoder uses the length to decide whether a denser quantile set
/// would still fit. The packet is self-contained: anchor, top endpoint and
/// eps all live in the header.
pub fn encode_quantiles(
    quantiles: &[f64],
    eps: f64,
    packet_size: usize,
) -> Result<(usize, EncodedRecord), PzError> {
    if packet_size % 4 != 0 || packet_size < HEADER_LEN + 2 {
        return Err(PzError::InvalidArgument(format!(
            "unsupported packet size {}",
            packet_size
        )));
    }
    let m = quantiles.len();
    if m < 2 {
        return Err(PzError::InvalidArgument(format!(
            "cannot encode {} quantiles; need at least 2",
            m
        )));
    }
    let capacity = packet_size - HEADER_LEN;
    if m - 2 > capacity {
        return Err(PzError::RecordCapacity(format!(
            "cannot fit {} quantiles in a {}-byte packet",
            m, packet_size
        )));
    }

    let eps_code = (eps / EPS_QUANTUM).round();
    if !(eps_code >= 1.0) || eps_code > 255.0 {
        return Err(PzError::RecordCapacity(format!(
            "eps={:.6} does not fit one byte; increase the packet length or \
             decrease the number of quantiles",
            eps
        )));
    }
    let eps_code = eps_code as u8;
    // Quantize with the exact step the decoder will recover.
    let eps = eps_code as f64 * EPS_QUANTUM;

    let xmin_code = format::encode_anchor_floor(quantiles[0])?;
    let xmax_code = format::encode_anchor_ceil(quantiles[m - 1])?;
    let header = RecordHeader::new(eps_code, xmin_code, xmax_code);

    let codes = delta::quantize(&quantiles[1..m - 1], header.zmin(), eps)?;
    let payload_len: usize = codes.iter().map(DeltaCode::encoded_len).sum();
    if payload_len > capacity {
        return Err(PzError::RecordCapacity(format!(
            "payload of {} bytes does not fit a {}-byte packet",
            payload_len, packet_size
        )));
    }

    let mut bytes = vec![0u8; packet_size];
    header.write(&mut bytes);
    let mut payload = Vec::with_capacity(payload_len);
    delta::write_payload(&codes, &mut payload);
    bytes[HEADER_LEN..HEADER_LEN + payload_len].copy_from_slice(&payload);

    Ok((payload_len, EncodedRecord { bytes }))
}

/// Decodes a record back into its quantile set (endpoints included).
///
/// The inverse of [`encode_quantiles`]: dequantize the payload, running-sum
/// from the anchor, then append the top endpoint from the header.
pub fn decode_quantiles(bytes: &[u8]) -> Result<QuantileSet, PzError> {
    if bytes.iter().all(|&b| b == 0) {
        return Err(PzError::RecordFormat(
            "null (all-zero) record carries no PDF".to_string(),
        ));
    }
    let header = RecordHeader::read(bytes)?;
    let steps = delta::read_payload(&bytes[HEADER_LEN..])?;
    let mut z = delta::accumulate(header.zmin(), &steps, header.eps());
    z.push(header.zmax());
    Ok(QuantileSet::new(z))
}

//==================================================================================
// Record Analysis
//==================================================================================

/// Metadata peeked from a record without reconstructing the PDF.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RecordStats {
    pub format_version: u8,
    pub packet_size: usize,
    pub eps: f64,
    pub zmin: f64,
    pub zmax: f64,
    /// Number of quantile levels the record stores (endpoints included).
    pub num_levels: usize,
    /// Payload bytes in use, excluding padding.
    pub payload_len: usize,
    /// How many deltas needed the wide escape form.
    pub wide_deltas: usize,
}

impl RecordStats {
    /// The stats as a JSON string, for diagnostics and logs.
    pub fn to_json(&self) -> Result<String, PzError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Inspects a record's header and payload structure.
pub fn analyze(bytes: &[u8]) -> Result<RecordStats, PzError> {
    let header = RecordHeader::read(bytes)?;
    let payload = &bytes[HEADER_LEN..];

    let mut payload_len = 0usize;
    let mut deltas = 0usize;
    let mut wide = 0usize;
    let mut i = 0;
    while i < payload.len() {
        let b = payload[i];
        if b == 0 && payload[i..].iter().all(|&x| x == 0) {
            break;
        }
        if b == ESCAPE_SENTINEL {
            if i + 3 > payload.len() {
                return Err(PzError::RecordFormat(
                    "escape code truncated at end of payload".to_string(),
                ));
            }
            wide += 1;
            i += 3;
        } else {
            i += 1;
        }
        deltas += 1;
        payload_len = i;
    }

    Ok(RecordStats {
        format_version: header.version,
        packet_size: bytes.len(),
        eps: header.eps(),
        zmin: header.zmin(),
        zmax: header.zmax(),
        num_levels: deltas + 2,
        payload_len,
        wide_deltas: wide,
    })
}
