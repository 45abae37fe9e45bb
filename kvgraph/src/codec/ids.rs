// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Order-preserving vertex identifier encodings
//!
//! Both encodings map `i64` to bytes such that unsigned lexicographic order of
//! the bytes equals numeric order of the ids, and neither encoding is a prefix
//! of another id's encoding.
//!
//! ## FixedWidth
//!
//! XOR with `0x8000_0000_0000_0000` flips the sign bit, then 8 bytes
//! big-endian. Negative ids sort before positive ones.
//!
//! ## Varint
//!
//! One header byte followed by a minimal big-endian payload:
//!
//! - `id >= 0`: header `0x80 + n`, payload is the `n` low bytes of `id`
//!   (`n = 0` for zero)
//! - `id < 0`: with `m = !id` (that is `-id - 1`), header `0x7F - n`, payload
//!   is the `n` low bytes of `!m`
//!
//! `n` never exceeds 8, so headers fall in `0x77..=0x88`. Longer negative
//! payloads get smaller headers, which keeps large magnitudes ordered first.

use super::policy::IdEncoding;
use crate::error::{GraphError, GraphResult};
use crate::types::VertexId;

const SIGN_FLIP: u64 = 0x8000_0000_0000_0000;
const FIXED_WIDTH: usize = 8;
const VARINT_NON_NEGATIVE_BASE: u8 = 0x80;
const VARINT_NEGATIVE_BASE: u8 = 0x7F;
const MAX_PAYLOAD: usize = 8;

/// Number of bytes needed to hold `value` without leading zero bytes
fn minimal_len(value: u64) -> usize {
    ((64 - value.leading_zeros() as usize) + 7) / 8
}

fn low_bytes_mask(len: usize) -> u64 {
    if len >= MAX_PAYLOAD {
        u64::MAX
    } else {
        (1u64 << (len * 8)) - 1
    }
}

fn read_be(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b))
}

impl IdEncoding {
    /// Append the encoding of `id` to `buf`
    pub fn encode_into(self, id: VertexId, buf: &mut Vec<u8>) {
        match self {
            IdEncoding::FixedWidth => {
                buf.extend_from_slice(&((id.0 as u64) ^ SIGN_FLIP).to_be_bytes());
            }
            IdEncoding::Varint => {
                if id.0 >= 0 {
                    let value = id.0 as u64;
                    let len = minimal_len(value);
                    buf.push(VARINT_NON_NEGATIVE_BASE + len as u8);
                    buf.extend_from_slice(&value.to_be_bytes()[MAX_PAYLOAD - len..]);
                } else {
                    let magnitude = (!id.0) as u64;
                    let len = minimal_len(magnitude);
                    buf.push(VARINT_NEGATIVE_BASE - len as u8);
                    buf.extend_from_slice(&(!magnitude).to_be_bytes()[MAX_PAYLOAD - len..]);
                }
            }
        }
    }

    /// Upper bound of the encoded size, for buffer sizing
    pub fn max_len(self) -> usize {
        match self {
            IdEncoding::FixedWidth => FIXED_WIDTH,
            IdEncoding::Varint => 1 + MAX_PAYLOAD,
        }
    }

    /// Decode one id from the front of `bytes`
    ///
    /// Returns the id and the number of bytes consumed. `key` is only used to
    /// report which record was malformed.
    pub fn decode(self, bytes: &[u8], key: &[u8]) -> GraphResult<(VertexId, usize)> {
        match self {
            IdEncoding::FixedWidth => {
                if bytes.len() < FIXED_WIDTH {
                    return Err(GraphError::corrupt_key(
                        key,
                        format!(
                            "fixed-width id needs {} bytes, found {}",
                            FIXED_WIDTH,
                            bytes.len()
                        ),
                    ));
                }
                let raw = read_be(&bytes[..FIXED_WIDTH]);
                Ok((VertexId((raw ^ SIGN_FLIP) as i64), FIXED_WIDTH))
            }
            IdEncoding::Varint => {
                let header = *bytes
                    .first()
                    .ok_or_else(|| GraphError::corrupt_key(key, "missing varint header"))?;
                let (negative, len) = if header >= VARINT_NON_NEGATIVE_BASE {
                    (false, usize::from(header - VARINT_NON_NEGATIVE_BASE))
                } else {
                    (true, usize::from(VARINT_NEGATIVE_BASE - header))
                };
                if len > MAX_PAYLOAD {
                    return Err(GraphError::corrupt_key(
                        key,
                        format!("varint header {:#04x} out of range", header),
                    ));
                }
                let payload = bytes.get(1..1 + len).ok_or_else(|| {
                    GraphError::corrupt_key(key, format!("varint payload truncated, want {}", len))
                })?;
                let raw = read_be(payload);
                let magnitude = if negative {
                    !raw & low_bytes_mask(len)
                } else {
                    raw
                };
                if minimal_len(magnitude) != len || magnitude > i64::MAX as u64 {
                    return Err(GraphError::corrupt_key(key, "non-canonical varint id"));
                }
                let id = if negative {
                    !(magnitude as i64)
                } else {
                    magnitude as i64
                };
                Ok((VertexId(id), 1 + len))
            }
        }
    }
}
