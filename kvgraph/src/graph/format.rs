// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Format descriptor stamped into every graph keyspace
//!
//! Stored as bincode followed by a big-endian CRC32 of the bincode bytes.

use crate::codec::{EncodingPolicy, IdEncoding, KeyLayout};
use crate::error::{GraphError, GraphResult};
use serde::{Deserialize, Serialize};

/// Layout version written by this crate
pub const FORMAT_VERSION: u32 = 1;

const CHECKSUM_WIDTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatDescriptor {
    pub version: u32,
    pub layout: KeyLayout,
    pub encoding: IdEncoding,
}

impl FormatDescriptor {
    pub fn new(policy: EncodingPolicy) -> Self {
        Self {
            version: FORMAT_VERSION,
            layout: policy.layout,
            encoding: policy.encoding,
        }
    }

    pub fn policy(&self) -> EncodingPolicy {
        EncodingPolicy::new(self.layout, self.encoding)
    }

    pub fn encode(&self) -> GraphResult<Vec<u8>> {
        let mut bytes = bincode::serialize(self)
            .map_err(|e| GraphError::CorruptValue(format!("format descriptor: {}", e)))?;
        let checksum = crc32fast::hash(&bytes);
        bytes.extend_from_slice(&checksum.to_be_bytes());
        Ok(bytes)
    }

    pub fn decode(bytes: &[u8]) -> GraphResult<Self> {
        if bytes.len() < CHECKSUM_WIDTH {
            return Err(GraphError::CorruptValue(
                "format descriptor too short".to_string(),
            ));
        }
        let (body, checksum) = bytes.split_at(bytes.len() - CHECKSUM_WIDTH);
        let mut expected = [0u8; CHECKSUM_WIDTH];
        expected.copy_from_slice(checksum);
        if crc32fast::hash(body) != u32::from_be_bytes(expected) {
            return Err(GraphError::CorruptValue(
                "format descriptor checksum mismatch".to_string(),
            ));
        }
        let descriptor: FormatDescriptor = bincode::deserialize(body)
            .map_err(|e| GraphError::CorruptValue(format!("format descriptor: {}", e)))?;
        if descriptor.version != FORMAT_VERSION {
            return Err(GraphError::OpenError(format!(
                "unsupported format version {} (expected {})",
                descriptor.version, FORMAT_VERSION
            )));
        }
        Ok(descriptor)
    }
}
