// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Guarded atomic write batches
//!
//! A [`WriteBatch`] is a list of presence preconditions followed by a list of
//! writes. Drivers apply it as one atomic unit: either every precondition
//! holds and every write becomes visible together, or nothing is written.
//!
//! Counters live in the same keyspace as ordinary records, encoded as 8-byte
//! big-endian `i64`. An absent counter reads as zero and a counter that drops
//! back to zero is removed.

use super::types::{StorageDriverError, StorageResult};

/// Width of an encoded counter value
pub const COUNTER_WIDTH: usize = 8;

/// Encode a counter value
pub fn encode_counter(value: i64) -> [u8; COUNTER_WIDTH] {
    value.to_be_bytes()
}

/// Decode a counter value read from `key`
pub fn decode_counter(key: &[u8], bytes: &[u8]) -> StorageResult<i64> {
    let raw: [u8; COUNTER_WIDTH] =
        bytes
            .try_into()
            .map_err(|_| StorageDriverError::CorruptValue {
                key: key.to_vec(),
                reason: format!(
                    "counter must be {} bytes, found {}",
                    COUNTER_WIDTH,
                    bytes.len()
                ),
            })?;
    Ok(i64::from_be_bytes(raw))
}

/// Apply `delta` to a counter, failing on overflow
pub fn apply_delta(key: &[u8], current: i64, delta: i64) -> StorageResult<i64> {
    current
        .checked_add(delta)
        .ok_or_else(|| StorageDriverError::CorruptValue {
            key: key.to_vec(),
            reason: format!("counter overflow applying {} to {}", delta, current),
        })
}

/// Presence check evaluated before any write of the batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    Present(Vec<u8>),
    Absent(Vec<u8>),
}

impl Precondition {
    pub fn key(&self) -> &[u8] {
        match self {
            Precondition::Present(key) | Precondition::Absent(key) => key,
        }
    }

    /// Whether the precondition holds given the key's current presence
    pub fn holds(&self, present: bool) -> bool {
        match self {
            Precondition::Present(_) => present,
            Precondition::Absent(_) => !present,
        }
    }
}

/// A single write inside a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Insert { key: Vec<u8>, value: Vec<u8> },
    Remove { key: Vec<u8> },
    /// Add `delta` to the counter stored at `key`
    Increment { key: Vec<u8>, delta: i64 },
}

/// Ordered list of guarded writes applied atomically by a [`StorageTree`](super::StorageTree)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    preconditions: Vec<Precondition>,
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only apply the batch if `key` is currently present
    pub fn require_present(&mut self, key: Vec<u8>) -> &mut Self {
        self.preconditions.push(Precondition::Present(key));
        self
    }

    /// Only apply the batch if `key` is currently absent
    pub fn require_absent(&mut self, key: Vec<u8>) -> &mut Self {
        self.preconditions.push(Precondition::Absent(key));
        self
    }

    pub fn insert(&mut self, key: Vec<u8>, value: Vec<u8>) -> &mut Self {
        self.ops.push(BatchOp::Insert { key, value });
        self
    }

    pub fn remove(&mut self, key: Vec<u8>) -> &mut Self {
        self.ops.push(BatchOp::Remove { key });
        self
    }

    pub fn increment(&mut self, key: Vec<u8>, delta: i64) -> &mut Self {
        if delta != 0 {
            self.ops.push(BatchOp::Increment { key, delta });
        }
        self
    }

    pub fn preconditions(&self) -> &[Precondition] {
        &self.preconditions
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }
}
