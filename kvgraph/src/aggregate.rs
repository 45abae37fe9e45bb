// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Vertex/edge counts and per-vertex degrees
//!
//! Counters are ordinary records of the graph keyspace. Mutations never write
//! them directly: they add `Increment` ops to the batch that carries the
//! adjacency change, so a counter moves if and only if the guarded batch
//! applies.

use crate::codec::{KeyCodec, KeyKind, EDGE_COUNT_KEY, VERTEX_COUNT_KEY};
use crate::error::{GraphError, GraphResult};
use crate::storage::{decode_counter, encode_counter, SharedTree, StorageTree, WriteBatch};
use crate::types::{Direction, VertexId};
use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outcome of [`AggregateTracker::rebuild_counters`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterReport {
    /// Vertex markers found
    pub vertices: u64,
    /// Forward entries found
    pub edges: u64,
    /// Counter records that disagree with the scan (rewritten when repairing)
    pub corrected: usize,
    /// Adjacency entries whose mirror entry is missing
    pub dangling: usize,
}

impl CounterReport {
    pub fn is_consistent(&self) -> bool {
        self.corrected == 0 && self.dangling == 0
    }
}

#[derive(Clone)]
pub struct AggregateTracker {
    codec: KeyCodec,
    tree: SharedTree,
}

impl AggregateTracker {
    pub fn new(codec: KeyCodec, tree: SharedTree) -> Self {
        Self { codec, tree }
    }

    fn read_counter(&self, key: &[u8]) -> GraphResult<u64> {
        let value = match self.tree.get(key)? {
            Some(raw) => decode_counter(key, &raw)?,
            None => 0,
        };
        u64::try_from(value).map_err(|_| {
            GraphError::CorruptValue(format!("counter {:02x?} is negative ({})", key, value))
        })
    }

    pub fn count_vertex(&self) -> GraphResult<u64> {
        self.read_counter(VERTEX_COUNT_KEY)
    }

    pub fn count_edge(&self) -> GraphResult<u64> {
        self.read_counter(EDGE_COUNT_KEY)
    }

    /// Exact degree, counted from the adjacency range of `id`
    pub fn degree(&self, id: VertexId, direction: Direction) -> GraphResult<u64> {
        let prefix = self.codec.adjacency_prefix(id, direction);
        let mut degree = 0u64;
        for entry in self.tree.scan_prefix(&prefix)? {
            let (key, _) = entry?;
            self.codec.decode_neighbour(&prefix, &key)?;
            degree += 1;
        }
        trace!("Scanned {} degree of {}: {}", direction, id, degree);
        Ok(degree)
    }

    /// Maintained degree counter of `id`
    pub fn degree_fast(&self, id: VertexId, direction: Direction) -> GraphResult<u64> {
        self.read_counter(&self.codec.degree_key(id, direction))
    }

    pub fn record_vertex_insert(&self, batch: &mut WriteBatch) {
        batch.increment(VERTEX_COUNT_KEY.to_vec(), 1);
    }

    pub fn record_edge_insert(&self, batch: &mut WriteBatch, source: VertexId, target: VertexId) {
        self.record_edge_delta(batch, source, target, 1);
    }

    pub fn record_edge_removal(&self, batch: &mut WriteBatch, source: VertexId, target: VertexId) {
        self.record_edge_delta(batch, source, target, -1);
    }

    fn record_edge_delta(
        &self,
        batch: &mut WriteBatch,
        source: VertexId,
        target: VertexId,
        delta: i64,
    ) {
        batch
            .increment(self.codec.degree_key(source, Direction::Out), delta)
            .increment(self.codec.degree_key(target, Direction::In), delta)
            .increment(EDGE_COUNT_KEY.to_vec(), delta);
    }

    /// Recompute every counter from the adjacency entries and vertex markers
    ///
    /// Drifted counters are rewritten in a single batch. Must not run
    /// concurrently with mutations, or the rewritten values may be stale.
    pub fn rebuild_counters(&self) -> GraphResult<CounterReport> {
        self.reconcile(true)
    }

    /// Same scan as [`rebuild_counters`](Self::rebuild_counters), without writing
    pub fn verify_counters(&self) -> GraphResult<CounterReport> {
        self.reconcile(false)
    }

    fn reconcile(&self, repair: bool) -> GraphResult<CounterReport> {
        let mut report = CounterReport::default();
        let mut computed: HashMap<(VertexId, Direction), i64> = HashMap::new();
        let mut stored: HashMap<(VertexId, Direction), StoredCounter> = HashMap::new();

        for entry in self.tree.iter()? {
            let (key, value) = entry?;
            match self.codec.classify(&key)? {
                KeyKind::Meta(_) => {}
                KeyKind::Vertex(_) => report.vertices += 1,
                KeyKind::Adjacency {
                    direction,
                    vertex,
                    neighbour,
                } => {
                    *computed.entry((vertex, direction)).or_insert(0) += 1;
                    let mirror = match direction {
                        Direction::Out => {
                            report.edges += 1;
                            self.codec.reverse_key(vertex, neighbour)
                        }
                        Direction::In => self.codec.forward_key(neighbour, vertex),
                    };
                    if !self.tree.contains_key(&mirror)? {
                        warn!(
                            "Dangling {} entry {} -> {} has no mirror",
                            direction, vertex, neighbour
                        );
                        report.dangling += 1;
                    }
                }
                KeyKind::Degree { vertex, direction } => {
                    let counter = StoredCounter::read(&key, Some(value.as_slice()));
                    stored.insert((vertex, direction), counter);
                }
            }
        }

        let mut batch = WriteBatch::new();
        for (&slot, &current) in &stored {
            let expected = computed.get(&slot).copied().unwrap_or(0);
            let key = self.codec.degree_key(slot.0, slot.1);
            if stage_counter(&mut batch, key, current, expected) {
                report.corrected += 1;
            }
        }
        for (&slot, &expected) in &computed {
            if !stored.contains_key(&slot) {
                let key = self.codec.degree_key(slot.0, slot.1);
                if stage_counter(&mut batch, key, StoredCounter::Absent, expected) {
                    report.corrected += 1;
                }
            }
        }
        for (key, expected) in [
            (VERTEX_COUNT_KEY, report.vertices),
            (EDGE_COUNT_KEY, report.edges),
        ] {
            let current = StoredCounter::read(key, self.tree.get(key)?.as_deref());
            if stage_counter(&mut batch, key.to_vec(), current, expected as i64) {
                report.corrected += 1;
            }
        }

        if batch.is_empty() {
            debug!("All counters consistent");
        } else if repair {
            self.tree.apply_batch(&batch)?;
            info!("Rebuilt {} counters", report.corrected);
        }
        Ok(report)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoredCounter {
    Absent,
    Value(i64),
    Malformed,
}

impl StoredCounter {
    fn read(key: &[u8], raw: Option<&[u8]>) -> Self {
        match raw {
            None => StoredCounter::Absent,
            Some(raw) => match decode_counter(key, raw) {
                Ok(value) => StoredCounter::Value(value),
                Err(_) => StoredCounter::Malformed,
            },
        }
    }

    fn matches(self, expected: i64) -> bool {
        match self {
            StoredCounter::Absent => expected == 0,
            StoredCounter::Value(value) => value == expected,
            StoredCounter::Malformed => false,
        }
    }
}

/// Queue a rewrite of `key` unless it already holds `expected`
fn stage_counter(
    batch: &mut WriteBatch,
    key: Vec<u8>,
    current: StoredCounter,
    expected: i64,
) -> bool {
    if current.matches(expected) {
        return false;
    }
    warn!(
        "Counter {:02x?} drifted: stored {:?}, actual {}",
        key, current, expected
    );
    if expected == 0 {
        batch.remove(key);
    } else {
        batch.insert(key, encode_counter(expected).to_vec());
    }
    true
}
