// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Key codec
//!
//! Maps vertices, adjacency entries and counters onto byte keys of one ordered
//! keyspace. Under every policy:
//!
//! - the forward entries of a source sort contiguously, by ascending target
//! - the reverse entries of a target sort contiguously, by ascending source
//! - markers, counters and metadata never fall inside an adjacency range
//!
//! ## Partitioned layout
//!
//! ```text
//! 10 <v>              vertex marker
//! 11 <src> <dst>      forward entry
//! 12 <dst> <src>      reverse entry
//! 13 <v> <dir>        degree counter
//! ```
//!
//! ## Vertex-clustered layout
//!
//! ```text
//! 20 <v> 00           vertex marker
//! 20 <src> 01 <dst>   forward entry
//! 20 <dst> 02 <src>   reverse entry
//! 20 <v> 03 <dir>     degree counter
//! ```
//!
//! Metadata lives under tag `00` for both layouts.

pub mod ids;
pub mod policy;

pub use policy::{EncodingPolicy, IdEncoding, KeyLayout};

use crate::error::{GraphError, GraphResult};
use crate::types::{Direction, VertexId};

/// Namespace tag of metadata records
pub const META_TAG: u8 = 0x00;
/// Format descriptor record
pub const FORMAT_KEY: &[u8] = b"\x00format";
/// Global vertex counter
pub const VERTEX_COUNT_KEY: &[u8] = b"\x00count/vertices";
/// Global edge counter
pub const EDGE_COUNT_KEY: &[u8] = b"\x00count/edges";

const PARTITIONED_VERTEX: u8 = 0x10;
const PARTITIONED_FORWARD: u8 = 0x11;
const PARTITIONED_REVERSE: u8 = 0x12;
const PARTITIONED_DEGREE: u8 = 0x13;

const CLUSTERED_TAG: u8 = 0x20;
const CLUSTERED_VERTEX: u8 = 0x00;
const CLUSTERED_FORWARD: u8 = 0x01;
const CLUSTERED_REVERSE: u8 = 0x02;
const CLUSTERED_DEGREE: u8 = 0x03;

/// Decoded form of any key in a graph keyspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyKind {
    /// Metadata record; carries the name after the tag
    Meta(Vec<u8>),
    Vertex(VertexId),
    /// Adjacency entry of `vertex`: a forward entry for [`Direction::Out`],
    /// a reverse entry for [`Direction::In`]
    Adjacency {
        direction: Direction,
        vertex: VertexId,
        neighbour: VertexId,
    },
    Degree {
        vertex: VertexId,
        direction: Direction,
    },
}

/// Encodes and decodes keys under one [`EncodingPolicy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCodec {
    policy: EncodingPolicy,
}

impl KeyCodec {
    pub fn new(policy: EncodingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> EncodingPolicy {
        self.policy
    }

    fn buffer(&self, ids: usize) -> Vec<u8> {
        Vec::with_capacity(3 + ids * self.policy.encoding.max_len())
    }

    fn push_id(&self, id: VertexId, buf: &mut Vec<u8>) {
        self.policy.encoding.encode_into(id, buf);
    }

    fn adjacency_tags(direction: Direction) -> (u8, u8) {
        match direction {
            Direction::Out => (PARTITIONED_FORWARD, CLUSTERED_FORWARD),
            Direction::In => (PARTITIONED_REVERSE, CLUSTERED_REVERSE),
        }
    }

    /// Marker written by AddVertex
    pub fn vertex_key(&self, id: VertexId) -> Vec<u8> {
        let mut key = self.buffer(1);
        match self.policy.layout {
            KeyLayout::Partitioned => {
                key.push(PARTITIONED_VERTEX);
                self.push_id(id, &mut key);
            }
            KeyLayout::VertexClustered => {
                key.push(CLUSTERED_TAG);
                self.push_id(id, &mut key);
                key.push(CLUSTERED_VERTEX);
            }
        }
        key
    }

    /// Key range holding the `direction` neighbours of `id`
    pub fn adjacency_prefix(&self, id: VertexId, direction: Direction) -> Vec<u8> {
        let (partitioned, clustered) = Self::adjacency_tags(direction);
        let mut key = self.buffer(2);
        match self.policy.layout {
            KeyLayout::Partitioned => {
                key.push(partitioned);
                self.push_id(id, &mut key);
            }
            KeyLayout::VertexClustered => {
                key.push(CLUSTERED_TAG);
                self.push_id(id, &mut key);
                key.push(clustered);
            }
        }
        key
    }

    /// Adjacency entry of `vertex` pointing at `neighbour`
    pub fn adjacency_key(
        &self,
        direction: Direction,
        vertex: VertexId,
        neighbour: VertexId,
    ) -> Vec<u8> {
        let mut key = self.adjacency_prefix(vertex, direction);
        self.push_id(neighbour, &mut key);
        key
    }

    /// Forward entry of the edge `source -> target`
    pub fn forward_key(&self, source: VertexId, target: VertexId) -> Vec<u8> {
        self.adjacency_key(Direction::Out, source, target)
    }

    /// Reverse entry of the edge `source -> target`, stored under the target
    pub fn reverse_key(&self, source: VertexId, target: VertexId) -> Vec<u8> {
        self.adjacency_key(Direction::In, target, source)
    }

    /// Cached degree counter of `id` for one direction
    pub fn degree_key(&self, id: VertexId, direction: Direction) -> Vec<u8> {
        let mut key = self.buffer(1);
        match self.policy.layout {
            KeyLayout::Partitioned => {
                key.push(PARTITIONED_DEGREE);
                self.push_id(id, &mut key);
            }
            KeyLayout::VertexClustered => {
                key.push(CLUSTERED_TAG);
                self.push_id(id, &mut key);
                key.push(CLUSTERED_DEGREE);
            }
        }
        key.push(direction.tag());
        key
    }

    /// Extract the neighbour id from an adjacency key found under `prefix`
    pub fn decode_neighbour(&self, prefix: &[u8], key: &[u8]) -> GraphResult<VertexId> {
        let rest = key
            .strip_prefix(prefix)
            .ok_or_else(|| GraphError::corrupt_key(key, "key outside of scanned range"))?;
        let (neighbour, used) = self.policy.encoding.decode(rest, key)?;
        if used != rest.len() {
            return Err(GraphError::corrupt_key(
                key,
                "trailing bytes after neighbour id",
            ));
        }
        Ok(neighbour)
    }

    /// Decode any key of the keyspace into its record kind
    pub fn classify(&self, key: &[u8]) -> GraphResult<KeyKind> {
        let (&tag, rest) = key
            .split_first()
            .ok_or_else(|| GraphError::corrupt_key(key, "empty key"))?;
        if tag == META_TAG {
            return Ok(KeyKind::Meta(rest.to_vec()));
        }

        match (self.policy.layout, tag) {
            (KeyLayout::Partitioned, PARTITIONED_VERTEX) => {
                let (vertex, tail) = self.decode_id(rest, key)?;
                expect_end(tail, key)?;
                Ok(KeyKind::Vertex(vertex))
            }
            (KeyLayout::Partitioned, PARTITIONED_FORWARD | PARTITIONED_REVERSE) => {
                let direction = if tag == PARTITIONED_FORWARD {
                    Direction::Out
                } else {
                    Direction::In
                };
                let (vertex, tail) = self.decode_id(rest, key)?;
                let (neighbour, tail) = self.decode_id(tail, key)?;
                expect_end(tail, key)?;
                Ok(KeyKind::Adjacency {
                    direction,
                    vertex,
                    neighbour,
                })
            }
            (KeyLayout::Partitioned, PARTITIONED_DEGREE) => {
                let (vertex, tail) = self.decode_id(rest, key)?;
                let direction = decode_direction(tail, key)?;
                Ok(KeyKind::Degree { vertex, direction })
            }
            (KeyLayout::VertexClustered, CLUSTERED_TAG) => {
                let (vertex, tail) = self.decode_id(rest, key)?;
                let (&kind, tail) = tail
                    .split_first()
                    .ok_or_else(|| GraphError::corrupt_key(key, "missing record kind"))?;
                match kind {
                    CLUSTERED_VERTEX => {
                        expect_end(tail, key)?;
                        Ok(KeyKind::Vertex(vertex))
                    }
                    CLUSTERED_FORWARD | CLUSTERED_REVERSE => {
                        let direction = if kind == CLUSTERED_FORWARD {
                            Direction::Out
                        } else {
                            Direction::In
                        };
                        let (neighbour, tail) = self.decode_id(tail, key)?;
                        expect_end(tail, key)?;
                        Ok(KeyKind::Adjacency {
                            direction,
                            vertex,
                            neighbour,
                        })
                    }
                    CLUSTERED_DEGREE => {
                        let direction = decode_direction(tail, key)?;
                        Ok(KeyKind::Degree { vertex, direction })
                    }
                    other => Err(GraphError::corrupt_key(
                        key,
                        format!("unknown record kind {:#04x}", other),
                    )),
                }
            }
            (layout, other) => Err(GraphError::corrupt_key(
                key,
                format!("tag {:#04x} is not used by the {} layout", other, layout),
            )),
        }
    }

    fn decode_id<'k>(&self, bytes: &'k [u8], key: &[u8]) -> GraphResult<(VertexId, &'k [u8])> {
        let (id, used) = self.policy.encoding.decode(bytes, key)?;
        Ok((id, &bytes[used..]))
    }
}

fn expect_end(tail: &[u8], key: &[u8]) -> GraphResult<()> {
    if tail.is_empty() {
        Ok(())
    } else {
        Err(GraphError::corrupt_key(key, "trailing bytes"))
    }
}

fn decode_direction(tail: &[u8], key: &[u8]) -> GraphResult<Direction> {
    match tail {
        [tag] => Direction::from_tag(*tag)
            .ok_or_else(|| GraphError::corrupt_key(key, format!("bad direction {:#04x}", tag))),
        _ => Err(GraphError::corrupt_key(key, "degree key must end with one direction byte")),
    }
}
