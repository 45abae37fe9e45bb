// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Vertex identifiers and adjacency directions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a vertex, unique within one graph store
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct VertexId(pub i64);

impl VertexId {
    pub const fn new(id: i64) -> Self {
        VertexId(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for VertexId {
    fn from(id: i64) -> Self {
        VertexId(id)
    }
}

impl From<i32> for VertexId {
    fn from(id: i32) -> Self {
        VertexId(i64::from(id))
    }
}

impl From<u32> for VertexId {
    fn from(id: u32) -> Self {
        VertexId(i64::from(id))
    }
}

impl From<VertexId> for i64 {
    fn from(id: VertexId) -> Self {
        id.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for VertexId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(VertexId)
    }
}

/// Which side of a vertex an adjacency or degree record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Edges leaving the vertex
    Out,
    /// Edges arriving at the vertex
    In,
}

impl Direction {
    pub(crate) fn tag(self) -> u8 {
        match self {
            Direction::Out => 0x00,
            Direction::In => 0x01,
        }
    }

    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x00 => Some(Direction::Out),
            0x01 => Some(Direction::In),
            _ => None,
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            Direction::Out => Direction::In,
            Direction::In => Direction::Out,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Out => write!(f, "out"),
            Direction::In => write!(f, "in"),
        }
    }
}

/// A directed edge as the pair (source, target)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: VertexId,
    pub target: VertexId,
}

impl Edge {
    pub fn new(source: impl Into<VertexId>, target: impl Into<VertexId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl<S: Into<VertexId>, T: Into<VertexId>> From<(S, T)> for Edge {
    fn from((source, target): (S, T)) -> Self {
        Edge::new(source, target)
    }
}
