// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Encoding policy selection
//!
//! A policy is fixed when a store is created and recorded in its format
//! descriptor. Integer codes only appear at the boundary, in
//! [`EncodingPolicy::from_codes`].

use crate::error::{GraphError, GraphResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How records are grouped in the keyspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum KeyLayout {
    /// One contiguous range per record kind (markers, forward, reverse, degrees)
    #[default]
    Partitioned,
    /// Every record of a vertex stored next to each other
    VertexClustered,
}

impl KeyLayout {
    pub fn from_code(code: i32) -> GraphResult<Self> {
        match code {
            0 => Ok(KeyLayout::Partitioned),
            1 => Ok(KeyLayout::VertexClustered),
            other => Err(GraphError::InvalidEncoding(format!(
                "unknown policy code {}",
                other
            ))),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            KeyLayout::Partitioned => 0,
            KeyLayout::VertexClustered => 1,
        }
    }
}

impl fmt::Display for KeyLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyLayout::Partitioned => write!(f, "partitioned"),
            KeyLayout::VertexClustered => write!(f, "vertex-clustered"),
        }
    }
}

/// Byte encoding of vertex identifiers inside keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IdEncoding {
    #[default]
    FixedWidth,
    Varint,
}

impl IdEncoding {
    pub fn from_code(code: i32) -> GraphResult<Self> {
        match code {
            0 => Ok(IdEncoding::FixedWidth),
            1 => Ok(IdEncoding::Varint),
            other => Err(GraphError::InvalidEncoding(format!(
                "unknown encoding code {}",
                other
            ))),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            IdEncoding::FixedWidth => 0,
            IdEncoding::Varint => 1,
        }
    }
}

impl fmt::Display for IdEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdEncoding::FixedWidth => write!(f, "fixed-width"),
            IdEncoding::Varint => write!(f, "varint"),
        }
    }
}

/// Key layout plus identifier encoding, immutable for the life of a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EncodingPolicy {
    pub layout: KeyLayout,
    pub encoding: IdEncoding,
}

impl EncodingPolicy {
    pub const fn new(layout: KeyLayout, encoding: IdEncoding) -> Self {
        Self { layout, encoding }
    }

    /// Resolve the integer policy and encoding codes
    ///
    /// A missing encoding code means [`IdEncoding::FixedWidth`].
    pub fn from_codes(policy: i32, encoding: Option<i32>) -> GraphResult<Self> {
        let layout = KeyLayout::from_code(policy)?;
        let encoding = match encoding {
            Some(code) => IdEncoding::from_code(code)?,
            None => IdEncoding::default(),
        };
        Ok(Self { layout, encoding })
    }

    /// Every supported combination
    pub fn all() -> [EncodingPolicy; 4] {
        [
            EncodingPolicy::new(KeyLayout::Partitioned, IdEncoding::FixedWidth),
            EncodingPolicy::new(KeyLayout::Partitioned, IdEncoding::Varint),
            EncodingPolicy::new(KeyLayout::VertexClustered, IdEncoding::FixedWidth),
            EncodingPolicy::new(KeyLayout::VertexClustered, IdEncoding::Varint),
        ]
    }
}

impl fmt::Display for EncodingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.layout, self.encoding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_resolve() {
        let policy = EncodingPolicy::from_codes(1, Some(1)).unwrap();
        assert_eq!(policy.layout, KeyLayout::VertexClustered);
        assert_eq!(policy.encoding, IdEncoding::Varint);
        assert_eq!(
            EncodingPolicy::from_codes(0, None).unwrap(),
            EncodingPolicy::default()
        );
    }

    #[test]
    fn test_unknown_codes_are_invalid_encoding() {
        assert!(matches!(
            EncodingPolicy::from_codes(7, None),
            Err(GraphError::InvalidEncoding(_))
        ));
        assert!(matches!(
            EncodingPolicy::from_codes(0, Some(-1)),
            Err(GraphError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_codes_are_stable() {
        for policy in EncodingPolicy::all() {
            let back =
                EncodingPolicy::from_codes(policy.layout.code(), Some(policy.encoding.code()))
                    .unwrap();
            assert_eq!(back, policy);
        }
    }
}
