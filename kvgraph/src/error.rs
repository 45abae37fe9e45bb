// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for graph operations

use crate::graph::Lifecycle;
use crate::storage::StorageDriverError;
use thiserror::Error;

/// Errors returned by every [`GraphStore`](crate::GraphStore) operation
#[derive(Error, Debug)]
pub enum GraphError {
    /// Unknown policy/encoding code, or a policy that disagrees with the
    /// one the store was created with
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// The underlying store could not be created or attached
    #[error("Failed to open graph store: {0}")]
    OpenError(String),

    #[error("Cannot run '{operation}' while the graph store is {state}")]
    InvalidState {
        operation: &'static str,
        state: Lifecycle,
    },

    /// A key in a scanned range does not decode under the active policy
    #[error("Corrupt key {key:02x?}: {reason}")]
    CorruptKey { key: Vec<u8>, reason: String },

    /// A counter or format record holds a malformed value
    #[error("Corrupt value: {0}")]
    CorruptValue(String),

    #[error("Storage error: {0}")]
    StorageError(#[source] StorageDriverError),

    #[error("Graph store already terminated")]
    AlreadyTerminated,
}

impl GraphError {
    pub(crate) fn corrupt_key(key: &[u8], reason: impl Into<String>) -> Self {
        GraphError::CorruptKey {
            key: key.to_vec(),
            reason: reason.into(),
        }
    }
}

impl From<StorageDriverError> for GraphError {
    fn from(e: StorageDriverError) -> Self {
        match e {
            StorageDriverError::CorruptValue { .. } => GraphError::CorruptValue(e.to_string()),
            other => GraphError::StorageError(other),
        }
    }
}

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_storage_error_keeps_its_cause() {
        let err = GraphError::from(StorageDriverError::Backend("disk full".to_string()));
        assert!(matches!(err, GraphError::StorageError(_)));
        let cause = err.source().expect("adapter error is chained");
        assert_eq!(cause.to_string(), "Storage driver error: disk full");
    }

    #[test]
    fn test_corrupt_adapter_value_is_corrupt_value() {
        let err = GraphError::from(StorageDriverError::CorruptValue {
            key: vec![0x00],
            reason: "short".to_string(),
        });
        assert!(matches!(err, GraphError::CorruptValue(_)));
    }
}
