// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Options for opening a graph store

use crate::error::{GraphError, GraphResult};
use crate::storage::{DriverConfig, StorageType};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_tree_name() -> String {
    "graph".to_string()
}

fn default_flush_on_terminate() -> bool {
    true
}

/// Where and how a graph store is opened
///
/// Deserializable from JSON, so the CLI can take it from a config file:
///
/// ```json
/// { "storage_type": "Sled", "path": "./graph-db", "reinitialize": true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphOptions {
    #[serde(default)]
    pub storage_type: StorageType,

    /// Database directory; required for the sled backend
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Named tree inside the database holding the graph
    #[serde(default = "default_tree_name")]
    pub tree_name: String,

    /// Wipe the tree before use
    #[serde(default)]
    pub reinitialize: bool,

    /// Flush to disk as part of terminate
    #[serde(default = "default_flush_on_terminate")]
    pub flush_on_terminate: bool,

    #[serde(default)]
    pub cache_capacity: Option<u64>,

    #[serde(default)]
    pub flush_every_ms: Option<u64>,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            storage_type: StorageType::default(),
            path: None,
            tree_name: default_tree_name(),
            reinitialize: false,
            flush_on_terminate: default_flush_on_terminate(),
            cache_capacity: None,
            flush_every_ms: None,
        }
    }
}

impl GraphOptions {
    /// Persistent store under `path`
    pub fn sled<P: AsRef<Path>>(path: P) -> Self {
        Self {
            storage_type: StorageType::Sled,
            path: Some(path.as_ref().to_path_buf()),
            ..Self::default()
        }
    }

    /// Volatile store, gone once terminated
    pub fn in_memory() -> Self {
        Self {
            storage_type: StorageType::Memory,
            ..Self::default()
        }
    }

    pub fn with_tree_name(mut self, name: impl Into<String>) -> Self {
        self.tree_name = name.into();
        self
    }

    pub fn with_reinitialize(mut self, reinitialize: bool) -> Self {
        self.reinitialize = reinitialize;
        self
    }

    pub fn with_cache_capacity(mut self, bytes: u64) -> Self {
        self.cache_capacity = Some(bytes);
        self
    }

    pub fn from_json_str(json: &str) -> GraphResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| GraphError::OpenError(format!("invalid graph options: {}", e)))
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> GraphResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            GraphError::OpenError(format!("cannot read options file {:?}: {}", path, e))
        })?;
        Self::from_json_str(&json)
    }

    /// Driver configuration, validating that disk backends have a path
    pub(crate) fn driver_config(&self) -> GraphResult<DriverConfig> {
        let path = match (&self.path, self.storage_type) {
            (Some(path), _) => path.clone(),
            (None, StorageType::Memory) => PathBuf::new(),
            (None, StorageType::Sled) => {
                return Err(GraphError::OpenError(
                    "the sled backend needs a path".to_string(),
                ))
            }
        };
        if self.tree_name.is_empty() {
            return Err(GraphError::OpenError("empty tree name".to_string()));
        }
        Ok(DriverConfig {
            path,
            cache_capacity: self.cache_capacity,
            flush_every_ms: self.flush_every_ms,
            temporary: false,
        })
    }
}
