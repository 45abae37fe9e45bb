// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Storage driver types and error handling
//!
//! Backend selection, backend tuning, and the error type shared by every
//! driver implementation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Storage driver type configuration
///
/// Specifies which ordered key-value store backs a graph.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StorageType {
    /// Sled - pure Rust embedded ordered store, persistent on disk
    Sled,

    /// Memory - ordered in-process map, nothing survives the driver
    Memory,
}

impl Default for StorageType {
    fn default() -> Self {
        StorageType::Sled
    }
}

impl std::str::FromStr for StorageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sled" => Ok(StorageType::Sled),
            "memory" => Ok(StorageType::Memory),
            _ => Err(format!(
                "Unknown storage type: {}. Valid options: sled, memory",
                s
            )),
        }
    }
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StorageType::Sled => "sled",
            StorageType::Memory => "memory",
        };
        write!(f, "{}", name)
    }
}

/// Backend tuning passed to [`StorageDriver::open`](super::StorageDriver::open)
///
/// Drivers ignore the knobs they have no equivalent for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DriverConfig {
    /// Directory holding the database files
    pub path: PathBuf,
    /// Page cache size in bytes
    #[serde(default)]
    pub cache_capacity: Option<u64>,
    /// Background flush interval; `None` keeps the backend default
    #[serde(default)]
    pub flush_every_ms: Option<u64>,
    /// Delete the files when the driver is dropped
    #[serde(default)]
    pub temporary: bool,
}

impl DriverConfig {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            cache_capacity: None,
            flush_every_ms: None,
            temporary: false,
        }
    }
}

/// Error type for storage driver operations
#[derive(Error, Debug)]
pub enum StorageDriverError {
    /// I/O related errors (file system, locks)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Driver-specific error (Sled, ...)
    #[error("Storage driver error: {0}")]
    Backend(String),

    /// A stored value does not have the shape its key promises
    #[error("Corrupt value under key {key:02x?}: {reason}")]
    CorruptValue { key: Vec<u8>, reason: String },
}

/// Result type for storage driver operations
pub type StorageResult<T> = Result<T, StorageDriverError>;
