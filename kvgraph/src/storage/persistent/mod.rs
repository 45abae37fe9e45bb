// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Persistent storage backends
//!
//! The graph layer only ever talks to a [`StorageTree`]: byte keys in
//! unsigned lexicographic order, prefix scans, and guarded batches.
//!
//! ```text
//! GraphStore -> AdjacencyManager / AggregateTracker -> StorageTree -> sled | BTreeMap
//! ```
//!
//!
//! ```ignore
//! let driver = create_storage_driver(StorageType::Sled, &DriverConfig::new("./data"))?;
//! let tree = driver.open_tree("graph")?;
//!
//! let mut batch = WriteBatch::new();
//! batch.require_absent(b"key".to_vec()).insert(b"key".to_vec(), b"value".to_vec());
//! tree.apply_batch(&batch)?;
//! ```

pub mod batch;
pub mod factory;
pub mod traits;
pub mod types;

pub mod memory;
#[cfg(feature = "sled-backend")]
pub mod sled;

pub use batch::{decode_counter, encode_counter, BatchOp, Precondition, WriteBatch};
pub use factory::{create_storage_driver, BoxedDriver};
pub use traits::{KvIter, SharedTree, StorageDriver, StorageTree};
pub use types::{DriverConfig, StorageDriverError, StorageResult, StorageType};
