// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Storage driver traits
//!
//! A driver is a database handle; a tree is one ordered keyspace inside it.
//! Implementations must be safe to share between threads without any
//! synchronization on the caller's side.

use super::batch::WriteBatch;
use super::types::{DriverConfig, StorageResult, StorageType};
use std::sync::Arc;

/// Iterator over key-value pairs in ascending key order
pub type KvIter<'a> = Box<dyn Iterator<Item = StorageResult<(Vec<u8>, Vec<u8>)>> + 'a>;

/// Tree handle shared by the components of one open graph
pub type SharedTree = Arc<Box<dyn StorageTree>>;

/// One ordered keyspace of a driver
///
/// Keys compare as unsigned bytes, so every
/// iterator yields pairs in lexicographic key order.
pub trait StorageTree: Send + Sync {
    /// Unconditional put
    fn insert(&self, key: &[u8], value: &[u8]) -> StorageResult<()>;

    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Removing a missing key is not an error
    fn remove(&self, key: &[u8]) -> StorageResult<()>;

    fn contains_key(&self, key: &[u8]) -> StorageResult<bool>;

    /// Drop every key in this tree
    fn clear(&self) -> StorageResult<()>;

    fn is_empty(&self) -> StorageResult<bool>;

    /// Full scan in key order
    fn iter(&self) -> StorageResult<KvIter<'_>>;

    /// Iterate over the key-value pairs whose key starts with `prefix`
    fn scan_prefix(&self, prefix: &[u8]) -> StorageResult<KvIter<'_>>;

    /// Apply a guarded batch atomically
    ///
    /// Returns `Ok(false)` without writing anything when a precondition does
    /// not hold. A failure part-way through leaves the tree untouched.
    fn apply_batch(&self, batch: &WriteBatch) -> StorageResult<bool>;

    /// Make writes to this tree durable
    fn flush(&self) -> StorageResult<()>;
}

/// Database handle that hands out named trees
pub trait StorageDriver: Send + Sync {
    type Tree: StorageTree;

    /// Open the database at `config.path`, creating it when missing
    fn open(config: &DriverConfig) -> StorageResult<Self>
    where
        Self: Sized;

    /// Trees are created on first open
    fn open_tree(&self, name: &str) -> StorageResult<Self::Tree>;

    /// Returns whether the tree existed
    fn drop_tree(&self, name: &str) -> StorageResult<bool>;

    fn list_trees(&self) -> StorageResult<Vec<String>>;

    /// Make writes to every tree durable
    fn flush(&self) -> StorageResult<()>;

    fn storage_type(&self) -> StorageType;

    /// Persist everything before the driver is dropped
    fn shutdown(&mut self) -> StorageResult<()> {
        self.flush()
    }
}

// Drivers hand out boxed trees
impl StorageTree for Box<dyn StorageTree> {
    fn insert(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        (**self).insert(key, value)
    }

    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn remove(&self, key: &[u8]) -> StorageResult<()> {
        (**self).remove(key)
    }

    fn contains_key(&self, key: &[u8]) -> StorageResult<bool> {
        (**self).contains_key(key)
    }

    fn clear(&self) -> StorageResult<()> {
        (**self).clear()
    }

    fn is_empty(&self) -> StorageResult<bool> {
        (**self).is_empty()
    }

    fn iter(&self) -> StorageResult<KvIter<'_>> {
        (**self).iter()
    }

    fn scan_prefix(&self, prefix: &[u8]) -> StorageResult<KvIter<'_>> {
        (**self).scan_prefix(prefix)
    }

    fn apply_batch(&self, batch: &WriteBatch) -> StorageResult<bool> {
        (**self).apply_batch(batch)
    }

    fn flush(&self) -> StorageResult<()> {
        (**self).flush()
    }
}
