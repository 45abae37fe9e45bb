// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Volatile backend over `BTreeMap`
//!
//! Trees opened under the same name share one map, so a graph reopened on the
//! same driver sees its earlier writes. Nothing outlives the driver.

use super::batch::{apply_delta, decode_counter, encode_counter, BatchOp, WriteBatch};
use super::traits::{KvIter, StorageDriver, StorageTree};
use super::types::{DriverConfig, StorageResult, StorageType};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

type OrderedMap = BTreeMap<Vec<u8>, Vec<u8>>;

/// Named ordered maps behind one lock
pub struct MemoryStorageDriver {
    trees: Arc<RwLock<HashMap<String, Arc<RwLock<OrderedMap>>>>>,
}

pub struct MemoryTree {
    data: Arc<RwLock<OrderedMap>>,
}

impl MemoryStorageDriver {
    pub fn new() -> Self {
        Self {
            trees: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MemoryStorageDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageTree for MemoryTree {
    fn insert(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.data.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn remove(&self, key: &[u8]) -> StorageResult<()> {
        self.data.write().remove(key);
        Ok(())
    }

    fn contains_key(&self, key: &[u8]) -> StorageResult<bool> {
        Ok(self.data.read().contains_key(key))
    }

    fn clear(&self) -> StorageResult<()> {
        self.data.write().clear();
        Ok(())
    }

    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.data.read().is_empty())
    }

    fn iter(&self) -> StorageResult<KvIter<'_>> {
        let data = self.data.read();
        let items: Vec<_> = data
            .iter()
            .map(|(k, v)| Ok((k.clone(), v.clone())))
            .collect();
        Ok(Box::new(items.into_iter()))
    }

    fn scan_prefix(&self, prefix: &[u8]) -> StorageResult<KvIter<'_>> {
        let data = self.data.read();
        let items: Vec<_> = data
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| Ok((k.clone(), v.clone())))
            .collect();
        Ok(Box::new(items.into_iter()))
    }

    fn apply_batch(&self, batch: &WriteBatch) -> StorageResult<bool> {
        let mut data = self.data.write();

        if batch
            .preconditions()
            .iter()
            .any(|condition| !condition.holds(data.contains_key(condition.key())))
        {
            return Ok(false);
        }

        // Stage every write first so a corrupt counter leaves the map untouched
        let mut staged: BTreeMap<Vec<u8>, Option<Vec<u8>>> = BTreeMap::new();
        for op in batch.ops() {
            match op {
                BatchOp::Insert { key, value } => {
                    staged.insert(key.clone(), Some(value.clone()));
                }
                BatchOp::Remove { key } => {
                    staged.insert(key.clone(), None);
                }
                BatchOp::Increment { key, delta } => {
                    let current = match staged.get(key) {
                        Some(Some(raw)) => decode_counter(key, raw)?,
                        Some(None) => 0,
                        None => match data.get(key) {
                            Some(raw) => decode_counter(key, raw)?,
                            None => 0,
                        },
                    };
                    let next = apply_delta(key, current, *delta)?;
                    let value = (next != 0).then(|| encode_counter(next).to_vec());
                    staged.insert(key.clone(), value);
                }
            }
        }

        for (key, value) in staged {
            match value {
                Some(value) => {
                    data.insert(key, value);
                }
                None => {
                    data.remove(&key);
                }
            }
        }
        Ok(true)
    }

    fn flush(&self) -> StorageResult<()> {
        Ok(())
    }
}

impl StorageDriver for MemoryStorageDriver {
    type Tree = Box<dyn StorageTree>;

    fn open(_config: &DriverConfig) -> StorageResult<Self> {
        Ok(Self::new())
    }

    fn open_tree(&self, name: &str) -> StorageResult<Self::Tree> {
        let mut trees = self.trees.write();
        let data = trees
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(BTreeMap::new())))
            .clone();
        Ok(Box::new(MemoryTree { data }) as Box<dyn StorageTree>)
    }

    fn drop_tree(&self, name: &str) -> StorageResult<bool> {
        Ok(self.trees.write().remove(name).is_some())
    }

    fn list_trees(&self) -> StorageResult<Vec<String>> {
        Ok(self.trees.read().keys().cloned().collect())
    }

    fn flush(&self) -> StorageResult<()> {
        // nothing to persist
        Ok(())
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Memory
    }
}
