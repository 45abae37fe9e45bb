// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Persistent backend on sled
//!
//! Guarded batches run inside a sled transaction on a single tree.

use super::batch::{apply_delta, decode_counter, encode_counter, BatchOp, WriteBatch};
use super::traits::{KvIter, StorageDriver, StorageTree};
use super::types::{DriverConfig, StorageDriverError, StorageResult, StorageType};
use log::debug;
use sled::transaction::{
    ConflictableTransactionError, ConflictableTransactionResult, TransactionError,
};
use std::io::ErrorKind;
use std::thread;
use std::time::{Duration, Instant};

/// How long `open` keeps retrying a database still locked by a released handle
const LOCK_RETRY_BUDGET: Duration = Duration::from_secs(2);
const LOCK_RETRY_FIRST_STEP: Duration = Duration::from_millis(2);
const LOCK_RETRY_MAX_STEP: Duration = Duration::from_millis(50);

/// Lock held on the database files, typically by a just-dropped `Db` whose
/// background threads have not exited yet
fn is_lock_contention(e: &sled::Error) -> bool {
    match e {
        sled::Error::Io(io) => {
            io.kind() == ErrorKind::WouldBlock
                || io.to_string().contains("could not acquire lock")
        }
        _ => false,
    }
}

fn backend_error(e: sled::Error) -> StorageDriverError {
    match e {
        sled::Error::Io(io) => StorageDriverError::Io(io),
        other => StorageDriverError::Backend(other.to_string()),
    }
}

pub struct SledDriver {
    db: sled::Db,
}

pub struct SledTree {
    tree: sled::Tree,
}

impl StorageTree for SledTree {
    fn insert(&self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.tree.insert(key, value).map_err(backend_error)?;
        Ok(())
    }

    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        self.tree
            .get(key)
            .map_err(backend_error)
            .map(|opt| opt.map(|v| v.to_vec()))
    }

    fn remove(&self, key: &[u8]) -> StorageResult<()> {
        self.tree.remove(key).map_err(backend_error)?;
        Ok(())
    }

    fn contains_key(&self, key: &[u8]) -> StorageResult<bool> {
        self.tree.contains_key(key).map_err(backend_error)
    }

    fn clear(&self) -> StorageResult<()> {
        self.tree.clear().map_err(backend_error)
    }

    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.tree.is_empty())
    }

    fn iter(&self) -> StorageResult<KvIter<'_>> {
        let iter = self.tree.iter().map(|result| {
            result
                .map(|(k, v)| (k.to_vec(), v.to_vec()))
                .map_err(backend_error)
        });
        Ok(Box::new(iter))
    }

    fn scan_prefix(&self, prefix: &[u8]) -> StorageResult<KvIter<'_>> {
        let iter = self.tree.scan_prefix(prefix).map(|result| {
            result
                .map(|(k, v)| (k.to_vec(), v.to_vec()))
                .map_err(backend_error)
        });
        Ok(Box::new(iter))
    }

    fn apply_batch(&self, batch: &WriteBatch) -> StorageResult<bool> {
        // sled may run the closure several times on conflict, so it must not
        // carry state between attempts.
        let outcome = self.tree.transaction(
            |tx| -> ConflictableTransactionResult<bool, StorageDriverError> {
                for condition in batch.preconditions() {
                    let present = tx.get(condition.key())?.is_some();
                    if !condition.holds(present) {
                        return Ok(false);
                    }
                }

                for op in batch.ops() {
                    match op {
                        BatchOp::Insert { key, value } => {
                            tx.insert(key.as_slice(), value.as_slice())?;
                        }
                        BatchOp::Remove { key } => {
                            tx.remove(key.as_slice())?;
                        }
                        BatchOp::Increment { key, delta } => {
                            let current = match tx.get(key.as_slice())? {
                                Some(raw) => decode_counter(key, &raw)
                                    .map_err(ConflictableTransactionError::Abort)?,
                                None => 0,
                            };
                            let next = apply_delta(key, current, *delta)
                                .map_err(ConflictableTransactionError::Abort)?;
                            if next == 0 {
                                tx.remove(key.as_slice())?;
                            } else {
                                tx.insert(key.as_slice(), &encode_counter(next)[..])?;
                            }
                        }
                    }
                }
                Ok(true)
            },
        );

        match outcome {
            Ok(applied) => Ok(applied),
            Err(TransactionError::Abort(e)) => Err(e),
            Err(TransactionError::Storage(e)) => Err(backend_error(e)),
        }
    }

    fn flush(&self) -> StorageResult<()> {
        self.tree.flush().map_err(backend_error)?;
        Ok(())
    }
}

impl StorageDriver for SledDriver {
    type Tree = Box<dyn StorageTree>;

    fn open(config: &DriverConfig) -> StorageResult<Self> {
        let mut sled_config = sled::Config::new()
            .path(&config.path)
            .temporary(config.temporary);
        if let Some(capacity) = config.cache_capacity {
            sled_config = sled_config.cache_capacity(capacity);
        }
        if let Some(interval) = config.flush_every_ms {
            sled_config = sled_config.flush_every_ms(Some(interval));
        }

        let started = Instant::now();
        let mut step = LOCK_RETRY_FIRST_STEP;
        loop {
            match sled_config.open() {
                Ok(db) => {
                    debug!("Opened sled database at {:?}", config.path);
                    return Ok(SledDriver { db });
                }
                Err(e) if is_lock_contention(&e) && started.elapsed() < LOCK_RETRY_BUDGET => {
                    debug!(
                        "Database at {:?} still locked, retrying in {:?}",
                        config.path, step
                    );
                    thread::sleep(step);
                    step = (step * 2).min(LOCK_RETRY_MAX_STEP);
                }
                Err(e) => return Err(backend_error(e)),
            }
        }
    }

    fn open_tree(&self, name: &str) -> StorageResult<Self::Tree> {
        let tree = self.db.open_tree(name).map_err(backend_error)?;
        Ok(Box::new(SledTree { tree }) as Box<dyn StorageTree>)
    }

    fn drop_tree(&self, name: &str) -> StorageResult<bool> {
        self.db.drop_tree(name.as_bytes()).map_err(backend_error)
    }

    fn list_trees(&self) -> StorageResult<Vec<String>> {
        let tree_names = self
            .db
            .tree_names()
            .into_iter()
            .map(|name| String::from_utf8_lossy(&name).to_string())
            .collect();
        Ok(tree_names)
    }

    fn flush(&self) -> StorageResult<()> {
        self.db.flush().map_err(backend_error)?;
        Ok(())
    }

    fn storage_type(&self) -> StorageType {
        StorageType::Sled
    }

    fn shutdown(&mut self) -> StorageResult<()> {
        // Files are released once the last tree handle and the Db are dropped
        self.db.flush().map_err(backend_error)?;
        Ok(())
    }
}
