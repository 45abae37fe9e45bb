// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Ordered key-value storage the graph is persisted in
//!
//! - Driver/tree traits every backend implements
//! - Guarded atomic write batches with counter increments
//! - Sled and in-memory backends

pub mod persistent;

pub use persistent::{
    create_storage_driver, decode_counter, encode_counter, BoxedDriver, DriverConfig, SharedTree,
    StorageDriver, StorageDriverError, StorageResult, StorageTree, StorageType, WriteBatch,
};
