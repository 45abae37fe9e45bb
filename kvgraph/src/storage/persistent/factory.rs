// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Storage driver factory
//!
//! Instantiates the driver selected by a [`StorageType`].

use super::traits::{StorageDriver, StorageTree};
use super::types::{DriverConfig, StorageResult, StorageType};

/// Driver handle as stored by the graph layer
pub type BoxedDriver = Box<dyn StorageDriver<Tree = Box<dyn StorageTree>>>;

/// Open the backend named by `storage_type` with the given tuning
///
/// Asking for sled in a build without the `sled-backend` feature is a
/// backend error rather than a compile failure.
///
/// ```ignore
/// let driver = create_storage_driver(StorageType::Sled, &DriverConfig::new("./data"))?;
/// let tree = driver.open_tree("graph")?;
/// ```
pub fn create_storage_driver(
    storage_type: StorageType,
    config: &DriverConfig,
) -> StorageResult<BoxedDriver> {
    match storage_type {
        #[cfg(feature = "sled-backend")]
        StorageType::Sled => {
            use super::sled::SledDriver;
            let driver = SledDriver::open(config)?;
            Ok(Box::new(driver) as BoxedDriver)
        }
        #[cfg(not(feature = "sled-backend"))]
        StorageType::Sled => Err(super::types::StorageDriverError::Backend(
            "Sled storage backend not compiled in (enable the `sled-backend` feature)"
                .to_string(),
        )),
        StorageType::Memory => {
            use super::memory::MemoryStorageDriver;
            let driver = MemoryStorageDriver::open(config)?;
            Ok(Box::new(driver) as BoxedDriver)
        }
    }
}
