//! Test fixture for kvgraph integration tests
//!
//! Every fixture owns its own temporary directory, so tests can run in
//! parallel without sharing a database.

#![allow(dead_code)]

use kvgraph::{EncodingPolicy, GraphOptions, GraphResult, GraphStore, StorageType};
use std::path::{Path, PathBuf};

/// Graph store opened in an isolated temporary directory
pub struct GraphFixture {
    store: GraphStore,
    storage_type: StorageType,
    policy: EncodingPolicy,
    db_path: PathBuf,
    _temp_dir: tempfile::TempDir,
}

impl GraphFixture {
    /// Sled-backed store with the given policy
    pub fn new(policy: EncodingPolicy) -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_storage(StorageType::Sled, policy)
    }

    pub fn in_memory(policy: EncodingPolicy) -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_storage(StorageType::Memory, policy)
    }

    pub fn with_storage(
        storage_type: StorageType,
        policy: EncodingPolicy,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let temp_dir = tempfile::tempdir()?;
        let db_path = temp_dir.path().join("kvgraph_test");
        let options = Self::options_for(storage_type, &db_path);
        let store = GraphStore::open(options, policy)?;

        Ok(GraphFixture {
            store,
            storage_type,
            policy,
            db_path,
            _temp_dir: temp_dir,
        })
    }

    /// One fixture per policy and backend
    pub fn all() -> Vec<GraphFixture> {
        let mut fixtures = Vec::new();
        for storage_type in [StorageType::Sled, StorageType::Memory] {
            for policy in EncodingPolicy::all() {
                fixtures.push(
                    Self::with_storage(storage_type, policy)
                        .expect("Failed to create fixture"),
                );
            }
        }
        fixtures
    }

    fn options_for(storage_type: StorageType, db_path: &Path) -> GraphOptions {
        match storage_type {
            StorageType::Sled => GraphOptions::sled(db_path),
            StorageType::Memory => GraphOptions::in_memory(),
        }
    }

    /// Options pointing at this fixture's database
    pub fn options(&self) -> GraphOptions {
        Self::options_for(self.storage_type, &self.db_path)
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut GraphStore {
        &mut self.store
    }

    pub fn policy(&self) -> EncodingPolicy {
        self.policy
    }

    pub fn storage_type(&self) -> StorageType {
        self.storage_type
    }

    pub fn label(&self) -> String {
        format!("{} {}", self.storage_type, self.policy)
    }

    /// Terminate the store and open the same database again
    pub fn reopen(&mut self) -> GraphResult<()> {
        self.store.terminate()?;
        self.store = GraphStore::open(self.options(), self.policy)?;
        Ok(())
    }

    /// Check that both degree paths agree with the neighbour lists
    pub fn assert_degrees_consistent(&self, ids: &[i64]) {
        for &id in ids {
            let out = self.store.get_out_neighbours(id).expect("out scan");
            let inn = self.store.get_in_neighbours(id).expect("in scan");
            assert_eq!(
                self.store.out_degree(id).expect("out degree"),
                out.len() as u64,
                "{}: out degree of {}",
                self.label(),
                id
            );
            assert_eq!(
                self.store.in_degree(id).expect("in degree"),
                inn.len() as u64,
                "{}: in degree of {}",
                self.label(),
                id
            );
            assert_eq!(
                self.store.out_degree_fast(id).expect("fast out degree"),
                out.len() as u64,
                "{}: fast out degree of {}",
                self.label(),
                id
            );
            assert_eq!(
                self.store.in_degree_fast(id).expect("fast in degree"),
                inn.len() as u64,
                "{}: fast in degree of {}",
                self.label(),
                id
            );
        }
    }
}
