// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Graph store façade
//!
//! [`GraphStore`] owns the storage driver, the bound encoding policy and the
//! `Unopened -> Open -> Terminated` lifecycle. Every graph operation goes
//! through it and fails with [`GraphError::InvalidState`] outside `Open`.
//!
//! ```ignore
//! let mut store = GraphStore::open(GraphOptions::sled("./graph-db"), EncodingPolicy::default())?;
//! store.add_edge(1, 2)?;
//! assert_eq!(store.get_out_neighbours(1)?, vec![VertexId(2)]);
//! store.terminate()?;
//! ```

pub mod format;
pub mod options;

pub use format::{FormatDescriptor, FORMAT_VERSION};
pub use options::GraphOptions;

use crate::adjacency::AdjacencyManager;
use crate::aggregate::{AggregateTracker, CounterReport};
use crate::codec::{EncodingPolicy, KeyCodec, FORMAT_KEY};
use crate::error::{GraphError, GraphResult};
use crate::storage::{
    create_storage_driver, BoxedDriver, SharedTree, StorageDriver, StorageTree, StorageType,
    WriteBatch,
};
use crate::types::{Direction, Edge, VertexId};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Observable lifecycle state of a [`GraphStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    Unopened,
    Open,
    Terminated,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifecycle::Unopened => write!(f, "unopened"),
            Lifecycle::Open => write!(f, "open"),
            Lifecycle::Terminated => write!(f, "terminated"),
        }
    }
}

/// Summary returned by [`GraphStore::stats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub vertices: u64,
    pub edges: u64,
    pub policy: EncodingPolicy,
    pub storage_type: StorageType,
}

/// How the policy of a store being opened is chosen
#[derive(Debug, Clone, Copy)]
enum PolicyRequest {
    /// Must match the stored policy; stamped into an empty store
    Exact(EncodingPolicy),
    /// Use the stored policy; fail if there is none
    Adopt,
    /// Use the stored policy, or stamp the fallback into an empty store
    AdoptOr(EncodingPolicy),
}

struct OpenGraph {
    driver: BoxedDriver,
    tree: SharedTree,
    policy: EncodingPolicy,
    storage_type: StorageType,
    tree_name: String,
    flush_on_terminate: bool,
    adjacency: AdjacencyManager,
    aggregates: AggregateTracker,
}

impl OpenGraph {
    fn attach(options: &GraphOptions, request: PolicyRequest) -> GraphResult<Self> {
        let config = options.driver_config()?;
        let driver = create_storage_driver(options.storage_type, &config).map_err(|e| {
            GraphError::OpenError(format!("{} backend: {}", options.storage_type, e))
        })?;
        let tree = driver
            .open_tree(&options.tree_name)
            .map_err(|e| GraphError::OpenError(format!("tree '{}': {}", options.tree_name, e)))?;
        let tree: SharedTree = Arc::new(tree);

        if options.reinitialize {
            info!("Reinitializing graph tree '{}'", options.tree_name);
            tree.clear().map_err(|e| attach_error("clearing tree", e.into()))?;
        }

        let policy =
            bind_policy(&tree, request).map_err(|e| attach_error("format descriptor", e))?;
        let codec = KeyCodec::new(policy);
        let aggregates = AggregateTracker::new(codec, tree.clone());
        let adjacency = AdjacencyManager::new(codec, tree.clone(), aggregates.clone());

        Ok(Self {
            driver,
            tree,
            policy,
            storage_type: options.storage_type,
            tree_name: options.tree_name.clone(),
            flush_on_terminate: options.flush_on_terminate,
            adjacency,
            aggregates,
        })
    }

    /// Flush if configured, then drop every handle to the backend
    fn release(self) -> GraphResult<()> {
        let OpenGraph {
            mut driver,
            tree,
            adjacency,
            aggregates,
            flush_on_terminate,
            tree_name,
            ..
        } = self;

        let flushed = if flush_on_terminate {
            tree.flush().and_then(|_| driver.shutdown())
        } else {
            Ok(())
        };

        // The backend only closes its files once no tree handle is left
        drop(adjacency);
        drop(aggregates);
        drop(tree);
        drop(driver);

        info!("Graph store '{}' released", tree_name);
        flushed.map_err(GraphError::from)
    }
}

/// Report a failure while attaching as `OpenError`, keeping policy mismatches
fn attach_error(context: &str, e: GraphError) -> GraphError {
    match e {
        GraphError::InvalidEncoding(_) | GraphError::OpenError(_) => e,
        other => GraphError::OpenError(format!("{}: {}", context, other)),
    }
}

/// Read the stored policy, or stamp the requested one into an empty keyspace
fn bind_policy(tree: &SharedTree, request: PolicyRequest) -> GraphResult<EncodingPolicy> {
    loop {
        if let Some(raw) = tree.get(FORMAT_KEY)? {
            let stored = FormatDescriptor::decode(&raw)?.policy();
            return match request {
                PolicyRequest::Exact(policy) if policy != stored => {
                    Err(GraphError::InvalidEncoding(format!(
                        "store was created with policy {}, requested {}",
                        stored, policy
                    )))
                }
                _ => Ok(stored),
            };
        }

        let policy = match request {
            PolicyRequest::Exact(policy) | PolicyRequest::AdoptOr(policy) => policy,
            PolicyRequest::Adopt => {
                return Err(GraphError::OpenError(
                    "store has no format descriptor to adopt".to_string(),
                ))
            }
        };
        if !tree.is_empty()? {
            return Err(GraphError::OpenError(
                "tree holds data but no format descriptor".to_string(),
            ));
        }

        let mut batch = WriteBatch::new();
        batch
            .require_absent(FORMAT_KEY.to_vec())
            .insert(FORMAT_KEY.to_vec(), FormatDescriptor::new(policy).encode()?);
        if tree.apply_batch(&batch)? {
            debug!("Stamped format descriptor with policy {}", policy);
            return Ok(policy);
        }
        // another opener stamped first; compare against theirs
    }
}

enum StoreState {
    Unopened,
    Open(OpenGraph),
    Terminated,
}

/// Directed graph persisted in an ordered key-value store
///
/// All operations take `&self` and may be called from many threads at once
/// (wrap the store in an `Arc`). Each mutation is atomic on its own; there
/// are no multi-operation transactions.
pub struct GraphStore {
    state: StoreState,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore {
    /// A store in the `Unopened` state
    pub fn new() -> Self {
        Self {
            state: StoreState::Unopened,
        }
    }

    /// Open (or create) a store bound to `policy`
    pub fn open(options: GraphOptions, policy: EncodingPolicy) -> GraphResult<Self> {
        let mut store = Self::new();
        store.initialize(&options, policy)?;
        Ok(store)
    }

    /// Open from the integer policy/encoding codes
    pub fn open_with_codes(
        options: GraphOptions,
        policy: i32,
        encoding: Option<i32>,
    ) -> GraphResult<Self> {
        Self::open(options, EncodingPolicy::from_codes(policy, encoding)?)
    }

    /// Open an existing store with whatever policy it was created with
    pub fn open_existing(options: GraphOptions) -> GraphResult<Self> {
        let mut store = Self::new();
        store.attach(&options, PolicyRequest::Adopt)?;
        Ok(store)
    }

    /// Open with the stored policy, creating the store with `fallback` if it
    /// is empty
    pub fn open_or_default(options: GraphOptions, fallback: EncodingPolicy) -> GraphResult<Self> {
        let mut store = Self::new();
        store.attach(&options, PolicyRequest::AdoptOr(fallback))?;
        Ok(store)
    }

    /// Move an `Unopened` store to `Open`
    pub fn initialize(
        &mut self,
        options: &GraphOptions,
        policy: EncodingPolicy,
    ) -> GraphResult<()> {
        self.attach(options, PolicyRequest::Exact(policy))
    }

    fn attach(&mut self, options: &GraphOptions, request: PolicyRequest) -> GraphResult<()> {
        if !matches!(self.state, StoreState::Unopened) {
            return Err(GraphError::OpenError(format!(
                "graph store is already {}",
                self.lifecycle()
            )));
        }
        let graph = OpenGraph::attach(options, request)?;
        info!(
            "Opened graph store '{}' on {} with policy {}",
            graph.tree_name, graph.storage_type, graph.policy
        );
        self.state = StoreState::Open(graph);
        Ok(())
    }

    /// Release the underlying store; the instance is unusable afterwards
    pub fn terminate(&mut self) -> GraphResult<()> {
        match std::mem::replace(&mut self.state, StoreState::Terminated) {
            StoreState::Open(graph) => graph.release(),
            StoreState::Terminated => Err(GraphError::AlreadyTerminated),
            StoreState::Unopened => {
                self.state = StoreState::Unopened;
                Err(GraphError::InvalidState {
                    operation: "terminate",
                    state: Lifecycle::Unopened,
                })
            }
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        match self.state {
            StoreState::Unopened => Lifecycle::Unopened,
            StoreState::Open(_) => Lifecycle::Open,
            StoreState::Terminated => Lifecycle::Terminated,
        }
    }

    fn graph(&self, operation: &'static str) -> GraphResult<&OpenGraph> {
        match &self.state {
            StoreState::Open(graph) => Ok(graph),
            _ => Err(GraphError::InvalidState {
                operation,
                state: self.lifecycle(),
            }),
        }
    }

    pub fn policy(&self) -> GraphResult<EncodingPolicy> {
        Ok(self.graph("policy")?.policy)
    }

    /// Returns true if the vertex marker was newly written
    pub fn add_vertex(&self, id: impl Into<VertexId>) -> GraphResult<bool> {
        self.graph("add_vertex")?.adjacency.add_vertex(id.into())
    }

    pub fn has_vertex(&self, id: impl Into<VertexId>) -> GraphResult<bool> {
        self.graph("has_vertex")?.adjacency.has_vertex(id.into())
    }

    /// Returns true if the edge was newly inserted
    pub fn add_edge(
        &self,
        source: impl Into<VertexId>,
        target: impl Into<VertexId>,
    ) -> GraphResult<bool> {
        self.graph("add_edge")?
            .adjacency
            .add_edge(source.into(), target.into())
    }

    /// Returns how many of `edges` were newly inserted
    pub fn add_edges(&self, edges: &[Edge]) -> GraphResult<usize> {
        self.graph("add_edges")?.adjacency.add_edges(edges)
    }

    /// Returns true if the edge existed; deleting a missing edge is a no-op
    pub fn delete_edge(
        &self,
        source: impl Into<VertexId>,
        target: impl Into<VertexId>,
    ) -> GraphResult<bool> {
        self.graph("delete_edge")?
            .adjacency
            .delete_edge(source.into(), target.into())
    }

    pub fn has_edge(
        &self,
        source: impl Into<VertexId>,
        target: impl Into<VertexId>,
    ) -> GraphResult<bool> {
        self.graph("has_edge")?
            .adjacency
            .has_edge(source.into(), target.into())
    }

    pub fn get_out_neighbours(&self, id: impl Into<VertexId>) -> GraphResult<Vec<VertexId>> {
        self.graph("get_out_neighbours")?
            .adjacency
            .neighbours(id.into(), Direction::Out)
    }

    pub fn get_in_neighbours(&self, id: impl Into<VertexId>) -> GraphResult<Vec<VertexId>> {
        self.graph("get_in_neighbours")?
            .adjacency
            .neighbours(id.into(), Direction::In)
    }

    /// Out- and in-neighbours, read by two independent scans
    pub fn get_all_neighbours(
        &self,
        id: impl Into<VertexId>,
    ) -> GraphResult<(Vec<VertexId>, Vec<VertexId>)> {
        let graph = self.graph("get_all_neighbours")?;
        let id = id.into();
        let out = graph.adjacency.neighbours(id, Direction::Out)?;
        let inn = graph.adjacency.neighbours(id, Direction::In)?;
        Ok((out, inn))
    }

    /// Number of vertices added with [`add_vertex`](Self::add_vertex)
    pub fn count_vertex(&self) -> GraphResult<u64> {
        self.graph("count_vertex")?.aggregates.count_vertex()
    }

    pub fn count_edge(&self) -> GraphResult<u64> {
        self.graph("count_edge")?.aggregates.count_edge()
    }

    pub fn out_degree(&self, id: impl Into<VertexId>) -> GraphResult<u64> {
        self.graph("out_degree")?
            .aggregates
            .degree(id.into(), Direction::Out)
    }

    pub fn in_degree(&self, id: impl Into<VertexId>) -> GraphResult<u64> {
        self.graph("in_degree")?
            .aggregates
            .degree(id.into(), Direction::In)
    }

    pub fn out_degree_fast(&self, id: impl Into<VertexId>) -> GraphResult<u64> {
        self.graph("out_degree_fast")?
            .aggregates
            .degree_fast(id.into(), Direction::Out)
    }

    pub fn in_degree_fast(&self, id: impl Into<VertexId>) -> GraphResult<u64> {
        self.graph("in_degree_fast")?
            .aggregates
            .degree_fast(id.into(), Direction::In)
    }

    /// Recompute all counters from the stored records
    ///
    /// Run it while nothing else mutates the store.
    pub fn rebuild_counters(&self) -> GraphResult<CounterReport> {
        self.graph("rebuild_counters")?.aggregates.rebuild_counters()
    }

    /// Compare every counter with the stored records without changing them
    pub fn verify_counters(&self) -> GraphResult<CounterReport> {
        self.graph("verify_counters")?.aggregates.verify_counters()
    }

    pub fn stats(&self) -> GraphResult<GraphStats> {
        let graph = self.graph("stats")?;
        Ok(GraphStats {
            vertices: graph.aggregates.count_vertex()?,
            edges: graph.aggregates.count_edge()?,
            policy: graph.policy,
            storage_type: graph.storage_type,
        })
    }

    pub fn flush(&self) -> GraphResult<()> {
        let graph = self.graph("flush")?;
        graph.tree.flush()?;
        graph.driver.flush()?;
        Ok(())
    }
}

impl Drop for GraphStore {
    fn drop(&mut self) {
        if let StoreState::Open(graph) =
            std::mem::replace(&mut self.state, StoreState::Terminated)
        {
            if let Err(e) = graph.release() {
                warn!("Failed to release graph store on drop: {}", e);
            }
        }
    }
}
