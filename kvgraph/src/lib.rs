// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! kvgraph - directed graph storage on an ordered key-value store
//!
//! Vertices and directed edges are mapped onto byte keys so that the out- and
//! in-neighbours of a vertex are each one contiguous key range.
//!
//! # Features
//!
//! - **Range-scan adjacency**: neighbour lists read with a single prefix scan
//! - **Atomic mutations**: both adjacency entries and all counters of an edge
//!   change in one guarded batch, with no locking in the graph layer
//! - **Exact and fast degrees**: scan the adjacency range or read a counter
//! - **Selectable encoding policy**: two key layouts, two id encodings,
//!   recorded in the store and enforced on every later open
//! - **Embedded storage**: Sled on disk, or an in-memory ordered map
//!
//! # Usage
//!
//! ```ignore
//! use kvgraph::{EncodingPolicy, GraphOptions, GraphStore};
//!
//! let mut store = GraphStore::open(GraphOptions::sled("./graph-db"), EncodingPolicy::default())?;
//! store.add_vertex(1)?;
//! store.add_edge(1, 2)?;
//! assert_eq!(store.out_degree(1)?, 1);
//! store.terminate()?;
//! ```

pub mod adjacency;
pub mod aggregate;
pub mod codec;
pub mod error;
pub mod graph;
pub mod storage;
pub mod types;

pub use aggregate::CounterReport;
pub use codec::{EncodingPolicy, IdEncoding, KeyCodec, KeyLayout};
pub use error::{GraphError, GraphResult};
pub use graph::{GraphOptions, GraphStats, GraphStore, Lifecycle};
pub use storage::{StorageDriverError, StorageType};
pub use types::{Direction, Edge, VertexId};

/// kvgraph version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// kvgraph crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
