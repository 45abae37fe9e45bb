// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Adjacency maintenance and neighbour enumeration
//!
//! Each edge is stored twice: a forward entry under its source and a reverse
//! entry under its target. Both entries, together with the counter deltas,
//! go out in one guarded batch, so readers never observe half an edge.

use crate::aggregate::AggregateTracker;
use crate::codec::KeyCodec;
use crate::error::GraphResult;
use crate::storage::{SharedTree, StorageTree, WriteBatch};
use crate::types::{Direction, Edge, VertexId};
use log::{debug, trace};

#[derive(Clone)]
pub struct AdjacencyManager {
    codec: KeyCodec,
    tree: SharedTree,
    aggregates: AggregateTracker,
}

impl AdjacencyManager {
    pub fn new(codec: KeyCodec, tree: SharedTree, aggregates: AggregateTracker) -> Self {
        Self {
            codec,
            tree,
            aggregates,
        }
    }

    /// Write the marker of `id`; returns false if it was already there
    pub fn add_vertex(&self, id: VertexId) -> GraphResult<bool> {
        let marker = self.codec.vertex_key(id);
        let mut batch = WriteBatch::new();
        batch.require_absent(marker.clone()).insert(marker, Vec::new());
        self.aggregates.record_vertex_insert(&mut batch);

        let added = self.tree.apply_batch(&batch)?;
        if !added {
            debug!("Vertex {} already present", id);
        }
        Ok(added)
    }

    /// A vertex exists once it has a marker or any adjacency entry
    pub fn has_vertex(&self, id: VertexId) -> GraphResult<bool> {
        if self.tree.contains_key(&self.codec.vertex_key(id))? {
            return Ok(true);
        }
        for direction in [Direction::Out, Direction::In] {
            let prefix = self.codec.adjacency_prefix(id, direction);
            if self.tree.scan_prefix(&prefix)?.next().transpose()?.is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Insert `source -> target`; returns false if the edge already existed
    pub fn add_edge(&self, source: VertexId, target: VertexId) -> GraphResult<bool> {
        let forward = self.codec.forward_key(source, target);
        let mut batch = WriteBatch::new();
        batch
            .require_absent(forward.clone())
            .insert(forward, Vec::new())
            .insert(self.codec.reverse_key(source, target), Vec::new());
        self.aggregates.record_edge_insert(&mut batch, source, target);

        let added = self.tree.apply_batch(&batch)?;
        if added {
            trace!("Added edge {} -> {}", source, target);
        } else {
            debug!("Edge {} -> {} already present", source, target);
        }
        Ok(added)
    }

    /// Remove `source -> target`; returns false if there was no such edge
    pub fn delete_edge(&self, source: VertexId, target: VertexId) -> GraphResult<bool> {
        let forward = self.codec.forward_key(source, target);
        let mut batch = WriteBatch::new();
        batch
            .require_present(forward.clone())
            .remove(forward)
            .remove(self.codec.reverse_key(source, target));
        self.aggregates
            .record_edge_removal(&mut batch, source, target);

        let removed = self.tree.apply_batch(&batch)?;
        if removed {
            trace!("Deleted edge {} -> {}", source, target);
        } else {
            debug!("Edge {} -> {} not present, nothing to delete", source, target);
        }
        Ok(removed)
    }

    /// Insert every edge of `edges`, each in its own batch
    ///
    /// Returns how many were not present before. Stops at the first storage
    /// error; edges inserted up to that point stay.
    pub fn add_edges(&self, edges: &[Edge]) -> GraphResult<usize> {
        let mut inserted = 0;
        for edge in edges {
            if self.add_edge(edge.source, edge.target)? {
                inserted += 1;
            }
        }
        debug!("Bulk insert: {} of {} edges new", inserted, edges.len());
        Ok(inserted)
    }

    pub fn has_edge(&self, source: VertexId, target: VertexId) -> GraphResult<bool> {
        Ok(self
            .tree
            .contains_key(&self.codec.forward_key(source, target))?)
    }

    /// Neighbours of `id` in ascending id order
    pub fn neighbours(&self, id: VertexId, direction: Direction) -> GraphResult<Vec<VertexId>> {
        let prefix = self.codec.adjacency_prefix(id, direction);
        let mut neighbours = Vec::new();
        for entry in self.tree.scan_prefix(&prefix)? {
            let (key, _) = entry?;
            neighbours.push(self.codec.decode_neighbour(&prefix, &key)?);
        }
        trace!("{} neighbours of {}: {}", direction, id, neighbours.len());
        Ok(neighbours)
    }
}
