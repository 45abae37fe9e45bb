// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for kvgraph
//!
//! Bulk loading, synthetic graph generation, workload replay, and read-only
//! inspection of a graph store.

pub mod commands;
pub mod handlers;
pub mod output;
pub mod workload;

pub use commands::{Cli, Commands};
pub use handlers::{
    handle_degree, handle_generate, handle_load, handle_neighbours, handle_run, handle_stats,
    handle_verify,
};
