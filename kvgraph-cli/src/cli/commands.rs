// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Command-line argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use kvgraph::StorageType;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kvgraph")]
#[command(about = "Directed graph storage on an ordered key-value store", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Set log level explicitly (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<log::Level>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the graph lives and how it is encoded
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Database directory
    #[arg(long, global = true, default_value = "./kvgraph-db")]
    pub path: PathBuf,

    /// Storage backend (sled, memory)
    #[arg(long, global = true)]
    pub storage: Option<StorageType>,

    /// Key layout code: 0 partitioned, 1 vertex-clustered
    #[arg(long, global = true)]
    pub policy: Option<i32>,

    /// Id encoding code: 0 fixed-width, 1 varint
    #[arg(long, global = true)]
    pub encoding: Option<i32>,

    /// JSON file with graph options; --storage overrides it and --path
    /// fills in a missing path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Generated ids must fit a non-negative `VertexId`
pub const MAX_GENERATED_VERTICES: u64 = i64::MAX as u64;

#[derive(Subcommand)]
pub enum Commands {
    /// Load an edge list ("src dst" per line, '#' starts a comment)
    Load {
        file: PathBuf,

        /// Also insert the reverse of every edge
        #[arg(long)]
        undirected: bool,

        /// Worker threads inserting in parallel
        #[arg(long, default_value_t = 1)]
        threads: usize,

        /// Wipe the graph before loading
        #[arg(long)]
        reinit: bool,
    },

    /// Insert a synthetic graph and report insert latency
    Generate {
        #[arg(long, value_enum, default_value_t = GenerateMode::Random)]
        mode: GenerateMode,

        /// Size of the vertex id range (ids are 0..vertices)
        #[arg(
            long,
            default_value_t = 1_000,
            value_parser = clap::value_parser!(u64).range(1..=MAX_GENERATED_VERTICES)
        )]
        vertices: u64,

        /// Number of edges to insert
        #[arg(long, default_value_t = 10_000)]
        edges: u64,

        /// Skew of the power-law mode; larger means more edges on low ids
        #[arg(long, default_value_t = 2.0)]
        alpha: f64,

        /// Seed for reproducible graphs
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long)]
        undirected: bool,

        #[arg(long)]
        reinit: bool,
    },

    /// Replay a workload file ("add a b", "delete a b", "get a", "degree a")
    Run { file: PathBuf },

    /// List the neighbours of a vertex
    Neighbours {
        #[arg(allow_negative_numbers = true)]
        id: i64,

        #[arg(long, value_enum, default_value_t = DirectionArg::Both)]
        direction: DirectionArg,
    },

    /// Show the in- and out-degree of a vertex
    Degree {
        #[arg(allow_negative_numbers = true)]
        id: i64,

        /// Read the maintained counters instead of scanning
        #[arg(long)]
        fast: bool,
    },

    /// Show vertex/edge counts and the encoding policy
    Stats {
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Check the counters against the stored adjacency entries
    Verify {
        /// Rewrite counters that disagree
        #[arg(long)]
        repair: bool,
    },

    /// Show version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GenerateMode {
    /// Endpoints drawn uniformly from the id range
    Random,
    /// Endpoints skewed towards low ids
    Powerlaw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DirectionArg {
    Out,
    In,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_negative_vertex_id() {
        let cli = Cli::try_parse_from(["kvgraph", "degree", "-12", "--fast"]).unwrap();
        match cli.command {
            Commands::Degree { id, fast } => {
                assert_eq!(id, -12);
                assert!(fast);
            }
            _ => panic!("expected degree command"),
        }
    }

    #[test]
    fn test_global_store_args() {
        let cli = Cli::try_parse_from([
            "kvgraph", "stats", "--storage", "memory", "--policy", "1", "--format", "json",
        ])
        .unwrap();
        assert_eq!(cli.store.storage, Some(StorageType::Memory));
        assert_eq!(cli.store.policy, Some(1));
        assert!(matches!(
            cli.command,
            Commands::Stats {
                format: OutputFormat::Json
            }
        ));
    }

    #[test]
    fn test_vertex_range_must_fit_vertex_ids() {
        let too_many = (MAX_GENERATED_VERTICES + 1).to_string();
        assert!(Cli::try_parse_from(["kvgraph", "generate", "--vertices", &too_many]).is_err());
        assert!(Cli::try_parse_from(["kvgraph", "generate", "--vertices", "0"]).is_err());

        let max = MAX_GENERATED_VERTICES.to_string();
        let cli = Cli::try_parse_from(["kvgraph", "generate", "--vertices", &max]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Generate { vertices, .. } if vertices == MAX_GENERATED_VERTICES
        ));
    }
}
