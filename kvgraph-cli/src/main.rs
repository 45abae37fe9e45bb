// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! kvgraph CLI entry point

use clap::Parser;
use colored::Colorize;

mod cli;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments first to get log level
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        log::LevelFilter::Debug
    } else if let Some(level) = cli.log_level {
        level.to_level_filter()
    } else {
        // Default to Warn (can still be overridden by RUST_LOG env var)
        log::LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    let store = cli.store;
    match cli.command {
        Commands::Version => {
            println!("{} {}", "kvgraph".bold().green(), kvgraph::VERSION);
            println!("Directed graph storage on an ordered key-value store");
            Ok(())
        }

        Commands::Load {
            file,
            undirected,
            threads,
            reinit,
        } => cli::handle_load(&store, file, undirected, threads, reinit),

        Commands::Generate {
            mode,
            vertices,
            edges,
            alpha,
            seed,
            undirected,
            reinit,
        } => cli::handle_generate(&store, mode, vertices, edges, alpha, seed, undirected, reinit),

        Commands::Run { file } => cli::handle_run(&store, file),

        Commands::Neighbours { id, direction } => cli::handle_neighbours(&store, id, direction),

        Commands::Degree { id, fast } => cli::handle_degree(&store, id, fast),

        Commands::Stats { format } => cli::handle_stats(&store, format),

        Commands::Verify { repair } => cli::handle_verify(&store, repair),
    }
}
