// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI command handlers for kvgraph

use colored::Colorize;
use kvgraph::{EncodingPolicy, GraphOptions, GraphStore, VertexId};
use log::{debug, info};
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::time::Instant;

use super::commands::{DirectionArg, GenerateMode, OutputFormat, StoreArgs};
use super::output::OutputFormatter;
use super::workload::{parse_edge_list, EdgeGenerator, LatencyProfiler, WorkloadOp};

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Edges handed to one worker at a time by `load --threads`
const LOAD_CHUNK: usize = 4_096;

impl StoreArgs {
    /// Graph options from --config plus the command-line overrides
    pub fn options(&self, reinit: bool) -> Result<GraphOptions, Box<dyn std::error::Error>> {
        let mut options = match &self.config {
            Some(config) => GraphOptions::from_json_file(config)?,
            None => GraphOptions::default(),
        };
        if let Some(storage) = self.storage {
            options.storage_type = storage;
        }
        if self.config.is_none() || options.path.is_none() {
            options.path = Some(self.path.clone());
        }
        options.reinitialize |= reinit;
        Ok(options)
    }

    /// Open the store; the stored policy wins unless --policy is given
    pub fn open(&self, reinit: bool) -> Result<GraphStore, Box<dyn std::error::Error>> {
        let options = self.options(reinit)?;
        debug!("Opening graph store with {:?}", options);
        let store = match self.policy {
            Some(policy) => GraphStore::open_with_codes(options, policy, self.encoding)?,
            None => {
                let fallback = EncodingPolicy::from_codes(0, self.encoding)?;
                GraphStore::open_or_default(options, fallback)?
            }
        };
        Ok(store)
    }
}

/// Handle the load command
pub fn handle_load(
    args: &StoreArgs,
    file: PathBuf,
    undirected: bool,
    threads: usize,
    reinit: bool,
) -> CliResult {
    let reader = BufReader::new(
        File::open(&file).map_err(|e| format!("Cannot open edge list {:?}: {}", file, e))?,
    );
    let edges = parse_edge_list(reader, undirected)?;
    println!("Read {} edges from {:?}", edges.len(), file);

    let mut store = args.open(reinit)?;
    let started = Instant::now();

    let inserted = if threads > 1 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?;
        let store = &store;
        let counts = pool.install(|| {
            edges
                .par_chunks(LOAD_CHUNK)
                .map(|chunk| store.add_edges(chunk))
                .collect::<Result<Vec<usize>, _>>()
        })?;
        counts.into_iter().sum::<usize>()
    } else {
        store.add_edges(&edges)?
    };

    let elapsed = started.elapsed();
    info!("Loaded {} edges in {:?}", inserted, elapsed);
    println!(
        "{}",
        format!(
            "Inserted {} new edges ({} duplicates) in {:.2}s",
            inserted,
            edges.len() - inserted,
            elapsed.as_secs_f64()
        )
        .green()
    );
    print!("{}", OutputFormatter::stats(&store.stats()?, OutputFormat::Table));
    store.terminate()?;
    Ok(())
}

/// Handle the generate command
#[allow(clippy::too_many_arguments)]
pub fn handle_generate(
    args: &StoreArgs,
    mode: GenerateMode,
    vertices: u64,
    edges: u64,
    alpha: f64,
    seed: Option<u64>,
    undirected: bool,
    reinit: bool,
) -> CliResult {
    let mut store = args.open(reinit)?;
    let mut generator = EdgeGenerator::new(mode, vertices, alpha, seed);
    let mut profiler = LatencyProfiler::new();

    println!(
        "{}",
        format!(
            "Generating {} {:?} edges over {} vertices...",
            edges, mode, vertices
        )
        .bold()
    );
    for _ in 0..edges {
        let edge = generator.next_edge();
        let started = Instant::now();
        store.add_edge(edge.source, edge.target)?;
        profiler.record("add_edge", started.elapsed());
        if undirected {
            let started = Instant::now();
            store.add_edge(edge.target, edge.source)?;
            profiler.record("add_edge", started.elapsed());
        }
    }

    print!("{}", OutputFormatter::latency(&profiler.summaries()));
    print!("{}", OutputFormatter::stats(&store.stats()?, OutputFormat::Table));
    store.terminate()?;
    Ok(())
}

/// Handle the run command
pub fn handle_run(args: &StoreArgs, file: PathBuf) -> CliResult {
    let reader = BufReader::new(
        File::open(&file).map_err(|e| format!("Cannot open workload {:?}: {}", file, e))?,
    );
    let mut store = args.open(false)?;
    let mut profiler = LatencyProfiler::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let op = match WorkloadOp::parse(&line).map_err(|e| format!("line {}: {}", index + 1, e))? {
            Some(op) => op,
            None => continue,
        };
        let started = Instant::now();
        match op {
            WorkloadOp::Add(source, target) => {
                store.add_edge(source, target)?;
            }
            WorkloadOp::Delete(source, target) => {
                store.delete_edge(source, target)?;
            }
            WorkloadOp::Get(id) => {
                store.get_all_neighbours(id)?;
            }
            WorkloadOp::Degree(id) => {
                store.out_degree(id)?;
                store.in_degree(id)?;
            }
        }
        profiler.record(op.name(), started.elapsed());
    }

    print!("{}", OutputFormatter::latency(&profiler.summaries()));
    store.terminate()?;
    Ok(())
}

/// Handle the neighbours command
pub fn handle_neighbours(args: &StoreArgs, id: i64, direction: DirectionArg) -> CliResult {
    let mut store = args.open(false)?;
    let id = VertexId(id);
    match direction {
        DirectionArg::Out => {
            print!("{}", OutputFormatter::neighbours(id, "out", &store.get_out_neighbours(id)?))
        }
        DirectionArg::In => {
            print!("{}", OutputFormatter::neighbours(id, "in", &store.get_in_neighbours(id)?))
        }
        DirectionArg::Both => {
            let (out, inn) = store.get_all_neighbours(id)?;
            print!("{}", OutputFormatter::neighbours(id, "out", &out));
            print!("{}", OutputFormatter::neighbours(id, "in", &inn));
        }
    }
    store.terminate()?;
    Ok(())
}

/// Handle the degree command
pub fn handle_degree(args: &StoreArgs, id: i64, fast: bool) -> CliResult {
    let mut store = args.open(false)?;
    let (out, inn) = if fast {
        (store.out_degree_fast(id)?, store.in_degree_fast(id)?)
    } else {
        (store.out_degree(id)?, store.in_degree(id)?)
    };
    print!("{}", OutputFormatter::degree(VertexId(id), out, inn, fast));
    store.terminate()?;
    Ok(())
}

/// Handle the stats command
pub fn handle_stats(args: &StoreArgs, format: OutputFormat) -> CliResult {
    let mut store = args.open(false)?;
    let output = OutputFormatter::stats(&store.stats()?, format);
    match format {
        OutputFormat::Table => print!("{}", output),
        OutputFormat::Json => println!("{}", output),
    }
    store.terminate()?;
    Ok(())
}

/// Handle the verify command
pub fn handle_verify(args: &StoreArgs, repair: bool) -> CliResult {
    let mut store = args.open(false)?;
    let report = if repair {
        store.rebuild_counters()?
    } else {
        store.verify_counters()?
    };
    print!("{}", OutputFormatter::counter_report(&report, repair));
    store.terminate()?;
    if report.dangling > 0 {
        return Err("store has dangling adjacency entries".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvgraph::{IdEncoding, KeyLayout, StorageType};

    fn sled_args(dir: &tempfile::TempDir) -> StoreArgs {
        StoreArgs {
            path: dir.path().join("db"),
            storage: None,
            policy: None,
            encoding: None,
            config: None,
        }
    }

    #[test]
    fn test_load_then_inspect() {
        let dir = tempfile::tempdir().unwrap();
        let edges = dir.path().join("edges.txt");
        std::fs::write(&edges, "# tiny graph\n1 2\n1 3\n2 3\n1 2\n").unwrap();
        let args = sled_args(&dir);

        handle_load(&args, edges, false, 2, false).unwrap();

        let mut store = args.open(false).unwrap();
        assert_eq!(store.count_edge().unwrap(), 3);
        assert_eq!(store.get_out_neighbours(1).unwrap(), vec![VertexId(2), VertexId(3)]);
        store.terminate().unwrap();

        handle_verify(&args, false).unwrap();
    }

    #[test]
    fn test_existing_policy_is_adopted() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = sled_args(&dir);
        args.policy = Some(1);
        args.encoding = Some(1);
        args.open(false).unwrap().terminate().unwrap();

        args.policy = None;
        args.encoding = None;
        let mut store = args.open(false).unwrap();
        assert_eq!(
            store.policy().unwrap(),
            EncodingPolicy::new(KeyLayout::VertexClustered, IdEncoding::Varint)
        );
        store.terminate().unwrap();
    }

    #[test]
    fn test_config_file_with_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("graph.json");
        std::fs::write(&config, r#"{ "storage_type": "Sled", "tree_name": "edges" }"#).unwrap();
        let mut args = sled_args(&dir);
        args.config = Some(config);
        args.storage = Some(StorageType::Memory);

        let options = args.options(true).unwrap();
        assert_eq!(options.storage_type, StorageType::Memory);
        assert_eq!(options.tree_name, "edges");
        assert_eq!(options.path, Some(dir.path().join("db")));
        assert!(options.reinitialize);
    }

    #[test]
    fn test_generate_is_seeded() {
        let dir = tempfile::tempdir().unwrap();
        let args = StoreArgs {
            storage: Some(StorageType::Memory),
            ..sled_args(&dir)
        };
        handle_generate(&args, GenerateMode::Powerlaw, 100, 500, 2.0, Some(1), true, false)
            .unwrap();
    }
}
