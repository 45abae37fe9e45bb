/// Benchmark for edge insertion and adjacency reads
///
/// Measures insert, neighbour scan and degree throughput for every encoding
/// policy on the sled backend, plus concurrent insertion from several threads.

use kvgraph::{EncodingPolicy, GraphOptions, GraphStore};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tempfile::tempdir;

const VERTICES: i64 = 2_000;
const EDGES: usize = 50_000;
const THREADS: usize = 4;

fn random_edges(seed: u64) -> Vec<(i64, i64)> {
    let mut rng = fastrand::Rng::with_seed(seed);
    (0..EDGES)
        .map(|_| (rng.i64(0..VERTICES), rng.i64(0..VERTICES)))
        .collect()
}

fn per_sec(count: usize, started: Instant) -> f64 {
    count as f64 / started.elapsed().as_secs_f64()
}

fn bench_policy(policy: EncodingPolicy, edges: &[(i64, i64)]) {
    let temp_dir = tempdir().unwrap();
    let mut store = GraphStore::open(GraphOptions::sled(temp_dir.path().join("bench_db")), policy)
        .expect("Failed to open store");

    println!("📊 Policy {}:", policy);

    let started = Instant::now();
    for &(source, target) in edges {
        store.add_edge(source, target).expect("add_edge failed");
    }
    println!("  Insert:         {:.0} edges/sec", per_sec(edges.len(), started));

    let started = Instant::now();
    let mut seen = 0;
    for id in 0..VERTICES {
        let (out, inn) = store.get_all_neighbours(id).expect("scan failed");
        seen += out.len() + inn.len();
    }
    println!(
        "  Neighbour scan: {:.0} vertices/sec ({} entries)",
        per_sec(VERTICES as usize, started),
        seen
    );

    let started = Instant::now();
    for id in 0..VERTICES {
        store.out_degree(id).expect("degree failed");
    }
    println!("  Exact degree:   {:.0} lookups/sec", per_sec(VERTICES as usize, started));

    let started = Instant::now();
    for id in 0..VERTICES {
        store.out_degree_fast(id).expect("degree failed");
    }
    println!("  Fast degree:    {:.0} lookups/sec", per_sec(VERTICES as usize, started));

    let started = Instant::now();
    for &(source, target) in edges.iter().step_by(2) {
        store.delete_edge(source, target).expect("delete_edge failed");
    }
    println!("  Delete:         {:.0} edges/sec", per_sec(edges.len() / 2, started));
    println!();

    store.terminate().expect("terminate failed");
}

fn bench_concurrent(edges: &[(i64, i64)]) {
    let temp_dir = tempdir().unwrap();
    let store = Arc::new(
        GraphStore::open(
            GraphOptions::sled(temp_dir.path().join("bench_db")),
            EncodingPolicy::default(),
        )
        .expect("Failed to open store"),
    );

    println!("📊 Concurrent insert ({} threads):", THREADS);
    let started = Instant::now();
    let chunk = edges.len().div_ceil(THREADS);
    let handles: Vec<_> = edges
        .chunks(chunk)
        .map(|part| {
            let store = Arc::clone(&store);
            let part = part.to_vec();
            thread::spawn(move || {
                for (source, target) in part {
                    store.add_edge(source, target).expect("add_edge failed");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    println!("  Insert:         {:.0} edges/sec", per_sec(edges.len(), started));
    println!("  Stored edges:   {}", store.count_edge().unwrap());
    println!();
}

fn main() {
    println!("=== Edge Throughput Benchmark ===\n");

    let edges = random_edges(42);
    for policy in EncodingPolicy::all() {
        bench_policy(policy, &edges);
    }
    bench_concurrent(&edges);
}
