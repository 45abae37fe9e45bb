// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Edge lists, synthetic graphs, workload replay and latency bookkeeping

use super::commands::{GenerateMode, MAX_GENERATED_VERTICES};
use kvgraph::{Edge, VertexId};
use std::collections::BTreeMap;
use std::io::BufRead;
use std::time::Duration;

/// Parse an edge list: one `src dst` pair per line, blank lines and lines
/// starting with `#` or `%` are skipped
pub fn parse_edge_list<R: BufRead>(
    reader: R,
    undirected: bool,
) -> Result<Vec<Edge>, Box<dyn std::error::Error>> {
    let mut edges = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('%') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (source, target) = match (fields.next(), fields.next()) {
            (Some(source), Some(target)) => (source, target),
            _ => return Err(format!("line {}: expected 'src dst'", index + 1).into()),
        };
        let source: VertexId = source
            .parse()
            .map_err(|e| format!("line {}: bad source id: {}", index + 1, e))?;
        let target: VertexId = target
            .parse()
            .map_err(|e| format!("line {}: bad target id: {}", index + 1, e))?;
        edges.push(Edge { source, target });
        if undirected {
            edges.push(Edge {
                source: target,
                target: source,
            });
        }
    }
    Ok(edges)
}

/// Draws edge endpoints for the `generate` command
pub struct EdgeGenerator {
    rng: fastrand::Rng,
    mode: GenerateMode,
    vertices: u64,
    alpha: f64,
}

impl EdgeGenerator {
    pub fn new(mode: GenerateMode, vertices: u64, alpha: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self {
            rng,
            mode,
            vertices: vertices.clamp(1, MAX_GENERATED_VERTICES),
            alpha,
        }
    }

    fn endpoint(&mut self) -> VertexId {
        let id = match self.mode {
            GenerateMode::Random => self.rng.u64(0..self.vertices),
            GenerateMode::Powerlaw => {
                // u^alpha piles mass near zero for alpha > 1
                let skewed = self.rng.f64().powf(self.alpha.max(1.0));
                ((skewed * self.vertices as f64) as u64).min(self.vertices - 1)
            }
        };
        VertexId(i64::try_from(id).unwrap_or(i64::MAX))
    }

    pub fn next_edge(&mut self) -> Edge {
        let source = self.endpoint();
        let target = self.endpoint();
        Edge { source, target }
    }
}

/// One line of a workload file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadOp {
    Add(VertexId, VertexId),
    Delete(VertexId, VertexId),
    Get(VertexId),
    Degree(VertexId),
}

impl WorkloadOp {
    pub fn name(&self) -> &'static str {
        match self {
            WorkloadOp::Add(..) => "add_edge",
            WorkloadOp::Delete(..) => "delete_edge",
            WorkloadOp::Get(_) => "get_edges",
            WorkloadOp::Degree(_) => "degree",
        }
    }

    /// Parse one line; `Ok(None)` for blanks and comments
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let id = |index: usize| -> Result<VertexId, String> {
            fields
                .get(index)
                .ok_or_else(|| format!("'{}': missing vertex id", line))?
                .parse()
                .map_err(|e| format!("'{}': {}", line, e))
        };
        let op = match fields[0] {
            "add" => WorkloadOp::Add(id(1)?, id(2)?),
            "delete" => WorkloadOp::Delete(id(1)?, id(2)?),
            "get" => WorkloadOp::Get(id(1)?),
            "degree" => WorkloadOp::Degree(id(1)?),
            other => return Err(format!("unknown operation '{}'", other)),
        };
        Ok(Some(op))
    }
}

/// Latency percentiles of one operation kind, in microseconds
#[derive(Debug, Clone, PartialEq)]
pub struct LatencySummary {
    pub name: String,
    pub count: usize,
    pub sum: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
}

/// Collects per-operation latencies
#[derive(Default)]
pub struct LatencyProfiler {
    samples: BTreeMap<&'static str, Vec<f64>>,
}

impl LatencyProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: &'static str, elapsed: Duration) {
        self.samples
            .entry(name)
            .or_default()
            .push(elapsed.as_secs_f64() * 1_000_000.0);
    }

    pub fn summaries(&self) -> Vec<LatencySummary> {
        self.samples
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(name, values)| {
                let mut sorted = values.clone();
                sorted.sort_by(|a, b| a.total_cmp(b));
                LatencySummary {
                    name: name.to_string(),
                    count: sorted.len(),
                    sum: sorted.iter().sum(),
                    p50: percentile(&sorted, 0.50),
                    p95: percentile(&sorted, 0.95),
                    p99: percentile(&sorted, 0.99),
                }
            })
            .collect()
    }
}

/// Nearest-rank percentile of an ascending, non-empty slice
fn percentile(sorted: &[f64], quantile: f64) -> f64 {
    let rank = (quantile * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}
