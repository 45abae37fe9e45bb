// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Result formatting for CLI output

use super::commands::OutputFormat;
use super::workload::LatencySummary;
use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use kvgraph::{CounterReport, GraphStats, VertexId};

/// Formatter for everything the CLI prints
pub struct OutputFormatter;

impl OutputFormatter {
    fn table(header: &[&str]) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        let header_cells: Vec<Cell> = header
            .iter()
            .map(|col| Cell::new(col).fg(Color::Green))
            .collect();
        table.set_header(header_cells);
        table
    }

    pub fn stats(stats: &GraphStats, format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => {
                let mut table = Self::table(&["Property", "Value"]);
                table.add_row(vec!["vertices".to_string(), stats.vertices.to_string()]);
                table.add_row(vec!["edges".to_string(), stats.edges.to_string()]);
                table.add_row(vec!["layout".to_string(), stats.policy.layout.to_string()]);
                table.add_row(vec![
                    "encoding".to_string(),
                    stats.policy.encoding.to_string(),
                ]);
                table.add_row(vec!["storage".to_string(), stats.storage_type.to_string()]);
                format!("{}\n{}\n", "Graph Statistics".bold().green(), table)
            }
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "vertices": stats.vertices,
                    "edges": stats.edges,
                    "policy": stats.policy.layout.code(),
                    "encoding": stats.policy.encoding.code(),
                    "layout": stats.policy.layout.to_string(),
                    "storage": stats.storage_type.to_string(),
                });
                serde_json::to_string_pretty(&json).unwrap_or_else(|_| {
                    "{\"status\": \"error\", \"error\": \"Could not serialize stats\"}".to_string()
                })
            }
        }
    }

    pub fn neighbours(id: VertexId, label: &str, neighbours: &[VertexId]) -> String {
        if neighbours.is_empty() {
            return format!("{}\n", format!("No {} neighbours of {}", label, id).yellow());
        }
        let list: Vec<String> = neighbours.iter().map(|n| n.to_string()).collect();
        format!(
            "{} ({}): {}\n",
            format!("{} neighbours of {}", label, id).bold(),
            neighbours.len(),
            list.join(", ")
        )
    }

    pub fn degree(id: VertexId, out: u64, inn: u64, fast: bool) -> String {
        let source = if fast { "counters" } else { "scan" };
        let mut table = Self::table(&["Vertex", "Out", "In", "Source"]);
        table.add_row(vec![
            id.to_string(),
            out.to_string(),
            inn.to_string(),
            source.to_string(),
        ]);
        format!("{}\n", table)
    }

    pub fn latency(summaries: &[LatencySummary]) -> String {
        if summaries.is_empty() {
            return format!("{}\n", "No operations recorded".yellow());
        }
        let mut table =
            Self::table(&["Operation", "Count", "P50 µs", "P95 µs", "P99 µs", "Sum µs"]);
        for summary in summaries {
            table.add_row(vec![
                summary.name.clone(),
                summary.count.to_string(),
                format!("{:.1}", summary.p50),
                format!("{:.1}", summary.p95),
                format!("{:.1}", summary.p99),
                format!("{:.0}", summary.sum),
            ]);
        }
        format!("{}\n{}\n", "Latency".bold().green(), table)
    }

    pub fn counter_report(report: &CounterReport, repaired: bool) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "Scanned {} vertex markers and {} edges\n",
            report.vertices, report.edges
        ));
        if report.is_consistent() {
            output.push_str(&format!("{}\n", "All counters consistent".green()));
            return output;
        }
        if report.corrected > 0 {
            let line = if repaired {
                format!("Repaired {} counters", report.corrected)
            } else {
                format!(
                    "{} counters disagree with the stored edges (run with --repair)",
                    report.corrected
                )
            };
            output.push_str(&format!("{}\n", line.yellow()));
        }
        if report.dangling > 0 {
            output.push_str(&format!(
                "{}\n",
                format!("{} adjacency entries have no mirror entry", report.dangling).red()
            ));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvgraph::{EncodingPolicy, StorageType};

    #[test]
    fn test_stats_json_has_codes() {
        let stats = GraphStats {
            vertices: 3,
            edges: 5,
            policy: EncodingPolicy::from_codes(1, Some(1)).unwrap(),
            storage_type: StorageType::Memory,
        };
        let json: serde_json::Value =
            serde_json::from_str(&OutputFormatter::stats(&stats, OutputFormat::Json)).unwrap();
        assert_eq!(json["edges"], 5);
        assert_eq!(json["policy"], 1);
        assert_eq!(json["storage"], "memory");
    }

    #[test]
    fn test_report_mentions_repair_hint() {
        let report = CounterReport {
            vertices: 0,
            edges: 2,
            corrected: 1,
            dangling: 0,
        };
        assert!(OutputFormatter::counter_report(&report, false).contains("--repair"));
        assert!(OutputFormatter::counter_report(&report, true).contains("Repaired 1"));
    }
}
