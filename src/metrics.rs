//! Query statistics for one serving session.

use std::collections::VecDeque;
use std::time::Duration;

/// Number of recent query latencies kept for percentile estimates.
pub const LATENCY_WINDOW: usize = 4096;

/// Collects per-query latency and line counts while the server runs.
///
/// Percentiles are computed over the last [`LATENCY_WINDOW`] queries; the
/// average covers every query since the collector was created.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    recent_latencies_us: VecDeque<f64>,
    latency_sum_us: f64,
    total_queries: u64,
    skipped_lines: u64,
    results_returned: u64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an answered query with its duration and result count.
    pub fn record_query(&mut self, duration: Duration, results: usize) {
        self.total_queries += 1;
        self.results_returned += results as u64;
        let micros = duration.as_secs_f64() * 1e6;
        self.latency_sum_us += micros;
        if self.recent_latencies_us.len() == LATENCY_WINDOW {
            self.recent_latencies_us.pop_front();
        }
        self.recent_latencies_us.push_back(micros);
    }

    /// Record an input line dropped as malformed.
    pub fn record_skipped(&mut self) {
        self.skipped_lines += 1;
    }

    pub fn total_queries(&self) -> u64 {
        self.total_queries
    }

    pub fn skipped_lines(&self) -> u64 {
        self.skipped_lines
    }

    pub fn results_returned(&self) -> u64 {
        self.results_returned
    }

    /// Number of latency samples currently held.
    pub fn latency_samples(&self) -> usize {
        self.recent_latencies_us.len()
    }

    /// Average query latency in microseconds.
    pub fn avg_query_latency_us(&self) -> f64 {
        if self.total_queries == 0 {
            return 0.0;
        }
        self.latency_sum_us / self.total_queries as f64
    }

    /// Get a percentile of query latency (e.g., 50.0, 95.0, 99.0).
    pub fn percentile_query_latency_us(&self, percentile: f64) -> f64 {
        if self.recent_latencies_us.is_empty() {
            return 0.0;
        }

        let mut sorted: Vec<f64> = self.recent_latencies_us.iter().copied().collect();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let index = ((percentile / 100.0) * (sorted.len() - 1) as f64).round() as usize;
        sorted[index.min(sorted.len() - 1)]
    }

    /// Emit a one-line summary through `tracing`.
    pub fn log_summary(&self) {
        tracing::info!(
            queries = self.total_queries,
            skipped = self.skipped_lines,
            results = self.results_returned,
            avg_us = format_args!("{:.1}", self.avg_query_latency_us()),
            p50_us = format_args!("{:.1}", self.percentile_query_latency_us(50.0)),
            p99_us = format_args!("{:.1}", self.percentile_query_latency_us(99.0)),
            "query stream closed"
        );
    }
}
