//! Line-oriented query server.
//!
//! Reads one query per line, answers it in full and flushes before reading
//! the next. Malformed lines are dropped without output. No end-of-results
//! marker is written: a client knows a response is complete once it has read
//! `min(k, n)` lines for a query asking for `k` neighbors.

pub mod protocol;

use std::io::{BufRead, Write};
use std::time::Instant;

use crate::distance;
use crate::error::Result;
use crate::index::IndexStrategy;
use crate::metrics::MetricsCollector;

pub use protocol::{parse_query_line, write_results, QueryRequest};

/// Serves queries against one immutable index.
pub struct QueryServer<'a> {
    index: &'a dyn IndexStrategy,
    metrics: MetricsCollector,
}

impl<'a> QueryServer<'a> {
    pub fn new(index: &'a dyn IndexStrategy) -> Self {
        Self {
            index,
            metrics: MetricsCollector::new(),
        }
    }

    /// Answer every query line from `input` on `output` until end of input.
    ///
    /// Lines that are not valid UTF-8 are skipped like any other malformed
    /// line. Only I/O failures on either stream end the loop early.
    pub fn serve<R: BufRead, W: Write>(&mut self, mut input: R, mut output: W) -> Result<()> {
        let dim = self.index.collection().dim();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line.trim(),
                Err(e) => {
                    tracing::debug!(error = %e, "skipping query line that is not UTF-8");
                    self.metrics.record_skipped();
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }

            let QueryRequest { k, mut vector } = match parse_query_line(line, dim) {
                Ok(request) => request,
                Err(e) => {
                    tracing::debug!(error = %e, "skipping malformed query line");
                    self.metrics.record_skipped();
                    continue;
                }
            };

            let start = Instant::now();
            distance::normalize(&mut vector);
            let results = self.index.query(&vector, k)?;
            self.metrics.record_query(start.elapsed(), results.len());

            write_results(&mut output, &results)?;
            output.flush()?;
        }

        self.metrics.log_summary();
        Ok(())
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }
}
