//! Line protocol: `k,v0,...,v{D-1}` in, `index,score` out.

use std::io::Write;

use crate::error::{Result, VectorDbError};
use crate::top_k::SearchResult;

/// A parsed query line.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub k: usize,
    pub vector: Vec<f32>,
}

/// Parse one query line holding `k` followed by exactly `dim` components.
///
/// Tokens may carry surrounding whitespace. Negative `k`, non-numeric
/// tokens, non-finite components and any other field count are rejected.
pub fn parse_query_line(line: &str, dim: usize) -> Result<QueryRequest> {
    let mut fields = line.split(',');

    let k_token = fields.next().unwrap_or_default().trim();
    let k = k_token
        .parse::<usize>()
        .map_err(|_| VectorDbError::malformed(format!("invalid k: {:?}", k_token)))?;

    let mut vector = Vec::with_capacity(dim);
    for token in fields {
        let token = token.trim();
        let value = token
            .parse::<f32>()
            .map_err(|_| VectorDbError::malformed(format!("invalid float: {:?}", token)))?;
        if !value.is_finite() {
            return Err(VectorDbError::malformed(format!(
                "non-finite component: {:?}",
                token
            )));
        }
        vector.push(value);
    }

    if vector.len() != dim {
        return Err(VectorDbError::malformed(format!(
            "expected {} components, got {}",
            dim,
            vector.len()
        )));
    }

    Ok(QueryRequest { k, vector })
}

/// Write one `index,score` line per result.
pub fn write_results<W: Write>(out: &mut W, results: &[SearchResult]) -> std::io::Result<()> {
    for r in results {
        writeln!(out, "{},{}", r.index, r.score)?;
    }
    Ok(())
}
