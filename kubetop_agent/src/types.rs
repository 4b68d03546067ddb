//! Samples parsed from `kubectl top` rows.
//! `Display` is the wire format: each sample goes out as exactly that one line.

use serde::Serialize;
use std::fmt;

use crate::error::{AgentError, Result};

/// One row of `kubectl top pods`. Values are carried verbatim (e.g. "15m", "128Mi").
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct PodSample {
    pub name: String,
    pub cpu: String,
    pub memory: String,
}

/// One row of `kubectl top nodes`.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct NodeSample {
    pub name: String,
    pub cpu_cores: String,
    pub cpu_percent: String,
    pub memory_bytes: String,
    pub memory_percent: String,
}

/// Split a row and take the first `N` whitespace tokens; extra tokens are ignored.
fn leading_fields<const N: usize>(line: usize, row: &str) -> Result<[String; N]> {
    let mut out: [String; N] = std::array::from_fn(|_| String::new());
    let mut found = 0;
    for (slot, tok) in out.iter_mut().zip(row.split_whitespace()) {
        *slot = tok.to_string();
        found += 1;
    }
    if found < N {
        return Err(AgentError::MalformedRow {
            line,
            expected: N,
            found,
            row: row.to_string(),
        });
    }
    Ok(out)
}

impl PodSample {
    pub const FIELDS: usize = 3;

    /// `line` is the 1-based line number within the report, used for diagnostics.
    pub fn from_row(line: usize, row: &str) -> Result<Self> {
        let [name, cpu, memory] = leading_fields::<{ PodSample::FIELDS }>(line, row)?;
        Ok(Self { name, cpu, memory })
    }
}

impl NodeSample {
    pub const FIELDS: usize = 5;

    pub fn from_row(line: usize, row: &str) -> Result<Self> {
        let [name, cpu_cores, cpu_percent, memory_bytes, memory_percent] =
            leading_fields::<{ NodeSample::FIELDS }>(line, row)?;
        Ok(Self {
            name,
            cpu_cores,
            cpu_percent,
            memory_bytes,
            memory_percent,
        })
    }
}

impl fmt::Display for PodSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: CPU={}, Memory={}", self.name, self.cpu, self.memory)
    }
}

impl fmt::Display for NodeSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // kubectl already prints the percent sign; a second one follows it on the wire.
        write!(
            f,
            "{}: CPU={} cores ({}%), Memory={} bytes ({}%)",
            self.name, self.cpu_cores, self.cpu_percent, self.memory_bytes, self.memory_percent
        )
    }
}
