//! Parsing of raw `kubectl top` reports.
//!
//! A report is one header line followed by one whitespace-delimited row per
//! entity. Blank lines are ignored. Rows with too few fields are skipped and
//! logged so one bad line never costs the rest of the tick.

use tracing::warn;

use crate::error::{AgentError, Result};
use crate::types::{NodeSample, PodSample};

/// Samples that parsed plus the rows that were rejected.
#[derive(Debug)]
pub struct ParsedReport<T> {
    pub samples: Vec<T>,
    pub rejected: Vec<AgentError>,
}

impl<T> Default for ParsedReport<T> {
    fn default() -> Self {
        Self {
            samples: Vec::new(),
            rejected: Vec::new(),
        }
    }
}

fn parse_rows<T>(text: &str, parse: impl Fn(usize, &str) -> Result<T>) -> ParsedReport<T> {
    let mut out = ParsedReport::default();
    // line 1 is the header
    for (idx, row) in text.lines().enumerate().skip(1) {
        if row.trim().is_empty() {
            continue;
        }
        match parse(idx + 1, row) {
            Ok(s) => out.samples.push(s),
            Err(e) => out.rejected.push(e),
        }
    }
    out
}

pub fn parse_pod_report_detailed(text: &str) -> ParsedReport<PodSample> {
    parse_rows(text, PodSample::from_row)
}

pub fn parse_node_report_detailed(text: &str) -> ParsedReport<NodeSample> {
    parse_rows(text, NodeSample::from_row)
}

pub(crate) fn log_rejected(kind: &str, rejected: &[AgentError]) {
    for e in rejected {
        warn!("skipping malformed {kind} row: {e}");
    }
}

pub fn parse_pod_report(text: &str) -> Vec<PodSample> {
    let parsed = parse_pod_report_detailed(text);
    log_rejected("pod", &parsed.rejected);
    parsed.samples
}

pub fn parse_node_report(text: &str) -> Vec<NodeSample> {
    let parsed = parse_node_report_detailed(text);
    log_rejected("node", &parsed.rejected);
    parsed.samples
}
