//! CSV recording in the `Time,topic,data` layout the analysis notebooks load.

use chrono::{DateTime, Utc};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub const HEADER: &str = "Time,topic,data";

/// Quote a field when it holds a comma, quote or newline; quotes are doubled.
pub fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

pub fn csv_row(at: DateTime<Utc>, topic: &str, data: &str) -> String {
    let secs = at.timestamp_micros() as f64 / 1_000_000.0;
    format!("{secs:.6},{},{}", csv_field(topic), csv_field(data))
}

pub struct Recorder {
    out: BufWriter<File>,
}

impl Recorder {
    /// Append to `path`, writing the header first if the file is new or empty.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let fresh = file.metadata()?.len() == 0;
        let mut out = BufWriter::new(file);
        if fresh {
            writeln!(out, "{HEADER}")?;
        }
        Ok(Self { out })
    }

    pub fn write(&mut self, at: DateTime<Utc>, topic: &str, data: &str) -> io::Result<()> {
        writeln!(self.out, "{}", csv_row(at, topic, data))
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        let _ = self.out.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fields_are_quoted_when_needed() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(
            csv_field("podA: CPU=5m, Memory=10Mi"),
            "\"podA: CPU=5m, Memory=10Mi\""
        );
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn row_has_fractional_seconds() {
        let at = Utc.timestamp_opt(1_700_000_000, 250_000_000).unwrap();
        assert_eq!(
            csv_row(at, "/k8s_node_metrics", "n1: CPU=200m cores (5%%), Memory=512Mi bytes (10%%)"),
            "1700000000.250000,/k8s_node_metrics,\"n1: CPU=200m cores (5%%), Memory=512Mi bytes (10%%)\""
        );
    }
}
