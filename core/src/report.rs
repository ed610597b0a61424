//! Append-only line sinks for findings and failures.
//!
//! Both stores are injected into the scan session instead of living behind
//! process-wide file handles, so tests can swap in [`MemorySink`]. Access is
//! strictly sequential within a run; a parallel redesign must add per-sink
//! serialization before it may share these.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// An append-only line store. No dedup, no ordering beyond call order.
pub trait ReportSink {
    fn append(&mut self, line: &str) -> io::Result<()>;
}

/// File-backed sink. The file is opened in append mode for every write,
/// so an interrupt between writes never leaves a partial line behind.
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    /// Sink for confirmed findings: truncated once at session start.
    pub fn results(path: impl AsRef<Path>) -> io::Result<Self> {
        File::create(path.as_ref())?;
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Sink for failure diagnostics: accumulates across runs.
    pub fn failures(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self {
            path: path.as_ref().to_path_buf(),
        })
    }
}

impl ReportSink for FileSink {
    fn append(&mut self, line: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")
    }
}

/// In-memory sink for tests and dry runs.
#[derive(Default)]
pub struct MemorySink {
    pub lines: Vec<String>,
}

impl ReportSink for MemorySink {
    fn append(&mut self, line: &str) -> io::Result<()> {
        self.lines.push(line.to_string());
        Ok(())
    }
}
