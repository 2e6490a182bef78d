//! Serde data model for analyzer telemetry and the persisted suite log.
//!
//! # Log format
//!
//! One JSON array per suite, one object per benchmark, in discovery order:
//!
//! ```text
//! [
//!   {"name": "coupon", "kleene": {"solve_time": 2.0, "solve_iters": 4},
//!                      "newton": {"solve_time": 1.0, "solve_iters": 2}},
//!   {"name": "hermann3", "newton": "T/O", "polar": 1.25}
//! ]
//! ```
//!
//! A mode maps to a telemetry object on success, a bare float for the
//! comparator tool's wall-clock seconds, or a marker string (`"T/O"`,
//! `"ERR"`). `name` and `result` are absent for suites that do not record
//! them, so readers default them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

/// Marker recorded when an invocation exceeded its wall-clock budget.
pub const TIMEOUT_MARKER: &str = "T/O";

/// Marker recorded when an invocation failed or emitted undecodable output.
pub const ERROR_MARKER: &str = "ERR";

/// One successful solver invocation's structured output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    /// Wall-clock solving time in seconds.
    pub solve_time: f64,
    /// Number of solver iterations until the fixed point was reached.
    pub solve_iters: u64,
    /// Analyzer-specific extra fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Terminal classification of one analyzer or comparator invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Timeout,
    Error,
}

/// Result of one invocation, before aggregation into a [`BenchmarkStat`].
///
/// Invariant: `telemetry` is `Some` iff `outcome == Outcome::Ok`.
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub mode: String,
    pub outcome: Outcome,
    pub telemetry: Option<Telemetry>,
    /// Qualitative result line (e.g. an inferred invariant), for suites
    /// whose analyzer prints one ahead of the telemetry payload.
    pub result_label: Option<String>,
}

impl RunRecord {
    pub fn ok(mode: &str, telemetry: Telemetry, result_label: Option<String>) -> Self {
        Self {
            mode: mode.to_string(),
            outcome: Outcome::Ok,
            telemetry: Some(telemetry),
            result_label,
        }
    }

    pub fn timeout(mode: &str) -> Self {
        Self {
            mode: mode.to_string(),
            outcome: Outcome::Timeout,
            telemetry: None,
            result_label: None,
        }
    }

    pub fn error(mode: &str) -> Self {
        Self {
            mode: mode.to_string(),
            outcome: Outcome::Error,
            telemetry: None,
            result_label: None,
        }
    }
}

/// Persisted form of one mode's result inside a benchmark's log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModeEntry {
    /// Solver telemetry object.
    Telemetry(Telemetry),
    /// Comparator tool wall-clock seconds.
    Seconds(f64),
    /// `"T/O"` or `"ERR"`.
    Marker(String),
}

impl ModeEntry {
    pub fn telemetry(&self) -> Option<&Telemetry> {
        match self {
            ModeEntry::Telemetry(t) => Some(t),
            _ => None,
        }
    }

    pub fn seconds(&self) -> Option<f64> {
        match self {
            ModeEntry::Seconds(s) => Some(*s),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ModeEntry::Marker(m) if m == TIMEOUT_MARKER)
    }

    pub fn from_record(record: &RunRecord) -> Self {
        match (&record.outcome, &record.telemetry) {
            (Outcome::Ok, Some(t)) => ModeEntry::Telemetry(t.clone()),
            (Outcome::Timeout, _) => ModeEntry::Marker(TIMEOUT_MARKER.to_string()),
            _ => ModeEntry::Marker(ERROR_MARKER.to_string()),
        }
    }
}

/// One benchmark's aggregated records: a mode-to-entry map plus identity.
///
/// Finalized once (all modes computed) before being appended to the log,
/// never partially overwritten.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkStat {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(flatten)]
    pub modes: BTreeMap<String, ModeEntry>,
}

impl BenchmarkStat {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            result: None,
            modes: BTreeMap::new(),
        }
    }

    /// Successful solve time for a mode, from telemetry or comparator entry.
    pub fn solve_time(&self, mode: &str) -> Option<f64> {
        let entry = self.modes.get(mode)?;
        entry
            .telemetry()
            .map(|t| t.solve_time)
            .or_else(|| entry.seconds())
    }

    /// Successful iteration count for a solver mode.
    pub fn solve_iters(&self, mode: &str) -> Option<u64> {
        self.modes.get(mode)?.telemetry().map(|t| t.solve_iters)
    }
}

/// Ordered per-benchmark entries for one suite run; the sole durable artifact.
pub type SuiteLog = Vec<BenchmarkStat>;

/// Write a suite log wholesale, replacing any prior artifact at `path`.
pub fn write_suite_log(path: &Path, log: &SuiteLog) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string(log).map_err(io::Error::other)?;
    fs::write(path, json)
}

/// Read a suite log persisted by an earlier collect run.
///
/// A missing or malformed file is a configuration error for the report
/// stage, surfaced before any statistics work begins.
pub fn read_suite_log(path: &Path) -> io::Result<SuiteLog> {
    let bytes = fs::read(path)
        .map_err(|e| io::Error::new(e.kind(), format!("suite log {}: {e}", path.display())))?;
    serde_json::from_slice(&bytes).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("suite log {}: {e}", path.display()),
        )
    })
}
