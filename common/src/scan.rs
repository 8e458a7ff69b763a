//! # Scan Results
//!
//! What a finished (or interrupted) scan hands back to its caller.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::network::host::HostRecord;

/// How a scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The scanner exited successfully and its report was read to the end.
    Completed,
    /// The deadline passed and the scanner was killed.
    TimedOut,
    /// The caller aborted the scan and the scanner was killed.
    Cancelled,
    /// The scanner exited unsuccessfully. `code` is `None` when it died from a signal.
    ExitedWithError { code: Option<i32> },
    /// The scanner exited unsuccessfully because it lacked privileges.
    PermissionDenied,
}

/// Stderr fragments the scanner prints when a scan type needs root.
pub const PRIVILEGE_MARKERS: [&str; 3] = [
    "requires root",
    "root privileges",
    "Operation not permitted",
];

impl Outcome {
    /// Maps how the scanner exited, plus what it wrote to stderr, to an outcome.
    ///
    /// `code` is `None` when the process was terminated by a signal.
    pub fn classify(success: bool, code: Option<i32>, diagnostics: &str) -> Self {
        if success {
            return Outcome::Completed;
        }

        if PRIVILEGE_MARKERS
            .iter()
            .any(|marker| diagnostics.contains(marker))
        {
            Outcome::PermissionDenied
        } else {
            Outcome::ExitedWithError { code }
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Outcome::Completed)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Completed => f.write_str("completed"),
            Outcome::TimedOut => f.write_str("timed out"),
            Outcome::Cancelled => f.write_str("cancelled"),
            Outcome::ExitedWithError { code: Some(code) } => write!(f, "exited with status {code}"),
            Outcome::ExitedWithError { code: None } => f.write_str("terminated by a signal"),
            Outcome::PermissionDenied => f.write_str("permission denied"),
        }
    }
}

/// A `host` element that could not be decoded. It is skipped, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not decode host at byte {position}: {reason}")]
pub struct HostDecodeError {
    /// Byte offset in the report where the failure was noticed.
    pub position: u64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    /// Hosts in the order the scanner reported them.
    pub hosts: Vec<HostRecord>,
    pub outcome: Outcome,
    /// Whatever the scanner wrote to stderr.
    pub diagnostics: String,
    pub diagnostics_truncated: bool,
    pub decode_errors: Vec<HostDecodeError>,
    pub elapsed: Duration,
}

impl ScanResult {
    pub fn is_partial(&self) -> bool {
        !self.outcome.is_complete()
    }
}
