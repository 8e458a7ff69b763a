//! Collects decoded hosts into the final [`ScanResult`].

use std::time::Duration;

use netry_common::network::host::HostRecord;
use netry_common::scan::{HostDecodeError, Outcome, ScanResult};

use crate::scanner::process::DiagnosticBuffer;

/// Hosts in arrival order, waiting for the scan to end.
#[derive(Debug, Default)]
pub struct Aggregator {
    hosts: Vec<HostRecord>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, host: HostRecord) {
        self.hosts.push(host);
    }

    /// Hosts collected so far.
    pub fn count(&self) -> usize {
        self.hosts.len()
    }

    pub fn finish(
        self,
        outcome: Outcome,
        diagnostics: DiagnosticBuffer,
        decode_errors: Vec<HostDecodeError>,
        elapsed: Duration,
    ) -> ScanResult {
        ScanResult {
            hosts: self.hosts,
            outcome,
            diagnostics: diagnostics.text(),
            diagnostics_truncated: diagnostics.is_truncated(),
            decode_errors,
            elapsed,
        }
    }
}

impl Extend<HostRecord> for Aggregator {
    fn extend<T: IntoIterator<Item = HostRecord>>(&mut self, iter: T) {
        self.hosts.extend(iter);
    }
}
