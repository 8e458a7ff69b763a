//! # Scan Orchestration
//!
//! Runs the external scanner for one [`ScanPlan`] and turns its report into a
//! [`ScanResult`].
//!
//! Three activities run concurrently while the process is alive:
//! * **Exit watch**: `child.wait()` raced against the deadline and the caller's
//!   cancellation token.
//! * **Decode**: stdout is fed through [`HostStream`] and every host is sent over
//!   a channel as soon as it is complete.
//! * **Drain**: stderr is read into a bounded [`DiagnosticBuffer`] so the pipe never fills.
//!
//! Timeouts, cancellation and non-zero exits are [`Outcome`]s, not errors. Hosts
//! decoded before the scan ended are always returned. When the scanner is killed,
//! whatever it already wrote is still decoded for a short grace period.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufRead, BufReader};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until, timeout_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use netry_common::config::ScanConfig;
use netry_common::network::host::HostRecord;
use netry_common::scan::{HostDecodeError, Outcome, ScanResult};
use netry_protocols::nmap_xml::HostStream;

use crate::aggregator::Aggregator;
use crate::plan::{PlanError, ScanPlan};

pub mod process;

use process::DiagnosticBuffer;

/// Fallback horizon for deadlines too large to represent.
const FAR_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// How long a killed scanner's remaining output is read before the readers are stopped.
const KILL_GRACE: Duration = Duration::from_secs(2);

/// Invoked with the running host count every time a host is decoded.
pub type ProgressCallback = Box<dyn Fn(usize) + Send + Sync>;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error("failed to start scanner '{}': {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("scanner {0} was not captured")]
    Pipe(&'static str),
}

/// Where the process stood when the exit watch ended.
#[derive(Debug)]
enum ProcessState {
    Exited(ExitStatus),
    WaitFailed,
    TimedOut,
    Cancelled,
}

pub struct NmapScanner {
    program: PathBuf,
    deadline: Duration,
    stderr_cap: usize,
    on_host_found: Option<ProgressCallback>,
}

impl NmapScanner {
    pub fn new(program: impl Into<PathBuf>, deadline: Duration, stderr_cap: usize) -> Self {
        Self {
            program: program.into(),
            deadline,
            stderr_cap,
            on_host_found: None,
        }
    }

    pub fn from_config(cfg: &ScanConfig) -> Self {
        Self::new(cfg.scanner.clone(), cfg.deadline, cfg.stderr_cap)
    }

    pub fn with_progress(mut self, on_host_found: Option<ProgressCallback>) -> Self {
        self.on_host_found = on_host_found;
        self
    }

    /// Spawns the scanner for `plan` and waits until it exits, the deadline passes
    /// or `cancel` fires.
    ///
    /// Only a failure to start the process is an error.
    pub async fn run(
        &self,
        plan: &ScanPlan,
        cancel: &CancellationToken,
    ) -> Result<ScanResult, ScanError> {
        let started: Instant = Instant::now();
        let deadline: Instant = started
            .checked_add(self.deadline)
            .unwrap_or_else(|| started + FAR_FUTURE);

        let args: Vec<String> = plan.args();
        let mut child = process::spawn(&self.program, &args)?;
        let stdout = child.stdout.take().ok_or(ScanError::Pipe("stdout"))?;
        let stderr = child.stderr.take().ok_or(ScanError::Pipe("stderr"))?;

        let stop: CancellationToken = CancellationToken::new();
        let (tx, mut rx) = mpsc::unbounded_channel::<HostRecord>();
        let mut decoder: JoinHandle<Vec<HostDecodeError>> =
            tokio::spawn(stream_hosts(BufReader::new(stdout), tx, stop.clone()));
        let mut drain: JoinHandle<DiagnosticBuffer> =
            tokio::spawn(process::drain_stderr(stderr, self.stderr_cap, stop.clone()));

        let mut aggregator: Aggregator = Aggregator::new();

        let mut state: ProcessState = loop {
            tokio::select! {
                Some(host) = rx.recv() => self.collect(&mut aggregator, host),
                status = child.wait() => break match status {
                    Ok(status) => ProcessState::Exited(status),
                    Err(e) => {
                        error!("Failed to wait for scanner: {}", e);
                        ProcessState::WaitFailed
                    }
                },
                _ = sleep_until(deadline) => break ProcessState::TimedOut,
                _ = cancel.cancelled() => break ProcessState::Cancelled,
            }
        };
        debug!("Scanner process ended: {:?}", state);

        let mut stop_at: Instant = deadline;
        if !matches!(state, ProcessState::Exited(_)) {
            if let Err(e) = child.kill().await {
                warn!("Failed to kill scanner: {}", e);
            }
            stop_at = Instant::now() + KILL_GRACE;
        }

        // Output already in the pipe is still decoded, after a kill as well as a clean exit.
        let decode_errors: Vec<HostDecodeError> = loop {
            let exited: bool = matches!(state, ProcessState::Exited(_));
            tokio::select! {
                Some(host) = rx.recv() => self.collect(&mut aggregator, host),
                joined = &mut decoder => break joined.unwrap_or_else(|e| {
                    error!("Report decoder task failed: {}", e);
                    Vec::new()
                }),
                _ = sleep_until(stop_at), if !stop.is_cancelled() => {
                    if exited {
                        warn!("Deadline passed while reading the scan report");
                        state = ProcessState::TimedOut;
                    } else {
                        debug!("Scanner output still open after kill, stopping readers");
                    }
                    stop.cancel();
                }
                _ = cancel.cancelled(), if exited && !stop.is_cancelled() => {
                    state = ProcessState::Cancelled;
                    stop.cancel();
                }
            }
        };

        while let Ok(host) = rx.try_recv() {
            self.collect(&mut aggregator, host);
        }

        let diagnostics: DiagnosticBuffer = settle_drain(&mut drain, stop_at, &stop)
            .await
            .unwrap_or_else(|| DiagnosticBuffer::new(self.stderr_cap));

        let outcome: Outcome = match state {
            ProcessState::Exited(status) => {
                Outcome::classify(status.success(), status.code(), &diagnostics.text())
            }
            ProcessState::WaitFailed => Outcome::ExitedWithError { code: None },
            ProcessState::TimedOut => Outcome::TimedOut,
            ProcessState::Cancelled => Outcome::Cancelled,
        };

        debug!(
            "Scan {} with {} host(s) and {} decode error(s)",
            outcome,
            aggregator.count(),
            decode_errors.len()
        );
        Ok(aggregator.finish(outcome, diagnostics, decode_errors, started.elapsed()))
    }

    fn collect(&self, aggregator: &mut Aggregator, host: HostRecord) {
        aggregator.push(host);
        if let Some(callback) = &self.on_host_found {
            callback(aggregator.count());
        }
    }
}

/// Decodes hosts from `reader` until the report ends, or until `stop` has fired
/// and the next host would have to wait for more input.
async fn stream_hosts<R>(
    reader: R,
    tx: UnboundedSender<HostRecord>,
    stop: CancellationToken,
) -> Vec<HostDecodeError>
where
    R: AsyncBufRead + Unpin,
{
    let mut stream: HostStream<R> = HostStream::new(reader);

    loop {
        tokio::select! {
            biased;
            next = stream.next_host() => match next {
                Some(host) => {
                    if tx.send(host).is_err() {
                        break;
                    }
                }
                None => break,
            },
            _ = stop.cancelled() => break,
        }
    }

    stream.into_errors()
}

/// Waits for the stderr drain, forcing it to stop once `stop_at` passes.
async fn settle_drain(
    drain: &mut JoinHandle<DiagnosticBuffer>,
    stop_at: Instant,
    stop: &CancellationToken,
) -> Option<DiagnosticBuffer> {
    let joined = match timeout_at(stop_at, &mut *drain).await {
        Ok(joined) => joined,
        Err(_) => {
            stop.cancel();
            drain.await
        }
    };

    joined
        .map_err(|e| error!("Diagnostics reader task failed: {}", e))
        .ok()
}

/// Compiles `cfg` and runs one scan.
///
/// `on_host_found` receives the running host count, in the manner of a progress bar.
pub async fn perform_scan(
    cfg: &ScanConfig,
    cancel: &CancellationToken,
    on_host_found: Option<ProgressCallback>,
) -> Result<ScanResult, ScanError> {
    let plan: ScanPlan = ScanPlan::from_config(cfg)?;
    NmapScanner::from_config(cfg)
        .with_progress(on_host_found)
        .run(&plan, cancel)
        .await
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
