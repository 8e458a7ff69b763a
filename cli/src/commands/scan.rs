use std::time::Duration;

use colored::*;
use is_root::is_root;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span, error, info, info_span, warn};

use netry_common::config::ScanConfig;
use netry_common::network::host::HostRecord;
use netry_common::scan::{Outcome, ScanResult};
use netry_common::{output, success};
use netry_core::plan::ScanPlan;
use netry_core::scanner::{NmapScanner, ProgressCallback};

use crate::terminal::{colors, format, input::InputHandle, print, spinner};

/// Runs one scan and prints what it found. Returns how the scan ended.
pub async fn scan(cfg: &ScanConfig, no_input: bool, quiet: u8) -> anyhow::Result<Outcome> {
    let plan: ScanPlan = ScanPlan::from_config(cfg)?;

    for keyword in plan.skipped_info() {
        warn!("Info keyword '{}' is not supported and was left out", keyword);
    }
    if plan.needs_privileges() && !is_root() {
        warn!("OS detection and raw scans need root privileges. The scanner may refuse to run.");
    }

    print::print_status(format!(
        "Running {} {}",
        cfg.scanner.display(),
        plan.args().join(" ")
    ));

    let cancel: CancellationToken = CancellationToken::new();
    let ctrl_c = tokio::spawn(cancel_on_ctrl_c(cancel.clone()));
    let keyboard: Option<InputHandle> = if no_input {
        None
    } else {
        InputHandle::start(cancel.clone())
    };

    let span: Span = info_span!("scan", indicatif.pb_show = true);
    spinner::start(&span, keyboard.is_some());

    let progress_span: Span = span.clone();
    let on_host_found: ProgressCallback =
        Box::new(move |count| spinner::report_scan_progress(&progress_span, count));

    let result = NmapScanner::from_config(cfg)
        .with_progress(Some(on_host_found))
        .run(&plan, &cancel)
        .instrument(span)
        .await;

    drop(keyboard);
    ctrl_c.abort();

    let result: ScanResult = result?;
    scan_ends(&result, quiet);
    Ok(result.outcome)
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        cancel.cancel();
    }
}

fn scan_ends(result: &ScanResult, quiet: u8) {
    report_outcome(result);

    if result.hosts.is_empty() {
        print::header("ZERO HOSTS DETECTED", quiet);
        if quiet == 0 {
            print::no_results();
        }
        return;
    }

    if quiet > 0 {
        output!();
    }

    print::header("Scan Results", quiet);
    print_hosts(&result.hosts, quiet);
    print_summary(result, quiet);
}

fn report_outcome(result: &ScanResult) {
    match result.outcome {
        Outcome::Completed => {}
        Outcome::TimedOut => warn!("Scan timed out. Showing the hosts found so far."),
        Outcome::Cancelled => warn!("Scan aborted. Showing the hosts found so far."),
        Outcome::PermissionDenied => {
            error!("The scanner requires root privileges for this scan. Try again with sudo.")
        }
        Outcome::ExitedWithError { .. } => error!("Scanner {}", result.outcome),
    }

    for decode_error in &result.decode_errors {
        warn!("{}", decode_error);
    }

    if !result.outcome.is_complete() && !result.diagnostics.trim().is_empty() {
        info!("Scanner diagnostics:");
        for line in result.diagnostics.lines().filter(|line| !line.trim().is_empty()) {
            print::print_status(line);
        }
        if result.diagnostics_truncated {
            warn!("Scanner diagnostics were truncated");
        }
    }
}

fn print_hosts(hosts: &[HostRecord], quiet: u8) {
    for (idx, host) in hosts.iter().enumerate() {
        match quiet {
            2.. => print::tree_head(idx, &format::host_title(host)),
            _ => print_host_tree(host, idx),
        }
        if idx + 1 != hosts.len() && quiet < 2 {
            output!();
        }
    }
}

fn print_host_tree(host: &HostRecord, idx: usize) {
    print::tree_head(idx, &format::host_title(host));
    print::as_tree_one_level(&format::host_to_details(host));
}

fn print_summary(result: &ScanResult, quiet: u8) {
    let open_ports: usize = result.hosts.iter().map(|host| host.open_ports().count()).sum();
    let hosts: ColoredString = format!("{} hosts", result.hosts.len()).bold().green();
    let ports: ColoredString = format!("{open_ports} open ports").bold().green();
    let total_time: ColoredString = seconds(result.elapsed).bold().yellow();
    let verb: &str = if result.outcome.is_complete() {
        "Scan Complete"
    } else {
        "Scan Incomplete"
    };
    let line: ColoredString =
        format!("{verb}: {hosts} with {ports} in {total_time}").color(colors::TEXT_DEFAULT);

    match quiet {
        0 => {
            print::summary_banner(&line.to_string());
        }
        _ => {
            output!();
            success!("{}", line);
        }
    }
}

fn seconds(elapsed: Duration) -> String {
    format!("{:.2}s", elapsed.as_secs_f64())
}
