use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use netry_common::config::ScanConfig;
use netry_common::directive::ScanMode;
use netry_common::network::host::{HostRecord, Protocol};
use netry_common::scan::{Outcome, ScanResult};
use netry_core::plan::ScanPlan;
use netry_core::scanner::{NmapScanner, ProgressCallback, ScanError};

use super::fake_scanner::{self, FakeScanner, host, report, report_head};

const DEADLINE: Duration = Duration::from_secs(20);

fn addresses(result: &ScanResult) -> Vec<&str> {
    result
        .hosts
        .iter()
        .filter_map(HostRecord::primary_addr)
        .collect()
}

/*************************************************************
                        Completed scans
**************************************************************/

#[tokio::test]
async fn completed_scan_returns_hosts_in_report_order() -> anyhow::Result<()> {
    let hosts: Vec<String> = vec![
        host("10.0.0.3", &[(22, "open", "ssh"), (80, "closed", "http")]),
        host("10.0.0.1", &[]),
        host("10.0.0.2", &[(443, "filtered", "https")]),
    ];
    let scanner: FakeScanner = FakeScanner::printing(&report(&hosts), 0)?;

    let result: ScanResult = fake_scanner::run(&scanner.config(DEADLINE), &CancellationToken::new()).await?;

    assert_eq!(result.outcome, Outcome::Completed);
    assert_eq!(addresses(&result), vec!["10.0.0.3", "10.0.0.1", "10.0.0.2"]);
    assert!(result.decode_errors.is_empty());

    let first: &HostRecord = &result.hosts[0];
    assert_eq!(first.hostnames, vec!["host-10.0.0.3"]);
    assert_eq!(first.status.as_deref(), Some("up"));
    assert_eq!(first.ports.len(), 2);
    assert_eq!(first.ports[0].port, 22);
    assert_eq!(first.ports[0].protocol, Protocol::Tcp);
    assert_eq!(first.ports[0].service.as_deref(), Some("ssh"));
    assert_eq!(first.open_ports().count(), 1);
    Ok(())
}

#[tokio::test]
async fn truncated_trailing_host_is_dropped() -> anyhow::Result<()> {
    let body: String = format!(
        "{}{}\n{}\n<host><status state=\"up\"/><address addr=\"10.0.0.9\" addrtype=\"ipv4\"/><ports><port protocol=\"tcp\" portid=\"2",
        report_head(),
        host("10.0.0.1", &[(22, "open", "ssh")]),
        host("10.0.0.2", &[]),
    );
    let scanner: FakeScanner = FakeScanner::printing(&body, 0)?;

    let result: ScanResult = fake_scanner::run(&scanner.config(DEADLINE), &CancellationToken::new()).await?;

    assert_eq!(result.outcome, Outcome::Completed);
    assert_eq!(addresses(&result), vec!["10.0.0.1", "10.0.0.2"]);
    assert!(result.decode_errors.is_empty(), "{:?}", result.decode_errors);
    Ok(())
}

#[tokio::test]
async fn malformed_host_is_skipped_and_reported() -> anyhow::Result<()> {
    let broken: String = host("10.0.0.2", &[]).replace("<ports></ports>", r#"<ports><port protocol="tcp" portid="http"><state state="open"/></port></ports>"#);
    let hosts: Vec<String> = vec![host("10.0.0.1", &[]), broken, host("10.0.0.3", &[])];
    let scanner: FakeScanner = FakeScanner::printing(&report(&hosts), 0)?;

    let result: ScanResult = fake_scanner::run(&scanner.config(DEADLINE), &CancellationToken::new()).await?;

    assert_eq!(addresses(&result), vec!["10.0.0.1", "10.0.0.3"]);
    assert_eq!(result.decode_errors.len(), 1);
    assert!(result.decode_errors[0].reason.contains("http"), "{:?}", result.decode_errors);
    Ok(())
}

#[tokio::test]
async fn progress_callback_sees_every_host() -> anyhow::Result<()> {
    let hosts: Vec<String> = (1..=4).map(|n| host(&format!("10.0.0.{n}"), &[])).collect();
    let scanner: FakeScanner = FakeScanner::printing(&report(&hosts), 0)?;
    let cfg: ScanConfig = scanner.config(DEADLINE);

    let seen: Arc<AtomicUsize> = Arc::new(AtomicUsize::new(0));
    let seen_ref: Arc<AtomicUsize> = seen.clone();
    let plan: ScanPlan = ScanPlan::from_config(&cfg)?;

    let on_host_found: ProgressCallback = Box::new(move |count| {
        seen_ref.fetch_max(count, Ordering::SeqCst);
    });

    let result: ScanResult = NmapScanner::from_config(&cfg)
        .with_progress(Some(on_host_found))
        .run(&plan, &CancellationToken::new())
        .await?;

    assert_eq!(result.hosts.len(), 4);
    assert_eq!(seen.load(Ordering::SeqCst), 4);
    Ok(())
}

/*************************************************************
                      Interrupted scans
**************************************************************/

#[tokio::test]
async fn deadline_overrun_keeps_hosts_found_before_the_kill() -> anyhow::Result<()> {
    let body: String = format!(
        "cat <<'REPORT'\n{}{}\n{}\nREPORT\nexec sleep 30",
        report_head(),
        host("10.0.0.1", &[(80, "open", "http")]),
        host("10.0.0.2", &[]),
    );
    let scanner: FakeScanner = FakeScanner::new(&body)?;

    let result: ScanResult =
        fake_scanner::run(&scanner.config(Duration::from_secs(2)), &CancellationToken::new()).await?;

    assert_eq!(result.outcome, Outcome::TimedOut);
    assert_eq!(addresses(&result), vec!["10.0.0.1", "10.0.0.2"]);
    assert!(result.elapsed < Duration::from_secs(15), "took {:?}", result.elapsed);
    Ok(())
}

#[tokio::test]
async fn cancellation_stops_the_scanner() -> anyhow::Result<()> {
    let body: String = format!(
        "cat <<'REPORT'\n{}{}\nREPORT\nexec sleep 30",
        report_head(),
        host("10.0.0.1", &[]),
    );
    let scanner: FakeScanner = FakeScanner::new(&body)?;
    let cancel: CancellationToken = CancellationToken::new();

    let trigger: CancellationToken = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        trigger.cancel();
    });

    let result: ScanResult = fake_scanner::run(&scanner.config(DEADLINE), &cancel).await?;

    assert_eq!(result.outcome, Outcome::Cancelled);
    assert_eq!(addresses(&result), vec!["10.0.0.1"]);
    assert!(result.elapsed < Duration::from_secs(15), "took {:?}", result.elapsed);
    Ok(())
}

/*************************************************************
                        Failed scans
**************************************************************/

#[tokio::test]
async fn root_requirement_is_permission_denied() -> anyhow::Result<()> {
    let scanner: FakeScanner = FakeScanner::new(
        "echo 'You requested a scan type which requires root privileges.' >&2\necho 'QUITTING!' >&2\nexit 1",
    )?;

    let result: ScanResult = fake_scanner::run(&scanner.config(DEADLINE), &CancellationToken::new()).await?;

    assert_eq!(result.outcome, Outcome::PermissionDenied);
    assert!(result.diagnostics.contains("QUITTING!"));
    assert!(result.hosts.is_empty());
    Ok(())
}

#[tokio::test]
async fn other_failures_keep_the_exit_code() -> anyhow::Result<()> {
    let scanner: FakeScanner = FakeScanner::new("echo 'Failed to resolve \"nowhere\".' >&2\nexit 3")?;

    let result: ScanResult = fake_scanner::run(&scanner.config(DEADLINE), &CancellationToken::new()).await?;

    assert_eq!(result.outcome, Outcome::ExitedWithError { code: Some(3) });
    assert!(result.diagnostics.contains("Failed to resolve"));
    Ok(())
}

#[tokio::test]
async fn missing_scanner_is_a_spawn_error() {
    let cfg: ScanConfig = ScanConfig {
        scanner: PathBuf::from("/nonexistent/bin/nmap"),
        ..ScanConfig::default()
    };

    let result: Result<ScanResult, ScanError> = fake_scanner::run(&cfg, &CancellationToken::new()).await;
    assert!(matches!(result, Err(ScanError::Spawn { .. })), "{result:?}");
}

#[tokio::test]
async fn noisy_stderr_is_capped() -> anyhow::Result<()> {
    let hosts: Vec<String> = vec![host("10.0.0.1", &[])];
    let body: String = format!(
        "head -c 200000 /dev/zero | tr '\\000' 'x' >&2\ncat <<'REPORT'\n{}\nREPORT\nexit 0",
        report(&hosts)
    );
    let scanner: FakeScanner = FakeScanner::new(&body)?;
    let cfg: ScanConfig = ScanConfig {
        stderr_cap: 1024,
        ..scanner.config(DEADLINE)
    };

    let result: ScanResult = fake_scanner::run(&cfg, &CancellationToken::new()).await?;

    assert_eq!(result.outcome, Outcome::Completed);
    assert_eq!(result.diagnostics.len(), 1024);
    assert!(result.diagnostics_truncated);
    assert_eq!(result.hosts.len(), 1);
    Ok(())
}

/*************************************************************
                     Argument forwarding
**************************************************************/

#[tokio::test]
async fn compiled_arguments_reach_the_scanner() -> anyhow::Result<()> {
    let scanner: FakeScanner = FakeScanner::new(&format!(
        "printf '%s\\n' \"$@\" > \"$(dirname \"$0\")/args\"\ncat <<'REPORT'\n{}\nREPORT",
        report(&[]),
    ))?;
    let cfg: ScanConfig = ScanConfig {
        targets: "a".to_string(),
        ports: Some("r:20-25".to_string()),
        info: Some("os,v:7".to_string()),
        mode: ScanMode::Discover,
        passthrough: vec!["-oN".to_string(), "out.txt".to_string(), "-T4".to_string()],
        ..scanner.config(DEADLINE)
    };

    let result: ScanResult = fake_scanner::run(&cfg, &CancellationToken::new()).await?;
    assert_eq!(result.outcome, Outcome::Completed);

    let recorded: String = fs::read_to_string(scanner.dir().join("args"))?;
    let args: Vec<&str> = recorded.lines().collect();
    assert_eq!(
        args,
        vec![
            "-oX", "-", "10.0.0.0/8", "-p", "20-25", "-O", "--version-intensity", "7", "-sn",
            "-T4",
        ]
    );
    assert!(scanner.path().exists());
    Ok(())
}
