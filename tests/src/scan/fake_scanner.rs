//! Stand-in scanner executables written to temporary directories.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use netry_common::config::ScanConfig;
use netry_common::scan::ScanResult;
use netry_core::scanner::{ScanError, perform_scan};

/// `ETXTBSY`: the script is still open for writing in a concurrently forked child.
const TEXT_FILE_BUSY: i32 = 26;
const SPAWN_ATTEMPTS: usize = 10;

pub struct FakeScanner {
    dir: TempDir,
    path: PathBuf,
}

impl FakeScanner {
    /// Writes an executable `sh` script whose body is `body`.
    pub fn new(body: &str) -> anyhow::Result<Self> {
        let dir: TempDir = tempfile::tempdir()?;
        let path: PathBuf = dir.path().join("nmap");
        fs::write(&path, format!("#!/bin/sh\n{body}\n"))?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        Ok(Self { dir, path })
    }

    /// A scanner that prints `report` to stdout and exits with `code`.
    pub fn printing(report: &str, code: i32) -> anyhow::Result<Self> {
        Self::new(&format!("cat <<'REPORT'\n{report}\nREPORT\nexit {code}"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self, deadline: Duration) -> ScanConfig {
        ScanConfig {
            targets: "n:127.0.0.1".to_string(),
            deadline,
            scanner: self.path.clone(),
            ..ScanConfig::default()
        }
    }
}

pub fn host(addr: &str, ports: &[(u16, &str, &str)]) -> String {
    let ports: String = ports
        .iter()
        .map(|(port, state, service)| {
            format!(
                r#"<port protocol="tcp" portid="{port}"><state state="{state}" reason="syn-ack"/><service name="{service}" method="table" conf="3"/></port>"#
            )
        })
        .collect();

    format!(
        r#"<host starttime="1700000000" endtime="1700000001"><status state="up" reason="syn-ack"/><address addr="{addr}" addrtype="ipv4"/><hostnames><hostname name="host-{addr}" type="PTR"/></hostnames><ports>{ports}</ports></host>"#
    )
}

pub fn report(hosts: &[String]) -> String {
    format!("{}{}\n</nmaprun>", report_head(), hosts.join("\n"))
}

/// Everything up to and including the `nmaprun` start tag.
pub fn report_head() -> String {
    concat!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
        "<!DOCTYPE nmaprun>\n",
        "<nmaprun scanner=\"nmap\" args=\"nmap -oX -\" start=\"1700000000\" version=\"7.94\" xmloutputversion=\"1.05\">\n",
        "<scaninfo type=\"syn\" protocol=\"tcp\" numservices=\"1000\" services=\"1-1000\"/>\n",
    )
    .to_string()
}

/// Runs a scan, retrying while the freshly written script is still busy.
pub async fn run(cfg: &ScanConfig, cancel: &CancellationToken) -> Result<ScanResult, ScanError> {
    let mut attempt: usize = 1;
    loop {
        match perform_scan(cfg, cancel, None).await {
            Err(ScanError::Spawn { source, .. })
                if source.raw_os_error() == Some(TEXT_FILE_BUSY) && attempt < SPAWN_ATTEMPTS =>
            {
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            other => return other,
        }
    }
}
