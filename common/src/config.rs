use std::path::PathBuf;
use std::time::Duration;

use crate::directive::ScanMode;

pub const DEFAULT_TARGETS: &str = "n:localhost";
pub const DEFAULT_SCANNER: &str = "nmap";
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_STDERR_CAP: usize = 64 * 1024;

/// Everything the core needs to run one scan.
///
/// Built once by the front end (flags, environment, config file) and never
/// mutated afterwards. Directive fields hold the raw shorthand strings.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub targets: String,
    pub ports: Option<String>,
    pub info: Option<String>,
    pub mode: ScanMode,
    /// Extra scanner arguments appended after the compiled options.
    pub passthrough: Vec<String>,
    pub deadline: Duration,
    /// Path or name of the scanner executable.
    pub scanner: PathBuf,
    /// Upper bound for captured stderr, in bytes.
    pub stderr_cap: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            targets: DEFAULT_TARGETS.to_string(),
            ports: None,
            info: None,
            mode: ScanMode::Default,
            passthrough: Vec::new(),
            deadline: DEFAULT_DEADLINE,
            scanner: PathBuf::from(DEFAULT_SCANNER),
            stderr_cap: DEFAULT_STDERR_CAP,
        }
    }
}
