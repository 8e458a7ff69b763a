//! # Configuration
//!
//! Builds the [`ScanConfig`] handed to the core. Each field is taken from the
//! first source that sets it:
//!
//! 1. **Command line** flags.
//! 2. **Environment** (`NETRY_TARGETS`, `NETRY_PORTS`, `NETRY_INFO`, `NETRY_MODE`),
//!    resolved by clap together with the flags.
//! 3. **Config file** (`--config <path>` or `~/.netry.toml`).
//! 4. Built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use directories::BaseDirs;
use serde::Deserialize;
use tracing::debug;

use netry_common::config::{DEFAULT_SCANNER, DEFAULT_STDERR_CAP, DEFAULT_TARGETS, ScanConfig};
use netry_common::directive::ScanMode;

use crate::commands::ScanArgs;

const CONFIG_FILE_NAME: &str = ".netry.toml";

/// Contents of the TOML config file. Every key is optional.
#[derive(Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub targets: Option<String>,
    pub ports: Option<String>,
    pub info: Option<String>,
    pub mode: Option<String>,
    /// Seconds before the scan is abandoned.
    pub timeout: Option<u64>,
    pub scanner: Option<PathBuf>,
    pub args: Vec<String>,
    pub stderr_cap: Option<usize>,
}

pub fn default_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| dirs.home_dir().join(CONFIG_FILE_NAME))
}

/// Reads the config file. An explicitly given file must exist; the default one may not.
pub fn load(explicit: Option<&Path>) -> anyhow::Result<FileConfig> {
    let path: PathBuf = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_path() {
            Some(path) if path.is_file() => path,
            _ => return Ok(FileConfig::default()),
        },
    };

    debug!("Loading configuration from {}", path.display());
    let raw: String = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("invalid config file {}", path.display()))
}

/// Layers the command line over the config file.
pub fn merge(args: &ScanArgs, file: FileConfig) -> anyhow::Result<ScanConfig> {
    let mode: ScanMode = match (args.mode, file.mode.as_deref()) {
        (Some(mode), _) => mode,
        (None, Some(raw)) => raw
            .parse::<ScanMode>()
            .with_context(|| format!("invalid mode '{raw}' in config file"))?,
        (None, None) => ScanMode::default(),
    };

    let deadline: Duration = match args.timeout.or(file.timeout) {
        Some(secs) => Duration::from_secs(secs),
        None => ScanConfig::default().deadline,
    };

    let passthrough: Vec<String> = if args.passthrough.is_empty() {
        file.args
    } else {
        args.passthrough.clone()
    };

    Ok(ScanConfig {
        targets: args
            .targets
            .clone()
            .or(file.targets)
            .unwrap_or_else(|| DEFAULT_TARGETS.to_string()),
        ports: args.ports.clone().or(file.ports),
        info: args.info.clone().or(file.info),
        mode,
        passthrough,
        deadline,
        scanner: args
            .scanner
            .clone()
            .or(file.scanner)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SCANNER)),
        stderr_cap: file.stderr_cap.unwrap_or(DEFAULT_STDERR_CAP),
    })
}

pub fn resolve(args: &ScanArgs) -> anyhow::Result<ScanConfig> {
    let file: FileConfig = load(args.config.as_deref())?;
    merge(args, file)
}
