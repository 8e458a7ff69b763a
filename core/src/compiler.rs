//! # Option Compiler
//!
//! Turns typed directives into the argument tokens the scanner understands.
//!
//! Compilation is a pure function of its input. Every value that is
//! syntactically valid but out of range is rejected here with a precise
//! [`CompileError`], before any process is started.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use netry_common::directive::{
    Directive, InfoRequest, PortSpec, PrivateClass, Probe, ScanMode, TargetSpec,
};

pub const TOP_PORTS: &str = "--top-ports";
pub const PORT_RANGE: &str = "-p";
pub const PORT_RATIO: &str = "--port-ratio";
pub const TARGET_FILE: &str = "-iL";
pub const RANDOM_TARGETS: &str = "-iR";
pub const OS_DETECTION: &str = "-O";
pub const TRACEROUTE: &str = "--traceroute";
pub const VERSION_INTENSITY: &str = "--version-intensity";
pub const SCRIPT: &str = "--script";

const MIN_PORT: i64 = 1;
const MAX_PORT: i64 = u16::MAX as i64;
const MAX_VERSION_INTENSITY: u8 = 9;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("top-ports count must be positive, got {0}")]
    InvalidPortCount(i64),
    #[error("port range {start}-{end} must satisfy 1 <= start <= end <= 65535")]
    InvalidPortRange { start: i64, end: i64 },
    #[error("port ratio must be greater than 0 and at most 1, got {0}")]
    InvalidPortRatio(f64),
    #[error("random target count must be positive, got {0}")]
    InvalidTargetCount(i64),
    #[error("'{0}' requires a value")]
    MissingValue(&'static str),
    #[error("version intensity must be an integer from 0 to 9, got '{0}'")]
    InvalidVersionIntensity(String),
}

/// Argument tokens for one directive, in the order they must be passed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledOption {
    tokens: Vec<String>,
}

impl CompiledOption {
    pub fn flag(name: &str) -> Self {
        Self {
            tokens: vec![name.to_string()],
        }
    }

    pub fn pair(name: &str, value: impl Into<String>) -> Self {
        Self {
            tokens: vec![name.to_string(), value.into()],
        }
    }

    pub fn positional<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<String> {
        self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    fn append(&mut self, other: CompiledOption) {
        self.tokens.extend(other.tokens);
    }
}

impl fmt::Display for CompiledOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens.join(" "))
    }
}

pub fn compile(directive: &Directive) -> Result<CompiledOption, CompileError> {
    match directive {
        Directive::Ports(spec) => compile_ports(spec),
        Directive::Targets(spec) => compile_targets(spec),
        Directive::Info(request) => compile_info(request),
    }
}

pub fn compile_ports(spec: &PortSpec) -> Result<CompiledOption, CompileError> {
    match *spec {
        PortSpec::TopN(count) if count <= 0 => Err(CompileError::InvalidPortCount(count)),
        PortSpec::TopN(count) => Ok(CompiledOption::pair(TOP_PORTS, count.to_string())),
        PortSpec::Range { start, end } => {
            let in_bounds = |port: i64| (MIN_PORT..=MAX_PORT).contains(&port);
            if start > end || !in_bounds(start) || !in_bounds(end) {
                return Err(CompileError::InvalidPortRange { start, end });
            }
            Ok(CompiledOption::pair(PORT_RANGE, format!("{start}-{end}")))
        }
        PortSpec::Ratio(ratio) if ratio > 0.0 && ratio <= 1.0 => {
            Ok(CompiledOption::pair(PORT_RATIO, ratio.to_string()))
        }
        PortSpec::Ratio(ratio) => Err(CompileError::InvalidPortRatio(ratio)),
    }
}

pub fn compile_targets(spec: &TargetSpec) -> Result<CompiledOption, CompileError> {
    match spec {
        TargetSpec::PrivateClass(class) => Ok(CompiledOption::positional([class.cidr()])),
        TargetSpec::FromFile(path) => Ok(CompiledOption::pair(
            TARGET_FILE,
            path.to_string_lossy().into_owned(),
        )),
        TargetSpec::Explicit(spec) => Ok(CompiledOption::positional(spec.split_whitespace())),
        TargetSpec::Random(count) if *count <= 0 => Err(CompileError::InvalidTargetCount(*count)),
        TargetSpec::Random(count) => Ok(CompiledOption::pair(RANDOM_TARGETS, count.to_string())),
    }
}

/// Compiles every probe into its own argument pair, keeping encounter order.
pub fn compile_info(request: &InfoRequest) -> Result<CompiledOption, CompileError> {
    let mut option: CompiledOption = CompiledOption::default();
    for probe in request.probes() {
        option.append(compile_probe(probe)?);
    }
    Ok(option)
}

pub fn compile_probe(probe: &Probe) -> Result<CompiledOption, CompileError> {
    match probe {
        Probe::OsDetection => Ok(CompiledOption::flag(OS_DETECTION)),
        Probe::Traceroute => Ok(CompiledOption::flag(TRACEROUTE)),
        Probe::VersionIntensity(level) if level.is_empty() => Err(CompileError::MissingValue("v")),
        Probe::VersionIntensity(level) => match level.parse::<u8>() {
            Ok(parsed) if parsed <= MAX_VERSION_INTENSITY => {
                Ok(CompiledOption::pair(VERSION_INTENSITY, level.as_str()))
            }
            _ => Err(CompileError::InvalidVersionIntensity(level.clone())),
        },
        Probe::Script(name) if name.is_empty() => Err(CompileError::MissingValue("s")),
        Probe::Script(name) => Ok(CompiledOption::pair(SCRIPT, name.as_str())),
    }
}

pub fn compile_mode(mode: ScanMode) -> CompiledOption {
    match mode {
        ScanMode::Default => CompiledOption::default(),
        ScanMode::Discover => CompiledOption::flag("-sn"),
        ScanMode::Full => CompiledOption::flag("-A"),
        ScanMode::Os => CompiledOption::flag(OS_DETECTION),
        ScanMode::Traceroute => CompiledOption::flag(TRACEROUTE),
    }
}

/// Recovers the port directive that produced `option`, if it came from [`compile_ports`].
pub fn decompile_ports(option: &CompiledOption) -> Option<PortSpec> {
    let [flag, value] = option.tokens() else {
        return None;
    };

    match flag.as_str() {
        TOP_PORTS => value.parse().ok().map(PortSpec::TopN),
        PORT_RANGE => {
            let (start, end) = value.split_once('-')?;
            Some(PortSpec::Range {
                start: start.parse().ok()?,
                end: end.parse().ok()?,
            })
        }
        PORT_RATIO => value.parse().ok().map(PortSpec::Ratio),
        _ => None,
    }
}

/// Recovers the target directive that produced `option`, if it came from [`compile_targets`].
///
/// A bare private-network CIDR decompiles to its class, even when it was written as `n:<cidr>`.
pub fn decompile_targets(option: &CompiledOption) -> Option<TargetSpec> {
    match option.tokens() {
        [flag, path] if flag == TARGET_FILE => Some(TargetSpec::FromFile(PathBuf::from(path))),
        [flag, count] if flag == RANDOM_TARGETS => count.parse().ok().map(TargetSpec::Random),
        [single] if PrivateClass::from_cidr(single).is_some() => {
            PrivateClass::from_cidr(single).map(TargetSpec::PrivateClass)
        }
        [] => None,
        tokens => Some(TargetSpec::Explicit(tokens.join(" "))),
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
