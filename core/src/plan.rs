//! # Scan Plan
//!
//! The ordered argument list for one scanner invocation:
//!
//! 1. `-oX -` so the report is streamed to stdout.
//! 2. Targets, then ports, then info probes. Output flags hidden in an explicit
//!    target list are dropped like passthrough ones.
//! 3. The scan mode preset.
//! 4. Passthrough arguments, minus any that would redirect the report.

use thiserror::Error;
use tracing::{debug, warn};

use netry_common::config::ScanConfig;
use netry_common::directive::{Directive, DirectiveError, DirectiveKind};

use crate::compiler::{self, CompileError, CompiledOption};

pub const XML_TO_STDOUT: [&str; 2] = ["-oX", "-"];

/// Output flags that would send the report somewhere other than stdout.
pub const OUTPUT_FLAGS: [&str; 5] = ["-oN", "-oX", "-oS", "-oG", "-oA"];

const PRIVILEGED_FLAGS: [&str; 5] = ["-O", "-A", "-sS", "-sU", "-sO"];

#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Directive(#[from] DirectiveError),
    #[error("invalid {kind} directive '{raw}': {source}")]
    Compile {
        kind: DirectiveKind,
        raw: String,
        #[source]
        source: CompileError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPlan {
    options: Vec<CompiledOption>,
    passthrough: Vec<String>,
    skipped_info: Vec<String>,
}

impl ScanPlan {
    /// Parses and compiles every directive in `cfg`.
    ///
    /// Fails on the first malformed or out-of-range directive, in the order
    /// targets, ports, info.
    pub fn from_config(cfg: &ScanConfig) -> Result<Self, PlanError> {
        let mut options: Vec<CompiledOption> = Vec::new();
        let mut skipped_info: Vec<String> = Vec::new();

        let targets: CompiledOption = compile_field(DirectiveKind::Targets, &cfg.targets)?;
        options.push(CompiledOption::positional(strip_output_flags(
            targets.tokens(),
            "target",
        )));

        if let Some(ports) = cfg.ports.as_deref() {
            options.push(compile_field(DirectiveKind::Ports, ports)?);
        }

        if let Some(info) = cfg.info.as_deref() {
            let directive: Directive = Directive::parse(DirectiveKind::Info, info)?;
            if let Directive::Info(request) = &directive {
                skipped_info.extend(request.skipped().iter().cloned());
            }
            options.push(compile_directive(&directive, info)?);
        }

        options.push(compiler::compile_mode(cfg.mode));
        options.retain(|option| !option.is_empty());

        let plan: ScanPlan = ScanPlan {
            options,
            passthrough: strip_output_flags(&cfg.passthrough, "passthrough"),
            skipped_info,
        };
        debug!("Compiled scan plan: {}", plan.args().join(" "));
        Ok(plan)
    }

    /// The complete argument list, excluding the program name.
    pub fn args(&self) -> Vec<String> {
        XML_TO_STDOUT
            .iter()
            .map(|token| token.to_string())
            .chain(self.options.iter().flat_map(|option| option.tokens().iter().cloned()))
            .chain(self.passthrough.iter().cloned())
            .collect()
    }

    pub fn options(&self) -> &[CompiledOption] {
        &self.options
    }

    pub fn passthrough(&self) -> &[String] {
        &self.passthrough
    }

    /// Info keywords that were not recognised and left out of the plan.
    pub fn skipped_info(&self) -> &[String] {
        &self.skipped_info
    }

    /// Whether any argument asks for a scan type that normally needs root.
    pub fn needs_privileges(&self) -> bool {
        self.args()
            .iter()
            .any(|arg| PRIVILEGED_FLAGS.contains(&arg.as_str()))
    }
}

fn compile_field(kind: DirectiveKind, raw: &str) -> Result<CompiledOption, PlanError> {
    let directive: Directive = Directive::parse(kind, raw)?;
    compile_directive(&directive, raw)
}

fn compile_directive(directive: &Directive, raw: &str) -> Result<CompiledOption, PlanError> {
    compiler::compile(directive).map_err(|source| PlanError::Compile {
        kind: directive.kind(),
        raw: raw.to_string(),
        source,
    })
}

/// Drops output redirection flags, along with their value when it is a separate token.
fn strip_output_flags(args: &[String], source: &str) -> Vec<String> {
    let mut kept: Vec<String> = Vec::with_capacity(args.len());
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        let Some(flag) = OUTPUT_FLAGS.iter().find(|flag| arg.starts_with(**flag)) else {
            kept.push(arg.clone());
            continue;
        };

        if arg.as_str() == *flag {
            let value: Option<&String> = iter.next();
            warn!(
                "Ignoring {} '{} {}': the report is always streamed to stdout",
                source,
                arg,
                value.map(String::as_str).unwrap_or_default()
            );
        } else {
            warn!("Ignoring {source} '{arg}': the report is always streamed to stdout");
        }
    }

    kept
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
