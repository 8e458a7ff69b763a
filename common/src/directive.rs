//! # Scan Directives
//!
//! Compact shorthand strings that describe one aspect of a scan.
//!
//! Each grammar is dispatched on a leading tag:
//! * **Ports** ([`PortSpec`]): `t:<count>`, `r:<start>-<end>`, `p:<ratio>`.
//! * **Targets** ([`TargetSpec`]): `a`, `b`, `c`, `f:<path>`, `n:<spec>`, `r:<count>`.
//! * **Info requests** ([`InfoRequest`]): comma-separated `os`, `tr`, `v:<level>`, `s:<script>`.
//!
//! The parsers only check syntax. Numeric ranges are validated when a directive
//! is compiled into scanner options, so every rejected value maps to a precise error.

use std::fmt;

use thiserror::Error;

pub mod info;
pub mod mode;
pub mod ports;
pub mod targets;

pub use info::{InfoRequest, Probe};
pub use mode::ScanMode;
pub use ports::PortSpec;
pub use targets::{PrivateClass, TargetSpec};

/// The field a directive was supplied for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    Ports,
    Targets,
    Info,
    Mode,
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &str = match self {
            DirectiveKind::Ports => "ports",
            DirectiveKind::Targets => "targets",
            DirectiveKind::Info => "info",
            DirectiveKind::Mode => "mode",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectiveError {
    #[error("malformed {kind} directive '{raw}': {reason}")]
    Malformed {
        kind: DirectiveKind,
        raw: String,
        reason: String,
    },
}

impl DirectiveError {
    pub(crate) fn malformed(kind: DirectiveKind, raw: &str, reason: impl Into<String>) -> Self {
        DirectiveError::Malformed {
            kind,
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }

    /// The field the offending directive was supplied for.
    pub fn kind(&self) -> DirectiveKind {
        match self {
            DirectiveError::Malformed { kind, .. } => *kind,
        }
    }

    /// The directive exactly as the user wrote it.
    pub fn raw(&self) -> &str {
        match self {
            DirectiveError::Malformed { raw, .. } => raw,
        }
    }
}

/// A parsed directive, tagged by the field it describes.
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    Ports(PortSpec),
    Targets(TargetSpec),
    Info(InfoRequest),
}

impl Directive {
    /// Parses `raw` with the grammar selected by `kind`.
    ///
    /// [`DirectiveKind::Mode`] is not a directive grammar and is always rejected here;
    /// use [`ScanMode`]'s `FromStr` instead.
    pub fn parse(kind: DirectiveKind, raw: &str) -> Result<Self, DirectiveError> {
        match kind {
            DirectiveKind::Ports => raw.parse().map(Directive::Ports),
            DirectiveKind::Targets => raw.parse().map(Directive::Targets),
            DirectiveKind::Info => Ok(Directive::Info(InfoRequest::parse(raw))),
            DirectiveKind::Mode => Err(DirectiveError::malformed(
                kind,
                raw,
                "scan modes are not directives",
            )),
        }
    }

    pub fn kind(&self) -> DirectiveKind {
        match self {
            Directive::Ports(_) => DirectiveKind::Ports,
            Directive::Targets(_) => DirectiveKind::Targets,
            Directive::Info(_) => DirectiveKind::Info,
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Ports(spec) => spec.fmt(f),
            Directive::Targets(spec) => spec.fmt(f),
            Directive::Info(request) => request.fmt(f),
        }
    }
}
