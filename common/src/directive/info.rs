//! Extra probe requests: a comma-separated list such as `os,tr,v:2,s:default`.
//!
//! Unknown keywords are not fatal. They are skipped, logged and kept in
//! [`InfoRequest::skipped`] so callers can report them.

use std::fmt;

use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    OsDetection,
    Traceroute,
    /// Raw level as written; validated by the compiler.
    VersionIntensity(String),
    /// Script name or category as written; validated by the compiler.
    Script(String),
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Probe::OsDetection => f.write_str("os"),
            Probe::Traceroute => f.write_str("tr"),
            Probe::VersionIntensity(level) => write!(f, "v:{level}"),
            Probe::Script(name) => write!(f, "s:{name}"),
        }
    }
}

/// An ordered list of probes. Repeated entries are preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoRequest {
    probes: Vec<Probe>,
    skipped: Vec<String>,
}

impl InfoRequest {
    /// Parses a comma-separated probe list. Never fails.
    pub fn parse(raw: &str) -> Self {
        let mut request: InfoRequest = InfoRequest::default();

        for token in raw.split(',').map(str::trim).filter(|token| !token.is_empty()) {
            match parse_probe(token) {
                Some(probe) => request.probes.push(probe),
                None => {
                    warn!("Skipping unrecognised info keyword '{token}'");
                    request.skipped.push(token.to_string());
                }
            }
        }

        request
    }

    pub fn probes(&self) -> &[Probe] {
        &self.probes
    }

    /// Tokens that were not recognised, in encounter order.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }
}

impl FromIterator<Probe> for InfoRequest {
    fn from_iter<I: IntoIterator<Item = Probe>>(iter: I) -> Self {
        InfoRequest {
            probes: iter.into_iter().collect(),
            skipped: Vec::new(),
        }
    }
}

fn parse_probe(token: &str) -> Option<Probe> {
    let (key, value) = match token.split_once(':') {
        Some((key, value)) => (key, Some(value)),
        None => (token, None),
    };

    match (key, value) {
        ("os", None) => Some(Probe::OsDetection),
        ("tr", None) => Some(Probe::Traceroute),
        ("v", value) => Some(Probe::VersionIntensity(value.unwrap_or_default().to_string())),
        ("s", value) => Some(Probe::Script(value.unwrap_or_default().to_string())),
        _ => None,
    }
}

impl fmt::Display for InfoRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, probe) in self.probes.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            probe.fmt(f)?;
        }
        Ok(())
    }
}
