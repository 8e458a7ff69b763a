//! Preset scan behaviours.

use std::fmt;
use std::str::FromStr;

use super::{DirectiveError, DirectiveKind};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanMode {
    /// Leave the scan type to the scanner.
    #[default]
    Default,
    /// Host discovery only, no port scan.
    Discover,
    /// OS and version detection, scripts and traceroute.
    Full,
    Os,
    Traceroute,
}

impl FromStr for ScanMode {
    type Err = DirectiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" | "" => Ok(ScanMode::Default),
            "discover" | "discovery" => Ok(ScanMode::Discover),
            "full" => Ok(ScanMode::Full),
            "os" => Ok(ScanMode::Os),
            "traceroute" | "tr" => Ok(ScanMode::Traceroute),
            _ => Err(DirectiveError::malformed(
                DirectiveKind::Mode,
                s,
                "expected 'default', 'discover', 'full', 'os' or 'traceroute'",
            )),
        }
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &str = match self {
            ScanMode::Default => "default",
            ScanMode::Discover => "discover",
            ScanMode::Full => "full",
            ScanMode::Os => "os",
            ScanMode::Traceroute => "traceroute",
        };
        f.write_str(name)
    }
}
