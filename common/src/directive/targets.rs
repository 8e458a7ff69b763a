//! Target selection shorthand.
//!
//! * `a`, `b`, `c`: the RFC 1918 private network of that class.
//! * `f:<path>`: read targets from a file.
//! * `n:<spec>`: any target expression the scanner itself accepts.
//! * `r:<count>`: pick `count` random internet hosts.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::{DirectiveError, DirectiveKind};

const EXPECTED: &str = "expected 'a', 'b', 'c', 'f:<path>', 'n:<spec>' or 'r:<count>'";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrivateClass {
    A,
    B,
    C,
}

impl PrivateClass {
    /// The CIDR block reserved for this class.
    pub fn cidr(&self) -> &'static str {
        match self {
            PrivateClass::A => "10.0.0.0/8",
            PrivateClass::B => "172.16.0.0/12",
            PrivateClass::C => "192.168.0.0/16",
        }
    }

    pub fn from_cidr(cidr: &str) -> Option<Self> {
        [PrivateClass::A, PrivateClass::B, PrivateClass::C]
            .into_iter()
            .find(|class| class.cidr() == cidr)
    }
}

/// Which hosts the scanner should probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    PrivateClass(PrivateClass),
    FromFile(PathBuf),
    Explicit(String),
    Random(i64),
}

impl FromStr for TargetSpec {
    type Err = DirectiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| DirectiveError::malformed(DirectiveKind::Targets, s, reason);
        let trimmed: &str = s.trim();

        if let Some(class) = parse_class(trimmed) {
            return Ok(TargetSpec::PrivateClass(class));
        }

        let Some((tag, payload)) = trimmed.split_once(':') else {
            return Err(malformed(EXPECTED));
        };

        match tag {
            "f" if payload.is_empty() => Err(malformed("missing target file path")),
            "f" => Ok(TargetSpec::FromFile(PathBuf::from(payload))),
            "n" if payload.trim().is_empty() => Err(malformed("missing target specification")),
            "n" => Ok(TargetSpec::Explicit(payload.trim().to_string())),
            "r" => payload
                .parse::<i64>()
                .map(TargetSpec::Random)
                .map_err(|_| malformed("random target count is not an integer")),
            "a" | "b" | "c" => Err(malformed("private network classes take no payload")),
            _ => Err(malformed(&format!("unknown target type '{tag}', {EXPECTED}"))),
        }
    }
}

fn parse_class(s: &str) -> Option<PrivateClass> {
    match s {
        "a" => Some(PrivateClass::A),
        "b" => Some(PrivateClass::B),
        "c" => Some(PrivateClass::C),
        _ => None,
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetSpec::PrivateClass(PrivateClass::A) => f.write_str("a"),
            TargetSpec::PrivateClass(PrivateClass::B) => f.write_str("b"),
            TargetSpec::PrivateClass(PrivateClass::C) => f.write_str("c"),
            TargetSpec::FromFile(path) => write!(f, "f:{}", path.display()),
            TargetSpec::Explicit(spec) => write!(f, "n:{spec}"),
            TargetSpec::Random(count) => write!(f, "r:{count}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_private_classes() {
        assert_eq!("a".parse(), Ok(TargetSpec::PrivateClass(PrivateClass::A)));
        assert_eq!("b".parse(), Ok(TargetSpec::PrivateClass(PrivateClass::B)));
        assert_eq!(" c ".parse(), Ok(TargetSpec::PrivateClass(PrivateClass::C)));
    }

    #[test]
    fn parses_payload_targets() {
        assert_eq!(
            "f:/tmp/targets.txt".parse(),
            Ok(TargetSpec::FromFile(PathBuf::from("/tmp/targets.txt")))
        );
        assert_eq!(
            "n:scanme.nmap.org".parse(),
            Ok(TargetSpec::Explicit("scanme.nmap.org".to_string()))
        );
        assert_eq!("r:50".parse(), Ok(TargetSpec::Random(50)));
        assert_eq!("r:0".parse(), Ok(TargetSpec::Random(0)));
    }

    #[test]
    fn explicit_spec_keeps_inner_colons() {
        assert_eq!(
            "n:fe80::1".parse(),
            Ok(TargetSpec::Explicit("fe80::1".to_string()))
        );
    }

    #[test]
    fn rejects_missing_or_invalid_payloads() {
        let inputs: [&str; 9] = ["", "d", "f:", "n:", "n:   ", "r:", "r:many", "a:10", "x:1"];
        for input in inputs {
            let result = input.parse::<TargetSpec>();
            assert!(result.is_err(), "'{input}' should be malformed, got {result:?}");
        }
    }

    #[test]
    fn cidr_lookup_round_trips() {
        for class in [PrivateClass::A, PrivateClass::B, PrivateClass::C] {
            assert_eq!(PrivateClass::from_cidr(class.cidr()), Some(class));
        }
        assert_eq!(PrivateClass::from_cidr("10.0.0.0/24"), None);
    }
}
