//! Port selection shorthand: `t:<count>`, `r:<start>-<end>` or `p:<ratio>`.

use std::fmt;
use std::str::FromStr;

use super::{DirectiveError, DirectiveKind};

/// Which ports the scanner should probe.
///
/// Values are kept exactly as written. Range checks (`count > 0`,
/// `1 <= start <= end <= 65535`, `0 < ratio <= 1`) happen at compile time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PortSpec {
    /// The `n` most common ports.
    TopN(i64),
    /// An inclusive port range.
    Range { start: i64, end: i64 },
    /// Every port more common than the given frequency.
    Ratio(f64),
}

impl FromStr for PortSpec {
    type Err = DirectiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| DirectiveError::malformed(DirectiveKind::Ports, s, reason);

        let Some((tag, value)) = s.trim().split_once(':') else {
            return Err(malformed("expected 't:<count>', 'r:<start>-<end>' or 'p:<ratio>'"));
        };

        match tag {
            "t" => value
                .parse::<i64>()
                .map(PortSpec::TopN)
                .map_err(|_| malformed("top-ports count is not an integer")),
            "r" => parse_range(value).ok_or_else(|| malformed("expected '<start>-<end>'")),
            "p" => parse_ratio(value).ok_or_else(|| malformed("port ratio is not a number")),
            _ => Err(malformed(&format!("unknown port type '{tag}'"))),
        }
    }
}

fn parse_range(value: &str) -> Option<PortSpec> {
    let (start, end) = value.split_once('-')?;
    let start: i64 = start.parse().ok()?;
    let end: i64 = end.parse().ok()?;
    Some(PortSpec::Range { start, end })
}

fn parse_ratio(value: &str) -> Option<PortSpec> {
    value
        .parse::<f64>()
        .ok()
        .filter(|ratio| ratio.is_finite())
        .map(PortSpec::Ratio)
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortSpec::TopN(count) => write!(f, "t:{count}"),
            PortSpec::Range { start, end } => write!(f, "r:{start}-{end}"),
            PortSpec::Ratio(ratio) => write!(f, "p:{ratio}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_port_type() {
        assert_eq!("t:100".parse(), Ok(PortSpec::TopN(100)));
        assert_eq!(
            "r:22-443".parse(),
            Ok(PortSpec::Range { start: 22, end: 443 })
        );
        assert_eq!("p:0.5".parse(), Ok(PortSpec::Ratio(0.5)));
    }

    #[test]
    fn keeps_out_of_range_numbers_for_the_compiler() {
        // Syntax is fine, the compiler decides whether the value is usable.
        assert_eq!("t:0".parse(), Ok(PortSpec::TopN(0)));
        assert_eq!("t:-3".parse(), Ok(PortSpec::TopN(-3)));
        assert_eq!(
            "r:90-80".parse(),
            Ok(PortSpec::Range { start: 90, end: 80 })
        );
        assert_eq!("p:1.5".parse(), Ok(PortSpec::Ratio(1.5)));
    }

    #[test]
    fn rejects_malformed_input() {
        let inputs: [&str; 12] = [
            "", "t", "t100", "t:", "t:ten", "x:10", "r:10", "r:a-b", "r:-5-10", "p:", "p:NaN",
            "p:inf",
        ];
        for input in inputs {
            assert!(
                input.parse::<PortSpec>().is_err(),
                "'{input}' should not parse as a port directive"
            );
        }
    }

    #[test]
    fn rejects_integer_overflow() {
        assert!("t:99999999999999999999".parse::<PortSpec>().is_err());
    }
}
