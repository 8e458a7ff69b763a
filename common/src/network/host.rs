//! # Host Records
//!
//! The decoded form of one `host` element of a scanner report.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    pub addr: String,
    /// `ipv4`, `ipv6` or `mac`.
    pub addr_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Tcp,
    Udp,
    Sctp,
    Ip,
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            "sctp" => Ok(Protocol::Sctp),
            "ip" => Ok(Protocol::Ip),
            _ => Err(format!("unknown transport protocol '{s}'")),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &str = match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
            Protocol::Sctp => "sctp",
            Protocol::Ip => "ip",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortRecord {
    pub port: u16,
    pub protocol: Protocol,
    /// `open`, `closed`, `filtered`, ... as reported by the scanner.
    pub state: String,
    pub service: Option<String>,
}

impl PortRecord {
    pub fn is_open(&self) -> bool {
        self.state == "open"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostRecord {
    pub addresses: Vec<Address>,
    pub hostnames: Vec<String>,
    /// Host status (`up`, `down`) when the report carries one.
    pub status: Option<String>,
    /// Ports in report order.
    pub ports: Vec<PortRecord>,
}

impl HostRecord {
    /// The first IP address of the host, falling back to any address.
    pub fn primary_addr(&self) -> Option<&str> {
        self.addresses
            .iter()
            .find(|address| address.addr_type != "mac")
            .or_else(|| self.addresses.first())
            .map(|address| address.addr.as_str())
    }

    pub fn mac_addr(&self) -> Option<&str> {
        self.addresses
            .iter()
            .find(|address| address.addr_type == "mac")
            .map(|address| address.addr.as_str())
    }

    pub fn open_ports(&self) -> impl Iterator<Item = &PortRecord> {
        self.ports.iter().filter(|port| port.is_open())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(addr: &str, addr_type: &str) -> Address {
        Address {
            addr: addr.to_string(),
            addr_type: addr_type.to_string(),
        }
    }

    #[test]
    fn primary_addr_prefers_ip_over_mac() {
        let host: HostRecord = HostRecord {
            addresses: vec![
                address("AA:BB:CC:DD:EE:FF", "mac"),
                address("192.168.1.7", "ipv4"),
            ],
            ..HostRecord::default()
        };
        assert_eq!(host.primary_addr(), Some("192.168.1.7"));
        assert_eq!(host.mac_addr(), Some("AA:BB:CC:DD:EE:FF"));
    }

    #[test]
    fn primary_addr_falls_back_to_mac() {
        let host: HostRecord = HostRecord {
            addresses: vec![address("AA:BB:CC:DD:EE:FF", "mac")],
            ..HostRecord::default()
        };
        assert_eq!(host.primary_addr(), Some("AA:BB:CC:DD:EE:FF"));
        assert_eq!(HostRecord::default().primary_addr(), None);
    }

    #[test]
    fn protocol_parses_known_names_only() {
        assert_eq!("udp".parse(), Ok(Protocol::Udp));
        assert!("icmp".parse::<Protocol>().is_err());
    }
}
