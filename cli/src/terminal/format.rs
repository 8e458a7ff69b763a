use colored::*;
use netry_common::network::host::{Address, HostRecord, PortRecord};

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

/// The name a host is listed under: its first hostname, else its address.
pub fn host_title(host: &HostRecord) -> String {
    host.hostnames
        .first()
        .map(String::as_str)
        .or_else(|| host.primary_addr())
        .unwrap_or("Unknown host")
        .to_string()
}

pub fn address_to_detail(address: &Address) -> Detail {
    let (key, color): (&str, Color) = match address.addr_type.as_str() {
        "ipv4" => ("IPv4", colors::IPV4_ADDR),
        "ipv6" => ("IPv6", colors::IPV6_ADDR),
        "mac" => ("MAC", colors::MAC_ADDR),
        other => (other, colors::TEXT_DEFAULT),
    };
    (key.to_string(), address.addr.color(color))
}

pub fn port_to_detail(port: &PortRecord) -> Detail {
    let color: Color = match port.state.as_str() {
        "open" => colors::PORT_OPEN,
        "closed" => colors::PORT_CLOSED,
        _ => colors::PORT_FILTERED,
    };
    let value: String = match &port.service {
        Some(service) => format!("{} {}", port.state.color(color), service.color(colors::SECONDARY)),
        None => port.state.color(color).to_string(),
    };
    (format!("{}/{}", port.port, port.protocol), value.normal())
}

/// Everything known about `host`, in display order.
pub fn host_to_details(host: &HostRecord) -> Vec<Detail> {
    let mut details: Vec<Detail> = host.addresses.iter().map(address_to_detail).collect();

    details.extend(
        host.hostnames
            .iter()
            .skip(1)
            .map(|name| ("Alias".to_string(), name.color(colors::SECONDARY))),
    );

    if let Some(status) = &host.status {
        details.push(("Status".to_string(), status.color(colors::TEXT_DEFAULT)));
    }

    details.extend(host.ports.iter().map(port_to_detail));
    details
}

#[cfg(test)]
mod tests {
    use super::*;
    use netry_common::network::host::Protocol;

    fn sample_host() -> HostRecord {
        HostRecord {
            addresses: vec![
                Address {
                    addr: "192.168.1.10".to_string(),
                    addr_type: "ipv4".to_string(),
                },
                Address {
                    addr: "AA:BB:CC:DD:EE:FF".to_string(),
                    addr_type: "mac".to_string(),
                },
            ],
            hostnames: vec!["printer.lan".to_string(), "hp.lan".to_string()],
            status: Some("up".to_string()),
            ports: vec![PortRecord {
                port: 631,
                protocol: Protocol::Tcp,
                state: "open".to_string(),
                service: Some("ipp".to_string()),
            }],
        }
    }

    #[test]
    fn title_prefers_hostname_then_address() {
        let mut host: HostRecord = sample_host();
        assert_eq!(host_title(&host), "printer.lan");
        host.hostnames.clear();
        assert_eq!(host_title(&host), "192.168.1.10");
    }

    #[test]
    fn details_follow_display_order() {
        let keys: Vec<String> = host_to_details(&sample_host())
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(keys, vec!["IPv4", "MAC", "Alias", "Status", "631/tcp"]);
    }
}
