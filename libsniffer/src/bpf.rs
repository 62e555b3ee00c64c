//! Kernel prefilter expressions
//!
//! The expression selects a superset of what [`FilterSpec::matches`]
//! accepts, so it can be installed on the capture handle to reduce the
//! number of frames copied to userspace.

use crate::filter::{FilterSpec, PortDirection, PortFilter};
use crate::layers::ProtocolKind;

fn port_clause(p: &PortFilter) -> String {
    match p.direction {
        PortDirection::Source => format!("src port {}", p.port),
        PortDirection::Destination => format!("dst port {}", p.port),
        PortDirection::Either => format!("port {}", p.port),
        PortDirection::Both => format!("src port {} and dst port {}", p.port, p.port),
    }
}

impl FilterSpec {
    /// libpcap filter expression equivalent to (or broader than) this filter
    ///
    /// Returns `None` when every frame must be captured.
    pub fn to_bpf(&self) -> Option<String> {
        if self.is_accept_all() {
            return None;
        }
        let ports = self
            .ports()
            .iter()
            .map(port_clause)
            .collect::<Vec<_>>()
            .join(" and ");
        let protocols = self.protocols();
        let mut clauses = Vec::new();
        for kind in protocols {
            let clause = match kind {
                ProtocolKind::Tcp | ProtocolKind::Udp if !ports.is_empty() => {
                    format!("({kind} and {ports})")
                }
                ProtocolKind::Tcp | ProtocolKind::Udp => kind.to_string(),
                // port-less protocols never pass a port filter
                _ if !ports.is_empty() => continue,
                ProtocolKind::Icmp4 => "icmp".to_owned(),
                ProtocolKind::Icmp6 | ProtocolKind::Ndp => "icmp6".to_owned(),
                // MLD follows a Hop-by-Hop header, which `icmp6` does not skip
                ProtocolKind::Mld => "ip6".to_owned(),
                ProtocolKind::Arp => "arp".to_owned(),
                ProtocolKind::Igmp => "igmp".to_owned(),
            };
            if !clauses.contains(&clause) {
                clauses.push(clause);
            }
        }
        Some(clauses.join(" or "))
    }
}
