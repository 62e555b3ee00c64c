use std::fmt;

use pnet_packet::icmpv6::Icmpv6Types;
use pnet_packet::ip::{IpNextHeaderProtocol, IpNextHeaderProtocols};

pub const ETHERNET_HEADER_LEN: usize = 14;
pub const IPV4_MIN_HEADER_LEN: usize = 20;
pub const IPV6_HEADER_LEN: usize = 40;
pub const ARP_ETHERNET_IPV4_LEN: usize = 28;
pub const TCP_MIN_HEADER_LEN: usize = 20;
pub const UDP_HEADER_LEN: usize = 8;
pub const ICMP_HEADER_LEN: usize = 4;
pub const IGMP_HEADER_LEN: usize = 8;

// Multicast Listener Discovery message types (RFC 2710, RFC 3810)
pub const MLD_QUERY: u8 = 130;
pub const MLD_REPORT: u8 = 131;
pub const MLD_DONE: u8 = 132;
pub const MLD_REPORT_V2: u8 = 143;

/// Header, max response delay, reserved and multicast address
pub const MLD_V1_LEN: usize = 24;

/// Returns true if `proto` is an IPv6 extension header
pub fn is_ipv6_ext_header(proto: IpNextHeaderProtocol) -> bool {
    matches!(
        proto,
        IpNextHeaderProtocols::Hopopt
            | IpNextHeaderProtocols::Ipv6Opts
            | IpNextHeaderProtocols::Ipv6Route
            | IpNextHeaderProtocols::Ipv6Frag
            | IpNextHeaderProtocols::Esp
            | IpNextHeaderProtocols::Ah
            | IpNextHeaderProtocols::MobilityHeader
            | IpNextHeaderProtocols::Ipv6NoNxt
    )
}

/// Length of the fixed part (ICMPv6 header included) of a Neighbor Discovery
/// message, or `None` if `icmp_type` is not a Neighbor Discovery message
pub fn ndp_fixed_len(icmp_type: u8) -> Option<usize> {
    match icmp_type {
        t if t == Icmpv6Types::RouterSolicit.0 => Some(8),
        t if t == Icmpv6Types::RouterAdvert.0 => Some(16),
        t if t == Icmpv6Types::NeighborSolicit.0 => Some(24),
        t if t == Icmpv6Types::NeighborAdvert.0 => Some(24),
        t if t == Icmpv6Types::Redirect.0 => Some(40),
        _ => None,
    }
}

pub fn is_mld(icmp_type: u8) -> bool {
    matches!(icmp_type, MLD_QUERY | MLD_REPORT | MLD_DONE | MLD_REPORT_V2)
}

/// Length of the fixed part of an ICMPv6 message followed by TLV options
///
/// Covers Neighbor Discovery messages and MLDv1 queries, reports and dones.
pub fn options_offset(icmp_type: u8) -> Option<usize> {
    match icmp_type {
        MLD_QUERY | MLD_REPORT | MLD_DONE => Some(MLD_V1_LEN),
        t => ndp_fixed_len(t),
    }
}

/// Protocol classification used for filtering
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ProtocolKind {
    Tcp,
    Udp,
    Icmp4,
    Icmp6,
    Arp,
    Ndp,
    Mld,
    Igmp,
}

impl ProtocolKind {
    /// Classify an ICMPv6 message type
    pub fn from_icmpv6_type(icmp_type: u8) -> ProtocolKind {
        if ndp_fixed_len(icmp_type).is_some() {
            ProtocolKind::Ndp
        } else if is_mld(icmp_type) {
            ProtocolKind::Mld
        } else {
            ProtocolKind::Icmp6
        }
    }

    /// Returns true if records of this kind carry ports
    pub fn has_ports(self) -> bool {
        matches!(self, ProtocolKind::Tcp | ProtocolKind::Udp)
    }
}

impl fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            ProtocolKind::Tcp => "tcp",
            ProtocolKind::Udp => "udp",
            ProtocolKind::Icmp4 => "icmp4",
            ProtocolKind::Icmp6 => "icmp6",
            ProtocolKind::Arp => "arp",
            ProtocolKind::Ndp => "ndp",
            ProtocolKind::Mld => "mld",
            ProtocolKind::Igmp => "igmp",
        };
        f.write_str(s)
    }
}
