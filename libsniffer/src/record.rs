use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use libsniffer_tools::Timestamp;
use pnet_base::MacAddr;

use crate::layers::ProtocolKind;

/// Displays a MAC address as six uppercase hexadecimal octets separated by colons
pub struct UpperMac<'a>(pub &'a MacAddr);

impl fmt::Display for UpperMac<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let m = self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            m.0, m.1, m.2, m.3, m.4, m.5
        )
    }
}

/// Link-layer (Ethernet) addresses
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkInfo {
    pub src: MacAddr,
    pub dst: MacAddr,
}

/// ARP operation and addresses, for Ethernet/IPv4
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArpInfo {
    pub operation: u16,
    pub sender_hw: MacAddr,
    pub sender_proto: Ipv4Addr,
    pub target_hw: MacAddr,
    pub target_proto: Ipv4Addr,
}

impl ArpInfo {
    pub fn operation_name(&self) -> &'static str {
        match self.operation {
            1 => "request",
            2 => "reply",
            3 => "reverse request",
            4 => "reverse reply",
            _ => "unknown",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Network {
    Ipv4 { src: Ipv4Addr, dst: Ipv4Addr },
    Ipv6 { src: Ipv6Addr, dst: Ipv6Addr },
    Arp(ArpInfo),
    Unknown { ethertype: u16 },
}

impl Network {
    /// Source and destination addresses, for IP packets
    pub fn ip_addresses(&self) -> Option<(IpAddr, IpAddr)> {
        match *self {
            Network::Ipv4 { src, dst } => Some((IpAddr::V4(src), IpAddr::V4(dst))),
            Network::Ipv6 { src, dst } => Some((IpAddr::V6(src), IpAddr::V6(dst))),
            Network::Arp(_) | Network::Unknown { .. } => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NdOptionKind {
    SourceLinkLayerAddress,
    TargetLinkLayerAddress,
}

impl fmt::Display for NdOptionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NdOptionKind::SourceLinkLayerAddress => f.write_str("source link-layer address"),
            NdOptionKind::TargetLinkLayerAddress => f.write_str("target link-layer address"),
        }
    }
}

/// Link-layer address option of a Neighbor Discovery message
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NdOption {
    pub kind: NdOptionKind,
    pub link_address: MacAddr,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transport {
    Tcp {
        src_port: u16,
        dst_port: u16,
        flags: u8,
    },
    Udp {
        src_port: u16,
        dst_port: u16,
    },
    Icmpv4 {
        icmp_type: u8,
        code: u8,
    },
    Icmpv6 {
        icmp_type: u8,
        code: u8,
        nd_options: Vec<NdOption>,
    },
    Igmp {
        igmp_type: u8,
    },
}

impl Transport {
    /// Source and destination ports, for TCP and UDP
    pub fn ports(&self) -> Option<(u16, u16)> {
        match *self {
            Transport::Tcp {
                src_port, dst_port, ..
            }
            | Transport::Udp { src_port, dst_port } => Some((src_port, dst_port)),
            _ => None,
        }
    }

    pub fn kind(&self) -> ProtocolKind {
        match *self {
            Transport::Tcp { .. } => ProtocolKind::Tcp,
            Transport::Udp { .. } => ProtocolKind::Udp,
            Transport::Icmpv4 { .. } => ProtocolKind::Icmp4,
            Transport::Icmpv6 { icmp_type, .. } => ProtocolKind::from_icmpv6_type(icmp_type),
            Transport::Igmp { .. } => ProtocolKind::Igmp,
        }
    }
}

/// Decoded view of one captured frame
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PacketRecord {
    pub captured_at: Timestamp,
    /// Number of captured bytes
    pub frame_len: usize,
    pub link: LinkInfo,
    pub network: Network,
    pub transport: Option<Transport>,
}

impl PacketRecord {
    /// The protocol kind used for filtering, if the record has one
    pub fn kind(&self) -> Option<ProtocolKind> {
        match (&self.network, &self.transport) {
            (Network::Arp(_), _) => Some(ProtocolKind::Arp),
            (_, Some(transport)) => Some(transport.kind()),
            (_, None) => None,
        }
    }

    pub fn ports(&self) -> Option<(u16, u16)> {
        self.transport.as_ref().and_then(Transport::ports)
    }
}
