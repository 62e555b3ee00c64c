//! Protocol decoder chain
//!
//! Each layer is decoded from the byte range its parent delimits. Field
//! accessors come from `pnet_packet`, but every declared length is checked
//! against the captured bytes first: a header that would be read past the
//! end of the frame is `Truncated`, inconsistent length fields are
//! `Malformed`. No partial record is ever returned.

use std::fmt;

use libsniffer_tools::{Frame, Timestamp};
use pnet_base::MacAddr;
use pnet_packet::arp::ArpPacket;
use pnet_packet::ethernet::{EtherTypes, EthernetPacket};
use pnet_packet::icmp::IcmpPacket;
use pnet_packet::icmpv6::Icmpv6Packet;
use pnet_packet::ip::{IpNextHeaderProtocol, IpNextHeaderProtocols};
use pnet_packet::ipv4::Ipv4Packet;
use pnet_packet::ipv6::Ipv6Packet;
use pnet_packet::tcp::TcpPacket;
use pnet_packet::udp::UdpPacket;
use thiserror::Error;

use crate::layers::*;
use crate::record::*;

/// Protocol layer, as reported in decoding errors
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    Ethernet,
    Arp,
    Ipv4,
    Ipv6,
    Ipv6Extension,
    Tcp,
    Udp,
    Icmpv4,
    Icmpv6,
    Igmp,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Layer::Ethernet => "Ethernet",
            Layer::Arp => "ARP",
            Layer::Ipv4 => "IPv4",
            Layer::Ipv6 => "IPv6",
            Layer::Ipv6Extension => "IPv6 extension header",
            Layer::Tcp => "TCP",
            Layer::Udp => "UDP",
            Layer::Icmpv4 => "ICMP",
            Layer::Icmpv6 => "ICMPv6",
            Layer::Igmp => "IGMP",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("{layer}: truncated header ({needed} bytes needed, {available} available)")]
    Truncated {
        layer: Layer,
        needed: usize,
        available: usize,
    },
    #[error("{layer}: malformed header ({reason})")]
    Malformed { layer: Layer, reason: &'static str },
}

#[inline]
fn require(layer: Layer, data: &[u8], needed: usize) -> Result<(), DecodeError> {
    if data.len() < needed {
        return Err(DecodeError::Truncated {
            layer,
            needed,
            available: data.len(),
        });
    }
    Ok(())
}

/// Decode a captured frame, stamping the record with the capture timestamp
pub fn decode_frame(frame: &Frame) -> Result<PacketRecord, DecodeError> {
    let mut record = decode(frame.data)?;
    record.captured_at = frame.ts;
    Ok(record)
}

/// Decode an Ethernet frame
///
/// The returned record has a null timestamp; use [`decode_frame`] for
/// captured frames.
pub fn decode(data: &[u8]) -> Result<PacketRecord, DecodeError> {
    let (link, network, transport) = decode_l2(data)?;
    Ok(PacketRecord {
        captured_at: Timestamp::default(),
        frame_len: data.len(),
        link,
        network,
        transport,
    })
}

fn decode_l2(data: &[u8]) -> Result<(LinkInfo, Network, Option<Transport>), DecodeError> {
    require(Layer::Ethernet, data, ETHERNET_HEADER_LEN)?;
    let eth = EthernetPacket::new(data).ok_or(DecodeError::Truncated {
        layer: Layer::Ethernet,
        needed: ETHERNET_HEADER_LEN,
        available: data.len(),
    })?;
    let link = LinkInfo {
        src: eth.get_source(),
        dst: eth.get_destination(),
    };
    let ethertype = eth.get_ethertype();
    trace!("    ethertype: 0x{:04x}", ethertype.0);
    let l3_data = &data[ETHERNET_HEADER_LEN..];
    let (network, transport) = match ethertype {
        EtherTypes::Ipv4 => decode_l3_ipv4(l3_data)?,
        EtherTypes::Ipv6 => decode_l3_ipv6(l3_data)?,
        EtherTypes::Arp => (decode_l3_arp(l3_data)?, None),
        _ => {
            debug!("Unsupported ethertype 0x{:04x}", ethertype.0);
            (
                Network::Unknown {
                    ethertype: ethertype.0,
                },
                None,
            )
        }
    };
    Ok((link, network, transport))
}

fn decode_l3_arp(data: &[u8]) -> Result<Network, DecodeError> {
    require(Layer::Arp, data, ARP_ETHERNET_IPV4_LEN)?;
    let arp = ArpPacket::new(data).ok_or(DecodeError::Truncated {
        layer: Layer::Arp,
        needed: ARP_ETHERNET_IPV4_LEN,
        available: data.len(),
    })?;
    if arp.get_hw_addr_len() != 6 || arp.get_proto_addr_len() != 4 {
        return Err(DecodeError::Malformed {
            layer: Layer::Arp,
            reason: "not an Ethernet/IPv4 ARP packet",
        });
    }
    Ok(Network::Arp(ArpInfo {
        operation: arp.get_operation().0,
        sender_hw: arp.get_sender_hw_addr(),
        sender_proto: arp.get_sender_proto_addr(),
        target_hw: arp.get_target_hw_addr(),
        target_proto: arp.get_target_proto_addr(),
    }))
}

fn decode_l3_ipv4(data: &[u8]) -> Result<(Network, Option<Transport>), DecodeError> {
    require(Layer::Ipv4, data, IPV4_MIN_HEADER_LEN)?;
    let ipv4 = Ipv4Packet::new(data).ok_or(DecodeError::Truncated {
        layer: Layer::Ipv4,
        needed: IPV4_MIN_HEADER_LEN,
        available: data.len(),
    })?;
    let header_len = usize::from(ipv4.get_header_length()) * 4;
    if header_len < IPV4_MIN_HEADER_LEN {
        return Err(DecodeError::Malformed {
            layer: Layer::Ipv4,
            reason: "header length below 5 words",
        });
    }
    require(Layer::Ipv4, data, header_len)?;
    // total length 0 is produced by segmentation offload
    let total_len = match usize::from(ipv4.get_total_length()) {
        0 => data.len(),
        n => n,
    };
    require(Layer::Ipv4, data, total_len)?;
    if total_len < header_len {
        return Err(DecodeError::Malformed {
            layer: Layer::Ipv4,
            reason: "total length smaller than header length",
        });
    }
    let network = Network::Ipv4 {
        src: ipv4.get_source(),
        dst: ipv4.get_destination(),
    };
    // remove padding
    let l4_data = &data[header_len..total_len];
    let l4_proto = ipv4.get_next_level_protocol();
    if ipv4.get_fragment_offset() != 0 {
        debug!("IPv4: non-first fragment, no transport header");
        return Ok((network, None));
    }
    let transport = match l4_proto {
        IpNextHeaderProtocols::Tcp => Some(decode_l4_tcp(l4_data)?),
        IpNextHeaderProtocols::Udp => Some(decode_l4_udp(l4_data)?),
        IpNextHeaderProtocols::Icmp => Some(decode_l4_icmp(l4_data)?),
        IpNextHeaderProtocols::Igmp => Some(decode_l4_igmp(l4_data)?),
        _ => {
            debug!("IPv4: Unsupported L4 proto {}", l4_proto);
            None
        }
    };
    Ok((network, transport))
}

fn decode_l3_ipv6(data: &[u8]) -> Result<(Network, Option<Transport>), DecodeError> {
    require(Layer::Ipv6, data, IPV6_HEADER_LEN)?;
    let ipv6 = Ipv6Packet::new(data).ok_or(DecodeError::Truncated {
        layer: Layer::Ipv6,
        needed: IPV6_HEADER_LEN,
        available: data.len(),
    })?;
    let network = Network::Ipv6 {
        src: ipv6.get_source(),
        dst: ipv6.get_destination(),
    };
    let payload = match usize::from(ipv6.get_payload_length()) {
        0 => {
            trace!("IPv6 length is 0. Jumbogram?");
            &data[IPV6_HEADER_LEN..]
        }
        n => {
            require(Layer::Ipv6, data, IPV6_HEADER_LEN + n)?;
            &data[IPV6_HEADER_LEN..IPV6_HEADER_LEN + n]
        }
    };
    let (l4_proto, l4_data) = match walk_ipv6_extensions(ipv6.get_next_header(), payload)? {
        Some(t) => t,
        None => return Ok((network, None)),
    };
    let transport = match l4_proto {
        IpNextHeaderProtocols::Tcp => Some(decode_l4_tcp(l4_data)?),
        IpNextHeaderProtocols::Udp => Some(decode_l4_udp(l4_data)?),
        IpNextHeaderProtocols::Icmpv6 => Some(decode_l4_icmpv6(l4_data)?),
        _ => {
            debug!("IPv6: Unsupported L4 proto {}", l4_proto);
            None
        }
    };
    Ok((network, transport))
}

/// Skip IPv6 extension headers
///
/// Returns the terminal protocol and its data, or `None` if the chain ends
/// without a decodable upper layer (ESP, No Next Header, non-first fragment,
/// or fewer than 2 bytes left).
fn walk_ipv6_extensions(
    mut l4_proto: IpNextHeaderProtocol,
    mut payload: &[u8],
) -> Result<Option<(IpNextHeaderProtocol, &[u8])>, DecodeError> {
    while is_ipv6_ext_header(l4_proto) {
        if l4_proto == IpNextHeaderProtocols::Esp || l4_proto == IpNextHeaderProtocols::Ipv6NoNxt {
            return Ok(None);
        }
        if payload.len() < 2 {
            return Ok(None);
        }
        trace!("option header: {}", l4_proto);
        // AH length is in 4-octet units minus 2, others in 8-octet units minus 1
        let ext_len = if l4_proto == IpNextHeaderProtocols::Ah {
            (usize::from(payload[1]) + 2) * 4
        } else {
            (usize::from(payload[1]) + 1) * 8
        };
        require(Layer::Ipv6Extension, payload, ext_len)?;
        if l4_proto == IpNextHeaderProtocols::Ipv6Frag {
            let frag_offset = u16::from_be_bytes([payload[2], payload[3]]) >> 3;
            if frag_offset != 0 {
                debug!("IPv6: non-first fragment, no transport header");
                return Ok(None);
            }
        }
        l4_proto = IpNextHeaderProtocol::new(payload[0]);
        payload = &payload[ext_len..];
    }
    Ok(Some((l4_proto, payload)))
}

fn decode_l4_tcp(data: &[u8]) -> Result<Transport, DecodeError> {
    require(Layer::Tcp, data, TCP_MIN_HEADER_LEN)?;
    let tcp = TcpPacket::new(data).ok_or(DecodeError::Truncated {
        layer: Layer::Tcp,
        needed: TCP_MIN_HEADER_LEN,
        available: data.len(),
    })?;
    let header_len = usize::from(tcp.get_data_offset()) * 4;
    if header_len < TCP_MIN_HEADER_LEN {
        return Err(DecodeError::Malformed {
            layer: Layer::Tcp,
            reason: "data offset below 5 words",
        });
    }
    require(Layer::Tcp, data, header_len)?;
    Ok(Transport::Tcp {
        src_port: tcp.get_source(),
        dst_port: tcp.get_destination(),
        flags: data[13],
    })
}

fn decode_l4_udp(data: &[u8]) -> Result<Transport, DecodeError> {
    require(Layer::Udp, data, UDP_HEADER_LEN)?;
    let udp = UdpPacket::new(data).ok_or(DecodeError::Truncated {
        layer: Layer::Udp,
        needed: UDP_HEADER_LEN,
        available: data.len(),
    })?;
    Ok(Transport::Udp {
        src_port: udp.get_source(),
        dst_port: udp.get_destination(),
    })
}

fn decode_l4_icmp(data: &[u8]) -> Result<Transport, DecodeError> {
    require(Layer::Icmpv4, data, ICMP_HEADER_LEN)?;
    let icmp = IcmpPacket::new(data).ok_or(DecodeError::Truncated {
        layer: Layer::Icmpv4,
        needed: ICMP_HEADER_LEN,
        available: data.len(),
    })?;
    Ok(Transport::Icmpv4 {
        icmp_type: icmp.get_icmp_type().0,
        code: icmp.get_icmp_code().0,
    })
}

fn decode_l4_igmp(data: &[u8]) -> Result<Transport, DecodeError> {
    require(Layer::Igmp, data, IGMP_HEADER_LEN)?;
    Ok(Transport::Igmp { igmp_type: data[0] })
}

fn decode_l4_icmpv6(data: &[u8]) -> Result<Transport, DecodeError> {
    require(Layer::Icmpv6, data, ICMP_HEADER_LEN)?;
    let icmpv6 = Icmpv6Packet::new(data).ok_or(DecodeError::Truncated {
        layer: Layer::Icmpv6,
        needed: ICMP_HEADER_LEN,
        available: data.len(),
    })?;
    let icmp_type = icmpv6.get_icmpv6_type().0;
    let code = icmpv6.get_icmpv6_code().0;
    let nd_options = match options_offset(icmp_type) {
        Some(fixed_len) => {
            require(Layer::Icmpv6, data, fixed_len)?;
            parse_nd_options(&data[fixed_len..])
        }
        None => Vec::new(),
    };
    Ok(Transport::Icmpv6 {
        icmp_type,
        code,
        nd_options,
    })
}

const ND_OPT_SOURCE_LL_ADDR: u8 = 1;
const ND_OPT_TARGET_LL_ADDR: u8 = 2;

/// Parse Neighbor Discovery TLV options (RFC 4861 section 4.6)
///
/// Only link-layer address options are kept. Parsing stops at the first
/// option with a zero length or a length exceeding the remaining bytes.
fn parse_nd_options(mut data: &[u8]) -> Vec<NdOption> {
    let mut options = Vec::new();
    while data.len() >= 2 {
        let opt_type = data[0];
        let opt_len = usize::from(data[1]) * 8;
        if opt_len == 0 || opt_len > data.len() {
            debug!("ND option: invalid length {opt_len}, stopping");
            break;
        }
        let kind = match opt_type {
            ND_OPT_SOURCE_LL_ADDR => Some(NdOptionKind::SourceLinkLayerAddress),
            ND_OPT_TARGET_LL_ADDR => Some(NdOptionKind::TargetLinkLayerAddress),
            _ => None,
        };
        if let Some(kind) = kind {
            // option length is at least 8, so the 6-byte address is present
            let a = &data[2..8];
            options.push(NdOption {
                kind,
                link_address: MacAddr::new(a[0], a[1], a[2], a[3], a[4], a[5]),
            });
        }
        data = &data[opt_len..];
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn decode_udp_over_ipv4() {
        let frame = udp4_frame(1234, 5678, b"hello");
        let record = decode(&frame).unwrap();
        assert_eq!(record.frame_len, frame.len());
        assert_eq!(record.link.src, MAC_SRC);
        assert_eq!(record.link.dst, MAC_DST);
        assert_eq!(
            record.network,
            Network::Ipv4 {
                src: Ipv4Addr::new(192, 168, 1, 10),
                dst: Ipv4Addr::new(192, 168, 1, 20),
            }
        );
        assert_eq!(
            record.transport,
            Some(Transport::Udp {
                src_port: 1234,
                dst_port: 5678
            })
        );
    }

    #[test]
    fn decode_tcp_flags() {
        let frame = ethernet(0x0800, &ipv4(6, &tcp(40000, 443, 0x12)));
        let record = decode(&frame).unwrap();
        assert_eq!(
            record.transport,
            Some(Transport::Tcp {
                src_port: 40000,
                dst_port: 443,
                flags: 0x12
            })
        );
    }

    #[test]
    fn decode_ipv4_padding_is_trimmed() {
        let mut frame = udp4_frame(53, 53, b"");
        // minimum-size Ethernet frame
        frame.resize(60, 0);
        let record = decode(&frame).unwrap();
        assert_eq!(record.frame_len, 60);
        assert_eq!(record.ports(), Some((53, 53)));
    }

    #[test]
    fn decode_ipv4_errors() {
        let mut l3 = ipv4(17, &udp(1, 2, b""));
        l3[0] = 0x44;
        assert!(matches!(
            decode(&ethernet(0x0800, &l3)),
            Err(DecodeError::Malformed {
                layer: Layer::Ipv4,
                ..
            })
        ));
        let mut l3 = ipv4(17, &udp(1, 2, b""));
        l3[0] = 0x4f;
        assert_eq!(
            decode(&ethernet(0x0800, &l3)),
            Err(DecodeError::Truncated {
                layer: Layer::Ipv4,
                needed: 60,
                available: 28
            })
        );
        let mut l3 = ipv4(17, &udp(1, 2, b""));
        l3[2..4].copy_from_slice(&100u16.to_be_bytes());
        assert!(matches!(
            decode(&ethernet(0x0800, &l3)),
            Err(DecodeError::Truncated {
                layer: Layer::Ipv4,
                needed: 100,
                ..
            })
        ));
        let mut l3 = ipv4(17, &udp(1, 2, b""));
        l3[2..4].copy_from_slice(&10u16.to_be_bytes());
        assert!(matches!(
            decode(&ethernet(0x0800, &l3)),
            Err(DecodeError::Malformed {
                layer: Layer::Ipv4,
                ..
            })
        ));
    }

    #[test]
    fn decode_ipv4_zero_total_length() {
        let mut l3 = ipv4(17, &udp(7, 9, b"x"));
        l3[2..4].copy_from_slice(&[0, 0]);
        let record = decode(&ethernet(0x0800, &l3)).unwrap();
        assert_eq!(record.ports(), Some((7, 9)));
    }

    #[test]
    fn decode_ipv4_fragment() {
        let mut l3 = ipv4(17, &udp(7, 9, b"x"));
        // fragment offset 185 (1480 bytes)
        l3[6..8].copy_from_slice(&185u16.to_be_bytes());
        let record = decode(&ethernet(0x0800, &l3)).unwrap();
        assert!(matches!(record.network, Network::Ipv4 { .. }));
        assert_eq!(record.transport, None);
        // first fragment, more fragments flag set
        l3[6..8].copy_from_slice(&0x2000u16.to_be_bytes());
        let record = decode(&ethernet(0x0800, &l3)).unwrap();
        assert_eq!(record.ports(), Some((7, 9)));
    }

    #[test]
    fn decode_truncated_transport() {
        let l3 = ipv4(17, &[0x12, 0x34, 0x00]);
        assert_eq!(
            decode(&ethernet(0x0800, &l3)),
            Err(DecodeError::Truncated {
                layer: Layer::Udp,
                needed: 8,
                available: 3
            })
        );
        let mut segment = tcp(1, 2, 0x02);
        segment[12] = 0x30;
        assert!(matches!(
            decode(&ethernet(0x0800, &ipv4(6, &segment))),
            Err(DecodeError::Malformed {
                layer: Layer::Tcp,
                ..
            })
        ));
        segment[12] = 0x60;
        assert_eq!(
            decode(&ethernet(0x0800, &ipv4(6, &segment))),
            Err(DecodeError::Truncated {
                layer: Layer::Tcp,
                needed: 24,
                available: 20
            })
        );
    }

    #[test]
    fn decode_short_ethernet() {
        assert_eq!(
            decode(&[0u8; 13]),
            Err(DecodeError::Truncated {
                layer: Layer::Ethernet,
                needed: 14,
                available: 13
            })
        );
        let e = decode(&[0u8; 13]).unwrap_err();
        assert_eq!(
            e.to_string(),
            "Ethernet: truncated header (14 bytes needed, 13 available)"
        );
    }

    #[test]
    fn decode_unknown_ethertype() {
        let frame = ethernet(0x88cc, &[0u8; 30]);
        let record = decode(&frame).unwrap();
        assert_eq!(record.network, Network::Unknown { ethertype: 0x88cc });
        assert_eq!(record.transport, None);
    }

    #[test]
    fn decode_arp_request() {
        let frame = arp_request_frame();
        let record = decode(&frame).unwrap();
        match record.network {
            Network::Arp(arp) => {
                assert_eq!(arp.operation, 1);
                assert_eq!(arp.operation_name(), "request");
                assert_eq!(arp.sender_hw, MAC_SRC);
                assert_eq!(arp.sender_proto, Ipv4Addr::new(10, 0, 0, 1));
                assert_eq!(arp.target_hw, MacAddr::zero());
                assert_eq!(arp.target_proto, Ipv4Addr::new(10, 0, 0, 2));
            }
            ref n => panic!("unexpected network layer {n:?}"),
        }
        assert_eq!(record.transport, None);
        assert!(matches!(
            decode(&frame[..ETHERNET_HEADER_LEN + 20]),
            Err(DecodeError::Truncated {
                layer: Layer::Arp,
                ..
            })
        ));
    }

    #[test]
    fn decode_neighbor_solicitation() {
        let frame = neighbor_solicitation_frame();
        let record = decode(&frame).unwrap();
        assert_eq!(
            record.network,
            Network::Ipv6 {
                src: Ipv6Addr::LOCALHOST,
                dst: Ipv6Addr::LOCALHOST,
            }
        );
        assert_eq!(
            record.transport,
            Some(Transport::Icmpv6 {
                icmp_type: 135,
                code: 0,
                nd_options: vec![NdOption {
                    kind: NdOptionKind::SourceLinkLayerAddress,
                    link_address: MacAddr::new(0, 1, 2, 3, 4, 5),
                }],
            })
        );
    }

    #[test]
    fn decode_nd_options() {
        let mut body = vec![0u8; 20];
        // unknown option (prefix information, 32 bytes), skipped
        body.extend_from_slice(&[3, 4]);
        body.extend_from_slice(&[0u8; 30]);
        body.extend_from_slice(&[2, 1, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        // zero-length option stops parsing
        body.extend_from_slice(&[1, 0, 1, 1, 1, 1, 1, 1]);
        let frame = ethernet(0x86dd, &ipv6(58, &icmpv6(136, 0, &body)));
        let record = decode(&frame).unwrap();
        match record.transport {
            Some(Transport::Icmpv6 { nd_options, .. }) => {
                assert_eq!(
                    nd_options,
                    vec![NdOption {
                        kind: NdOptionKind::TargetLinkLayerAddress,
                        link_address: MacAddr::new(0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff),
                    }]
                );
            }
            t => panic!("unexpected transport {t:?}"),
        }
        // option length beyond the remaining bytes stops parsing
        let mut body = vec![0u8; 20];
        body.extend_from_slice(&[1, 2, 0, 1, 2, 3, 4, 5]);
        let record = decode(&ethernet(0x86dd, &ipv6(58, &icmpv6(135, 0, &body)))).unwrap();
        assert!(matches!(
            record.transport,
            Some(Transport::Icmpv6 { ref nd_options, .. }) if nd_options.is_empty()
        ));
    }

    #[test]
    fn decode_short_nd_body() {
        let frame = ethernet(0x86dd, &ipv6(58, &icmpv6(135, 0, &[0u8; 10])));
        assert_eq!(
            decode(&frame),
            Err(DecodeError::Truncated {
                layer: Layer::Icmpv6,
                needed: 24,
                available: 14
            })
        );
    }

    #[test]
    fn decode_echo_request_v6() {
        let frame = ethernet(0x86dd, &ipv6(58, &icmpv6(128, 0, &[0, 1, 0, 1])));
        let record = decode(&frame).unwrap();
        assert_eq!(
            record.transport,
            Some(Transport::Icmpv6 {
                icmp_type: 128,
                code: 0,
                nd_options: Vec::new()
            })
        );
    }

    #[test]
    fn decode_mld_after_hop_by_hop() {
        // hop-by-hop header with router alert option, then MLDv2 report
        let mut l4 = vec![58, 0, 5, 2, 0, 0, 1, 0];
        l4.extend_from_slice(&icmpv6(143, 0, &[0u8; 4]));
        let frame = ethernet(0x86dd, &ipv6(0, &l4));
        let record = decode(&frame).unwrap();
        assert_eq!(
            record.transport,
            Some(Transport::Icmpv6 {
                icmp_type: 143,
                code: 0,
                nd_options: Vec::new()
            })
        );
        assert_eq!(record.kind(), Some(ProtocolKind::Mld));
    }

    #[test]
    fn decode_mld_query_options() {
        // general query (unspecified multicast address), then a source
        // link-layer address option
        let mut body = vec![0, 10, 0, 0];
        body.extend_from_slice(&[0u8; 16]);
        body.extend_from_slice(&[1, 1, 0x02, 0x00, 0x5e, 0x00, 0x53, 0x01]);
        let frame = ethernet(0x86dd, &ipv6(58, &icmpv6(130, 0, &body)));
        let record = decode(&frame).unwrap();
        assert_eq!(record.kind(), Some(ProtocolKind::Mld));
        assert_eq!(
            record.transport,
            Some(Transport::Icmpv6 {
                icmp_type: 130,
                code: 0,
                nd_options: vec![NdOption {
                    kind: NdOptionKind::SourceLinkLayerAddress,
                    link_address: MacAddr::new(0x02, 0x00, 0x5e, 0x00, 0x53, 0x01),
                }],
            })
        );
        // MLDv1 body shorter than the multicast address
        let frame = ethernet(0x86dd, &ipv6(58, &icmpv6(131, 0, &[0u8; 12])));
        assert_eq!(
            decode(&frame),
            Err(DecodeError::Truncated {
                layer: Layer::Icmpv6,
                needed: 24,
                available: 16
            })
        );
    }

    #[test]
    fn decode_ipv6_extensions() {
        // destination options header declaring 16 bytes, only 8 present
        let l4 = vec![17, 1, 0, 0, 0, 0, 0, 0];
        assert_eq!(
            decode(&ethernet(0x86dd, &ipv6(60, &l4))),
            Err(DecodeError::Truncated {
                layer: Layer::Ipv6Extension,
                needed: 16,
                available: 8
            })
        );
        // AH: length 4 means 24 bytes
        let mut l4 = vec![17, 4];
        l4.extend_from_slice(&[0u8; 22]);
        l4.extend_from_slice(&udp(500, 4500, b""));
        let record = decode(&ethernet(0x86dd, &ipv6(51, &l4))).unwrap();
        assert_eq!(record.ports(), Some((500, 4500)));
        // ESP stops the walk
        let record = decode(&ethernet(0x86dd, &ipv6(50, &[0u8; 16]))).unwrap();
        assert_eq!(record.transport, None);
        // non-first fragment
        let mut l4 = vec![17, 0, 0x05, 0xa8, 0, 0, 0, 1];
        l4.extend_from_slice(&udp(1, 2, b""));
        let record = decode(&ethernet(0x86dd, &ipv6(44, &l4))).unwrap();
        assert!(matches!(record.network, Network::Ipv6 { .. }));
        assert_eq!(record.transport, None);
        // first fragment
        l4[2] = 0;
        l4[3] = 1;
        let record = decode(&ethernet(0x86dd, &ipv6(44, &l4))).unwrap();
        assert_eq!(record.ports(), Some((1, 2)));
    }

    #[test]
    fn decode_ipv6_payload_length() {
        let mut l3 = ipv6(17, &udp(1000, 2000, b"abc"));
        l3[4..6].copy_from_slice(&200u16.to_be_bytes());
        assert!(matches!(
            decode(&ethernet(0x86dd, &l3)),
            Err(DecodeError::Truncated {
                layer: Layer::Ipv6,
                needed: 240,
                ..
            })
        ));
        // jumbogram
        l3[4..6].copy_from_slice(&[0, 0]);
        let record = decode(&ethernet(0x86dd, &l3)).unwrap();
        assert_eq!(record.ports(), Some((1000, 2000)));
    }

    #[test]
    fn decode_igmp() {
        let frame = ethernet(0x0800, &ipv4(2, &[0x16, 0, 0, 0, 224, 0, 0, 251]));
        let record = decode(&frame).unwrap();
        assert_eq!(record.transport, Some(Transport::Igmp { igmp_type: 0x16 }));
        let frame = ethernet(0x0800, &ipv4(2, &[0x16, 0, 0, 0]));
        assert!(matches!(
            decode(&frame),
            Err(DecodeError::Truncated {
                layer: Layer::Igmp,
                ..
            })
        ));
    }

    #[test]
    fn decode_frame_timestamp() {
        let data = udp4_frame(1, 2, b"");
        let frame = Frame {
            ts: Timestamp::new(1_700_000_000, 42),
            data: &data,
            caplen: data.len() as u32,
            origlen: data.len() as u32,
            index: 1,
        };
        let record = decode_frame(&frame).unwrap();
        assert_eq!(record.captured_at, Timestamp::new(1_700_000_000, 42));
    }
}
