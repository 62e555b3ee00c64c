use std::fmt::Write as _;
use std::io::{self, Write};

use libsniffer_tools::Timestamp;
use nom::HexDisplay;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::record::*;

const TCP_FLAG_NAMES: [(u8, &str); 8] = [
    (0x01, "FIN"),
    (0x02, "SYN"),
    (0x04, "RST"),
    (0x08, "PSH"),
    (0x10, "ACK"),
    (0x20, "URG"),
    (0x40, "ECE"),
    (0x80, "CWR"),
];

/// RFC 3339 representation (UTC) of a capture timestamp
pub fn format_timestamp(ts: Timestamp) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(ts.unix_nanos())
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
        .unwrap_or_else(|| ts.to_string())
}

pub fn format_tcp_flags(flags: u8) -> String {
    let names: Vec<_> = TCP_FLAG_NAMES
        .iter()
        .filter(|(bit, _)| flags & bit != 0)
        .map(|(_, name)| *name)
        .collect();
    if names.is_empty() {
        "(none)".to_owned()
    } else {
        names.join(" ")
    }
}

fn render_fields(record: &PacketRecord) -> String {
    let mut s = String::new();
    // writing to a String cannot fail
    let _ = writeln!(s, "timestamp: {}", format_timestamp(record.captured_at));
    let _ = writeln!(s, "src MAC: {}", UpperMac(&record.link.src));
    let _ = writeln!(s, "dst MAC: {}", UpperMac(&record.link.dst));
    let _ = writeln!(s, "frame length: {} bytes", record.frame_len);
    match record.network {
        Network::Ipv4 { .. } | Network::Ipv6 { .. } => {
            if let Some((src, dst)) = record.network.ip_addresses() {
                let _ = writeln!(s, "src IP: {src}");
                let _ = writeln!(s, "dst IP: {dst}");
            }
        }
        Network::Arp(ref arp) => {
            let _ = writeln!(
                s,
                "ARP operation: {} ({})",
                arp.operation,
                arp.operation_name()
            );
            let _ = writeln!(s, "sender MAC: {}", UpperMac(&arp.sender_hw));
            let _ = writeln!(s, "sender IP: {}", arp.sender_proto);
            let _ = writeln!(s, "target MAC: {}", UpperMac(&arp.target_hw));
            let _ = writeln!(s, "target IP: {}", arp.target_proto);
        }
        Network::Unknown { .. } => (),
    }
    match record.transport {
        Some(Transport::Tcp {
            src_port,
            dst_port,
            flags,
        }) => {
            let _ = writeln!(s, "src port: {src_port}");
            let _ = writeln!(s, "dst port: {dst_port}");
            let _ = writeln!(s, "TCP flags: {}", format_tcp_flags(flags));
        }
        Some(Transport::Udp { src_port, dst_port }) => {
            let _ = writeln!(s, "src port: {src_port}");
            let _ = writeln!(s, "dst port: {dst_port}");
        }
        Some(Transport::Icmpv4 { icmp_type, code }) => {
            let _ = writeln!(s, "ICMP type: {icmp_type}");
            let _ = writeln!(s, "ICMP code: {code}");
        }
        Some(Transport::Icmpv6 {
            icmp_type,
            code,
            ref nd_options,
        }) => {
            let _ = writeln!(s, "ICMPv6 type: {icmp_type}");
            let _ = writeln!(s, "ICMPv6 code: {code}");
            for opt in nd_options {
                let _ = writeln!(
                    s,
                    "ND option: {} {}",
                    opt.kind,
                    UpperMac(&opt.link_address)
                );
            }
        }
        Some(Transport::Igmp { igmp_type }) => {
            let _ = writeln!(s, "IGMP type: {igmp_type}");
        }
        None => (),
    }
    s
}

/// Text block describing a record, terminated by a blank line
pub fn render(record: &PacketRecord) -> String {
    let mut s = render_fields(record);
    s.push('\n');
    s
}

/// Writes one block per reported record, flushing after each of them
pub struct Reporter<W: Write> {
    out: W,
    hexdump: bool,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, hexdump: bool) -> Self {
        Reporter { out, hexdump }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Write the block for `record`, followed by a dump of `data` if enabled
    pub fn report(&mut self, record: &PacketRecord, data: &[u8]) -> io::Result<()> {
        self.out.write_all(render_fields(record).as_bytes())?;
        if self.hexdump {
            self.out.write_all(data.to_hex(16).as_bytes())?;
        }
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::decode;
    use crate::testutil::*;

    #[test]
    fn render_udp() {
        let mut record = decode(&udp4_frame(1234, 5678, b"abcd")).unwrap();
        record.captured_at = Timestamp::new(1_700_000_000, 0);
        let expected = "\
timestamp: 2023-11-14T22:13:20Z
src MAC: 00:1B:2C:3D:4E:5F
dst MAC: AA:BB:CC:DD:EE:FF
frame length: 46 bytes
src IP: 192.168.1.10
dst IP: 192.168.1.20
src port: 1234
dst port: 5678

";
        assert_eq!(render(&record), expected);
    }

    #[test]
    fn render_neighbor_solicitation() {
        let record = decode(&neighbor_solicitation_frame()).unwrap();
        let s = render(&record);
        let lines: Vec<_> = s.lines().collect();
        assert_eq!(lines[0], "timestamp: 1970-01-01T00:00:00Z");
        assert_eq!(
            &lines[4..],
            &[
                "src IP: ::1",
                "dst IP: ::1",
                "ICMPv6 type: 135",
                "ICMPv6 code: 0",
                "ND option: source link-layer address 00:01:02:03:04:05",
                "",
            ]
        );
        assert!(!s.contains("port"));
    }

    #[test]
    fn render_arp_and_tcp() {
        let s = render(&decode(&arp_request_frame()).unwrap());
        assert!(s.contains("dst MAC: FF:FF:FF:FF:FF:FF\n"));
        assert!(s.contains("ARP operation: 1 (request)\n"));
        assert!(s.contains("target IP: 10.0.0.2\n"));
        assert!(!s.contains("src IP"));

        let s = render(&decode(&ethernet(0x0800, &ipv4(6, &tcp(80, 50000, 0x12)))).unwrap());
        assert!(s.contains("src port: 80\ndst port: 50000\nTCP flags: SYN ACK\n"));
        assert_eq!(format_tcp_flags(0), "(none)");
    }

    #[test]
    fn render_arp_zero_source_mac() {
        // broadcast request from an unconfigured sender
        let mut frame = arp_request_frame();
        frame[6..12].fill(0);
        let s = render(&decode(&frame).unwrap());
        let lines: Vec<_> = s.lines().collect();
        assert_eq!(lines[1], "src MAC: 00:00:00:00:00:00");
        assert_eq!(lines[2], "dst MAC: FF:FF:FF:FF:FF:FF");

        let s = render(&decode(&arp_request_frame()).unwrap());
        assert!(s.contains("src MAC: 00:1B:2C:3D:4E:5F\n"));
        assert!(!s.contains("src MAC: 00:00:00:00:00:00"));
    }

    #[test]
    fn reporter_writes_blocks() {
        let frame = udp4_frame(1, 2, b"");
        let record = decode(&frame).unwrap();
        let mut reporter = Reporter::new(Vec::new(), false);
        reporter.report(&record, &frame).unwrap();
        reporter.report(&record, &frame).unwrap();
        let out = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(out, render(&record).repeat(2));

        let mut reporter = Reporter::new(Vec::new(), true);
        reporter.report(&record, &frame).unwrap();
        let out = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(out.starts_with(&render_fields(&record)));
        assert!(out.len() > render(&record).len());
        assert!(out.ends_with("\n\n"));
    }
}
