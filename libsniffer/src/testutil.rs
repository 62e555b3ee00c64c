//! Hand-built frames for unit tests

use pnet_base::MacAddr;

pub const MAC_SRC: MacAddr = MacAddr(0x00, 0x1b, 0x2c, 0x3d, 0x4e, 0x5f);
pub const MAC_DST: MacAddr = MacAddr(0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff);

fn mac_bytes(m: MacAddr) -> [u8; 6] {
    [m.0, m.1, m.2, m.3, m.4, m.5]
}

pub fn ethernet(ethertype: u16, payload: &[u8]) -> Vec<u8> {
    let mut v = Vec::with_capacity(14 + payload.len());
    v.extend_from_slice(&mac_bytes(MAC_DST));
    v.extend_from_slice(&mac_bytes(MAC_SRC));
    v.extend_from_slice(&ethertype.to_be_bytes());
    v.extend_from_slice(payload);
    v
}

/// IPv4 header from 192.168.1.10 to 192.168.1.20, no options
pub fn ipv4(proto: u8, payload: &[u8]) -> Vec<u8> {
    let total_len = (20 + payload.len()) as u16;
    let mut v = vec![0x45, 0];
    v.extend_from_slice(&total_len.to_be_bytes());
    v.extend_from_slice(&[0x12, 0x34, 0, 0, 64, proto, 0, 0]);
    v.extend_from_slice(&[192, 168, 1, 10]);
    v.extend_from_slice(&[192, 168, 1, 20]);
    v.extend_from_slice(payload);
    v
}

/// IPv6 header from ::1 to ::1
pub fn ipv6(next_header: u8, payload: &[u8]) -> Vec<u8> {
    let mut v = vec![0x60, 0, 0, 0];
    v.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    v.extend_from_slice(&[next_header, 255]);
    let mut localhost = [0u8; 16];
    localhost[15] = 1;
    v.extend_from_slice(&localhost);
    v.extend_from_slice(&localhost);
    v.extend_from_slice(payload);
    v
}

pub fn tcp(src_port: u16, dst_port: u16, flags: u8) -> Vec<u8> {
    let mut v = Vec::with_capacity(20);
    v.extend_from_slice(&src_port.to_be_bytes());
    v.extend_from_slice(&dst_port.to_be_bytes());
    v.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 0]);
    v.extend_from_slice(&[0x50, flags, 0xff, 0xff, 0, 0, 0, 0]);
    v
}

pub fn udp(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    let mut v = Vec::with_capacity(8 + payload.len());
    v.extend_from_slice(&src_port.to_be_bytes());
    v.extend_from_slice(&dst_port.to_be_bytes());
    v.extend_from_slice(&((8 + payload.len()) as u16).to_be_bytes());
    v.extend_from_slice(&[0, 0]);
    v.extend_from_slice(payload);
    v
}

pub fn icmpv6(icmp_type: u8, code: u8, body: &[u8]) -> Vec<u8> {
    let mut v = vec![icmp_type, code, 0, 0];
    v.extend_from_slice(body);
    v
}

pub fn udp4_frame(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    ethernet(0x0800, &ipv4(17, &udp(src_port, dst_port, payload)))
}

/// Neighbor Solicitation for ::1 with a source link-layer address option
pub fn neighbor_solicitation_frame() -> Vec<u8> {
    let mut body = vec![0u8; 4];
    let mut target = [0u8; 16];
    target[15] = 1;
    body.extend_from_slice(&target);
    body.extend_from_slice(&[1, 1, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05]);
    ethernet(0x86dd, &ipv6(58, &icmpv6(135, 0, &body)))
}

/// ARP request: who has 10.0.0.2, tell 10.0.0.1
pub fn arp_request_frame() -> Vec<u8> {
    let mut v = vec![0, 1, 0x08, 0x00, 6, 4, 0, 1];
    v.extend_from_slice(&mac_bytes(MAC_SRC));
    v.extend_from_slice(&[10, 0, 0, 1]);
    v.extend_from_slice(&[0u8; 6]);
    v.extend_from_slice(&[10, 0, 0, 2]);
    let mut frame = Vec::with_capacity(14 + v.len());
    frame.extend_from_slice(&[0xff; 6]);
    frame.extend_from_slice(&mac_bytes(MAC_SRC));
    frame.extend_from_slice(&0x0806u16.to_be_bytes());
    frame.extend_from_slice(&v);
    frame
}
