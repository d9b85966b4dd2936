//! Netlink message fixtures for testing.
//!
//! Captured bodies are kept as byte literals in host (little-endian) order
//! the way the kernel sends them; the builders assemble arbitrary records
//! for the edge cases.

use super::attr::{NLA_HDRLEN, nla_align};
use super::message::{NlMsgHdr, nlmsg_align};
use super::types::addr::IfAddrMsg;
use super::types::link::IfInfoMsg;

/// Wrap `payload` in a netlink header and pad it to the message alignment.
pub fn nlmsg(msg_type: u16, payload: &[u8]) -> Vec<u8> {
    let hdr = NlMsgHdr::new(msg_type, payload.len());
    let mut buf = hdr.as_bytes().to_vec();
    buf.extend_from_slice(payload);
    buf.resize(nlmsg_align(buf.len()), 0);
    buf
}

/// Encode a single attribute, padded.
pub fn attr(attr_type: u16, payload: &[u8]) -> Vec<u8> {
    let len = (NLA_HDRLEN + payload.len()) as u16;
    let mut buf = Vec::with_capacity(nla_align(len as usize));
    buf.extend_from_slice(&len.to_ne_bytes());
    buf.extend_from_slice(&attr_type.to_ne_bytes());
    buf.extend_from_slice(payload);
    buf.resize(nla_align(buf.len()), 0);
    buf
}

/// Build an Ethernet link body: ifinfomsg followed by the given attributes.
pub fn link_body(index: i32, flags: u32, attrs: &[Vec<u8>]) -> Vec<u8> {
    let header = IfInfoMsg {
        ifi_type: 1, // ARPHRD_ETHER
        ifi_index: index,
        ifi_flags: flags,
        ..Default::default()
    };
    let mut buf = header.as_bytes().to_vec();
    for a in attrs {
        buf.extend_from_slice(a);
    }
    buf
}

/// Build an IPv4 address body: ifaddrmsg followed by the given attributes.
pub fn addr_body(index: u32, prefix_len: u8, attrs: &[Vec<u8>]) -> Vec<u8> {
    let header = IfAddrMsg {
        ifa_family: libc::AF_INET as u8,
        ifa_prefixlen: prefix_len,
        ifa_index: index,
        ..Default::default()
    };
    let mut buf = header.as_bytes().to_vec();
    for a in attrs {
        buf.extend_from_slice(a);
    }
    buf
}

/// Link body for eth0, index 7, as sent when it comes up with carrier.
pub fn link_eth0_up() -> Vec<u8> {
    vec![
        // ifinfomsg: family=0, pad=0, type=1 (ARPHRD_ETHER), index=7, flags=0x11043 (UP|BROADCAST|RUNNING|MULTICAST|LOWER_UP), change=0
        0x00, 0x00, // family, pad
        0x01, 0x00, // type = 1 (ARPHRD_ETHER)
        0x07, 0x00, 0x00, 0x00, // index = 7
        0x43, 0x10, 0x01, 0x00, // flags
        0x00, 0x00, 0x00, 0x00, // change = 0
        // IFLA_IFNAME = "eth0"
        0x09, 0x00, // len = 9
        0x03, 0x00, // type = IFLA_IFNAME (3)
        b'e', b't', b'h', b'0', 0x00, 0x00, 0x00, 0x00, // "eth0\0" + padding
        // IFLA_MTU = 1500
        0x08, 0x00, // len = 8
        0x04, 0x00, // type = IFLA_MTU (4)
        0xdc, 0x05, 0x00, 0x00, // mtu = 1500
        // IFLA_OPERSTATE = 6 (UP)
        0x05, 0x00, // len = 5
        0x10, 0x00, // type = IFLA_OPERSTATE (16)
        0x06, 0x00, 0x00, 0x00, // operstate = 6 + padding
    ]
}

/// Address body for 192.168.1.10/24 on index 7.
pub fn addr_eth0_v4() -> Vec<u8> {
    vec![
        // ifaddrmsg: family=AF_INET, prefixlen=24, flags=0x80 (IFA_F_PERMANENT), scope=RT_SCOPE_UNIVERSE, index=7
        0x02, // family = AF_INET
        0x18, // prefixlen = 24
        0x80, // flags = IFA_F_PERMANENT
        0x00, // scope = RT_SCOPE_UNIVERSE (0)
        0x07, 0x00, 0x00, 0x00, // index = 7
        // IFA_ADDRESS = 192.168.1.10
        0x08, 0x00, // len = 8
        0x01, 0x00, // type = IFA_ADDRESS (1)
        0xc0, 0xa8, 0x01, 0x0a, // 192.168.1.10
        // IFA_LOCAL = 192.168.1.10
        0x08, 0x00, // len = 8
        0x02, 0x00, // type = IFA_LOCAL (2)
        0xc0, 0xa8, 0x01, 0x0a, // 192.168.1.10
        // IFA_LABEL = "eth0"
        0x09, 0x00, // len = 9
        0x03, 0x00, // type = IFA_LABEL (3)
        b'e', b't', b'h', b'0', 0x00, 0x00, 0x00, 0x00, // "eth0\0" + padding
    ]
}

/// Route body for a default route via 192.168.1.1 on index 7.
pub fn route_default_v4() -> Vec<u8> {
    vec![
        // rtmsg: family=AF_INET, dst_len=0, src_len=0, tos=0, table=RT_TABLE_MAIN, protocol=RTPROT_STATIC, scope=RT_SCOPE_UNIVERSE, type=RTN_UNICAST
        0x02, 0x00, 0x00, 0x00, // family, dst_len, src_len, tos
        0xfe, 0x04, 0x00, 0x01, // table, protocol, scope, type
        0x00, 0x00, 0x00, 0x00, // flags = 0
        // RTA_GATEWAY = 192.168.1.1
        0x08, 0x00, // len = 8
        0x05, 0x00, // type = RTA_GATEWAY (5)
        0xc0, 0xa8, 0x01, 0x01, // 192.168.1.1
        // RTA_OIF = 7
        0x08, 0x00, // len = 8
        0x04, 0x00, // type = RTA_OIF (4)
        0x07, 0x00, 0x00, 0x00, // oif = 7
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::messages::{AddressMessage, LinkMessage};
    use crate::netlink::parse::FromNetlink;

    #[test]
    fn test_parse_link_eth0() {
        let link = LinkMessage::from_bytes(&link_eth0_up()).expect("failed to parse link message");

        assert_eq!(link.ifindex(), 7);
        assert_eq!(link.name(), Some("eth0"));
        assert!(link.is_up());
        assert!(link.is_running());
    }

    #[test]
    fn test_parse_addr_eth0() {
        let addr =
            AddressMessage::from_bytes(&addr_eth0_v4()).expect("failed to parse address message");

        assert_eq!(addr.ifindex(), 7);
        assert_eq!(addr.prefix_len(), 24);
        assert!(addr.is_ipv4());
        assert_eq!(addr.local().map(|a| a.to_string()).as_deref(), Some("192.168.1.10"));
        assert_eq!(addr.label(), Some("eth0"));
    }

    #[test]
    fn test_builders_match_captures() {
        let built = link_body(
            7,
            0x11043,
            &[
                attr(3, b"eth0\0"),
                attr(4, &1500u32.to_ne_bytes()),
                attr(16, &[6]),
            ],
        );
        if cfg!(target_endian = "little") {
            assert_eq!(built, link_eth0_up());
        }
    }
}
