//! Strongly-typed address message.

use std::net::Ipv4Addr;

use crate::netlink::attr::{AttrTable, get};
use crate::netlink::error::Result;
use crate::netlink::message::nlmsg_align;
use crate::netlink::parse::FromNetlink;
use crate::netlink::types::addr::{IFA_MAX, IfAddrMsg, ifa};

/// Address message with the attributes the monitor reports.
///
/// Only IPv4 payloads are interpreted; for other families the address
/// fields stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressMessage {
    /// Fixed-size header.
    pub(crate) header: IfAddrMsg,
    /// Local address (IFA_LOCAL).
    pub(crate) local: Option<Ipv4Addr>,
    /// Label (IFA_LABEL).
    pub(crate) label: Option<String>,
}

impl AddressMessage {
    /// Get the address family.
    pub fn family(&self) -> u8 {
        self.header.ifa_family
    }

    /// Check if this is an IPv4 address.
    pub fn is_ipv4(&self) -> bool {
        self.header.ifa_family == libc::AF_INET as u8
    }

    /// Get the prefix length.
    pub fn prefix_len(&self) -> u8 {
        self.header.ifa_prefixlen
    }

    /// Get the interface index.
    pub fn ifindex(&self) -> u32 {
        self.header.ifa_index
    }

    /// Get the local address.
    pub fn local(&self) -> Option<Ipv4Addr> {
        self.local
    }

    /// Get the label.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl FromNetlink for AddressMessage {
    fn from_bytes(data: &[u8]) -> Result<Self> {
        let header = IfAddrMsg::from_bytes(data)?;
        let attrs = data.get(nlmsg_align(IfAddrMsg::SIZE)..).unwrap_or(&[]);
        let table = AttrTable::parse(attrs, IFA_MAX)?;

        let mut msg = Self {
            header,
            label: table.get(ifa::LABEL).map(get::string),
            ..Default::default()
        };
        if msg.is_ipv4() {
            msg.local = table.get(ifa::LOCAL).map(get::ipv4).transpose()?;
        }
        Ok(msg)
    }
}
