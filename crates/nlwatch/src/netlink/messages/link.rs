//! Strongly-typed link message.

use crate::netlink::attr::{AttrTable, get};
use crate::netlink::error::{Error, Result};
use crate::netlink::message::nlmsg_align;
use crate::netlink::parse::FromNetlink;
use crate::netlink::types::link::{IFLA_MAX, IfInfoMsg, iff, ifla};

/// Link message with the attributes the monitor reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkMessage {
    /// Fixed-size header.
    pub(crate) header: IfInfoMsg,
    /// Interface index, checked to be non-negative.
    pub(crate) index: u32,
    /// Interface name (IFLA_IFNAME).
    pub(crate) name: Option<String>,
}

impl LinkMessage {
    /// Get the interface index.
    pub fn ifindex(&self) -> u32 {
        self.index
    }

    /// Get the interface name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Check if the interface is administratively up.
    pub fn is_up(&self) -> bool {
        self.header.ifi_flags & iff::UP != 0
    }

    /// Check if the interface has its resources allocated and is operating.
    pub fn is_running(&self) -> bool {
        self.header.ifi_flags & iff::RUNNING != 0
    }
}

impl FromNetlink for LinkMessage {
    fn from_bytes(data: &[u8]) -> Result<Self> {
        let header = IfInfoMsg::from_bytes(data)?;
        let index = u32::try_from(header.ifi_index).map_err(|_| {
            Error::InvalidMessage(format!("negative interface index {}", header.ifi_index))
        })?;
        let attrs = data.get(nlmsg_align(IfInfoMsg::SIZE)..).unwrap_or(&[]);
        let table = AttrTable::parse(attrs, IFLA_MAX)?;

        // Only the name is decoded; other attributes are bounds-checked
        // by the table and otherwise ignored.
        Ok(Self {
            header,
            index,
            name: table.get(ifla::IFNAME).map(get::string),
        })
    }
}
