//! Traits for strongly-typed netlink message parsing.
//!
//! # Example
//!
//! ```ignore
//! use nlwatch::netlink::FromNetlink;
//! use nlwatch::netlink::messages::LinkMessage;
//!
//! let link = LinkMessage::from_bytes(record.payload())?;
//! println!("{:?} is up: {}", link.name(), link.is_up());
//! ```

use super::error::Result;

/// Trait for types that can be decoded from a netlink record body.
///
/// `data` is the payload following the `nlmsghdr`; implementations read
/// their fixed header first and then the attribute list after it.
pub trait FromNetlink: Sized {
    /// Decode from a complete record body.
    fn from_bytes(data: &[u8]) -> Result<Self>;
}
