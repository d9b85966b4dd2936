//! Netlink attribute (rtattr/nlattr) handling.

use super::error::{Error, Result};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Netlink attribute alignment.
pub const NLA_ALIGNTO: usize = 4;

/// Align a length to NLA_ALIGNTO boundary.
#[inline]
pub const fn nla_align(len: usize) -> usize {
    (len + NLA_ALIGNTO - 1) & !(NLA_ALIGNTO - 1)
}

/// Size of the attribute header.
pub const NLA_HDRLEN: usize = 4; // nla_align(size_of::<NlAttr>())

/// Netlink attribute header (mirrors struct nlattr / struct rtattr).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct NlAttr {
    /// Length including header.
    pub nla_len: u16,
    /// Attribute type.
    pub nla_type: u16,
}

/// Attribute type flags.
pub const NLA_F_NESTED: u16 = 1 << 15;
pub const NLA_F_NET_BYTEORDER: u16 = 1 << 14;
pub const NLA_TYPE_MASK: u16 = !(NLA_F_NESTED | NLA_F_NET_BYTEORDER);

impl NlAttr {
    /// Get the attribute type without flags.
    pub fn kind(&self) -> u16 {
        self.nla_type & NLA_TYPE_MASK
    }

    /// Get the payload length (total length minus header).
    pub fn payload_len(&self) -> usize {
        (self.nla_len as usize).saturating_sub(NLA_HDRLEN)
    }

    /// Read an attribute header from the front of `data`.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::read_from_prefix(data)
            .map(|(attr, _)| attr)
            .map_err(|_| Error::Truncated {
                expected: std::mem::size_of::<Self>(),
                actual: data.len(),
            })
    }
}

/// Iterator over netlink attributes in a buffer.
///
/// Yields `(type, payload)` with the flag bits masked off. An attribute
/// claiming fewer bytes than its header, or more than remain, yields an
/// error and ends the iteration. Trailing bytes shorter than a header are
/// padding.
pub struct AttrIter<'a> {
    data: &'a [u8],
    failed: bool,
}

impl<'a> AttrIter<'a> {
    /// Create a new attribute iterator.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            failed: false,
        }
    }

    /// Check if there are no more attributes.
    pub fn is_empty(&self) -> bool {
        self.failed || self.data.len() < NLA_HDRLEN
    }
}

impl<'a> Iterator for AttrIter<'a> {
    type Item = Result<(u16, &'a [u8])>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_empty() {
            return None;
        }

        let attr = match NlAttr::from_bytes(self.data) {
            Ok(a) => a,
            Err(e) => {
                self.failed = true;
                return Some(Err(e));
            }
        };

        let len = attr.nla_len as usize;
        if len < NLA_HDRLEN || len > self.data.len() {
            self.failed = true;
            return Some(Err(Error::InvalidAttribute(format!(
                "attribute type {} claims {} bytes, {} remaining",
                attr.kind(),
                len,
                self.data.len()
            ))));
        }

        let payload = &self.data[NLA_HDRLEN..len];
        let aligned_len = nla_align(len);

        // Move to next attribute
        if aligned_len >= self.data.len() {
            self.data = &[];
        } else {
            self.data = &self.data[aligned_len..];
        }

        Some(Ok((attr.kind(), payload)))
    }
}

impl std::iter::FusedIterator for AttrIter<'_> {}

/// Attribute payloads of one record, indexed by type.
///
/// Built fresh for every record. Types above the bound given to
/// [`AttrTable::parse`] are dropped; a repeated type keeps its last payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrTable<'a> {
    slots: Vec<Option<&'a [u8]>>,
}

impl<'a> AttrTable<'a> {
    /// Decode the attribute list in `data`, keeping types `0..=max`.
    pub fn parse(data: &'a [u8], max: u16) -> Result<Self> {
        let mut slots = vec![None; max as usize + 1];
        for attr in AttrIter::new(data) {
            let (kind, payload) = attr?;
            if let Some(slot) = slots.get_mut(kind as usize) {
                *slot = Some(payload);
            }
        }
        Ok(Self { slots })
    }

    /// Payload of `kind`, if the record carried it.
    pub fn get(&self, kind: u16) -> Option<&'a [u8]> {
        self.slots.get(kind as usize).copied().flatten()
    }

    /// Check whether `kind` is present.
    pub fn contains(&self, kind: u16) -> bool {
        self.get(kind).is_some()
    }

    /// Number of distinct attribute types present.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Check if no attribute was kept.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Iterate over present attributes in type order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &'a [u8])> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(kind, slot)| slot.map(|p| (kind as u16, p)))
    }
}

/// Helper functions for extracting typed values from attribute payloads.
pub mod get {
    use super::*;
    use std::net::Ipv4Addr;

    /// Extract a null-terminated string.
    ///
    /// Invalid UTF-8 is replaced rather than rejected; interface names are
    /// display-only.
    pub fn string(data: &[u8]) -> String {
        let len = data.iter().position(|&b| b == 0).unwrap_or(data.len());
        String::from_utf8_lossy(&data[..len]).into_owned()
    }

    /// Extract an IPv4 address in network order. The payload must be
    /// exactly four bytes.
    pub fn ipv4(data: &[u8]) -> Result<Ipv4Addr> {
        let octets: [u8; 4] = data.try_into().map_err(|_| {
            Error::InvalidAttribute(format!(
                "IPv4 address attribute is {} bytes, expected 4",
                data.len()
            ))
        })?;
        Ok(Ipv4Addr::from(octets))
    }
}
