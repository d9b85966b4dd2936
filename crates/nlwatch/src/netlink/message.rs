//! Netlink message header and the record cursor.

use super::error::{Error, Result};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Netlink message header alignment.
pub const NLMSG_ALIGNTO: usize = 4;

/// Align a length to NLMSG_ALIGNTO boundary.
#[inline]
pub const fn nlmsg_align(len: usize) -> usize {
    (len + NLMSG_ALIGNTO - 1) & !(NLMSG_ALIGNTO - 1)
}

/// Size of the netlink message header.
pub const NLMSG_HDRLEN: usize = nlmsg_align(std::mem::size_of::<NlMsgHdr>());

/// Netlink message header (mirrors struct nlmsghdr).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct NlMsgHdr {
    /// Length of message including header.
    pub nlmsg_len: u32,
    /// Message type.
    pub nlmsg_type: u16,
    /// Additional flags.
    pub nlmsg_flags: u16,
    /// Sequence number.
    pub nlmsg_seq: u32,
    /// Sending process port ID.
    pub nlmsg_pid: u32,
}

impl NlMsgHdr {
    /// Create a header for a message with `payload_len` bytes of body.
    pub fn new(msg_type: u16, payload_len: usize) -> Self {
        Self {
            nlmsg_len: (NLMSG_HDRLEN + payload_len) as u32,
            nlmsg_type: msg_type,
            ..Default::default()
        }
    }

    /// Convert header to bytes.
    pub fn as_bytes(&self) -> &[u8] {
        <Self as IntoBytes>::as_bytes(self)
    }

    /// Read a header from the front of `data`.
    ///
    /// The header is copied out, so `data` needs no particular alignment.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::read_from_prefix(data)
            .map(|(hdr, _)| hdr)
            .map_err(|_| Error::Truncated {
                expected: std::mem::size_of::<Self>(),
                actual: data.len(),
            })
    }
}

/// Message types the monitor knows about.
pub struct NlMsgType;

impl NlMsgType {
    /// No operation, message must be discarded.
    pub const NOOP: u16 = 1;
    /// Error message or ACK.
    pub const ERROR: u16 = 2;
    /// End of multipart message.
    pub const DONE: u16 = 3;
    /// Data lost, request resend.
    pub const OVERRUN: u16 = 4;

    // Link messages
    pub const RTM_NEWLINK: u16 = 16;
    pub const RTM_DELLINK: u16 = 17;

    // Address messages
    pub const RTM_NEWADDR: u16 = 20;
    pub const RTM_DELADDR: u16 = 21;

    // Route messages
    pub const RTM_NEWROUTE: u16 = 24;
    pub const RTM_DELROUTE: u16 = 25;

    /// Symbolic name of a message type, for logs and malformed reasons.
    pub fn name(msg_type: u16) -> &'static str {
        match msg_type {
            Self::NOOP => "NLMSG_NOOP",
            Self::ERROR => "NLMSG_ERROR",
            Self::DONE => "NLMSG_DONE",
            Self::OVERRUN => "NLMSG_OVERRUN",
            Self::RTM_NEWLINK => "RTM_NEWLINK",
            Self::RTM_DELLINK => "RTM_DELLINK",
            Self::RTM_NEWADDR => "RTM_NEWADDR",
            Self::RTM_DELADDR => "RTM_DELADDR",
            Self::RTM_NEWROUTE => "RTM_NEWROUTE",
            Self::RTM_DELROUTE => "RTM_DELROUTE",
            _ => "unknown",
        }
    }
}

/// One kernel record: its header and the type-specific body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord<'a> {
    header: NlMsgHdr,
    payload: &'a [u8],
}

impl<'a> RawRecord<'a> {
    /// Get the header.
    pub fn header(&self) -> &NlMsgHdr {
        &self.header
    }

    /// Get the message type.
    pub fn kind(&self) -> u16 {
        self.header.nlmsg_type
    }

    /// Get the declared length including header.
    pub fn total_len(&self) -> usize {
        self.header.nlmsg_len as usize
    }

    /// Get the sequence number.
    pub fn sequence(&self) -> u32 {
        self.header.nlmsg_seq
    }

    /// Get the sender port ID (0 for the kernel).
    pub fn sender(&self) -> u32 {
        self.header.nlmsg_pid
    }

    /// Get the body following the header.
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }
}

/// Iterator over netlink records in a buffer.
///
/// A record whose declared length is shorter than a header or runs past the
/// end of the buffer yields one error and ends the iteration; nothing after
/// it is trusted. Fewer than [`NLMSG_HDRLEN`] trailing bytes end the
/// iteration quietly.
pub struct MessageIter<'a> {
    data: &'a [u8],
    failed: bool,
}

impl<'a> MessageIter<'a> {
    /// Create a new message iterator.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            failed: false,
        }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len()
    }
}

impl<'a> Iterator for MessageIter<'a> {
    type Item = Result<RawRecord<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.data.len() < NLMSG_HDRLEN {
            return None;
        }

        let header = match NlMsgHdr::from_bytes(self.data) {
            Ok(h) => h,
            Err(e) => {
                self.failed = true;
                return Some(Err(e));
            }
        };

        let msg_len = header.nlmsg_len as usize;
        if msg_len < NLMSG_HDRLEN || msg_len > self.data.len() {
            self.failed = true;
            return Some(Err(Error::InvalidMessage(format!(
                "invalid message length: {} ({} bytes remaining)",
                msg_len,
                self.data.len()
            ))));
        }

        let payload = &self.data[NLMSG_HDRLEN..msg_len];
        let aligned_len = nlmsg_align(msg_len);

        // Move to next message
        if aligned_len >= self.data.len() {
            self.data = &[];
        } else {
            self.data = &self.data[aligned_len..];
        }

        Some(Ok(RawRecord { header, payload }))
    }
}

impl std::iter::FusedIterator for MessageIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::fixtures;

    #[test]
    fn test_align() {
        assert_eq!(nlmsg_align(0), 0);
        assert_eq!(nlmsg_align(1), 4);
        assert_eq!(nlmsg_align(16), 16);
        assert_eq!(nlmsg_align(17), 20);
        assert_eq!(NLMSG_HDRLEN, 16);
    }

    #[test]
    fn test_yields_every_record_in_order() {
        // Bodies of 5, 8 and 1 bytes exercise padding between records.
        let buf = [
            fixtures::nlmsg(100, &[1, 2, 3, 4, 5]),
            fixtures::nlmsg(101, &[6; 8]),
            fixtures::nlmsg(102, &[7]),
        ]
        .concat();

        let records: Vec<_> = MessageIter::new(&buf).map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].kind(), 100);
        assert_eq!(records[0].payload(), &[1, 2, 3, 4, 5]);
        assert_eq!(records[1].kind(), 101);
        assert_eq!(records[1].payload(), &[6; 8]);
        assert_eq!(records[2].kind(), 102);
        assert_eq!(records[2].payload(), &[7]);

        // Every byte accounted for: headers, bodies and alignment padding.
        let consumed: usize = records.iter().map(|r| nlmsg_align(r.total_len())).sum();
        assert_eq!(consumed, buf.len());
    }

    #[test]
    fn test_last_record_without_padding() {
        let mut buf = fixtures::nlmsg(100, &[0; 4]);
        let mut tail = fixtures::nlmsg(101, &[9, 9, 9]);
        // Drop the trailing pad bytes of the final record.
        tail.truncate(NLMSG_HDRLEN + 3);
        buf.extend_from_slice(&tail);

        let records: Vec<_> = MessageIter::new(&buf).map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].payload(), &[9, 9, 9]);
    }

    #[test]
    fn test_length_past_end_is_rejected() {
        let mut buf = fixtures::nlmsg(100, &[0; 4]);
        let mut bad = fixtures::nlmsg(101, &[0; 4]);
        bad[..4].copy_from_slice(&4096u32.to_ne_bytes());
        buf.extend_from_slice(&bad);
        buf.extend_from_slice(&fixtures::nlmsg(102, &[0; 4]));

        let mut iter = MessageIter::new(&buf);
        assert!(iter.next().unwrap().is_ok());
        let err = iter.next().unwrap().unwrap_err();
        assert!(matches!(err, Error::InvalidMessage(_)));
        // The cursor does not move past the corrupt record.
        assert_eq!(iter.remaining(), buf.len() - 20);
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_length_below_header_is_rejected() {
        let mut buf = fixtures::nlmsg(100, &[0; 4]);
        buf[..4].copy_from_slice(&8u32.to_ne_bytes());

        let mut iter = MessageIter::new(&buf);
        assert!(iter.next().unwrap().is_err());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_short_tail_is_ignored() {
        let mut buf = fixtures::nlmsg(100, &[]);
        buf.extend_from_slice(&[0xff; 6]);

        let records: Vec<_> = MessageIter::new(&buf).collect();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_ok());
    }

    #[test]
    fn test_empty_buffer() {
        assert_eq!(MessageIter::new(&[]).count(), 0);
    }

    #[test]
    fn test_header_fields() {
        let mut buf = fixtures::nlmsg(NlMsgType::RTM_NEWLINK, &[]);
        buf[8..12].copy_from_slice(&42u32.to_ne_bytes());
        buf[12..16].copy_from_slice(&0u32.to_ne_bytes());

        let record = MessageIter::new(&buf).next().unwrap().unwrap();
        assert_eq!(record.kind(), NlMsgType::RTM_NEWLINK);
        assert_eq!(record.sequence(), 42);
        assert_eq!(record.sender(), 0);
        assert_eq!(record.total_len(), NLMSG_HDRLEN);
        assert!(record.payload().is_empty());
    }

    #[test]
    fn test_header_from_unaligned_bytes() {
        let hdr = NlMsgHdr::new(NlMsgType::RTM_NEWADDR, 8);
        let mut buf = vec![0u8];
        buf.extend_from_slice(hdr.as_bytes());

        let parsed = NlMsgHdr::from_bytes(&buf[1..]).unwrap();
        assert_eq!(parsed, hdr);
        assert!(NlMsgHdr::from_bytes(&buf[1..5]).is_err());
    }

    #[test]
    fn test_type_names() {
        assert_eq!(NlMsgType::name(NlMsgType::RTM_DELLINK), "RTM_DELLINK");
        assert_eq!(NlMsgType::name(NlMsgType::OVERRUN), "NLMSG_OVERRUN");
        assert_eq!(NlMsgType::name(999), "unknown");
    }
}
