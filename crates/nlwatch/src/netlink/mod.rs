//! rtnetlink decoding and the monitoring pipeline.
//!
//! Records flow through four stages:
//!
//! 1. [`MessageIter`] splits a received buffer into [`RawRecord`]s.
//! 2. [`AttrTable`] decodes the attribute list of a link or address body.
//! 3. [`Classifier`](events::Classifier) turns a record into an
//!    [`Event`](events::Event), consulting its [`InterfaceCache`].
//! 4. [`ReceiveLoop`](monitor::ReceiveLoop) drives the cycle against a
//!    [`Transport`](monitor::Transport) and hands events to a reporter.
//!
//! # Decoding a captured buffer
//!
//! ```ignore
//! use nlwatch::netlink::MessageIter;
//! use nlwatch::netlink::events::{Classifier, Subscriptions};
//!
//! let mut classifier = Classifier::new(Subscriptions::all());
//! for record in MessageIter::new(&buf) {
//!     match record {
//!         Ok(record) => {
//!             if let Some(event) = classifier.classify(&record) {
//!                 println!("{:?}", event);
//!             }
//!         }
//!         Err(e) => eprintln!("bad buffer: {}", e),
//!     }
//! }
//! ```

pub mod attr;
pub mod cache;
mod error;
pub mod events;
#[cfg(test)]
mod fixtures;
pub mod message;
pub mod messages;
pub mod monitor;
pub mod parse;
mod socket;
pub mod types;

pub use attr::{AttrIter, AttrTable, NlAttr};
pub use cache::{InterfaceCache, Observation};
pub use error::{Error, Result};
pub use message::{MessageIter, NLMSG_HDRLEN, NlMsgHdr, NlMsgType, RawRecord};
pub use parse::FromNetlink;
pub use socket::{RouteSocket, rtnetlink_groups};
