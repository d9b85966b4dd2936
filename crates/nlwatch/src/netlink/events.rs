//! Event classification for rtnetlink notifications.
//!
//! A [`Classifier`] turns each [`RawRecord`] into at most one [`Event`]. It
//! owns the [`InterfaceCache`] used to tell newly created interfaces from
//! existing ones changing state, and the [`Subscriptions`] deciding which
//! record kinds are reported at all.
//!
//! # Example
//!
//! ```ignore
//! use nlwatch::netlink::MessageIter;
//! use nlwatch::netlink::events::{Classifier, Event, Subscriptions};
//!
//! let mut classifier = Classifier::new(Subscriptions::new().links(true));
//! for record in MessageIter::new(&buf).flatten() {
//!     if let Some(Event::InterfaceCreated { index, name, .. }) = classifier.classify(&record) {
//!         println!("new interface {} ({:?})", index, name);
//!     }
//! }
//! ```

use std::net::Ipv4Addr;

use serde::Serialize;

use super::cache::{InterfaceCache, Observation};
use super::message::{NlMsgType, RawRecord};
use super::messages::{AddressMessage, LinkMessage};
use super::parse::FromNetlink;
use super::socket::rtnetlink_groups::*;

/// A classified network change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// First notification for an interface index.
    InterfaceCreated {
        index: u32,
        name: Option<String>,
        is_up: bool,
        is_running: bool,
    },
    /// A known interface changed state.
    InterfaceStateChanged {
        index: u32,
        name: Option<String>,
        is_up: bool,
        is_running: bool,
    },
    /// An interface was removed.
    InterfaceRemoved { index: u32, name: Option<String> },
    /// An IPv4 address was added.
    AddressAdded {
        interface_index: u32,
        address: Option<Ipv4Addr>,
        prefix_len: u8,
        label: Option<String>,
    },
    /// An IPv4 address was removed.
    AddressRemoved {
        interface_index: u32,
        address: Option<Ipv4Addr>,
        prefix_len: u8,
        label: Option<String>,
    },
    /// The IPv4 routing table changed.
    RouteChanged { change: RouteChange },
    /// A record or buffer could not be decoded.
    Malformed { reason: String },
}

/// Whether a route was added or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteChange {
    Added,
    Removed,
}

impl Event {
    /// Create a malformed-input event.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Event::Malformed {
            reason: reason.into(),
        }
    }

    /// Returns the interface index associated with this event, if any.
    pub fn ifindex(&self) -> Option<u32> {
        match self {
            Event::InterfaceCreated { index, .. }
            | Event::InterfaceStateChanged { index, .. }
            | Event::InterfaceRemoved { index, .. } => Some(*index),
            Event::AddressAdded {
                interface_index, ..
            }
            | Event::AddressRemoved {
                interface_index, ..
            } => Some(*interface_index),
            Event::RouteChanged { .. } | Event::Malformed { .. } => None,
        }
    }

    /// Returns true for [`Event::Malformed`].
    pub fn is_malformed(&self) -> bool {
        matches!(self, Event::Malformed { .. })
    }

    /// Returns true if something was removed.
    pub fn is_del(&self) -> bool {
        matches!(
            self,
            Event::InterfaceRemoved { .. }
                | Event::AddressRemoved { .. }
                | Event::RouteChanged {
                    change: RouteChange::Removed
                }
        )
    }

    /// Returns "new", "change", "del" or "error".
    ///
    /// Useful for display/logging purposes.
    pub fn action(&self) -> &'static str {
        match self {
            Event::InterfaceCreated { .. } => "new",
            Event::InterfaceStateChanged { .. } => "change",
            Event::Malformed { .. } => "error",
            _ if self.is_del() => "del",
            _ => "new",
        }
    }
}

/// Event classes that can be subscribed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Link (interface) events.
    Link,
    /// IPv4 address events.
    Address,
    /// IPv4 route events.
    Route,
    /// All event types.
    All,
}

/// Which record classes are watched and reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Subscriptions {
    links: bool,
    addresses_v4: bool,
    routes_v4: bool,
}

impl Subscriptions {
    /// Create a set with no subscriptions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to everything the monitor understands.
    pub fn all() -> Self {
        Self::new().links(true).addresses_v4(true).routes_v4(true)
    }

    /// Build from a list of event types, e.g. from CLI arguments.
    pub fn from_event_types(types: &[EventType]) -> Self {
        let mut subs = Self::new();
        for t in types {
            match t {
                EventType::Link => subs.links = true,
                EventType::Address => subs.addresses_v4 = true,
                EventType::Route => subs.routes_v4 = true,
                EventType::All => subs = Self::all(),
            }
        }
        subs
    }

    /// Subscribe to link (interface) events.
    pub fn links(mut self, enabled: bool) -> Self {
        self.links = enabled;
        self
    }

    /// Subscribe to IPv4 address events.
    pub fn addresses_v4(mut self, enabled: bool) -> Self {
        self.addresses_v4 = enabled;
        self
    }

    /// Subscribe to IPv4 route events.
    pub fn routes_v4(mut self, enabled: bool) -> Self {
        self.routes_v4 = enabled;
        self
    }

    /// Check if link events are reported.
    pub fn has_links(&self) -> bool {
        self.links
    }

    /// Check if IPv4 address events are reported.
    pub fn has_addresses_v4(&self) -> bool {
        self.addresses_v4
    }

    /// Check if IPv4 route events are reported.
    pub fn has_routes_v4(&self) -> bool {
        self.routes_v4
    }

    /// Check if nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        !(self.links || self.addresses_v4 || self.routes_v4)
    }

    /// rtnetlink multicast groups to join.
    pub fn groups(&self) -> Vec<u32> {
        let mut groups = Vec::with_capacity(3);
        if self.links {
            groups.push(RTNLGRP_LINK);
        }
        if self.addresses_v4 {
            groups.push(RTNLGRP_IPV4_IFADDR);
        }
        if self.routes_v4 {
            groups.push(RTNLGRP_IPV4_ROUTE);
        }
        groups
    }
}

/// Turns raw records into events.
#[derive(Debug, Clone)]
pub struct Classifier {
    cache: InterfaceCache,
    subscriptions: Subscriptions,
}

impl Classifier {
    /// Create a classifier with an empty interface cache.
    pub fn new(subscriptions: Subscriptions) -> Self {
        Self {
            cache: InterfaceCache::new(),
            subscriptions,
        }
    }

    /// Mark an interface as already present, so its next link event is a
    /// state change rather than a creation.
    pub fn seed(&mut self, index: u32) -> bool {
        self.cache.seed(index)
    }

    /// Get the interface cache.
    pub fn cache(&self) -> &InterfaceCache {
        &self.cache
    }

    /// Get the subscriptions.
    pub fn subscriptions(&self) -> &Subscriptions {
        &self.subscriptions
    }

    /// Classify one record.
    ///
    /// Returns `None` for record kinds that are not subscribed or not
    /// understood. Decode failures become [`Event::Malformed`].
    pub fn classify(&mut self, record: &RawRecord<'_>) -> Option<Event> {
        let kind = record.kind();
        let event = match kind {
            NlMsgType::RTM_NEWLINK | NlMsgType::RTM_DELLINK if self.subscriptions.links => {
                self.classify_link(kind, record.payload())
            }
            NlMsgType::RTM_NEWADDR | NlMsgType::RTM_DELADDR if self.subscriptions.addresses_v4 => {
                classify_address(kind, record.payload())?
            }
            NlMsgType::RTM_NEWROUTE if self.subscriptions.routes_v4 => Event::RouteChanged {
                change: RouteChange::Added,
            },
            NlMsgType::RTM_DELROUTE if self.subscriptions.routes_v4 => Event::RouteChanged {
                change: RouteChange::Removed,
            },
            NlMsgType::OVERRUN => {
                tracing::warn!(seq = record.sequence(), "kernel reported overrun, events lost");
                return None;
            }
            NlMsgType::ERROR => {
                tracing::debug!(seq = record.sequence(), "ignoring error message");
                return None;
            }
            _ => {
                tracing::trace!(kind, "ignoring record");
                return None;
            }
        };

        tracing::debug!(kind = NlMsgType::name(kind), action = event.action(), "classified record");
        Some(event)
    }

    fn classify_link(&mut self, kind: u16, payload: &[u8]) -> Event {
        let link = match LinkMessage::from_bytes(payload) {
            Ok(link) => link,
            Err(e) => return Event::malformed(format!("{}: {}", NlMsgType::name(kind), e)),
        };

        let index = link.ifindex();
        let name = link.name().map(str::to_string);
        if kind == NlMsgType::RTM_DELLINK {
            return Event::InterfaceRemoved { index, name };
        }

        let is_up = link.is_up();
        let is_running = link.is_running();
        match self.cache.observe(index) {
            Observation::FirstSeen => Event::InterfaceCreated {
                index,
                name,
                is_up,
                is_running,
            },
            Observation::AlreadyKnown => Event::InterfaceStateChanged {
                index,
                name,
                is_up,
                is_running,
            },
        }
    }
}

/// Address records of other families yield no event.
fn classify_address(kind: u16, payload: &[u8]) -> Option<Event> {
    let addr = match AddressMessage::from_bytes(payload) {
        Ok(addr) => addr,
        Err(e) => {
            return Some(Event::malformed(format!(
                "{}: {}",
                NlMsgType::name(kind),
                e
            )));
        }
    };

    if !addr.is_ipv4() {
        tracing::trace!(family = addr.family(), "ignoring non-IPv4 address");
        return None;
    }

    let interface_index = addr.ifindex();
    let address = addr.local();
    let prefix_len = addr.prefix_len();
    let label = addr.label().map(str::to_string);
    Some(if kind == NlMsgType::RTM_DELADDR {
        Event::AddressRemoved {
            interface_index,
            address,
            prefix_len,
            label,
        }
    } else {
        Event::AddressAdded {
            interface_index,
            address,
            prefix_len,
            label,
        }
    })
}
