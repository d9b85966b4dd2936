//! Kernel network change monitor built on rtnetlink.
//!
//! This crate watches the kernel's link, IPv4 address and IPv4 route
//! notifications and turns every record into a classified [`Event`]:
//! interface created, state changed or removed, address added or removed,
//! route table changed, or malformed input.
//!
//! # Example
//!
//! ```ignore
//! use nlwatch::netlink::events::{Classifier, Subscriptions};
//! use nlwatch::netlink::monitor::{MonitorConfig, ReceiveLoop, stop_channel};
//! use nlwatch::netlink::RouteSocket;
//! use nlwatch::output::{ReportConfig, WriterReporter};
//!
//! #[tokio::main]
//! async fn main() -> nlwatch::Result<()> {
//!     let subscriptions = Subscriptions::all();
//!     let socket = RouteSocket::new(&subscriptions)?;
//!
//!     let mut classifier = Classifier::new(subscriptions);
//!     for (_, index) in nlwatch::util::ifname::list_indexed().unwrap_or_default() {
//!         classifier.seed(index);
//!     }
//!
//!     let (_handle, stop) = stop_channel();
//!     let mut reporter = WriterReporter::new(std::io::stdout(), ReportConfig::new());
//!     let mut monitor = ReceiveLoop::new(socket, classifier, MonitorConfig::new());
//!     monitor.run(&mut reporter, stop).await?;
//!     Ok(())
//! }
//! ```
//!
//! [`Event`]: netlink::events::Event

pub mod netlink;
pub mod output;
pub mod util;

pub use netlink::{Error, Result};
