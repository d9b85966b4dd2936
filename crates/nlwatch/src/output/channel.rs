//! Forwarding events to an async consumer.

use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::Reporter;
use crate::netlink::events::Event;
use crate::netlink::{Error, Result};

/// Create a reporter and the stream receiving its events.
///
/// # Example
///
/// ```ignore
/// use nlwatch::output::event_channel;
/// use tokio_stream::StreamExt;
///
/// let (mut reporter, mut events) = event_channel();
/// tokio::spawn(async move {
///     while let Some(event) = events.next().await {
///         println!("{:?}", event);
///     }
/// });
/// monitor.run(&mut reporter, stop).await?;
/// ```
pub fn event_channel() -> (ChannelReporter, UnboundedReceiverStream<Event>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelReporter { tx }, UnboundedReceiverStream::new(rx))
}

/// Sends every event into a channel.
#[derive(Debug, Clone)]
pub struct ChannelReporter {
    tx: mpsc::UnboundedSender<Event>,
}

impl ChannelReporter {
    /// Check if the receiving side is gone.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl Reporter for ChannelReporter {
    fn report(&mut self, event: &Event) -> Result<()> {
        self.tx
            .send(event.clone())
            .map_err(|_| Error::ChannelClosed)
    }
}
