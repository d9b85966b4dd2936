//! The receive loop.
//!
//! [`ReceiveLoop`] reads one buffer per cycle from a non-blocking
//! [`Transport`], splits it into records, classifies them and hands every
//! resulting [`Event`] to a [`Reporter`]. Between cycles it waits a fixed
//! idle interval, so a burst of notifications is drained at most one buffer
//! per interval.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use nlwatch::netlink::RouteSocket;
//! use nlwatch::netlink::events::{Classifier, Subscriptions};
//! use nlwatch::netlink::monitor::{MonitorConfig, ReceiveLoop, stop_channel};
//! use nlwatch::output::VecReporter;
//!
//! let subs = Subscriptions::all();
//! let config = MonitorConfig::new().with_idle_interval(Duration::from_millis(100));
//! let mut monitor = ReceiveLoop::new(RouteSocket::new(&subs)?, Classifier::new(subs), config);
//!
//! let (handle, stop) = stop_channel();
//! tokio::spawn(async move {
//!     tokio::signal::ctrl_c().await.ok();
//!     handle.stop();
//! });
//!
//! let mut events = VecReporter::new();
//! let stats = monitor.run(&mut events, stop).await?;
//! ```

use std::io;
use std::time::Duration;

use bytes::BytesMut;
use tokio::sync::watch;

use super::error::{Error, Result};
use super::events::{Classifier, Event};
use super::message::{MessageIter, NLMSG_HDRLEN};
use crate::output::Reporter;

/// Size of the sender address a netlink datagram must carry.
pub const SENDER_ADDR_LEN: usize = std::mem::size_of::<libc::sockaddr_nl>();

/// Default wait between cycles.
pub const DEFAULT_IDLE_INTERVAL: Duration = Duration::from_millis(250);

/// Default receive buffer size.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// One received datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Datagram {
    /// Bytes written into the buffer.
    pub len: usize,
    /// Size of the sender address reported by the kernel.
    pub sender_len: usize,
}

/// Source of netlink datagrams.
///
/// `recv` must not block: when nothing is queued it returns
/// [`io::ErrorKind::WouldBlock`].
pub trait Transport {
    /// Receive one datagram into `buf`.
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<Datagram>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<Datagram> {
        (**self).recv(buf)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<Datagram> {
        (**self).recv(buf)
    }
}

/// Configuration for the receive loop.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Wait after every cycle.
    pub idle_interval: Duration,
    /// Size of the reused receive buffer.
    pub buffer_size: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            idle_interval: DEFAULT_IDLE_INTERVAL,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl MonitorConfig {
    /// Create a new monitor config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the wait between cycles.
    pub fn with_idle_interval(mut self, interval: Duration) -> Self {
        self.idle_interval = interval;
        self
    }

    /// Set the receive buffer size. Sizes below one netlink header are
    /// raised to it.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(NLMSG_HDRLEN);
        self
    }
}

/// Create a linked stop handle and signal.
pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = watch::channel(false);
    (StopHandle { tx }, StopSignal { rx })
}

/// Requests a [`ReceiveLoop`] to stop.
#[derive(Debug)]
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

impl StopHandle {
    /// Ask the loop to stop at its next cycle boundary.
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }
}

/// Observed by a [`ReceiveLoop`] at every wait and cycle boundary.
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

impl StopSignal {
    /// Check if a stop was requested.
    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Sleep for `duration` or until a stop is requested. Returns whether
    /// a stop was requested.
    ///
    /// A dropped [`StopHandle`] never stops the loop.
    pub async fn sleep(&mut self, duration: Duration) -> bool {
        if self.is_stopped() {
            return true;
        }

        let sleep = tokio::time::sleep(duration);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => return self.is_stopped(),
                changed = self.rx.changed() => match changed {
                    Ok(()) if self.is_stopped() => return true,
                    Ok(()) => {}
                    Err(_) => {
                        (&mut sleep).await;
                        return self.is_stopped();
                    }
                },
            }
        }
    }
}

/// Counters accumulated by a [`ReceiveLoop`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    /// Receive attempts.
    pub cycles: u64,
    /// Buffers received.
    pub buffers: u64,
    /// Buffers dropped for a bad sender address.
    pub discarded_buffers: u64,
    /// Records decoded from accepted buffers.
    pub records: u64,
    /// Events handed to the reporter, malformed ones included.
    pub events: u64,
    /// Malformed events.
    pub malformed: u64,
    /// Non-transient receive failures.
    pub read_errors: u64,
}

/// What a single cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Nothing was queued, or the read was interrupted.
    Idle,
    /// The read failed; the error was logged.
    ReadFailed,
    /// The buffer was dropped for a bad sender address.
    Discarded,
    /// The buffer was decoded.
    Processed {
        /// Records found.
        records: usize,
        /// Events reported.
        events: usize,
    },
}

/// Non-blocking receive, decode and classify cycle.
pub struct ReceiveLoop<T> {
    transport: T,
    classifier: Classifier,
    config: MonitorConfig,
    buffer: BytesMut,
    stats: MonitorStats,
}

impl<T: Transport> ReceiveLoop<T> {
    /// Create a loop reading from `transport`.
    pub fn new(transport: T, classifier: Classifier, config: MonitorConfig) -> Self {
        let buffer = BytesMut::zeroed(config.buffer_size.max(NLMSG_HDRLEN));
        Self {
            transport,
            classifier,
            config,
            buffer,
            stats: MonitorStats::default(),
        }
    }

    /// Get the classifier.
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Get the classifier mutably, e.g. to seed it.
    pub fn classifier_mut(&mut self) -> &mut Classifier {
        &mut self.classifier
    }

    /// Get the counters so far.
    pub fn stats(&self) -> MonitorStats {
        self.stats
    }

    /// Get the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run one receive cycle without waiting.
    ///
    /// Returns an error only when the transport is gone for good or the
    /// reporter fails.
    pub fn poll_once<R: Reporter + ?Sized>(&mut self, reporter: &mut R) -> Result<CycleOutcome> {
        self.stats.cycles += 1;

        let datagram = match self.transport.recv(&mut self.buffer[..]) {
            Ok(d) => d,
            Err(e) => {
                let err = Error::from(e);
                if err.is_transient() {
                    return Ok(CycleOutcome::Idle);
                }
                if err.is_fatal_io() {
                    tracing::error!(error = %err, "transport closed");
                    return Err(err);
                }
                self.stats.read_errors += 1;
                tracing::warn!(error = %err, "receive failed, retrying");
                return Ok(CycleOutcome::ReadFailed);
            }
        };

        self.stats.buffers += 1;
        if datagram.sender_len != SENDER_ADDR_LEN {
            self.stats.discarded_buffers += 1;
            tracing::warn!(
                sender_len = datagram.sender_len,
                expected = SENDER_ADDR_LEN,
                "discarding buffer with unexpected sender address"
            );
            return Ok(CycleOutcome::Discarded);
        }

        let len = datagram.len.min(self.buffer.len());
        tracing::trace!(len, "received buffer");

        let mut records = 0;
        let mut events = 0;
        for record in MessageIter::new(&self.buffer[..len]) {
            let event = match record {
                Ok(record) => {
                    records += 1;
                    self.stats.records += 1;
                    match self.classifier.classify(&record) {
                        Some(event) => event,
                        None => continue,
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "dropping rest of buffer");
                    Event::malformed(e.to_string())
                }
            };

            if event.is_malformed() {
                self.stats.malformed += 1;
            }
            events += 1;
            self.stats.events += 1;
            reporter.report(&event)?;
        }

        Ok(CycleOutcome::Processed { records, events })
    }

    /// Run cycles until `stop` fires, waiting the idle interval after each.
    pub async fn run<R: Reporter + ?Sized>(
        &mut self,
        reporter: &mut R,
        mut stop: StopSignal,
    ) -> Result<MonitorStats> {
        tracing::info!(
            interval_ms = self.config.idle_interval.as_millis() as u64,
            buffer_size = self.buffer.len(),
            "monitor started"
        );

        while !stop.is_stopped() {
            self.poll_once(reporter)?;
            if stop.sleep(self.config.idle_interval).await {
                break;
            }
        }

        tracing::info!(stats = ?self.stats, "monitor stopped");
        Ok(self.stats)
    }
}
