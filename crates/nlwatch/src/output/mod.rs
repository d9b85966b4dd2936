//! Event reporters.
//!
//! A [`Reporter`] receives every [`Event`] the receive loop produces.
//! [`WriterReporter`] renders them as text or JSON lines,
//! [`ChannelReporter`] forwards them to an async consumer and
//! [`VecReporter`] keeps them in memory.

mod channel;
pub mod monitor;

pub use channel::{ChannelReporter, event_channel};
pub use monitor::{WriterReporter, write_timestamp};

use crate::netlink::Result;
use crate::netlink::events::Event;

/// Consumer of classified events.
pub trait Reporter {
    /// Handle one event. An error stops the receive loop.
    fn report(&mut self, event: &Event) -> Result<()>;
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report(&mut self, event: &Event) -> Result<()> {
        (**self).report(event)
    }
}

impl<R: Reporter + ?Sized> Reporter for Box<R> {
    fn report(&mut self, event: &Event) -> Result<()> {
        (**self).report(event)
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text output.
    #[default]
    Text,
    /// JSON output, one object per line.
    Json,
}

/// Configuration for rendered output.
#[derive(Debug, Clone, Copy)]
pub struct ReportConfig {
    /// Output format (text or JSON).
    pub format: OutputFormat,
    /// Whether to prefix output with timestamps.
    pub timestamp: bool,
    /// Resolve interface indices to names in text output.
    pub resolve_names: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            timestamp: false,
            resolve_names: true,
        }
    }
}

impl ReportConfig {
    /// Create a new report config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Enable timestamp prefixes.
    pub fn with_timestamp(mut self, enabled: bool) -> Self {
        self.timestamp = enabled;
        self
    }

    /// Resolve interface names (disable for numeric output).
    pub fn with_resolve_names(mut self, enabled: bool) -> Self {
        self.resolve_names = enabled;
        self
    }
}

/// Collects events in memory.
#[derive(Debug, Clone, Default)]
pub struct VecReporter {
    events: Vec<Event>,
}

impl VecReporter {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Events collected so far.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of events collected.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if nothing was collected.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Take the collected events.
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl Reporter for VecReporter {
    fn report(&mut self, event: &Event) -> Result<()> {
        self.events.push(event.clone());
        Ok(())
    }
}
