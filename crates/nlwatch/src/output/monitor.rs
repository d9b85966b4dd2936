//! Line-oriented rendering of monitor events.
//!
//! Text output follows `ip monitor`:
//!
//! ```text
//! LINK NEW: eth0 index 7 state UP RUNNING
//! LINK: eth0 index 7 state DOWN NOT RUNNING
//! ADDR: 192.168.1.10/24 dev eth0
//! ROUTE DEL: table changed
//! ```
//!
//! JSON output writes one object per line, tagged by `"event"`.

use std::io::{self, Write};
use std::time::SystemTime;

use super::{OutputFormat, ReportConfig, Reporter};
use crate::netlink::Result;
use crate::netlink::events::{Event, RouteChange};
use crate::util::ifname;

/// Write a timestamp prefix to the output if enabled.
///
/// Format: `[seconds.milliseconds] `
pub fn write_timestamp<W: Write>(w: &mut W, config: &ReportConfig) -> io::Result<()> {
    if config.timestamp {
        let now = SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();
        write!(w, "[{}.{:03}] ", now.as_secs(), now.subsec_millis())?;
    }
    Ok(())
}

/// Writes each event as a line of text or JSON.
#[derive(Debug)]
pub struct WriterReporter<W> {
    writer: W,
    config: ReportConfig,
}

impl<W: Write> WriterReporter<W> {
    /// Create a reporter writing to `writer`.
    pub fn new(writer: W, config: ReportConfig) -> Self {
        Self { writer, config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Get the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Consume the reporter, returning the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn device(&self, index: u32) -> String {
        if self.config.resolve_names {
            ifname::get_ifname_or_index(index)
        } else {
            format!("if{}", index)
        }
    }

    fn write_text(&mut self, event: &Event) -> io::Result<()> {
        match event {
            Event::InterfaceCreated {
                index,
                name,
                is_up,
                is_running,
            }
            | Event::InterfaceStateChanged {
                index,
                name,
                is_up,
                is_running,
            } => {
                let tag = if matches!(event, Event::InterfaceCreated { .. }) {
                    "LINK NEW"
                } else {
                    "LINK"
                };
                writeln!(
                    self.writer,
                    "{}: {} index {} state {} {}",
                    tag,
                    link_name(name.as_deref(), *index),
                    index,
                    if *is_up { "UP" } else { "DOWN" },
                    if *is_running { "RUNNING" } else { "NOT RUNNING" }
                )
            }
            Event::InterfaceRemoved { index, name } => writeln!(
                self.writer,
                "LINK DEL: {} index {}",
                link_name(name.as_deref(), *index),
                index
            ),
            Event::AddressAdded {
                interface_index,
                address,
                prefix_len,
                ..
            }
            | Event::AddressRemoved {
                interface_index,
                address,
                prefix_len,
                ..
            } => {
                let dev = self.device(*interface_index);
                write!(
                    self.writer,
                    "ADDR{}:",
                    if event.is_del() { " DEL" } else { "" }
                )?;
                if let Some(address) = address {
                    write!(self.writer, " {}/{}", address, prefix_len)?;
                }
                writeln!(self.writer, " dev {}", dev)
            }
            Event::RouteChanged { change } => writeln!(
                self.writer,
                "ROUTE{}: table changed",
                if *change == RouteChange::Removed {
                    " DEL"
                } else {
                    ""
                }
            ),
            Event::Malformed { reason } => writeln!(self.writer, "MALFORMED: {}", reason),
        }
    }
}

fn link_name(name: Option<&str>, index: u32) -> String {
    match name {
        Some(name) => name.to_string(),
        None => format!("if{}", index),
    }
}

impl<W: Write> Reporter for WriterReporter<W> {
    fn report(&mut self, event: &Event) -> Result<()> {
        write_timestamp(&mut self.writer, &self.config)?;

        match self.config.format {
            OutputFormat::Text => self.write_text(event)?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.writer, event)?;
                writeln!(self.writer)?;
            }
        }

        self.writer.flush()?;
        Ok(())
    }
}
