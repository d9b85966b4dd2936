//! nlwatch command - watch interface, address and route changes.

use std::time::Duration;

use clap::{Parser, ValueEnum};
use nlwatch::netlink::RouteSocket;
use nlwatch::netlink::events::{Classifier, EventType as WatchEventType, Subscriptions};
use nlwatch::netlink::monitor::{MonitorConfig, ReceiveLoop, stop_channel};
use nlwatch::output::{OutputFormat, ReportConfig, WriterReporter};
use nlwatch::util::ifname;
use tracing_subscriber::EnvFilter;

/// Event types that can be monitored.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum EventType {
    /// Link state changes (interfaces up/down, created, deleted).
    Link,
    /// IPv4 address changes (added, removed).
    Address,
    /// IPv4 routing table changes.
    Route,
    /// All event types.
    All,
}

impl EventType {
    /// Convert to the library's EventType for subscriptions.
    fn to_watch(self) -> WatchEventType {
        match self {
            EventType::Link => WatchEventType::Link,
            EventType::Address => WatchEventType::Address,
            EventType::Route => WatchEventType::Route,
            EventType::All => WatchEventType::All,
        }
    }
}

#[derive(Parser)]
#[command(
    name = "nlwatch",
    version,
    about = "Watch kernel interface, address and route changes"
)]
struct Cli {
    /// Event types to monitor.
    #[arg(value_enum, default_value = "all")]
    objects: Vec<EventType>,

    /// Output JSON.
    #[arg(short = 'j', long)]
    json: bool,

    /// Label output lines with event timestamps.
    #[arg(short = 't', long)]
    timestamp: bool,

    /// Don't resolve interface names.
    #[arg(short = 'n', long)]
    numeric: bool,

    /// Report interfaces that already exist as new on their first event.
    #[arg(long)]
    no_seed: bool,

    /// Wait between receive cycles, in milliseconds.
    #[arg(long, default_value_t = 250, value_parser = clap::value_parser!(u64).range(1..))]
    interval_ms: u64,

    /// Receive buffer size in bytes.
    #[arg(long, default_value_t = 8192, value_parser = clap::value_parser!(u64).range(16..))]
    buffer_size: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(log_filter())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn log_filter() -> EnvFilter {
    log_filter_from(EnvFilter::DEFAULT_ENV)
}

/// Filter from the variable `var` if set and valid, warnings otherwise.
fn log_filter_from(var: &str) -> EnvFilter {
    EnvFilter::try_from_env(var).unwrap_or_else(|_| EnvFilter::new("warn"))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Convert CLI event types to subscriptions
    let event_types: Vec<_> = cli.objects.iter().map(|o| o.to_watch()).collect();
    let subscriptions = Subscriptions::from_event_types(&event_types);

    let socket = RouteSocket::new(&subscriptions)?;

    let mut classifier = Classifier::new(subscriptions);
    if !cli.no_seed {
        match ifname::list_indexed() {
            Ok(interfaces) => {
                for (name, index) in interfaces {
                    tracing::debug!(%name, index, "seeding interface");
                    classifier.seed(index);
                }
            }
            Err(e) => tracing::warn!(error = %e, "cannot list interfaces, not seeding"),
        }
    }

    let config = MonitorConfig::new()
        .with_idle_interval(Duration::from_millis(cli.interval_ms))
        .with_buffer_size(cli.buffer_size as usize);

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let report = ReportConfig::new()
        .with_format(format)
        .with_timestamp(cli.timestamp)
        .with_resolve_names(!cli.numeric);
    let mut reporter = WriterReporter::new(std::io::stdout(), report);

    let (handle, stop) = stop_channel();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "cannot listen for Ctrl-C");
            return;
        }
        handle.stop();
    });

    let mut monitor = ReceiveLoop::new(socket, classifier, config);
    let stats = monitor.run(&mut reporter, stop).await?;
    tracing::info!(
        cycles = stats.cycles,
        buffers = stats.buffers,
        events = stats.events,
        malformed = stats.malformed,
        discarded = stats.discarded_buffers,
        read_errors = stats.read_errors,
        "stopped"
    );

    Ok(())
}
