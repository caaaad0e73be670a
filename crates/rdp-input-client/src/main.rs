//! RDP web input bridge client: entry point.
//!
//! Reads input-surface events (newline-delimited JSON) from stdin, runs
//! them through the keyboard translator, and sends the resulting primitives
//! over a supervised WebSocket connection.
//!
//! # Usage
//!
//! ```text
//! rdp-input-client [OPTIONS]
//!
//! Options:
//!   --config <PATH>                   TOML config file
//!   --url <URL>                       WebSocket URL of the gateway
//!   --keyboard-layout <TAG>           en, fr, de, es, it, pt, zh, ja, ko
//!   --auto-reconnect                  Retry failed connects with backoff
//!   --max-reconnect-attempts <N>      Retry budget
//!   --log-level <LEVEL>               Used when RUST_LOG is unset
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable             | Flag                  |
//! |----------------------|-----------------------|
//! | `RDP_INPUT_CONFIG`   | `--config`            |
//! | `RDP_INPUT_URL`      | `--url`               |
//! | `RDP_INPUT_LAYOUT`   | `--keyboard-layout`   |
//! | `RDP_INPUT_LOG`      | `--log-level`         |
//!
//! Flags win over the config file; the config file wins over defaults.
//!
//! # Example
//!
//! ```text
//! echo '{"type":"KeyDown","code":"KeyA","key":"a"}' \
//!   | rdp-input-client --url ws://127.0.0.1:3390
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use rdp_input_client::application::{
    ClientEvent, ConnectionSupervisor, EventBus, EventKind, SupervisorOptions,
};
use rdp_input_client::domain::ClientConfig;
use rdp_input_client::infrastructure::{pump_surface_events, JsonLineEngine, WsConnector};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Keyboard input bridge for browser-based RDP sessions.
#[derive(Debug, Parser)]
#[command(
    name = "rdp-input-client",
    about = "Translate keyboard events to RDP scancodes over a supervised WebSocket",
    version
)]
struct Cli {
    /// TOML config file.  A missing file means defaults.
    #[arg(long, env = "RDP_INPUT_CONFIG")]
    config: Option<PathBuf>,

    /// WebSocket URL of the RDP gateway.
    #[arg(long, env = "RDP_INPUT_URL")]
    url: Option<String>,

    /// Keyboard layout tag announced in the first packet.
    #[arg(long, env = "RDP_INPUT_LAYOUT")]
    keyboard_layout: Option<String>,

    /// Retry failed connection attempts with exponential backoff.
    #[arg(long)]
    auto_reconnect: bool,

    /// Maximum number of retries before giving up.
    #[arg(long)]
    max_reconnect_attempts: Option<u32>,

    /// Log level used when `RUST_LOG` is not set.
    #[arg(long, env = "RDP_INPUT_LOG")]
    log_level: Option<String>,
}

impl Cli {
    /// Loads the config file (if any) and applies the flags on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    fn into_client_config(self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::load_or_default(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => ClientConfig::default(),
        };

        if let Some(url) = self.url {
            config.connection.url = url;
        }
        if let Some(layout) = self.keyboard_layout {
            config.connection.keyboard_layout = layout;
        }
        if self.auto_reconnect {
            config.reconnect.auto_reconnect = true;
        }
        if let Some(max) = self.max_reconnect_attempts {
            config.reconnect.max_reconnect_attempts = max;
        }
        if let Some(level) = self.log_level {
            config.logging.log_level = level;
        }
        Ok(config)
    }
}

/// Mirrors server-side log and error events into the local log.
fn register_event_logging(events: &EventBus) {
    events.on(EventKind::Log, |event| {
        if let ClientEvent::Log { message } = event {
            info!("server: {message}");
        }
        Ok(())
    });
    events.on(EventKind::Error, |event| {
        if let ClientEvent::Error { message } = event {
            warn!("client error: {message}");
        }
        Ok(())
    });
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.into_client_config()?;

    // ── Logging setup ─────────────────────────────────────────────────────────
    //
    // `RUST_LOG` wins; otherwise the configured level applies.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.log_level)),
        )
        .init();

    let layout = config.connection.layout();
    let url = config.connection.url.clone();
    info!("RDP input client starting: url={url}, keyboard layout {layout}");

    let events = Arc::new(EventBus::new());
    register_event_logging(&events);

    let supervisor = ConnectionSupervisor::new(
        SupervisorOptions {
            url: url.clone(),
            layout,
            policy: config.reconnect.policy(),
        },
        Arc::new(WsConnector::default()),
        Arc::new(JsonLineEngine::new(layout)),
        events,
    );

    // ── Connect ───────────────────────────────────────────────────────────────
    tokio::select! {
        result = supervisor.connect() => {
            result.with_context(|| format!("failed to connect to {}", supervisor.url()))?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("received Ctrl+C while connecting");
            supervisor.disconnect();
            return Ok(());
        }
    }

    // ── Pump input until EOF, Ctrl+C, or remote close ─────────────────────────
    let stdin = BufReader::new(tokio::io::stdin());
    tokio::select! {
        result = pump_surface_events(stdin, &supervisor) => match result {
            Ok(count) => info!("input stream ended after {count} event(s)"),
            Err(e) => error!("failed to read input events: {e}"),
        },
        signal = tokio::signal::ctrl_c() => match signal {
            Ok(()) => info!("received Ctrl+C; disconnecting"),
            Err(e) => error!("failed to listen for Ctrl+C signal: {e}"),
        },
        () = supervisor.wait_disconnected() => info!("session closed by remote"),
    }

    supervisor.disconnect();
    info!("RDP input client stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
