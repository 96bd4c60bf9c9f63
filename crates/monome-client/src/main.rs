//! monome-client demo binary.
//!
//! Connects to a single grid device, lights the LED under every pressed key,
//! and clears it on release. Doubles as a smoke test for a live serialosc
//! setup: if the opening LED flash appears on the hardware, the command path
//! works; if pressing keys lights LEDs, the event path works too.
//!
//! # Usage
//!
//! ```text
//! monome-client [OPTIONS]
//!
//! Options:
//!   --config      <PATH>  TOML configuration file [default: monome.toml]
//!   --device      <NAME>  Device name to dial (overrides config)
//!   --device-host <HOST>  Device host (overrides config)
//!   --device-port <PORT>  Device UDP port (overrides config)
//!   --listen-port <PORT>  Local UDP listen port; 0 picks an ephemeral port
//!   --prefix      <PFX>   OSC address prefix for this application
//! ```
//!
//! CLI arguments win over the config file; the config file wins over the
//! built-in defaults. Each flag can also be set through the environment
//! (`MONOME_DEVICE`, `MONOME_PREFIX`, and so on); CLI args take precedence
//! when both are present.
//!
//! # Finding the device port
//!
//! serialosc assigns every connected device its own UDP port. Query the
//! daemon (port 12002) with `/serialosc/list`, or read the port from
//! another monome application, then pass it as `--device-port`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use monome_client::{
    load_config, AppConfig, DeviceResolver, DeviceSession, GridCommands, PressHandler,
    StaticResolver, UdpTransport,
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// LED echo demo for a monome grid.
///
/// The `#[derive(Parser)]` macro from `clap` generates the argument parser
/// automatically from the struct fields and their `#[arg(...)]` attributes.
#[derive(Debug, Parser)]
#[command(
    name = "monome-client",
    about = "LED echo demo for a monome grid over serialosc",
    version
)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "monome.toml", env = "MONOME_CONFIG")]
    config: PathBuf,

    /// Device name to resolve and dial.
    #[arg(long, env = "MONOME_DEVICE")]
    device: Option<String>,

    /// Host the device listens on.
    #[arg(long, env = "MONOME_DEVICE_HOST")]
    device_host: Option<String>,

    /// UDP port the device listens on.
    #[arg(long, env = "MONOME_DEVICE_PORT")]
    device_port: Option<u16>,

    /// Local UDP listen port announced to the device. 0 picks an ephemeral
    /// port and announces the resolved value.
    #[arg(long, env = "MONOME_LISTEN_PORT")]
    listen_port: Option<u16>,

    /// OSC address prefix for this application's events and commands.
    #[arg(long, env = "MONOME_PREFIX")]
    prefix: Option<String>,
}

impl Cli {
    /// Applies the CLI overrides on top of the loaded configuration.
    fn apply_to(&self, config: &mut AppConfig) {
        if let Some(name) = &self.device {
            config.device.name = name.clone();
        }
        if let Some(host) = &self.device_host {
            config.device.host = host.clone();
        }
        if let Some(port) = self.device_port {
            config.device.port = port;
        }
        if let Some(port) = self.listen_port {
            config.session.listen_port = port;
        }
        if let Some(prefix) = &self.prefix {
            config.session.prefix = prefix.clone();
        }
    }
}

// ── Echo handler ──────────────────────────────────────────────────────────────

/// Lights the LED under each pressed key and clears it on release.
///
/// Handlers run synchronously on the routing task, so the LED command is
/// spawned rather than awaited in place.
struct EchoHandler {
    grid: GridCommands,
}

impl PressHandler for EchoHandler {
    fn on_press(&self, x: i32, y: i32, state: i32) {
        let grid = self.grid.clone();
        tokio::spawn(async move {
            grid.set(x, y, state).await;
        });
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    cli.apply_to(&mut config);

    // Initialise structured logging. `RUST_LOG` wins; otherwise the config
    // file's log level applies.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.session.log_level.clone())),
        )
        .init();

    info!("monome-client starting");

    // ── Resolve the device ────────────────────────────────────────────────────
    let resolver = StaticResolver::new(vec![config.device.endpoint()]);
    let endpoint = resolver
        .resolve(&config.device.name)
        .await
        .with_context(|| format!("no endpoint known for device '{}'", config.device.name))?;

    // ── Connect ───────────────────────────────────────────────────────────────
    let transport = UdpTransport::new();
    let session =
        DeviceSession::connect(endpoint, config.session.session_config(), &transport).await?;

    info!(device = %session.endpoint(), prefix = %session.prefix().await, "session up");

    // ── Echo handler + LED flash ──────────────────────────────────────────────
    session.subscribe_to_press(Arc::new(EchoHandler {
        grid: session.grid(),
    }));

    // A short all-on/all-off flash confirms the command path reaches the
    // hardware before anyone presses a key.
    let grid = session.grid();
    grid.all(1).await;
    tokio::time::sleep(Duration::from_millis(150)).await;
    grid.all(0).await;

    // Give the /sys/info replies a moment to land before reporting the size.
    tokio::time::sleep(Duration::from_millis(250)).await;
    let (size_x, size_y) = session.size().await;
    if size_x > 0 {
        info!("device reports a {size_x}x{size_y} grid");
    } else {
        warn!("no size report yet; is the device port correct?");
    }

    info!("monome-client ready. Press Ctrl-C to exit.");

    // ── Wait for shutdown ─────────────────────────────────────────────────────
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    info!("shutdown signal received");

    session.close().await;

    let stats = session.diagnostics();
    if stats.send_failures > 0 || stats.malformed_dropped > 0 {
        warn!(
            send_failures = stats.send_failures,
            malformed_dropped = stats.malformed_dropped,
            "session saw transport trouble"
        );
    }
    info!(
        commands_sent = stats.commands_sent,
        events_dispatched = stats.events_dispatched,
        "monome-client stopped"
    );
    Ok(())
}
