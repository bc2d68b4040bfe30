//! netlock client entry point.
//!
//! Loads `settings.conf`, sets up logging, wires the capability adapters to
//! the reconcile use case, and runs the poll scheduler until Ctrl-C.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config(--path)          -- settings.conf, defaults on first run
//!  └─ logging::init(logs_path)     -- stderr + {logs_path}/{name}.logs
//!  └─ Capabilities                 -- identity, HTTP, gate, overlay, power
//!  └─ Scheduler::run()             -- tick every `interval` seconds
//!       └─ ReconcileTickUseCase::run_tick()
//!  └─ fail_open()                  -- input released, overlay torn down
//! ```
//!
//! # Dry run
//!
//! With `--dry-run` the input gate and power control are replaced by the
//! recording mocks: the client polls and logs every decision but never
//! blocks input or shuts the machine down.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use netlock_core::TickError;
use tokio::sync::watch;
use tracing::{error, info, warn};

use netlock_client::application::ports::{InputGate, PowerControl};
use netlock_client::application::reconcile_tick::{Capabilities, ReconcileTickUseCase};
use netlock_client::application::scheduler::Scheduler;
use netlock_client::infrastructure::{
    identity::InterfaceIdentityResolver,
    input_gate::{mock::RecordingInputGate, native_input_gate},
    logging,
    network::HttpStatusClient,
    overlay::{LogSurface, ThreadedOverlay},
    power::{mock::RecordingPowerControl, SystemPowerControl},
    storage::config::{load_config, ConfigError, LoadedConfig},
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// netlock kiosk-lock client.
///
/// Polls the lock server for this machine's status and locks keyboard,
/// mouse, and screen when time runs out.
#[derive(Debug, Parser)]
#[command(
    name = "netlock",
    about = "Kiosk-lock client: polls the lock server and enforces its decisions",
    version
)]
struct Cli {
    /// Directory containing `settings.conf`.
    ///
    /// The file is created with defaults if it does not exist.
    #[arg(short, long, default_value = "./", env = "NETLOCK_PATH")]
    path: PathBuf,

    /// Log file stem: logs go to `{logs_path}/{name}.logs`.
    #[arg(long, default_value = "netlock")]
    name: String,

    /// Poll and log decisions without blocking input or running power commands.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Config comes first: it names the log directory.
    let LoadedConfig {
        config,
        rejected_lines,
        created,
    } = match load_config(&cli.path) {
        Ok(loaded) => loaded,
        Err(e) => {
            let err = config_load_failure(e);
            eprintln!("{err:#}");
            return Err(err.context("failed to load settings.conf"));
        }
    };

    let _log_guard = logging::init(PathBuf::from(&config.logs_path).as_path(), &cli.name)
        .context("failed to initialise logging")?;

    info!(version = %config.version, dry_run = cli.dry_run, "netlock client starting");
    if created {
        info!(path = %cli.path.display(), "no settings.conf found; defaults written");
    }
    for line in &rejected_lines {
        warn!("can't recognise config line: {line}");
    }

    let ip = match config.require_ip(&cli.path) {
        Ok(ip) => ip.to_string(),
        Err(e) => {
            let err = config_load_failure(e);
            error!("{err:#}");
            return Err(err.context("client cannot start without a server address"));
        }
    };

    let gate: Arc<dyn InputGate> = if cli.dry_run {
        Arc::new(RecordingInputGate::new())
    } else {
        native_input_gate()
    };
    let power: Arc<dyn PowerControl> = if cli.dry_run {
        Arc::new(RecordingPowerControl::new())
    } else {
        Arc::new(SystemPowerControl::new())
    };

    let caps = Capabilities {
        identity: Arc::new(
            InterfaceIdentityResolver::new(&config.interfaces)
                .context("invalid interface allow-list")?,
        ),
        status: Arc::new(
            HttpStatusClient::new(&ip, config.connection_timeout())
                .context("failed to create status client")?,
        ),
        gate,
        overlay: Arc::new(ThreadedOverlay::spawn(LogSurface).context("failed to start overlay thread")?),
        power,
    };

    info!(
        server = %ip,
        interval = config.interval,
        initial_time = config.initial_time,
        "polling lock server"
    );

    let mut use_case = ReconcileTickUseCase::new(config.poll_config(), caps);

    // Ctrl-C handler: flip the shutdown flag; the scheduler fails open.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(forward_shutdown(tokio::signal::ctrl_c(), shutdown_tx));

    let exit = Scheduler::new(config.poll_interval(), config.error_cooldown())
        .run(&mut use_case, shutdown_rx)
        .await;

    info!(?exit, "netlock client stopped");
    Ok(())
}

/// Wraps a config error as the fatal [`TickError::ConfigLoadFailure`].
fn config_load_failure(e: ConfigError) -> anyhow::Error {
    anyhow::Error::new(TickError::ConfigLoadFailure(e.to_string()))
}

/// Flips `shutdown` once `signal` fires.
///
/// If the signal cannot be registered the sender is held forever: the
/// scheduler treats a dropped sender as a shutdown request.
async fn forward_shutdown<F>(signal: F, shutdown: watch::Sender<bool>)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            info!("Ctrl-C received – shutting down");
            let _ = shutdown.send(true);
        }
        Err(e) => {
            error!("failed to listen for Ctrl-C, running until killed: {e}");
            std::future::pending::<()>().await;
        }
    }
    drop(shutdown);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
