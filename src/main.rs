//! ir-cursor - IR pointer cursor control
//!
//! Entry point for the binary. Plays a recorded sensor script through the
//! cursor controller against the dry-run pointer backend.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use ir_cursor::config::Config;
use ir_cursor::cursor::{CursorController, CursorRuntime, UP_TIMEOUT};
use ir_cursor::input::DryRunBackend;
use ir_cursor::sensor::ReplaySensor;
use ir_cursor::utils::format_user_error;

/// Command-line arguments for ir-cursor
#[derive(Parser, Debug)]
#[command(name = "ir-cursor")]
#[command(version, about = "Drive the cursor from an IR pointing sensor", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "/etc/ir-cursor/config.toml")]
    config: String,

    /// Sensor replay script (`delay_ms x y` per line)
    #[arg(short, long)]
    replay: PathBuf,

    /// Smoothing window size (overrides config)
    #[arg(short, long, env = "IR_CURSOR_SMOOTHING")]
    smoothing: Option<usize>,

    /// Zone action codes, top/right/bottom/left (overrides config)
    #[arg(short, long, env = "IR_CURSOR_ZONES")]
    zones: Option<String>,

    /// Move the cursor without pressing buttons
    #[arg(long)]
    no_clicks: bool,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log format (json|pretty|compact)
    #[arg(long, default_value = "pretty")]
    log_format: String,

    /// Write logs to file (in addition to stdout)
    #[arg(long)]
    log_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // A missing file means defaults; a present but broken one is fatal
    let config_exists = Path::new(&args.config).exists();
    let loaded = if config_exists {
        Some(Config::parse(&args.config))
    } else {
        None
    };
    let base_level = match &loaded {
        Some(Ok(config)) => config.logging.level.clone(),
        _ => "info".to_string(),
    };

    let _log_guard = init_logging(&args, &base_level)?;

    info!("════════════════════════════════════════════════════════");
    info!("  ir-cursor v{}", env!("CARGO_PKG_VERSION"));
    info!("  Built: {}", env!("BUILD_DATE"));
    info!("  Commit: {}", env!("GIT_HASH"));
    info!("════════════════════════════════════════════════════════");

    let config = match loaded {
        Some(result) => report(result)?,
        None => {
            warn!("Config file {} not found, using defaults", args.config);
            Config::default()
        }
    };

    // Overrides apply before validation so flags can replace bad file values
    let config = config.with_overrides(args.smoothing, args.zones.clone(), args.no_clicks);
    report(config.validate().context("Invalid configuration"))?;

    info!("Configuration loaded successfully");
    tracing::debug!("Config: {:?}", config);

    report(run(&config, &args.replay).await)
}

async fn run(config: &Config, replay: &Path) -> Result<()> {
    let backend = Arc::new(DryRunBackend::new(config.screen_size()));
    let settings = config.controller_settings()?;
    let controller = Arc::new(CursorController::new(backend.clone(), settings)?);

    let sensor = ReplaySensor::from_file(replay)?;
    let done = sensor.completion();

    let runtime = CursorRuntime::start(controller, Box::new(sensor), config.poll_interval())
        .context("Failed to start cursor runtime")?;

    // Disconnects once the runtime drops the sensor
    let mut replay_done = tokio::task::spawn_blocking(move || done.recv().is_ok());

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut health = tokio::time::interval(Duration::from_millis(100));

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Interrupted, shutting down");
                break;
            }
            _ = &mut replay_done => {
                info!("Replay complete");
                // Let the final session idle out and release
                tokio::time::sleep(UP_TIMEOUT * 3).await;
                break;
            }
            _ = health.tick() => {
                if !runtime.is_running() {
                    warn!("Cursor controller stopped");
                    break;
                }
            }
        }
    }

    let stats = runtime.finish().context("Cursor runtime failed")?;
    let (x, y) = backend.position();
    info!(
        "Injected {} pointer events ({} sessions, {} ended), pointer at ({}, {})",
        backend.events(),
        stats.sessions_begun,
        stats.sessions_ended,
        x,
        y
    );
    Ok(())
}

/// Print the user-facing form of an error before returning it
fn report<T>(result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        eprintln!("{}", format_user_error(e));
    }
    result
}

fn init_logging(args: &Args, base_level: &str) -> Result<Option<WorkerGuard>> {
    use std::fs::File;

    let log_level = match args.verbose {
        0 => base_level,
        1 => "debug",
        _ => "trace",
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("ir_cursor={},warn", log_level))
    });

    let mut layers = vec![format_layer(&args.log_format, std::io::stdout, true)];

    // If log file is specified, write to both stdout and file
    let guard = match &args.log_file {
        Some(log_file_path) => {
            let file = File::create(log_file_path)
                .context(format!("Failed to create log file: {}", log_file_path))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            layers.push(format_layer(&args.log_format, writer, false));
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .init();

    if let Some(log_file_path) = &args.log_file {
        info!("Logging to file: {}", log_file_path);
    }
    Ok(guard)
}

/// Output layer in the requested format (json|pretty|compact)
fn format_layer<W>(
    format: &str,
    writer: W,
    ansi: bool,
) -> Box<dyn Layer<Registry> + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi);

    match format {
        "json" => layer.json().boxed(),
        "compact" => layer.compact().boxed(),
        _ => layer.pretty().boxed(),
    }
}
