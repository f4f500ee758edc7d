//! Herald Demo - Live progress for simulated async jobs
//!
//! Runs a handful of simulated jobs concurrently and redraws their progress on
//! stderr until every one of them has settled.
//!
//! # Usage
//!
//! ```bash
//! # The three default jobs
//! herald-demo
//!
//! # Custom jobs: name:millis[:failure reason]
//! herald-demo --task "Compile:1200" --task "Upload:800:Permission denied"
//!
//! # Different spinner, slower ticks, no color
//! herald-demo --spinner arc --tick-ms 200 --no-color
//!
//! # Keep a log of what happened
//! herald-demo --log-file /tmp/herald.log --log-level debug
//! ```

mod job;

use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use herald_core::{
    default_config_path, load_config_from_path, ConfigOverrides, Reporter, SpinnerStyle,
};
use tracing::{error, info};

use job::JobSpec;

/// Herald Demo - live terminal progress for concurrent async jobs
#[derive(Parser, Debug)]
#[command(name = "herald-demo")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Job to simulate as name:millis[:failure reason] (repeatable)
    #[arg(short = 't', long = "task", value_name = "SPEC")]
    tasks: Vec<JobSpec>,

    /// Spinner style (dots, line, arc, simple_dots); see also HERALD_SPINNER
    #[arg(short = 's', long, value_name = "STYLE")]
    spinner: Option<SpinnerStyle>,

    /// Custom spinner glyphs, comma separated
    #[arg(long, value_delimiter = ',', value_name = "GLYPHS")]
    frames: Option<Vec<String>>,

    /// Tick interval in milliseconds; see also HERALD_TICK_MS
    #[arg(long, value_name = "MS")]
    tick_ms: Option<u64>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Configuration file path
    #[arg(short = 'c', long, env = "HERALD_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write logs to this file (logs are discarded otherwise)
    #[arg(long, env = "HERALD_LOG_FILE", value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "HERALD_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(style) = self.spinner {
            overrides = overrides.with_spinner_style(style);
        }
        if let Some(ref frames) = self.frames {
            overrides = overrides.with_spinner_frames(frames.clone());
        }
        if let Some(ms) = self.tick_ms {
            overrides = overrides.with_tick_interval_ms(ms);
        }
        if self.no_color {
            overrides = overrides.with_color(false);
        }
        overrides
    }
}

/// Initialize logging into `log_file`
///
/// The redrawn block owns the terminal, so without a file nothing is installed
/// and every event is dropped.
fn init_logging(level: &str, log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {path:?}"))?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("herald_demo={level},herald_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.log_file.as_deref())?;

    info!("Herald demo starting");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config_path = args.config.clone().or_else(default_config_path);
    let mut config = load_config_from_path(config_path).context("Failed to load configuration")?;
    args.overrides()
        .apply(&mut config)
        .context("Invalid command line options")?;

    if !std::io::stderr().is_terminal() {
        config.color = false;
    }

    info!(
        source = %config.source(),
        spinner = %config.spinner_style,
        color = config.color,
        "Configuration resolved"
    );

    let reporter = Reporter::new(&config).context("Failed to create reporter")?;

    let jobs = if args.tasks.is_empty() {
        JobSpec::defaults()
    } else {
        args.tasks
    };

    for job in jobs {
        let name = job.name.clone();
        reporter
            .add(name, job.run())
            .context("Failed to register job")?;
    }
    reporter.close();

    tokio::select! {
        result = reporter.pipe(tokio::io::stderr()) => {
            if let Err(ref e) = result {
                error!(error = %e, "Reporter stopped with error");
            }
            result.context("Progress output failed")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received SIGINT, stopping");
        }
    }

    let snapshot = reporter.snapshot();
    info!(
        settled = snapshot.settled.len(),
        pending = snapshot.pending.len(),
        "Herald demo finished"
    );

    Ok(())
}
