//! gesture_nav — command-line entry point.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gesture_nav::app::{run_replay, run_window, write_pose_tour};
use gesture_nav::config::NavConfig;

/// Hands-free page navigation from hand gestures
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the debounce window, in milliseconds
    #[arg(long)]
    cooldown_ms: Option<u64>,

    /// Start with detection switched off
    #[arg(long)]
    disabled: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a JSON-lines landmark recording through a headless session
    Replay {
        file: PathBuf,
    },
    /// Open the overlay window (keyboard simulation, or LeapMotion with `leap`)
    Window {
        /// Also write every detector event to this file, in replay format
        #[arg(long)]
        record: Option<PathBuf>,
    },
    /// Print a recording that holds each gesture's pose in turn
    Poses {
        /// How long each pose is held
        #[arg(long, default_value = "1200")]
        hold_ms: u64,

        /// Empty frames between poses
        #[arg(long, default_value = "300")]
        gap_ms: u64,

        /// Frame interval
        #[arg(long, default_value = "33")]
        frame_ms: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; `poses` owns stdout.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let mut cfg = match &cli.config {
        Some(path) => NavConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => NavConfig::default(),
    };
    if let Some(ms) = cli.cooldown_ms {
        cfg.dispatch.cooldown_ms = ms;
    }
    if cli.disabled {
        cfg.detection.enabled = false;
    }

    match cli.command.unwrap_or(Command::Window { record: None }) {
        Command::Replay { file } => {
            let report = run_replay(&cfg, &file)
                .with_context(|| format!("Failed to replay {}", file.display()))?;
            let s = report.summary;
            println!(
                "frames={} hands={} dispatched={} suppressed={} unavailable={}",
                s.frames, s.hands, s.dispatched, s.suppressed, s.unavailable
            );
            println!("{}", report.viewport.summary());
        }
        Command::Window { record } => {
            #[cfg(feature = "leap")]
            info!("mode: LeapMotion hardware");
            #[cfg(not(feature = "leap"))]
            info!("mode: keyboard simulation (build with --features leap for hardware)");

            let summary = run_window(&cfg, record.as_deref()).context("Window session failed")?;
            info!(
                "session ended: {} frames, {} dispatched, {} suppressed",
                summary.frames, summary.dispatched, summary.suppressed
            );
        }
        Command::Poses { hold_ms, gap_ms, frame_ms } => {
            let lines = write_pose_tour(
                io::stdout().lock(),
                Duration::from_millis(hold_ms),
                Duration::from_millis(gap_ms),
                Duration::from_millis(frame_ms),
            )?;
            info!("wrote {} frames", lines);
        }
    }
    Ok(())
}
