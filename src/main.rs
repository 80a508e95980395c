//! Miniscope Stream CLI
//!
//! Command-line demonstration of the streaming core. Reads frames from a
//! synthetic sensor or a replay file, decodes their telemetry and reports
//! frame continuity until interrupted.

use clap::Parser;
use miniscope_stream::{
    capture::{FileConfig, FrameSource, MockSensor, RawFileSource},
    metrics::{MetricsRegistry, MetricsSnapshot},
    session::{FrameOutcome, Session, SessionError},
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Consecutive source errors after which the stream is abandoned.
const MAX_SOURCE_ERRORS: u32 = 10;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Downsample factor set on the acquisition hub.
    #[arg(long)]
    downsample: Option<u32>,
    /// Only deliver frames captured while recording.
    #[arg(long)]
    sync: bool,
    /// Store delivered frames as raw files in this directory.
    #[arg(long)]
    store: Option<PathBuf>,
    /// Replay concatenated transport frames from a file.
    #[arg(long)]
    replay: Option<PathBuf>,
    /// Number of reads before stopping.
    #[arg(long)]
    frames: Option<u32>,
    /// Run until interrupted.
    #[arg(long)]
    continuous: bool,
    /// Synthetic sensor: skip every counter divisible by N.
    #[arg(long, default_value_t = 0)]
    drop_every: u32,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!("Miniscope Stream v{}", miniscope_stream::VERSION);

    let mut config = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };
    if let Some(factor) = args.downsample {
        config.stream.downsample_factor = factor;
    }
    if args.sync {
        config.stream.sync_with_recording = true;
    }
    if let Some(dir) = &args.store {
        config.stream.file_storage = true;
        config.stream.storage_dir = dir.clone();
    }
    if let Some(frames) = args.frames {
        config.output.frame_count = frames;
    }
    if args.continuous {
        config.output.continuous = true;
    }

    let result = match &args.replay {
        Some(path) => RawFileSource::from_path(path)
            .map_err(|e| e.to_string())
            .and_then(|source| run(&config, source)),
        None => {
            info!("Using synthetic sensor input");
            // The synthetic sensor records from frame 50 onwards so that
            // sync mode has something to deliver.
            let sensor = MockSensor::new()
                .with_drop_every(args.drop_every)
                .with_recording_window(50..u32::MAX);
            run(&config, sensor)
        }
    };

    if let Err(e) = result {
        eprintln!("Stream failed: {}", e);
        std::process::exit(1);
    }
}

fn run<S: FrameSource>(config: &FileConfig, source: S) -> Result<(), String> {
    let mut session = Session::new(&config.stream, source).map_err(|e| e.to_string())?;

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .map_err(|e| e.to_string())?;
    }

    let registry = Arc::new(MetricsRegistry::new().map_err(|e| e.to_string())?);
    start_metrics_server(config.metrics.port, &registry);

    let mut reads = 0u32;
    let mut source_errors = 0u32;
    while running.load(Ordering::SeqCst) {
        if !config.output.continuous && reads >= config.output.frame_count {
            break;
        }
        reads += 1;

        let outcome = session.next_frame();
        if matches!(outcome, Err(SessionError::Source(_))) {
            source_errors += 1;
        } else {
            source_errors = 0;
        }

        match outcome {
            Ok(FrameOutcome::Delivered { stats, .. }) => {
                println!(
                    "Got Frame # {} record flag {} missing frames: {}",
                    stats.seq_id,
                    stats.is_recording,
                    stats
                        .missing_range
                        .map(|(first, last)| format!("[{}, {}]", first, last))
                        .unwrap_or_else(|| "[]".to_string())
                );
            }
            Ok(FrameOutcome::Suppressed(_)) => {}
            Ok(FrameOutcome::NoFrame) => {
                if session.is_exhausted() {
                    info!("Replay finished");
                    break;
                }
            }
            Err(e) if e.is_fatal() => return Err(e.to_string()),
            Err(e) if source_errors >= MAX_SOURCE_ERRORS => {
                return Err(format!("{} consecutive source errors, last: {}", source_errors, e));
            }
            Err(e) => warn!("Frame {} unusable: {}", reads, e),
        }

        registry.update(&MetricsSnapshot::from_session(session.counters()));
    }

    if !running.load(Ordering::SeqCst) {
        info!("Kill received. Exiting cleanly");
    }

    let counters = session.close().map_err(|e| e.to_string())?;
    info!(
        "Read {} buffers: {} delivered, {} suppressed, {} unusable, {} missing",
        counters.received, counters.delivered, counters.suppressed, counters.unusable,
        counters.missing
    );
    Ok(())
}

#[cfg(feature = "metrics")]
fn start_metrics_server(port: u16, registry: &Arc<MetricsRegistry>) {
    use miniscope_stream::metrics::{MetricsServer, MetricsServerConfig};

    if port == 0 {
        return;
    }
    let server = MetricsServer::new(MetricsServerConfig::with_port(port), Arc::clone(registry));
    if let Err(e) = server.spawn() {
        warn!("Metrics server not started: {}", e);
    }
}

#[cfg(not(feature = "metrics"))]
fn start_metrics_server(port: u16, _registry: &Arc<MetricsRegistry>) {
    if port != 0 {
        info!("Built without the metrics feature; exporter on port {} disabled", port);
    }
}
