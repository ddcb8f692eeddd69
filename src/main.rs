//! Sensor Hooks CLI
//!
//! Generate, replay and inspect sensor sessions.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use sensor_hooks::{
    config::Config,
    hooks::{MetricSet, MetricSnapshot},
    replay::{self, Pattern, ReplaySummary},
    sensors::{SensorKind, SensorReading, SensorRegistry, SimulatedDriver, SimulatedHandle},
    VERSION,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Longest session `synth` will generate.
const MAX_SYNTH_SECONDS: f64 = 24.0 * 3600.0;

#[cfg(feature = "api")]
use sensor_hooks::{ApiConfig, BlockingApiClient};

#[derive(Parser)]
#[command(name = "sensor-hooks")]
#[command(version = VERSION)]
#[command(about = "Device sensor registry and derived motion metrics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a synthetic sensor session
    Synth {
        /// Motion pattern (still, walk, shake or spin)
        #[arg(long, default_value = "walk")]
        pattern: String,

        /// Session length in seconds
        #[arg(long, default_value = "10")]
        seconds: f64,

        /// Samples per second for each sensor
        #[arg(long, default_value = "50")]
        rate: u32,

        /// Output recording (JSON lines)
        #[arg(long, short)]
        output: PathBuf,
    },

    /// Replay a recording through every derived metric
    Replay {
        /// Recording to replay (JSON lines)
        input: PathBuf,

        /// Pace readings by their timestamps; Ctrl+C stops early
        #[arg(long)]
        realtime: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show sensor support and registry defaults
    Status,

    /// Show configuration
    Config,

    /// Call the remote health check
    #[cfg(feature = "api")]
    Hello,

    /// Log in against the remote API
    #[cfg(feature = "api")]
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        pass: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not load config, using defaults");
        Config::default()
    });

    match cli.command {
        Commands::Synth {
            pattern,
            seconds,
            rate,
            output,
        } => cmd_synth(&pattern, seconds, rate, &output),
        Commands::Replay {
            input,
            realtime,
            json,
        } => cmd_replay(&config, &input, realtime, json),
        Commands::Status => {
            cmd_status(&config);
            Ok(())
        }
        Commands::Config => cmd_config(&config),
        #[cfg(feature = "api")]
        Commands::Hello => cmd_hello(&config),
        #[cfg(feature = "api")]
        Commands::Login { email, pass } => cmd_login(&config, &email, &pass),
    }
}

fn cmd_synth(pattern: &str, seconds: f64, rate: u32, output: &Path) -> Result<()> {
    let pattern: Pattern = pattern.parse()?;
    if !seconds.is_finite() || seconds <= 0.0 {
        bail!("--seconds must be a positive number");
    }
    if seconds > MAX_SYNTH_SECONDS {
        bail!("--seconds must be at most {MAX_SYNTH_SECONDS}");
    }

    let readings = replay::synthesize(pattern, seconds, rate, Utc::now());
    replay::save_recording(output, &readings)
        .with_context(|| format!("writing {}", output.display()))?;

    println!(
        "Wrote {} readings ({:?}, {seconds}s at {rate} Hz) to {}",
        readings.len(),
        pattern,
        output.display()
    );
    Ok(())
}

fn cmd_replay(config: &Config, input: &Path, realtime: bool, json: bool) -> Result<()> {
    let readings = replay::load_recording(input)
        .with_context(|| format!("reading {}", input.display()))?;
    if readings.is_empty() {
        bail!("{} contains no readings", input.display());
    }

    let driver = SimulatedDriver::new();
    let handle = driver.handle();
    let registry = SensorRegistry::with_config(driver, config.registry());
    registry.set_update_interval(SensorKind::Accelerometer, config.accelerometer_interval)?;
    registry.set_update_interval(SensorKind::Gyroscope, config.gyroscope_interval)?;

    let mut metrics = MetricSet::activate(&registry, &config.metrics)?;
    tracing::info!(
        readings = readings.len(),
        session = %registry.stats().session_id(),
        "replaying"
    );

    let replayed = if realtime {
        replay_realtime(&registry, &handle, &mut metrics, &readings)
    } else {
        replay::replay(&registry, &handle, &mut metrics, &readings);
        readings.len()
    };

    let dropped = registry.stats().stats().dropped_readings;
    if dropped > 0 {
        tracing::warn!(dropped, "consumer channels overflowed during replay");
    }
    let summary = ReplaySummary::new(&readings[..replayed], metrics.snapshot(), dropped);
    drop(metrics);
    registry.cleanup_all();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
        println!();
        println!("{}", registry.stats().summary());
    }
    Ok(())
}

/// Replay at recorded pace. Returns how many readings were emitted.
fn replay_realtime(
    registry: &SensorRegistry,
    handle: &SimulatedHandle,
    metrics: &mut MetricSet,
    readings: &[SensorReading],
) -> usize {
    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone());

    println!("Replaying in real time. Press Ctrl+C to stop");
    println!();

    let origin = readings[0].timestamp();
    let started = Instant::now();
    let mut last_report = Instant::now();
    let batch = replay::batch_size(registry);
    let mut emitted = 0;

    for reading in readings {
        if !running.load(Ordering::SeqCst) {
            println!();
            println!("Stopped early");
            break;
        }

        let offset = (reading.timestamp() - origin).to_std().unwrap_or_default();
        if let Some(wait) = offset.checked_sub(started.elapsed()) {
            thread::sleep(wait);
        }
        handle.emit(*reading);
        emitted += 1;
        if emitted % batch == 0 {
            metrics.drain();
        }

        if last_report.elapsed() >= Duration::from_millis(500) {
            metrics.drain();
            metrics.tick(reading.timestamp());
            print_live(&metrics.snapshot());
            last_report = Instant::now();
        }
    }

    metrics.drain();
    if let Some(last) = readings[..emitted].last() {
        metrics.tick(last.timestamp());
    }
    println!();
    emitted
}

fn print_live(snapshot: &MetricSnapshot) {
    println!(
        "heading {:>6.1}° {:<3}  steps {:>4}  shakes {:>3}  pitch {:>6.1}°  roll {:>6.1}°  speed {:>6.2} m/s{}",
        snapshot.heading.degrees,
        snapshot.heading.direction.to_string(),
        snapshot.steps,
        snapshot.shakes.count,
        snapshot.tilt.pitch,
        snapshot.tilt.roll,
        snapshot.motion.speed,
        if snapshot.stationary { "  (stationary)" } else { "" }
    );
}

fn print_summary(summary: &ReplaySummary) {
    let m = &summary.metrics;

    println!("Replay Summary");
    println!("==============");
    println!();
    println!("Readings: {}", summary.readings);
    if summary.dropped > 0 {
        println!("Dropped: {}", summary.dropped);
    }
    println!("Duration: {:.2}s", summary.duration_secs);
    println!(
        "Acceleration magnitude: mean {:.2} m/s², std dev {:.2}",
        summary.accel_magnitude_mean, summary.accel_magnitude_std_dev
    );
    println!();
    println!("Metrics:");
    println!("  Heading: {:.1}° ({})", m.heading.degrees, m.heading.direction);
    println!("  Shakes: {}", m.shakes.count);
    println!("  Steps: {}", m.steps);
    println!(
        "  Tilt: pitch {:.1}°, roll {:.1}°, yaw {:.1}° ({:.1}°/s)",
        m.tilt.pitch, m.tilt.roll, m.tilt.yaw, m.tilt.yaw_rate
    );
    println!(
        "  Altitude: {:.2} m (min {:.2}, max {:.2})",
        m.altitude.current, m.altitude.min, m.altitude.max
    );
    println!("  Stationary: {}", if m.stationary { "yes" } else { "no" });
    println!(
        "  Motion: speed {:.2} m/s, distance {:.2} m",
        m.motion.speed, m.motion.distance
    );
    println!(
        "  Orientation: {} (tilt x {:.1}°, tilt y {:.1}°)",
        if m.orientation.is_portrait {
            "portrait"
        } else {
            "landscape"
        },
        m.orientation.tilt_x,
        m.orientation.tilt_y
    );
}

fn cmd_status(config: &Config) {
    println!("Sensor Hooks Status");
    println!("===================");
    println!();

    println!("Sensors:");
    for kind in SensorKind::ALL {
        let interval = match kind {
            SensorKind::Accelerometer => format!("{}ms", config.accelerometer_interval.as_millis()),
            SensorKind::Gyroscope => format!("{}ms", config.gyroscope_interval.as_millis()),
            _ => "driver default".to_string(),
        };
        println!("  {:<14} update interval: {}", kind.to_string(), interval);
    }
    println!();

    println!("Channels:");
    println!("  Intake capacity: {}", config.channels.intake_capacity);
    println!("  Per-subscriber capacity: {}", config.channels.consumer_capacity);
    println!();

    println!("Speech language: {}", config.speech_language);
    println!(
        "Config file: {:?} ({})",
        Config::config_path(),
        if Config::config_path().exists() {
            "present"
        } else {
            "defaults"
        }
    );
}

fn cmd_config(config: &Config) -> Result<()> {
    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

#[cfg(feature = "api")]
fn cmd_hello(config: &Config) -> Result<()> {
    let client = BlockingApiClient::new(ApiConfig::from(config))?;
    let body = client.hello()?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

#[cfg(feature = "api")]
fn cmd_login(config: &Config, email: &str, pass: &str) -> Result<()> {
    let client = BlockingApiClient::new(ApiConfig::from(config))?;
    let name = client.login(email, pass)?;
    println!("Logged in as {name}");
    Ok(())
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) {
    if let Err(e) = ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    }) {
        tracing::warn!(error = %e, "could not install Ctrl+C handler");
    }
}
