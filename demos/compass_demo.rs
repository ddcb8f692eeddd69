//! Compass demo: a simulated device turning a full circle.
//!
//! Run with `cargo run --example compass_demo`.

use chrono::{Duration, Utc};
use sensor_hooks::hooks::{CompassHeading, MetricHook, TiltTracker};
use sensor_hooks::sensors::{SensorReading, SensorRegistry, SensorSample, SimulatedDriver};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    let driver = SimulatedDriver::new();
    let handle = driver.handle();
    let registry = SensorRegistry::new(driver);

    let mut compass = MetricHook::activate(&registry, CompassHeading::new())?;
    let mut tilt = MetricHook::activate(&registry, TiltTracker::new())?;

    let t0 = Utc::now();
    let rate = std::f64::consts::PI / 4.0;
    for step in 0..=16 {
        let at = t0 + Duration::milliseconds(step * 500);
        let angle = rate * step as f64 * 0.5;

        handle.emit(SensorReading::Magnetometer(SensorSample::at(
            40.0 * angle.cos(),
            40.0 * angle.sin(),
            -30.0,
            at,
        )));
        handle.emit(SensorReading::Gyroscope(SensorSample::at(0.0, 0.0, rate, at)));
        handle.emit(SensorReading::Accelerometer(SensorSample::at(0.0, 0.0, 9.81, at)));

        compass.drain();
        tilt.drain();

        let heading = compass.value();
        println!(
            "t={:>4}ms  heading {:>5.1}° {:<3}  integrated yaw {:>6.1}°",
            step * 500,
            heading.degrees,
            heading.direction.to_string(),
            tilt.value().yaw
        );
    }

    println!();
    println!("{registry:?}");
    drop(compass);
    drop(tilt);
    println!("{registry:?}");
    Ok(())
}
