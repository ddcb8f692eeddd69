//! Integration tests for the sensor registry lifecycle

use sensor_hooks::sensors::{
    SensorError, SensorKind, SensorReading, SensorRegistry, SensorSample, SimulatedDriver,
};
use sensor_hooks::hooks::{compass_heading_once, Cardinal};
use std::thread;
use std::time::{Duration, Instant};

fn gyro(z: f64) -> SensorReading {
    SensorReading::Gyroscope(SensorSample::new(0.0, 0.0, z))
}

#[test]
fn test_subscribe_starts_and_last_release_stops() {
    let driver = SimulatedDriver::new();
    let handle = driver.handle();
    let registry = SensorRegistry::new(driver);

    assert!(!registry.is_active(SensorKind::Gyroscope));
    let sub = registry.subscribe(SensorKind::Gyroscope).unwrap();
    assert!(registry.is_active(SensorKind::Gyroscope));
    assert!(handle.is_live(SensorKind::Gyroscope));

    registry.unsubscribe(sub);
    assert!(!registry.is_active(SensorKind::Gyroscope));
    assert!(!handle.is_live(SensorKind::Gyroscope));
    assert_eq!(registry.ref_count(SensorKind::Gyroscope), 0);
}

#[test]
fn test_double_subscribe_keeps_both_consumers() {
    let driver = SimulatedDriver::new();
    let handle = driver.handle();
    let registry = SensorRegistry::new(driver);

    let first = registry.subscribe(SensorKind::Gyroscope).unwrap();
    let second = registry.subscribe(SensorKind::Gyroscope).unwrap();
    assert_ne!(first.id(), second.id());
    assert_eq!(handle.start_count(SensorKind::Gyroscope), 1);

    handle.emit(gyro(0.5));
    registry.pump();

    // Both consumers see the reading; neither replaced the other.
    assert_eq!(first.drain().len(), 1);
    assert_eq!(second.drain().len(), 1);
}

#[test]
fn test_unsubscribe_kind_releases_all_and_is_idempotent() {
    let driver = SimulatedDriver::new();
    let handle = driver.handle();
    let registry = SensorRegistry::new(driver);

    let a = registry.subscribe(SensorKind::Magnetometer).unwrap();
    let b = registry.subscribe(SensorKind::Magnetometer).unwrap();

    registry.unsubscribe_kind(SensorKind::Magnetometer);
    assert_eq!(registry.ref_count(SensorKind::Magnetometer), 0);
    assert!(!handle.is_live(SensorKind::Magnetometer));

    registry.unsubscribe_kind(SensorKind::Magnetometer);
    drop(a);
    drop(b);
    assert_eq!(handle.stop_count(SensorKind::Magnetometer), 1);
}

#[test]
fn test_cleanup_all_then_unsubscribe_is_noop() {
    let driver = SimulatedDriver::new();
    let handle = driver.handle();
    let registry = SensorRegistry::new(driver);

    let subs: Vec<_> = SensorKind::ALL
        .iter()
        .map(|&kind| registry.subscribe(kind).unwrap())
        .collect();

    registry.cleanup_all();
    registry.cleanup_all();
    for kind in SensorKind::ALL {
        assert!(!handle.is_live(kind));
        registry.unsubscribe_kind(kind);
        assert_eq!(handle.stop_count(kind), 1);
    }

    for sub in subs {
        sub.unsubscribe();
    }
    for kind in SensorKind::ALL {
        assert_eq!(handle.stop_count(kind), 1);
    }
}

#[test]
fn test_resubscribe_after_cleanup_restarts_listener() {
    let driver = SimulatedDriver::new();
    let handle = driver.handle();
    let registry = SensorRegistry::new(driver);

    let stale = registry.subscribe(SensorKind::Barometer).unwrap();
    registry.cleanup_all();

    let fresh = registry.subscribe(SensorKind::Barometer).unwrap();
    assert_eq!(handle.start_count(SensorKind::Barometer), 2);
    assert_eq!(registry.ref_count(SensorKind::Barometer), 1);

    // Dropping the stale subscription must not stop the fresh listener.
    drop(stale);
    assert!(handle.is_live(SensorKind::Barometer));
    drop(fresh);
    assert!(!handle.is_live(SensorKind::Barometer));
}

#[test]
fn test_permission_denied_registers_nothing() {
    let driver = SimulatedDriver::new();
    let handle = driver.handle();
    handle.deny_permission(SensorKind::Magnetometer);
    let registry = SensorRegistry::new(driver);

    let err = registry.subscribe(SensorKind::Magnetometer).unwrap_err();
    assert_eq!(err, SensorError::PermissionDenied(SensorKind::Magnetometer));
    assert_eq!(registry.ref_count(SensorKind::Magnetometer), 0);
    assert!(!registry.is_active(SensorKind::Magnetometer));
}

#[test]
fn test_update_interval_configures_live_and_future_listeners() {
    let driver = SimulatedDriver::new();
    let handle = driver.handle();
    let registry = SensorRegistry::new(driver);

    let sub = registry.subscribe(SensorKind::Accelerometer).unwrap();
    registry
        .set_update_interval(SensorKind::Accelerometer, Duration::from_millis(20))
        .unwrap();
    assert_eq!(
        handle.update_interval(SensorKind::Accelerometer),
        Some(Duration::from_millis(20))
    );

    registry
        .set_update_interval(SensorKind::Gyroscope, Duration::from_millis(50))
        .unwrap();
    assert_eq!(handle.update_interval(SensorKind::Gyroscope), None);
    let _gyro = registry.subscribe(SensorKind::Gyroscope).unwrap();
    assert_eq!(
        handle.update_interval(SensorKind::Gyroscope),
        Some(Duration::from_millis(50))
    );

    assert_eq!(
        registry.set_update_interval(SensorKind::Magnetometer, Duration::from_millis(20)),
        Err(SensorError::IntervalUnsupported(SensorKind::Magnetometer))
    );
    drop(sub);
}

#[test]
fn test_pump_timeout_receives_from_driver_thread() {
    let driver = SimulatedDriver::new();
    let handle = driver.handle();
    let registry = SensorRegistry::new(driver);
    let sub = registry.subscribe(SensorKind::Gyroscope).unwrap();

    let producer = thread::spawn(move || {
        for i in 0..10 {
            handle.emit(gyro(i as f64));
        }
    });
    producer.join().unwrap();

    let mut received = 0;
    while received < 10 {
        if registry.pump_timeout(Duration::from_millis(200)) == 0 {
            break;
        }
        received += sub.drain().len();
    }
    assert_eq!(received, 10);
    assert_eq!(registry.pump_timeout(Duration::from_millis(10)), 0);
}

#[test]
fn test_stats_track_activity() {
    let driver = SimulatedDriver::new();
    let handle = driver.handle();
    let registry = SensorRegistry::new(driver);

    let _a = registry.subscribe(SensorKind::Gyroscope).unwrap();
    let _b = registry.subscribe(SensorKind::Gyroscope).unwrap();
    handle.emit(gyro(1.0));
    handle.emit(gyro(2.0));
    registry.pump();

    let stats = registry.stats().stats();
    assert_eq!(stats.gyroscope_readings, 2);
    assert_eq!(stats.subscriptions_opened, 2);
    assert_eq!(stats.listeners_started, 1);
    assert_eq!(stats.dropped_readings, 0);
}

/// Emit `reading` from another thread as soon as its listener comes up.
fn emit_when_live(
    handle: sensor_hooks::sensors::SimulatedHandle,
    reading: SensorReading,
) -> thread::JoinHandle<bool> {
    thread::spawn(move || {
        let deadline = Instant::now() + Duration::from_secs(2);
        while !handle.is_live(reading.kind()) && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        handle.emit(reading)
    })
}

#[test]
fn test_read_once_waits_for_first_reading() {
    let driver = SimulatedDriver::new();
    let handle = driver.handle();
    let registry = SensorRegistry::new(driver);

    let producer = emit_when_live(handle.clone(), gyro(0.25));
    let reading = registry
        .read_once(SensorKind::Gyroscope, Duration::from_secs(2))
        .unwrap();
    assert!(producer.join().unwrap());

    assert_eq!(reading.map(|r| r.kind()), Some(SensorKind::Gyroscope));
    assert_eq!(registry.ref_count(SensorKind::Gyroscope), 0);
    assert!(!handle.is_live(SensorKind::Gyroscope));
}

#[test]
fn test_compass_heading_once_reads_magnetometer() {
    let driver = SimulatedDriver::new();
    let handle = driver.handle();
    let registry = SensorRegistry::new(driver);

    let producer = emit_when_live(
        handle.clone(),
        SensorReading::Magnetometer(SensorSample::new(0.0, 25.0, -40.0)),
    );
    let heading = compass_heading_once(&registry, Duration::from_secs(2))
        .unwrap()
        .expect("a heading");
    assert!(producer.join().unwrap());

    assert!((heading.degrees - 90.0).abs() < 1e-9);
    assert_eq!(heading.direction, Cardinal::E);
    assert_eq!(handle.stop_count(SensorKind::Magnetometer), 1);
}
