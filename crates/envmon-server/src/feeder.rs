//! Simulated sensor feed
//!
//! Stands in for the device when no hardware is attached: seeds the store
//! so the charts have something to show, then records one sample per
//! interval.

use std::time::Duration;

use chrono::{DateTime, Utc};
use envmon_core::config::DemoConfig;
use envmon_core::dashboard::Dashboard;
use envmon_core::demo::{mock_readings, DemoSensor};
use envmon_core::reading::NewReading;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Start feeding simulated readings into `dashboard` until `cancel` fires
pub fn spawn(
    dashboard: Dashboard,
    config: &DemoConfig,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let mut sensor = match config.seed {
        Some(seed) => DemoSensor::with_seed(seed),
        None => DemoSensor::new(),
    };
    let period = Duration::from_millis(config.interval_ms.max(1));
    let config = config.clone();

    tokio::spawn(async move {
        let seed = initial_readings(&mut sensor, &config, Utc::now());
        let seeding = dashboard.clone();
        match tokio::task::spawn_blocking(move || record_all(&seeding, seed)).await {
            Ok(stored) => info!("Demo feed seeded {} readings", stored),
            Err(e) => warn!("Demo seeding failed: {}", e),
        }

        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Demo feed stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let reading = sensor.sample(Utc::now());
                    let recording = dashboard.clone();
                    match tokio::task::spawn_blocking(move || recording.record(reading)).await {
                        Ok(Ok(_)) => {}
                        Ok(Err(e)) => warn!("Demo reading rejected: {}", e),
                        Err(e) => warn!("Demo reading task failed: {}", e),
                    }
                }
            }
        }
    })
}

/// Readings stored before the first tick, oldest first
///
/// A simulated history of `backfill` samples ending one interval before
/// `now`, or the two fixed development readings when `backfill` is 0.
pub fn initial_readings(
    sensor: &mut DemoSensor,
    config: &DemoConfig,
    now: DateTime<Utc>,
) -> Vec<NewReading> {
    if config.backfill == 0 {
        return mock_readings(now)
            .into_iter()
            .rev()
            .map(|r| NewReading::new(r.data).at(r.timestamp))
            .collect();
    }

    let step = i64::try_from(config.interval_ms)
        .ok()
        .and_then(chrono::Duration::try_milliseconds)
        .unwrap_or(chrono::Duration::minutes(1));
    let end = now.checked_sub_signed(step).unwrap_or(now);
    sensor.history(end, config.backfill, step)
}

fn record_all(dashboard: &Dashboard, readings: Vec<NewReading>) -> usize {
    readings
        .into_iter()
        .filter_map(|reading| {
            dashboard
                .record(reading)
                .map_err(|e| warn!("Seed reading rejected: {}", e))
                .ok()
        })
        .count()
}
