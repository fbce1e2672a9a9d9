//! Demo Mode - Simulated sensor station for testing
//!
//! Generates realistic readings for UI testing without a real device.
//! Simulates a station at ~1500 m with a day/night cycle, occasional rain
//! showers and the odd gas leak.

use chrono::{DateTime, Duration, Timelike, Utc};
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

use crate::metrics::air_quality_heuristic;
use crate::reading::{NewReading, Reading, SensorData};
use crate::unit_conversion::{altitude_to_pressure, pressure_to_altitude};

/// Standard sea-level pressure (Pa)
const SEA_LEVEL_PA: f64 = 101325.0;

/// Simulated station altitude (m)
const STATION_ALTITUDE_M: f64 = 1520.0;

/// Gas level that raises an anomaly (ppm)
const ANOMALY_PPM: f64 = 1000.0;

/// Simulated sensor station
pub struct DemoSensor {
    /// Random number generator
    rng: StdRng,
    /// Current weather/gas event
    event: Event,
    /// Slowly drifting humidity (%)
    humidity: f64,
    /// Slowly drifting pressure offset (Pa)
    pressure_drift: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Event {
    /// Normal conditions
    Calm,
    /// Rain until the given time
    Rain { until: DateTime<Utc> },
    /// Gas leak on one sensor, peaking at `peak_ppm`
    GasLeak {
        gas: usize,
        peak_ppm: f64,
        start: DateTime<Utc>,
        until: DateTime<Utc>,
    },
}

impl Default for DemoSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoSensor {
    /// Create a simulator seeded from entropy
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Create a reproducible simulator
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            event: Event::Calm,
            humidity: 55.0,
            pressure_drift: 0.0,
        }
    }

    /// Generate the reading taken at `at`
    pub fn sample(&mut self, at: DateTime<Utc>) -> NewReading {
        self.update_event(at);

        // 0.0 at midnight, 1.0 at noon
        let hour = at.hour() as f64 + at.minute() as f64 / 60.0;
        let daylight = (((hour - 6.0) / 12.0) * std::f64::consts::PI).sin().max(0.0);
        let raining = matches!(self.event, Event::Rain { .. });

        let mut lux = daylight * 20000.0 + self.rng.gen_range(0.0..15.0);
        if raining {
            lux *= 0.3;
        }

        let dht_temperature = 12.0 + 10.0 * daylight + self.rng.gen_range(-0.3..0.3)
            - if raining { 3.0 } else { 0.0 };
        let bmp_temperature = dht_temperature + self.rng.gen_range(-0.2..0.4);

        let humidity_target = if raining { 92.0 } else { 70.0 - 30.0 * daylight };
        self.humidity += (humidity_target - self.humidity) * 0.1 + self.rng.gen_range(-0.5..0.5);
        self.humidity = self.humidity.clamp(5.0, 100.0);

        self.pressure_drift =
            (self.pressure_drift + self.rng.gen_range(-5.0..5.0)).clamp(-400.0, 400.0);
        let pressure = altitude_to_pressure(STATION_ALTITUDE_M, SEA_LEVEL_PA) + self.pressure_drift
            - if raining { 150.0 } else { 0.0 };

        let mut gases = [
            self.rng.gen_range(30.0..50.0),
            self.rng.gen_range(8.0..16.0),
            self.rng.gen_range(4.0..10.0),
            self.rng.gen_range(15.0..25.0),
            self.rng.gen_range(10.0..20.0),
        ];
        if let Event::GasLeak {
            gas,
            peak_ppm,
            start,
            until,
        } = self.event
        {
            let total = (until - start).num_seconds().max(1) as f64;
            let elapsed = (at - start).num_seconds() as f64;
            // Ramp up then decay over the leak
            let shape = (elapsed / total * std::f64::consts::PI).sin().max(0.0);
            gases[gas] += peak_ppm * shape;
        }

        let mut data = SensorData {
            alcohol_ppm: Some(round2(gases[0])),
            hydrogen_ppm: Some(round2(gases[1])),
            carbon_monoxide_ppm: Some(round2(gases[2])),
            propane_ppm: Some(round2(gases[3])),
            methane_ppm: Some(round2(gases[4])),
            lux: Some(round2(lux)),
            bmp_temperature: Some(round2(bmp_temperature)),
            pressure: Some(pressure.round()),
            altitude: Some(pressure_to_altitude(pressure, SEA_LEVEL_PA).round()),
            humidity: Some(round2(self.humidity)),
            dht_temperature: Some(round2(dht_temperature)),
            rain: raining,
            open: false,
            air_quality: None,
            rain_intensity: Some(rain_intensity(raining, self.humidity).to_string()),
            is_day: Some(daylight > 0.05),
            anomaly: None,
            alerts: None,
        };

        let worst = gases.iter().copied().fold(0.0, f64::max);
        let anomaly = worst > ANOMALY_PPM;
        data.air_quality = Some(f64::from(air_quality_heuristic(&data)));
        data.anomaly = Some(anomaly);
        data.alerts = Some(if anomaly {
            format!("Gas concentration high: {:.0} ppm", worst)
        } else {
            String::new()
        });

        NewReading::new(data).at(at)
    }

    /// Generate `count` readings spaced `step` apart and ending at `end`,
    /// oldest first
    ///
    /// Timestamps that fall outside the representable range are skipped.
    pub fn history(&mut self, end: DateTime<Utc>, count: usize, step: Duration) -> Vec<NewReading> {
        (0..count)
            .rev()
            .filter_map(|i| {
                let back = step.checked_mul(i32::try_from(i).ok()?)?;
                end.checked_sub_signed(back)
            })
            .map(|at| self.sample(at))
            .collect()
    }

    fn update_event(&mut self, at: DateTime<Utc>) {
        match self.event {
            Event::Rain { until } | Event::GasLeak { until, .. } if at < until => return,
            _ => {}
        }

        // Roughly one event every couple of hours at one sample per minute
        let roll: f64 = self.rng.gen();
        self.event = if roll < 0.004 {
            Event::Rain {
                until: at + Duration::minutes(self.rng.gen_range(20..90)),
            }
        } else if roll < 0.006 {
            Event::GasLeak {
                gas: self.rng.gen_range(0..5),
                peak_ppm: self.rng.gen_range(200.0..1800.0),
                start: at,
                until: at + Duration::minutes(self.rng.gen_range(5..20)),
            }
        } else {
            Event::Calm
        };
    }
}

fn rain_intensity(raining: bool, humidity: f64) -> &'static str {
    match (raining, humidity) {
        (false, _) => "No rain",
        (true, h) if h > 95.0 => "Heavy rain",
        (true, h) if h > 85.0 => "Moderate rain",
        (true, _) => "Light rain",
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// The fixed readings served by the development mock, newest first
pub fn mock_readings(now: DateTime<Utc>) -> Vec<Reading> {
    let base = SensorData {
        alcohol_ppm: Some(45.2),
        hydrogen_ppm: Some(12.5),
        carbon_monoxide_ppm: Some(8.3),
        propane_ppm: Some(22.1),
        methane_ppm: Some(15.7),
        lux: Some(350.5),
        bmp_temperature: Some(25.3),
        pressure: Some(101325.0),
        altitude: Some(1520.0),
        humidity: Some(65.2),
        dht_temperature: Some(25.1),
        rain: false,
        open: false,
        air_quality: Some(78.0),
        rain_intensity: Some("No rain".to_string()),
        is_day: Some(true),
        anomaly: Some(false),
        alerts: Some(String::new()),
    };

    let older = SensorData {
        alcohol_ppm: Some(42.8),
        hydrogen_ppm: Some(11.9),
        carbon_monoxide_ppm: Some(7.8),
        propane_ppm: Some(21.5),
        methane_ppm: Some(14.9),
        lux: Some(320.1),
        bmp_temperature: Some(25.1),
        pressure: Some(101315.0),
        altitude: Some(1518.0),
        humidity: Some(64.8),
        dht_temperature: Some(24.9),
        open: true,
        air_quality: Some(82.0),
        ..base.clone()
    };

    vec![
        Reading::new("1", now, base),
        Reading::new("2", now - Duration::seconds(60), older),
    ]
}
