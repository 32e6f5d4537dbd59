//! Fluctuating sensor data source.
//!
//! Stands in for real field hardware: every [`crate::consts::SIMULATION_PERIOD_MS`]
//! the host asks for a fresh set of readings and feeds them to the surface.
//! Values random-walk from the previous reading; statuses occasionally flip.

#[cfg(test)]
#[path = "simulator_test.rs"]
mod simulator_test;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::sensor::{ConfigurableSensor, FieldStatus, Readings, SensorKind, SensorReading};

/// Chance per tick that a sensor's status is re-rolled.
const STATUS_FLIP_PROBABILITY: f64 = 0.02;
/// Chance per tick that a pump toggles between `Active` and `Idle`.
const PUMP_TOGGLE_PROBABILITY: f64 = 0.1;
/// Maximum temperature drift per tick, °C.
const TEMPERATURE_DRIFT: f64 = 0.25;
/// Maximum moisture drift per tick, percentage points.
const MOISTURE_DRIFT: f64 = 1.0;
const TEMPERATURE_FALLBACK: f64 = 25.0;
const MOISTURE_FALLBACK: f64 = 60.0;

/// Seeded generator of sensor readings.
#[derive(Debug, Clone)]
pub struct Simulator {
    rng: StdRng,
}

impl Simulator {
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    /// Readings for the next tick.
    pub fn next_readings(&mut self, sensors: &[ConfigurableSensor]) -> Readings {
        tick(sensors, &mut self.rng)
    }
}

/// Compute one round of readings for `sensors` from their current values.
pub fn tick<R: Rng + ?Sized>(sensors: &[ConfigurableSensor], rng: &mut R) -> Readings {
    sensors.iter().map(|sensor| (sensor.id.clone(), next_reading(sensor, rng))).collect()
}

fn next_reading<R: Rng + ?Sized>(sensor: &ConfigurableSensor, rng: &mut R) -> SensorReading {
    let status = if rng.random::<f64>() < STATUS_FLIP_PROBABILITY {
        FieldStatus::ALL[rng.random_range(0..FieldStatus::ALL.len())]
    } else {
        sensor.status
    };

    let value = match sensor.kind {
        SensorKind::Temperature => {
            let current = leading_number(&sensor.value).unwrap_or(TEMPERATURE_FALLBACK);
            let next = current + rng.random_range(-TEMPERATURE_DRIFT..=TEMPERATURE_DRIFT);
            format!("{next:.1}°C")
        }
        SensorKind::Moisture => {
            let current = leading_number(&sensor.value).unwrap_or(MOISTURE_FALLBACK);
            let next = (current + rng.random_range(-MOISTURE_DRIFT..=MOISTURE_DRIFT)).clamp(0.0, 100.0);
            format!("{next:.1}%")
        }
        SensorKind::Status if is_pump(sensor) => {
            if rng.random::<f64>() < PUMP_TOGGLE_PROBABILITY {
                toggle_pump(&sensor.value).to_owned()
            } else {
                sensor.value.clone()
            }
        }
        SensorKind::Status => status.label().to_owned(),
    };

    SensorReading { status, value }
}

fn is_pump(sensor: &ConfigurableSensor) -> bool {
    sensor.name.to_lowercase().contains("pump")
}

fn toggle_pump(value: &str) -> &'static str {
    if value == "Active" { "Idle" } else { "Active" }
}

/// Parse the numeric prefix of a display value such as `"28.1°C"`.
fn leading_number(value: &str) -> Option<f64> {
    let trimmed = value.trim_start();
    let end = trimmed
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
        .map_or(trimmed.len(), |(i, _)| i);
    match trimmed[..end].parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}
