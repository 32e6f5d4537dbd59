//! Configurable sensors and their live readings.
//!
//! The registry is the authority on which sensor ids exist. Placements refer to
//! sensors by id only; a placement whose id is missing here is an orphan and is
//! skipped at render time (see [`crate::render`]).

#[cfg(test)]
#[path = "sensor_test.rs"]
mod sensor_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a configurable sensor, e.g. `"sensor_1720000000001"`.
pub type SensorId = String;

/// Health of a sensor reading; drives indicator color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldStatus {
    #[default]
    Ok,
    Alert,
    Danger,
}

impl FieldStatus {
    pub const ALL: [FieldStatus; 3] = [FieldStatus::Ok, FieldStatus::Alert, FieldStatus::Danger];

    /// Capitalized label, e.g. `"Alert"`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Ok => "Ok",
            Self::Alert => "Alert",
            Self::Danger => "Danger",
        }
    }

    /// CSS class suffix used by the indicator renderer.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Ok => "status-ok",
            Self::Alert => "status-alert",
            Self::Danger => "status-danger",
        }
    }
}

/// What a sensor measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    #[default]
    Status,
    Temperature,
    Moisture,
}

impl SensorKind {
    /// Parse the stored `type` name (`"status"`, `"temperature"`, `"moisture"`).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "status" => Some(Self::Status),
            "temperature" => Some(Self::Temperature),
            "moisture" => Some(Self::Moisture),
            _ => None,
        }
    }

    /// Display value given to a newly created sensor of this kind.
    #[must_use]
    pub fn initial_value(self) -> &'static str {
        match self {
            Self::Temperature => "25.0°C",
            Self::Moisture => "60.0%",
            Self::Status => "Ok",
        }
    }
}

/// A user-defined sensor with its latest live reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurableSensor {
    pub id: SensorId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SensorKind,
    #[serde(default)]
    pub status: FieldStatus,
    #[serde(default)]
    pub value: String,
}

/// One live update from the sensor data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub status: FieldStatus,
    pub value: String,
}

/// Latest readings keyed by sensor id.
pub type Readings = HashMap<SensorId, SensorReading>;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SensorError {
    #[error("sensor name must not be empty")]
    EmptyName,
    #[error("sensor not found: {0}")]
    NotFound(SensorId),
}

/// Ordered collection of configurable sensors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorRegistry {
    sensors: Vec<ConfigurableSensor>,
}

impl SensorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_sensors(sensors: Vec<ConfigurableSensor>) -> Self {
        Self { sensors }
    }

    /// The sensors a first-time dashboard starts with.
    #[must_use]
    pub fn with_defaults() -> Self {
        let seed = |id: &str, name: &str, kind: SensorKind, status: FieldStatus, value: &str| ConfigurableSensor {
            id: id.to_owned(),
            name: name.to_owned(),
            kind,
            status,
            value: value.to_owned(),
        };
        Self::from_sensors(vec![
            seed("sensor_1720000000001", "Greenhouse Temp", SensorKind::Temperature, FieldStatus::Ok, "28.1°C"),
            seed("sensor_1720000000002", "North Field Pump", SensorKind::Status, FieldStatus::Ok, "Active"),
            seed("sensor_1720000000003", "South Field Soil", SensorKind::Moisture, FieldStatus::Alert, "38.5%"),
            seed("sensor_1720000000004", "Main Well Level", SensorKind::Status, FieldStatus::Danger, "Low"),
        ])
    }

    /// Create a sensor with a fresh id. Returns the new id.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::EmptyName`] if `name` is blank after trimming.
    pub fn add(&mut self, name: &str, kind: SensorKind) -> Result<SensorId, SensorError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SensorError::EmptyName);
        }
        let id = format!("sensor_{}", Uuid::new_v4().simple());
        self.sensors.push(ConfigurableSensor {
            id: id.clone(),
            name: name.to_owned(),
            kind,
            status: FieldStatus::Ok,
            value: kind.initial_value().to_owned(),
        });
        Ok(id)
    }

    /// Rename a sensor.
    ///
    /// # Errors
    ///
    /// Returns [`SensorError::EmptyName`] for a blank name and
    /// [`SensorError::NotFound`] for an unknown id.
    pub fn rename(&mut self, id: &str, name: &str) -> Result<(), SensorError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SensorError::EmptyName);
        }
        let sensor = self.get_mut(id).ok_or_else(|| SensorError::NotFound(id.to_owned()))?;
        sensor.name = name.to_owned();
        Ok(())
    }

    /// Remove a sensor by id, returning it if it was present.
    pub fn remove(&mut self, id: &str) -> Option<ConfigurableSensor> {
        let idx = self.sensors.iter().position(|s| s.id == id)?;
        Some(self.sensors.remove(idx))
    }

    /// Overwrite status/value of every sensor that has a reading. Unknown ids are ignored.
    pub fn apply_readings(&mut self, readings: &Readings) {
        for sensor in &mut self.sensors {
            if let Some(reading) = readings.get(&sensor.id) {
                sensor.status = reading.status;
                sensor.value.clone_from(&reading.value);
            }
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ConfigurableSensor> {
        self.sensors.iter().find(|s| s.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut ConfigurableSensor> {
        self.sensors.iter_mut().find(|s| s.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigurableSensor> {
        self.sensors.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ConfigurableSensor] {
        &self.sensors
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }
}
