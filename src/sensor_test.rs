use super::*;

fn reading(status: FieldStatus, value: &str) -> SensorReading {
    SensorReading { status, value: value.to_owned() }
}

// =============================================================
// FieldStatus / SensorKind
// =============================================================

#[test]
fn field_status_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&FieldStatus::Danger).unwrap(), "\"danger\"");
    let s: FieldStatus = serde_json::from_str("\"alert\"").unwrap();
    assert_eq!(s, FieldStatus::Alert);
}

#[test]
fn field_status_labels_are_capitalized() {
    let labels: Vec<&str> = FieldStatus::ALL.iter().map(|s| s.label()).collect();
    assert_eq!(labels, ["Ok", "Alert", "Danger"]);
}

#[test]
fn sensor_kind_initial_values() {
    assert_eq!(SensorKind::Temperature.initial_value(), "25.0°C");
    assert_eq!(SensorKind::Moisture.initial_value(), "60.0%");
    assert_eq!(SensorKind::Status.initial_value(), "Ok");
}

#[test]
fn sensor_kind_parse() {
    assert_eq!(SensorKind::parse("moisture"), Some(SensorKind::Moisture));
    assert_eq!(SensorKind::parse("status"), Some(SensorKind::Status));
    assert_eq!(SensorKind::parse("Temperature"), None);
}

#[test]
fn sensor_deserializes_type_field() {
    let raw = r#"{"id":"s1","name":"Pump","type":"status","status":"ok","value":"Active"}"#;
    let s: ConfigurableSensor = serde_json::from_str(raw).unwrap();
    assert_eq!(s.kind, SensorKind::Status);
    assert_eq!(s.value, "Active");
}

#[test]
fn sensor_missing_live_fields_default() {
    let raw = r#"{"id":"s1","name":"Soil","type":"moisture"}"#;
    let s: ConfigurableSensor = serde_json::from_str(raw).unwrap();
    assert_eq!(s.status, FieldStatus::Ok);
    assert!(s.value.is_empty());
}

// =============================================================
// SensorRegistry
// =============================================================

#[test]
fn registry_defaults_has_four_sensors() {
    let reg = SensorRegistry::with_defaults();
    assert_eq!(reg.len(), 4);
    assert!(reg.contains("sensor_1720000000004"));
    assert_eq!(reg.get("sensor_1720000000003").unwrap().status, FieldStatus::Alert);
}

#[test]
fn registry_add_generates_prefixed_unique_ids() {
    let mut reg = SensorRegistry::new();
    let a = reg.add("Tank", SensorKind::Status).unwrap();
    let b = reg.add("Tank", SensorKind::Status).unwrap();
    assert!(a.starts_with("sensor_"));
    assert_ne!(a, b);
    assert_eq!(reg.len(), 2);
}

#[test]
fn registry_add_trims_and_seeds_value() {
    let mut reg = SensorRegistry::new();
    let id = reg.add("  Barn Temp  ", SensorKind::Temperature).unwrap();
    let s = reg.get(&id).unwrap();
    assert_eq!(s.name, "Barn Temp");
    assert_eq!(s.value, "25.0°C");
    assert_eq!(s.status, FieldStatus::Ok);
}

#[test]
fn registry_add_rejects_blank_name() {
    let mut reg = SensorRegistry::new();
    assert_eq!(reg.add("   ", SensorKind::Status), Err(SensorError::EmptyName));
    assert!(reg.is_empty());
}

#[test]
fn registry_rename() {
    let mut reg = SensorRegistry::with_defaults();
    reg.rename("sensor_1720000000001", " Hothouse ").unwrap();
    assert_eq!(reg.get("sensor_1720000000001").unwrap().name, "Hothouse");
}

#[test]
fn registry_rename_errors() {
    let mut reg = SensorRegistry::with_defaults();
    assert_eq!(reg.rename("sensor_1720000000001", ""), Err(SensorError::EmptyName));
    assert_eq!(reg.rename("nope", "x"), Err(SensorError::NotFound("nope".into())));
}

#[test]
fn registry_remove() {
    let mut reg = SensorRegistry::with_defaults();
    let removed = reg.remove("sensor_1720000000002").unwrap();
    assert_eq!(removed.name, "North Field Pump");
    assert!(!reg.contains("sensor_1720000000002"));
    assert!(reg.remove("sensor_1720000000002").is_none());
}

#[test]
fn registry_apply_readings_updates_known_only() {
    let mut reg = SensorRegistry::with_defaults();
    let mut readings = Readings::new();
    readings.insert("sensor_1720000000001".into(), reading(FieldStatus::Danger, "41.0°C"));
    readings.insert("ghost".into(), reading(FieldStatus::Alert, "?"));
    reg.apply_readings(&readings);

    let s = reg.get("sensor_1720000000001").unwrap();
    assert_eq!(s.status, FieldStatus::Danger);
    assert_eq!(s.value, "41.0°C");
    assert_eq!(reg.len(), 4);
    assert_eq!(reg.get("sensor_1720000000002").unwrap().value, "Active");
}

#[test]
fn sensor_error_display() {
    assert_eq!(SensorError::NotFound("x".into()).to_string(), "sensor not found: x");
}
