use api_contract::{CreateVirtualDeviceRequest, VirtualDeviceDto};
use domain::{AdminState, DeviceKind, OperatingState};
use serde_json::Value;
use std::collections::HashMap;

fn sample_dto() -> VirtualDeviceDto {
    VirtualDeviceDto {
        id: "dev-1".to_string(),
        name: "T1".to_string(),
        description: "".to_string(),
        profile_name: "TemperatureSensorProfile".to_string(),
        service_name: "device-virtual".to_string(),
        kind: DeviceKind::Temperature,
        admin_state: AdminState::Unlocked,
        operating_state: OperatingState::Up,
        protocols: HashMap::new(),
        is_running: false,
        last_reading_at: None,
        created: 1_700_000_000_000,
        modified: 1_700_000_000_000,
    }
}

#[test]
fn virtual_device_dto_is_camel_case() {
    let value = serde_json::to_value(sample_dto()).expect("serialize");
    assert!(value.get("isRunning").is_some());
    assert!(value.get("profileName").is_some());
    assert!(value.get("lastReadingAt").is_some());
    assert!(value.get("is_running").is_none());
}

#[test]
fn virtual_device_dto_states_are_strings() {
    let value = serde_json::to_value(sample_dto()).expect("serialize");
    assert_eq!(value["adminState"], Value::String("UNLOCKED".to_string()));
    assert_eq!(value["operatingState"], Value::String("UP".to_string()));
    assert_eq!(value["kind"], Value::String("temperature".to_string()));
}

#[test]
fn create_request_accepts_minimal_body() {
    let payload = r#"{"name":"T1","protocols":{"type":"temperature"}}"#;
    let req: CreateVirtualDeviceRequest = serde_json::from_str(payload).expect("parse");
    assert_eq!(req.name, "T1");
    assert_eq!(req.protocols.get("type").map(String::as_str), Some("temperature"));
    assert!(req.admin_state.is_none());
}

#[test]
fn create_request_defaults_missing_name_to_empty() {
    let req: CreateVirtualDeviceRequest = serde_json::from_str("{}").expect("parse");
    assert!(req.name.is_empty());
    assert!(req.protocols.is_empty());
}
