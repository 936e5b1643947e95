//! End-to-end smoke tests for the full airmond stack.
//!
//! Each test wires the simulated monitor, the real integration, registry
//! and axum router, and exercises the HTTP layer via
//! `tower::ServiceExt::oneshot`. No TCP port is bound.

use std::sync::Arc;

use airmon_adapter_http_axum::router;
use airmon_adapter_http_axum::state::AppState;
use airmon_adapter_miio::{MiioConfig, MonitorIntegration};
use airmon_adapter_virtual::SimulatedMonitor;
use airmon_app::event_bus::InProcessEventBus;
use airmon_app::ports::Integration;
use airmon_app::services::registry::EntityRegistry;
use airmon_domain::event::EventType;
use airmon_domain::model::Model;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

struct Stack {
    app: axum::Router,
    monitor: SimulatedMonitor,
    event_bus: InProcessEventBus,
}

/// Build a fully-wired router around a simulated monitor of `model`.
async fn stack(model: Model) -> Stack {
    let monitor = SimulatedMonitor::new(model);
    let event_bus = InProcessEventBus::default();
    let registry = EntityRegistry::new(event_bus.clone());
    let config = MiioConfig {
        host: "192.168.1.20".to_string(),
        token: "0123456789abcdef0123456789abcdef".to_string(),
        name: "Office".to_string(),
        ..MiioConfig::default()
    };
    let integration = Arc::new(MonitorIntegration::new(config, monitor.clone()));
    integration
        .setup(&registry)
        .await
        .expect("simulated monitor should set up");

    let state = AppState::new(registry, integration, event_bus.clone());
    Stack {
        app: router::build(state),
        monitor,
        event_bus,
    }
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let body = body.map_or_else(Body::empty, |json| Body::from(json.to_string()));
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn entity(app: &axum::Router, entity_id: &str) -> Value {
    let (_, entities) = send(app, "GET", "/api/entities", None).await;
    entities
        .as_array()
        .and_then(|all| all.iter().find(|e| e["entity_id"] == entity_id))
        .cloned()
        .unwrap_or_else(|| panic!("{entity_id} should be registered"))
}

// ---------------------------------------------------------------------------
// Health and discovery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let stack = stack(Model::AirMonitorLite).await;

    let resp = stack
        .app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn should_expose_detected_device() {
    let stack = stack(Model::AirMonitorS1).await;

    let (status, device) = send(&stack.app, "GET", "/api/device", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(device["model"], "cgllc.airmonitor.s1");
    assert_eq!(device["manufacturer"], "Cgllc");
    assert_eq!(device["unique_id"], "cgllc.airmonitor.s1-58:b6:23:00:00:01");
}

#[tokio::test]
async fn should_expose_feature_gated_entity_sets() {
    let s1 = stack(Model::AirMonitorS1).await;
    let dany = stack(Model::AirMonitorLiteDany).await;

    let (_, s1_entities) = send(&s1.app, "GET", "/api/entities", None).await;
    let (_, dany_entities) = send(&dany.app, "GET", "/api/entities", None).await;

    // air quality + 7 sensors
    assert_eq!(s1_entities.as_array().map(Vec::len), Some(8));
    // air quality + 8 sensors + 9 numbers + 2 switches
    assert_eq!(dany_entities.as_array().map(Vec::len), Some(20));
}

#[tokio::test]
async fn should_report_readings_as_sensor_values() {
    let stack = stack(Model::AirMonitorLite).await;

    let co2 = entity(&stack.app, "sensor.office_co2").await;

    assert_eq!(co2["state"], "on");
    assert_eq!(co2["attributes"]["value"], 612);
    assert_eq!(co2["attributes"]["unit_of_measurement"], "ppm");
}

// ---------------------------------------------------------------------------
// Service calls
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_turn_screen_off_and_publish_state_change() {
    let stack = stack(Model::AirMonitorLite).await;
    let mut events = stack.event_bus.subscribe();
    let screen = entity(&stack.app, "switch.office_screen").await;
    let id = screen["id"].as_str().unwrap();

    let (status, body) = send(
        &stack.app,
        "POST",
        &format!("/api/entities/{id}/services/turn_off"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "off");
    assert_eq!(stack.monitor.power(), (false, true));
    let event = events.recv().await.unwrap();
    assert_eq!(event.event_type, EventType::StateChanged);
}

#[tokio::test]
async fn should_write_number_and_reject_out_of_range_value() {
    let stack = stack(Model::AirMonitorLiteDany).await;
    let screen_off = entity(&stack.app, "number.office_screen_off").await;
    let uri = format!(
        "/api/entities/{}/services/set_value",
        screen_off["id"].as_str().unwrap()
    );

    let (ok, _) = send(&stack.app, "POST", &uri, Some(json!({"value": 120}))).await;
    let (too_big, error) = send(&stack.app, "POST", &uri, Some(json!({"value": 900}))).await;
    let (missing, _) = send(&stack.app, "POST", &uri, None).await;

    assert_eq!(ok, StatusCode::OK);
    assert_eq!(stack.monitor.reading("screen-off"), Some(json!(120)));
    assert_eq!(too_big, StatusCode::BAD_REQUEST);
    assert!(error["error"].as_str().is_some());
    assert_eq!(missing, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_mark_entity_unavailable_when_monitor_goes_offline() {
    let stack = stack(Model::AirMonitorLite).await;
    let co2 = entity(&stack.app, "sensor.office_co2").await;
    let air_quality =
        entity(&stack.app, "air_quality.office_cgllc_airm_cgdn1_58_b6_23_00_00_01").await;
    stack.monitor.set_offline(true);

    let (_, refreshed) = send(
        &stack.app,
        "POST",
        &format!("/api/entities/{}/services/update", air_quality["id"].as_str().unwrap()),
        None,
    )
    .await;

    assert_eq!(refreshed["state"], "unavailable");
    // the sibling sensor still serves the cached snapshot
    let (_, sensor) = send(
        &stack.app,
        "POST",
        &format!("/api/entities/{}/services/update", co2["id"].as_str().unwrap()),
        None,
    )
    .await;
    assert_eq!(sensor["state"], "on");
}

#[tokio::test]
async fn should_return_not_found_for_unknown_entity() {
    let stack = stack(Model::AirMonitorLite).await;

    let (status, _) = send(
        &stack.app,
        "POST",
        "/api/entities/00000000-0000-0000-0000-000000000000/services/update",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// S1 firmware commands
// ---------------------------------------------------------------------------

const S1_AIR_QUALITY: &str = "air_quality.office_cgllc_airmonitor_s1_58_b6_23_00_00_01";

async fn air_quality_service(stack: &Stack, entity_id: &str, service: &str) -> String {
    let air_quality = entity(&stack.app, entity_id).await;
    format!(
        "/api/entities/{}/services/{service}",
        air_quality["id"].as_str().unwrap()
    )
}

#[tokio::test]
async fn should_switch_s1_off_through_air_quality_entity() {
    let stack = stack(Model::AirMonitorS1).await;
    let uri = air_quality_service(&stack, S1_AIR_QUALITY, "set_power").await;

    let (status, body) = send(&stack.app, "POST", &uri, Some(json!({"on": false}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entity_id"], S1_AIR_QUALITY);
    assert_eq!(stack.monitor.power(), (true, false));
    assert_eq!(stack.monitor.reading("power"), Some(json!("off")));
}

#[tokio::test]
async fn should_program_s1_night_time_window() {
    let stack = stack(Model::AirMonitorS1).await;
    let uri = air_quality_service(&stack, S1_AIR_QUALITY, "set_night_time").await;

    let (ok, _) = send(
        &stack.app,
        "POST",
        &uri,
        Some(json!({"begin": "22:00", "end": "07:30"})),
    )
    .await;
    let (invalid, _) = send(
        &stack.app,
        "POST",
        &uri,
        Some(json!({"begin": "25:00", "end": "07:30"})),
    )
    .await;

    assert_eq!(ok, StatusCode::OK);
    assert_eq!(
        stack.monitor.reading("set_night_time"),
        Some(json!([79_200, 27_000]))
    );
    assert_eq!(invalid, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_reject_firmware_command_on_lite() {
    let stack = stack(Model::AirMonitorLite).await;
    let uri = air_quality_service(
        &stack,
        "air_quality.office_cgllc_airm_cgdn1_58_b6_23_00_00_01",
        "set_power",
    )
    .await;

    let (status, _) = send(&stack.app, "POST", &uri, Some(json!({"on": false}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(stack.monitor.power(), (true, true));
}
