//! # airmon-adapter-virtual
//!
//! A simulated monitor that stands in for the network transport.
//!
//! [`SimulatedMonitor`] answers the requests of either dialect from an
//! in-memory property table:
//!
//! | Method | Behaviour |
//! |--------|-----------|
//! | `miIO.info` | Fixed identity of the simulated model |
//! | `get_prop` | Values in request order, `null` for unknown names |
//! | `get_properties` | `code: 0` with the value, `-4003` for unknown dids |
//! | `set_properties` | Stores each value |
//! | `action` | Flips the screen or device power flag |
//!
//! [`SimulatedMonitor::set_offline`] makes every request time out, which
//! drives the entities' availability.
//!
//! ## Dependency rule
//!
//! Depends on `airmon-adapter-miio` (the `Transport` trait) and
//! `airmon-domain` only.

mod readings;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use airmon_adapter_miio::{MiioError, Transport};
use airmon_domain::model::{Dialect, Model};
use serde_json::{Value, json};

/// MIoT code for a property the device does not have.
const CODE_UNKNOWN_PROPERTY: i64 = -4003;
/// JSON-RPC code for an unknown method.
const CODE_UNKNOWN_METHOD: i64 = -32601;

struct State {
    properties: HashMap<String, Value>,
    screen_on: bool,
    device_on: bool,
    offline: bool,
}

/// An in-memory monitor answering miIO requests.
///
/// Clones share the same property table.
#[derive(Clone)]
pub struct SimulatedMonitor {
    model: Model,
    state: Arc<Mutex<State>>,
}

impl SimulatedMonitor {
    #[must_use]
    pub fn new(model: Model) -> Self {
        Self {
            model,
            state: Arc::new(Mutex::new(State {
                properties: readings::initial(model),
                screen_on: true,
                device_on: true,
                offline: false,
            })),
        }
    }

    #[must_use]
    pub fn model(&self) -> Model {
        self.model
    }

    /// Make every following request fail (`true`) or succeed again.
    pub fn set_offline(&self, offline: bool) {
        tracing::info!(model = %self.model, offline, "simulated monitor connectivity changed");
        self.lock().offline = offline;
    }

    /// Overwrite a reading, addressed by its dialect name (`co2` or
    /// `co2-density`).
    pub fn set_reading(&self, name: &str, value: Value) {
        self.lock().properties.insert(name.to_string(), value);
    }

    #[must_use]
    pub fn reading(&self, name: &str) -> Option<Value> {
        self.lock().properties.get(name).cloned()
    }

    /// Power flags `(screen, device)`.
    #[must_use]
    pub fn power(&self) -> (bool, bool) {
        let state = self.lock();
        (state.screen_on, state.device_on)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn answer(&self, method: &str, params: &Value) -> Result<Value, MiioError> {
        let mut state = self.lock();
        if state.offline {
            return Err(MiioError::transport(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "simulated monitor is offline",
            )));
        }

        match (method, self.model.dialect()) {
            ("miIO.info", _) => Ok(readings::identity(self.model)),
            ("get_prop", Dialect::Miio) => Ok(Value::Array(
                names(params)
                    .map(|name| state.properties.get(name).cloned().unwrap_or(Value::Null))
                    .collect(),
            )),
            ("get_properties", Dialect::Miot) => Ok(Value::Array(
                items(params)
                    .map(|item| {
                        let did = item.get("did").and_then(Value::as_str).unwrap_or_default();
                        let mut answer = json!({
                            "did": did,
                            "siid": item.get("siid"),
                            "piid": item.get("piid"),
                        });
                        match state.properties.get(did) {
                            Some(value) => {
                                answer["code"] = json!(0);
                                answer["value"] = value.clone();
                            }
                            None => answer["code"] = json!(CODE_UNKNOWN_PROPERTY),
                        }
                        answer
                    })
                    .collect(),
            )),
            ("set_properties", _) => Ok(Value::Array(
                items(params)
                    .map(|item| {
                        let did = item.get("did").and_then(Value::as_str).unwrap_or_default();
                        let value = item.get("value").cloned().unwrap_or(Value::Null);
                        let code = if state.properties.contains_key(did) {
                            state.properties.insert(did.to_string(), value);
                            0
                        } else {
                            CODE_UNKNOWN_PROPERTY
                        };
                        json!({ "did": did, "code": code })
                    })
                    .collect(),
            )),
            ("action", _) => Ok(self.run_action(&mut state, params)),
            ("set_power", Dialect::Miio) => {
                let on = params.get(0).and_then(Value::as_str) == Some("on");
                state.device_on = on;
                state
                    .properties
                    .insert("power".to_string(), json!(if on { "on" } else { "off" }));
                Ok(json!(["ok"]))
            }
            ("set_time_state" | "set_night_state" | "set_night_time", Dialect::Miio) => {
                state.properties.insert(method.to_string(), params.clone());
                Ok(json!(["ok"]))
            }
            _ => Err(MiioError::Device {
                code: CODE_UNKNOWN_METHOD,
                message: format!("method {method} not found"),
            }),
        }
    }

    /// Power actions: `[0]` switches on, `[1]` switches off.
    fn run_action(&self, state: &mut State, params: &Value) -> Value {
        let aiid = params.get("aiid").and_then(Value::as_u64);
        let on = params
            .get("in")
            .and_then(|input| input.get(0))
            .and_then(Value::as_i64)
            == Some(0);
        let (screen, device) = match self.model.dialect() {
            Dialect::Miio => (2, 6),
            Dialect::Miot => (5, 6),
        };
        match aiid {
            Some(aiid) if aiid == screen => state.screen_on = on,
            Some(aiid) if aiid == device => {
                state.device_on = on;
                if self.model.dialect() == Dialect::Miio {
                    state
                        .properties
                        .insert("power".to_string(), json!(if on { "on" } else { "off" }));
                }
            }
            _ => return json!({ "code": CODE_UNKNOWN_PROPERTY }),
        }
        json!({ "code": 0 })
    }
}

fn items(params: &Value) -> impl Iterator<Item = &Value> {
    params.as_array().into_iter().flatten()
}

fn names(params: &Value) -> impl Iterator<Item = &str> {
    items(params).filter_map(Value::as_str)
}

impl Transport for SimulatedMonitor {
    async fn send(&self, method: &str, params: Value) -> Result<Value, MiioError> {
        tracing::trace!(method, %params, "simulated request");
        self.answer(method, &params)
    }
}

#[cfg(test)]
mod tests {
    use airmon_adapter_miio::{MiioConfig, MonitorIntegration};
    use airmon_app::event_bus::InProcessEventBus;
    use airmon_app::ports::Integration;
    use airmon_app::services::registry::EntityRegistry;
    use airmon_domain::entity::{AttributeValue, EntityState};

    use super::*;

    fn config() -> MiioConfig {
        MiioConfig {
            host: "10.0.0.7".to_string(),
            token: "ffffffffffffffffffffffffffffffff".to_string(),
            name: "Bedroom".to_string(),
            ..MiioConfig::default()
        }
    }

    #[tokio::test]
    async fn should_answer_get_prop_in_request_order() {
        let monitor = SimulatedMonitor::new(Model::AirMonitorS1);

        let answer = monitor
            .send("get_prop", json!(["co2", "pm10", "battery_state"]))
            .await
            .unwrap();

        assert_eq!(answer, json!([612, null, "charging"]));
    }

    #[tokio::test]
    async fn should_flag_unknown_miot_property() {
        let monitor = SimulatedMonitor::new(Model::AirMonitorLite);

        let answer = monitor
            .send(
                "get_properties",
                json!([{"did": "co2-density", "siid": 3, "piid": 8},
                       {"did": "tvoc-density", "siid": 3, "piid": 9}]),
            )
            .await
            .unwrap();

        assert_eq!(answer[0]["value"], json!(612));
        assert_eq!(answer[1]["code"], json!(CODE_UNKNOWN_PROPERTY));
        assert!(answer[1].get("value").is_none());
    }

    #[tokio::test]
    async fn should_store_set_properties_and_reject_unknown() {
        let monitor = SimulatedMonitor::new(Model::AirMonitorLiteDany);

        let answer = monitor
            .send(
                "set_properties",
                json!([{"did": "screen-off", "siid": 9, "piid": 2, "value": 120},
                       {"did": "fan-level", "value": 1}]),
            )
            .await
            .unwrap();

        assert_eq!(answer[0]["code"], json!(0));
        assert_eq!(answer[1]["code"], json!(CODE_UNKNOWN_PROPERTY));
        assert_eq!(monitor.reading("screen-off"), Some(json!(120)));
    }

    #[tokio::test]
    async fn should_switch_screen_off_with_action() {
        let monitor = SimulatedMonitor::new(Model::AirMonitorLite);

        monitor
            .send("action", json!({"did": "screen", "siid": 9, "aiid": 5, "in": [1]}))
            .await
            .unwrap();

        assert_eq!(monitor.power(), (false, true));
    }

    #[tokio::test]
    async fn should_time_out_while_offline() {
        let monitor = SimulatedMonitor::new(Model::AirMonitorLite);
        monitor.set_offline(true);

        let err = monitor.send("miIO.info", json!([])).await.unwrap_err();

        assert!(matches!(err, MiioError::Transport(_)));
    }

    #[tokio::test]
    async fn should_reject_method_of_other_dialect() {
        let monitor = SimulatedMonitor::new(Model::AirMonitorLite);

        let err = monitor.send("get_prop", json!(["co2"])).await.unwrap_err();

        assert!(matches!(err, MiioError::Device { code: CODE_UNKNOWN_METHOD, .. }));
    }

    #[tokio::test]
    async fn should_drive_integration_through_detection_and_polling() {
        let monitor = SimulatedMonitor::new(Model::AirMonitorLiteDany);
        let integration = MonitorIntegration::new(config(), monitor.clone());
        let registry = EntityRegistry::new(InProcessEventBus::default());

        integration.setup(&registry).await.unwrap();

        let device = registry.device().unwrap();
        assert_eq!(device.unique_id, "cgllc.airm.cgd1st-58:b6:23:00:00:01");
        let frequency = registry
            .find_by_entity_id("number.bedroom_monitoring_frequency")
            .unwrap();
        assert_eq!(frequency.get_attribute("value"), Some(&AttributeValue::Int(60)));

        let updated = integration
            .handle_service_call(frequency.id, "set_value", json!({"value": 300}))
            .await
            .unwrap();
        assert_eq!(monitor.reading("monitoring-frequency"), Some(json!(300)));
        assert_eq!(updated.state, EntityState::On);
    }

    #[tokio::test]
    async fn should_mark_entities_unavailable_when_offline() {
        let monitor = SimulatedMonitor::new(Model::AirMonitorS1);
        let integration = MonitorIntegration::new(config(), monitor.clone());
        let registry = EntityRegistry::new(InProcessEventBus::default());
        integration.setup(&registry).await.unwrap();
        let co2 = registry.find_by_entity_id("sensor.bedroom_co2").unwrap();
        assert_eq!(co2.get_attribute("value"), Some(&AttributeValue::Int(612)));

        monitor.set_offline(true);
        let air_quality = registry
            .list_entities()
            .into_iter()
            .find(|e| e.entity_id.starts_with("air_quality."))
            .unwrap();
        let updated = integration
            .handle_service_call(air_quality.id, "update", json!({}))
            .await
            .unwrap();

        assert_eq!(updated.state, EntityState::Unavailable);
    }
}
