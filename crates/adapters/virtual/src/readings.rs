//! Initial property tables of the simulated models.

use std::collections::HashMap;

use airmon_domain::model::{Dialect, Model};
use airmon_domain::status::miot_props as p;
use serde_json::{Value, json};

pub(crate) fn initial(model: Model) -> HashMap<String, Value> {
    let mut table: Vec<(&str, Value)> = match model.dialect() {
        Dialect::Miio => vec![
            ("power", json!("on")),
            ("temperature", json!(21.5)),
            ("humidity", json!(45.0)),
            ("co2", json!(612)),
            ("tvoc", json!(140)),
            ("pm25", json!(8)),
            ("battery", json!(100)),
            ("battery_state", json!("charging")),
        ],
        Dialect::Miot => vec![
            (p::RELATIVE_HUMIDITY, json!(45.0)),
            (p::PM25_DENSITY, json!(8)),
            (p::PM10_DENSITY, json!(11)),
            (p::TEMPERATURE, json!(21.5)),
            (p::CO2_DENSITY, json!(612)),
            (p::BATTERY_LEVEL, json!(100)),
            (p::CHARGING_STATE, json!(1)),
            (p::VOLTAGE, json!(4150)),
        ],
    };
    if model == Model::AirMonitorLiteDany {
        table.extend([
            (p::MONITORING_FREQUENCY, json!(60)),
            (p::SCREEN_OFF, json!(300)),
            (p::DEVICE_OFF, json!(0)),
            (p::SCREENSAVER_TIME, json!(60)),
            (p::AUTO_SLIDEING_TIME, json!(30)),
            (p::SCREENSAVER_TYPE, json!(1)),
            (p::DEVICE_OFF_NEW, json!(0)),
            (p::IS_TWELVE_HOURS_SYS, json!(0)),
            (p::PM_TPF_STANDARD, json!(0)),
        ]);
    }
    table
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

/// Fixed identity answered to `miIO.info`.
pub(crate) fn identity(model: Model) -> Value {
    json!({
        "model": model.identifier(),
        "fw_ver": "4.1.8_9999",
        "hw_ver": "esp32",
        "mac": "58:b6:23:00:00:01",
    })
}
