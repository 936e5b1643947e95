//! Client for MIoT firmware (Lite and its ESP32 variant).
//!
//! Properties are addressed by `(siid, piid)` and actions by `(siid, aiid)`.
//! Each model carries a static table translating names into those ids.

use airmon_domain::model::{Feature, Model};
use airmon_domain::status::{MiotStatus, miot_props as p, miot_property};
use serde_json::{Map, Value, json};

use crate::error::MiioError;
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MiotProperty {
    pub did: &'static str,
    pub siid: u32,
    pub piid: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MiotAction {
    pub name: &'static str,
    pub siid: u32,
    pub aiid: u32,
}

/// Property and action ids of one model.
#[derive(Debug)]
pub struct MiotMapping {
    pub properties: &'static [MiotProperty],
    pub actions: &'static [MiotAction],
}

const fn prop(did: &'static str, siid: u32, piid: u32) -> MiotProperty {
    MiotProperty { did, siid, piid }
}

const POWER_ACTIONS: &[MiotAction] = &[
    MiotAction { name: "screen", siid: 9, aiid: 5 },
    MiotAction { name: "device", siid: 9, aiid: 6 },
];

static LITE: MiotMapping = MiotMapping {
    properties: &[
        prop(p::RELATIVE_HUMIDITY, 3, 1),
        prop(p::PM25_DENSITY, 3, 4),
        prop(p::PM10_DENSITY, 3, 5),
        prop(p::TEMPERATURE, 3, 7),
        prop(p::CO2_DENSITY, 3, 8),
        prop(p::BATTERY_LEVEL, 4, 1),
        prop(p::CHARGING_STATE, 4, 2),
        prop(p::VOLTAGE, 4, 3),
    ],
    actions: POWER_ACTIONS,
};

static LITE_DANY: MiotMapping = MiotMapping {
    properties: &[
        prop(p::RELATIVE_HUMIDITY, 3, 1),
        prop(p::PM25_DENSITY, 3, 4),
        prop(p::PM10_DENSITY, 3, 5),
        prop(p::TEMPERATURE, 3, 7),
        prop(p::CO2_DENSITY, 3, 8),
        prop(p::BATTERY_LEVEL, 4, 1),
        prop(p::CHARGING_STATE, 4, 2),
        prop(p::VOLTAGE, 4, 3),
        // settings service: ids follow feature order, unverified on hardware
        prop(p::MONITORING_FREQUENCY, 9, 1),
        prop(p::SCREEN_OFF, 9, 2),
        prop(p::DEVICE_OFF, 9, 3),
        prop(p::SCREENSAVER_TIME, 9, 4),
        prop(p::AUTO_SLIDEING_TIME, 9, 5),
        prop(p::SCREENSAVER_TYPE, 9, 6),
        prop(p::DEVICE_OFF_NEW, 9, 7),
        prop(p::IS_TWELVE_HOURS_SYS, 9, 8),
        prop(p::PM_TPF_STANDARD, 9, 9),
    ],
    actions: POWER_ACTIONS,
};

/// Mapping of a MIoT model; `None` for `get_prop` models.
#[must_use]
pub fn mapping_for(model: Model) -> Option<&'static MiotMapping> {
    match model {
        Model::AirMonitorLite => Some(&LITE),
        Model::AirMonitorLiteDany => Some(&LITE_DANY),
        Model::AirMonitorS1 => None,
    }
}

impl MiotMapping {
    /// Property by MIoT name, or by feature key for writable settings.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&MiotProperty> {
        let did = key
            .parse::<Feature>()
            .ok()
            .map_or(key, |feature| miot_property(feature));
        self.properties.iter().find(|prop| prop.did == did)
    }

    #[must_use]
    pub fn action(&self, name: &str) -> Option<&MiotAction> {
        self.actions.iter().find(|action| action.name == name)
    }
}

pub struct MiotClient<T> {
    transport: T,
    mapping: &'static MiotMapping,
}

impl<T: Transport> MiotClient<T> {
    pub fn new(transport: T, mapping: &'static MiotMapping) -> Self {
        Self { transport, mapping }
    }

    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    /// Read every mapped property. A property answered with a non-zero
    /// `code` reads as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`MiioError`] when the request fails or the answer is not a
    /// list.
    pub async fn status(&self) -> Result<MiotStatus, MiioError> {
        let params: Vec<Value> = self
            .mapping
            .properties
            .iter()
            .map(|prop| json!({ "did": prop.did, "siid": prop.siid, "piid": prop.piid }))
            .collect();

        let Value::Array(results) = self.transport.send("get_properties", Value::Array(params)).await?
        else {
            return Err(MiioError::UnexpectedResponse {
                method: "get_properties",
                reason: "expected a list of property results".to_string(),
            });
        };

        let values: Map<String, Value> = results
            .into_iter()
            .filter_map(|mut result| {
                let did = result.get("did")?.as_str()?.to_string();
                if result.get("code").and_then(Value::as_i64) != Some(0) {
                    tracing::debug!(did = %did, "property read failed on device");
                    return None;
                }
                let value = result.get_mut("value").map(Value::take)?;
                Some((did, value))
            })
            .collect();

        Ok(MiotStatus::from_properties(&values))
    }

    /// Power switches call their action (param `0` on, `1` off); other
    /// keys write a boolean property.
    ///
    /// # Errors
    ///
    /// Returns [`MiioError::UnknownProperty`] when `key` is not mapped.
    pub async fn set_switch(&self, key: &str, on: bool) -> Result<Value, MiioError> {
        if self.mapping.action(key).is_some() {
            return self.call_action(key, json!([if on { 0 } else { 1 }])).await;
        }
        self.set_property(key, Value::Bool(on)).await
    }

    /// # Errors
    ///
    /// Returns [`MiioError::UnknownProperty`] when `key` is not mapped.
    pub async fn set_property(&self, key: &str, value: Value) -> Result<Value, MiioError> {
        let prop = self
            .mapping
            .property(key)
            .ok_or_else(|| MiioError::UnknownProperty(key.to_string()))?;
        self.transport
            .send(
                "set_properties",
                json!([{ "did": prop.did, "siid": prop.siid, "piid": prop.piid, "value": value }]),
            )
            .await
    }

    /// # Errors
    ///
    /// Returns [`MiioError::UnknownProperty`] when `name` is not mapped.
    pub async fn call_action(&self, name: &str, params: Value) -> Result<Value, MiioError> {
        let action = self
            .mapping
            .action(name)
            .ok_or_else(|| MiioError::UnknownProperty(name.to_string()))?;
        self.transport
            .send(
                "action",
                json!({ "did": action.name, "siid": action.siid, "aiid": action.aiid, "in": params }),
            )
            .await
    }
}
