//! Client for `get_prop` firmware (QingPing S1).

use airmon_domain::error::ValidationError;
use airmon_domain::model::{Feature, Model};
use airmon_domain::status::MiioStatus;
use serde_json::{Map, Value, json};

use crate::error::MiioError;
use crate::transport::Transport;

/// Service id of the S1 power actions.
const ACTION_SIID: u32 = 9;
const SCREEN_AIID: u32 = 2;
const DEVICE_AIID: u32 = 6;

/// Seconds in a day; night-time bounds must stay below it.
const SECONDS_PER_DAY: u32 = 86_400;

pub struct MiioClient<T> {
    transport: T,
    model: Model,
}

impl<T: Transport> MiioClient<T> {
    pub fn new(transport: T, model: Model) -> Self {
        Self { transport, model }
    }

    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    /// Read every feature of the model in one `get_prop` request.
    ///
    /// `battery` is only requested separately, and only when the monitor
    /// does not report `charging`. Properties the model does not report (`pm10` on the
    /// S1) read as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`MiioError`] when a request fails or the answer is neither
    /// an object nor a list.
    pub async fn status(&self) -> Result<MiioStatus, MiioError> {
        let mut properties: Vec<&str> = self.model.features().iter().map(|f| f.key()).collect();
        let battery_deferred = self.model.supports(Feature::BatteryState)
            && self.model.supports(Feature::Battery);
        if battery_deferred {
            properties.retain(|p| *p != Feature::Battery.key());
        }

        let mut values = self.get_prop(&properties).await?;
        if values.len() != properties.len() {
            tracing::error!(
                requested = properties.len(),
                received = values.len(),
                "count of requested properties does not match the count of received values"
            );
        }

        let charging = values.get(Feature::BatteryState.key()).and_then(Value::as_str);
        if battery_deferred && charging != Some("charging") {
            let battery = self.get_prop(&[Feature::Battery.key()]).await?;
            if let Some(level) = battery
                .get(Feature::Battery.key())
                .filter(|v| !v.is_null() && v.as_i64() != Some(0))
            {
                values.insert(Feature::Battery.key().to_string(), level.clone());
            }
        }

        Ok(MiioStatus::from_properties(&values))
    }

    /// `get_prop` answers either with an object keyed by property name or
    /// with a list in request order.
    async fn get_prop(&self, properties: &[&str]) -> Result<Map<String, Value>, MiioError> {
        match self.transport.send("get_prop", json!(properties)).await? {
            Value::Object(map) => Ok(map),
            Value::Array(items) => Ok(properties
                .iter()
                .map(|p| (*p).to_string())
                .zip(items)
                .collect()),
            other => Err(MiioError::UnexpectedResponse {
                method: "get_prop",
                reason: format!("expected object or list, got {other}"),
            }),
        }
    }

    /// `screen` and `device` map to actions (param `0` switches on, `1`
    /// off); any other key is written as a boolean property.
    ///
    /// # Errors
    ///
    /// Returns [`MiioError`] when the request fails.
    pub async fn set_switch(&self, key: &str, on: bool) -> Result<Value, MiioError> {
        let param = if on { 0 } else { 1 };
        match key {
            "screen" => self.call_action_by(ACTION_SIID, SCREEN_AIID, json!([param])).await,
            "device" => self.call_action_by(ACTION_SIID, DEVICE_AIID, json!([param])).await,
            _ => self.set_property(key, Value::Bool(on)).await,
        }
    }

    /// # Errors
    ///
    /// Returns [`MiioError`] when the request fails.
    pub async fn set_property(&self, key: &str, value: Value) -> Result<Value, MiioError> {
        self.transport
            .send(
                "set_properties",
                json!([{ "did": key, "property": key, "value": value }]),
            )
            .await
    }

    /// # Errors
    ///
    /// Returns [`MiioError`] when the request fails.
    pub async fn call_action_by(&self, siid: u32, aiid: u32, params: Value) -> Result<Value, MiioError> {
        self.transport
            .send(
                "action",
                json!({
                    "did": format!("call-{siid}-{aiid}"),
                    "siid": siid,
                    "aiid": aiid,
                    "in": params,
                }),
            )
            .await
    }

    /// # Errors
    ///
    /// Returns [`MiioError`] when the request fails.
    pub async fn set_power(&self, on: bool) -> Result<Value, MiioError> {
        self.transport.send("set_power", json!([on_off(on)])).await
    }

    /// Show a clock instead of the air quality index.
    ///
    /// # Errors
    ///
    /// Returns [`MiioError`] when the request fails.
    pub async fn set_display_clock(&self, on: bool) -> Result<Value, MiioError> {
        self.transport.send("set_time_state", json!([on_off(on)])).await
    }

    /// Dim the display.
    ///
    /// # Errors
    ///
    /// Returns [`MiioError`] when the request fails.
    pub async fn set_night_mode(&self, on: bool) -> Result<Value, MiioError> {
        self.transport.send("set_night_state", json!([on_off(on)])).await
    }

    /// Enable night mode daily between `begin` and `end`, both
    /// `(hour, minute)`.
    ///
    /// # Errors
    ///
    /// Returns [`MiioError::Domain`] when a bound is not a time of day, or
    /// [`MiioError`] when the request fails.
    pub async fn set_night_time(&self, begin: (u32, u32), end: (u32, u32)) -> Result<Value, MiioError> {
        let begin = seconds_of_day(begin)?;
        let end = seconds_of_day(end)?;
        self.transport.send("set_night_time", json!([begin, end])).await
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

fn seconds_of_day((hour, minute): (u32, u32)) -> Result<u32, MiioError> {
    if hour < 24 && minute < 60 {
        return Ok(hour * 3600 + minute * 60);
    }
    Err(MiioError::Domain(
        ValidationError::OutOfRange {
            value: f64::from(hour) * 3600.0 + f64::from(minute) * 60.0,
            min: 0.0,
            max: f64::from(SECONDS_PER_DAY - 1),
        }
        .into(),
    ))
}
