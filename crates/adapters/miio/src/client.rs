//! Dialect dispatch behind the [`DeviceClient`] port.

use airmon_app::ports::{DeviceClient, DeviceInfo};
use airmon_domain::error::{AirmonError, ValidationError};
use airmon_domain::model::{Dialect, Model};
use airmon_domain::status::Status;
use serde_json::{Value, json};

use crate::error::MiioError;
use crate::miio::MiioClient;
use crate::miot::{MiotClient, mapping_for};
use crate::transport::Transport;

/// A monitor client for either dialect.
pub enum MonitorClient<T> {
    Miio(MiioClient<T>),
    Miot(MiotClient<T>),
}

/// Build the client matching the model's dialect.
///
/// # Errors
///
/// Returns [`ValidationError::UnsupportedModel`] when a MIoT model has no
/// property mapping.
pub fn connect<T: Transport>(model: Model, transport: T) -> Result<MonitorClient<T>, AirmonError> {
    match model.dialect() {
        Dialect::Miio => Ok(MonitorClient::Miio(MiioClient::new(transport, model))),
        Dialect::Miot => mapping_for(model)
            .map(|mapping| MonitorClient::Miot(MiotClient::new(transport, mapping)))
            .ok_or_else(|| ValidationError::UnsupportedModel(model.to_string()).into()),
    }
}

/// Read the identity block with `miIO.info`.
///
/// # Errors
///
/// Returns [`MiioError`] when the request fails or the answer is not an
/// object.
pub async fn fetch_info<T: Transport>(transport: &T) -> Result<DeviceInfo, MiioError> {
    let answer = transport.send("miIO.info", json!([])).await?;
    parse_info(&answer)
}

fn parse_info(answer: &Value) -> Result<DeviceInfo, MiioError> {
    let Value::Object(fields) = answer else {
        return Err(MiioError::UnexpectedResponse {
            method: "miIO.info",
            reason: "expected an object".to_string(),
        });
    };
    let text = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_string);
    Ok(DeviceInfo {
        model: text("model"),
        firmware_version: text("fw_ver"),
        hardware_version: text("hw_ver"),
        mac_address: text("mac"),
    })
}

/// Whole numbers go out as JSON integers; firmware rejects `300.0` for an
/// integer property.
fn json_number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        #[allow(clippy::cast_possible_truncation)]
        let whole = value as i64;
        Value::from(whole)
    } else {
        Value::from(value)
    }
}

impl<T: Transport> MonitorClient<T> {
    fn transport(&self) -> &T {
        match self {
            Self::Miio(client) => client.transport(),
            Self::Miot(client) => client.transport(),
        }
    }

    async fn set_switch(&self, key: &str, on: bool) -> Result<Value, MiioError> {
        match self {
            Self::Miio(client) => client.set_switch(key, on).await,
            Self::Miot(client) => client.set_switch(key, on).await,
        }
    }
}

impl<T: Transport> DeviceClient for MonitorClient<T> {
    async fn status(&self) -> Result<Status, AirmonError> {
        let status = match self {
            Self::Miio(client) => Status::Miio(client.status().await?),
            Self::Miot(client) => Status::Miot(client.status().await?),
        };
        Ok(status)
    }

    async fn info(&self) -> Result<DeviceInfo, AirmonError> {
        Ok(fetch_info(self.transport()).await?)
    }

    async fn set_switch_on(&self, key: &str) -> Result<Value, AirmonError> {
        Ok(self.set_switch(key, true).await?)
    }

    async fn set_switch_off(&self, key: &str) -> Result<Value, AirmonError> {
        Ok(self.set_switch(key, false).await?)
    }

    async fn set_value(&self, key: &str, value: f64) -> Result<Value, AirmonError> {
        let value = json_number(value);
        let response = match self {
            Self::Miio(client) => client.set_property(key, value).await?,
            Self::Miot(client) => client.set_property(key, value).await?,
        };
        Ok(response)
    }
}
