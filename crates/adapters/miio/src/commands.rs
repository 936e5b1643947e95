//! Firmware commands of the `get_prop` dialect that no entity models.
//!
//! They are reached as services of the S1's air-quality entity:
//!
//! | Service | Body |
//! |---------|------|
//! | `set_power` | `{"on": true}` |
//! | `set_display_clock` | `{"on": true}` |
//! | `set_night_mode` | `{"on": true}` |
//! | `set_night_time` | `{"begin": "22:00", "end": "07:30"}` |
//! | `call_action` | `{"siid": 9, "aiid": 2, "params": [0]}` |

use airmon_domain::error::ValidationError;
use serde_json::Value;

use crate::error::MiioError;
use crate::miio::MiioClient;
use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq)]
pub enum MonitorCommand {
    SetPower(bool),
    SetDisplayClock(bool),
    SetNightMode(bool),
    /// Both bounds as `(hour, minute)`.
    SetNightTime { begin: (u32, u32), end: (u32, u32) },
    CallAction { siid: u32, aiid: u32, params: Value },
}

impl MonitorCommand {
    /// Parse a service call. `Ok(None)` when `service` names no command.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidField`] when the body lacks a
    /// field the command needs.
    pub fn parse(service: &str, data: &Value) -> Result<Option<Self>, ValidationError> {
        let command = match service {
            "set_power" => Self::SetPower(flag(data)?),
            "set_display_clock" => Self::SetDisplayClock(flag(data)?),
            "set_night_mode" => Self::SetNightMode(flag(data)?),
            "set_night_time" => Self::SetNightTime {
                begin: time_of_day(data, "begin")?,
                end: time_of_day(data, "end")?,
            },
            "call_action" => Self::CallAction {
                siid: id(data, "siid")?,
                aiid: id(data, "aiid")?,
                params: data
                    .get("params")
                    .cloned()
                    .unwrap_or_else(|| Value::Array(Vec::new())),
            },
            _ => return Ok(None),
        };
        Ok(Some(command))
    }

    /// Send the command and return the raw answer.
    ///
    /// # Errors
    ///
    /// Returns [`MiioError`] when the request fails or a night-time bound
    /// is not a time of day.
    pub async fn run<T: Transport>(&self, client: &MiioClient<T>) -> Result<Value, MiioError> {
        match self {
            Self::SetPower(on) => client.set_power(*on).await,
            Self::SetDisplayClock(on) => client.set_display_clock(*on).await,
            Self::SetNightMode(on) => client.set_night_mode(*on).await,
            Self::SetNightTime { begin, end } => client.set_night_time(*begin, *end).await,
            Self::CallAction { siid, aiid, params } => {
                client.call_action_by(*siid, *aiid, params.clone()).await
            }
        }
    }
}

fn flag(data: &Value) -> Result<bool, ValidationError> {
    data.get("on")
        .and_then(Value::as_bool)
        .ok_or(ValidationError::InvalidField("on"))
}

fn id(data: &Value, field: &'static str) -> Result<u32, ValidationError> {
    data.get(field)
        .and_then(Value::as_u64)
        .and_then(|value| u32::try_from(value).ok())
        .ok_or(ValidationError::InvalidField(field))
}

/// `"HH:MM"`. Range checks happen when the command is sent.
fn time_of_day(data: &Value, field: &'static str) -> Result<(u32, u32), ValidationError> {
    data.get(field)
        .and_then(Value::as_str)
        .and_then(|text| text.split_once(':'))
        .and_then(|(hour, minute)| Some((hour.trim().parse().ok()?, minute.trim().parse().ok()?)))
        .ok_or(ValidationError::InvalidField(field))
}
