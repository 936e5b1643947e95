//! Device client port: the operations the entities need from a monitor.
//!
//! The encrypted request/response exchange lives behind this trait; the
//! entity layer only sees decoded status snapshots and raw command
//! responses.

use std::future::Future;
use std::sync::Arc;

use airmon_domain::error::AirmonError;
use airmon_domain::status::Status;

/// Identity block returned by `miIO.info`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Vendor model identifier, e.g. `cgllc.airm.cgdn1`.
    pub model: Option<String>,
    pub firmware_version: Option<String>,
    pub hardware_version: Option<String>,
    pub mac_address: Option<String>,
}

/// Talks to one monitor.
///
/// Commands return the device's raw response; interpreting it is left to
/// the caller (see [`command_succeeded`](crate::entities::command_succeeded)).
pub trait DeviceClient: Send + Sync {
    /// Read a full status snapshot.
    fn status(&self) -> impl Future<Output = Result<Status, AirmonError>> + Send;

    /// Read the device identity.
    fn info(&self) -> impl Future<Output = Result<DeviceInfo, AirmonError>> + Send;

    /// Turn the switch named `key` on.
    fn set_switch_on(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<serde_json::Value, AirmonError>> + Send;

    /// Turn the switch named `key` off.
    fn set_switch_off(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<serde_json::Value, AirmonError>> + Send;

    /// Write a configuration value.
    fn set_value(
        &self,
        key: &str,
        value: f64,
    ) -> impl Future<Output = Result<serde_json::Value, AirmonError>> + Send;
}

impl<T: DeviceClient> DeviceClient for Arc<T> {
    fn status(&self) -> impl Future<Output = Result<Status, AirmonError>> + Send {
        (**self).status()
    }

    fn info(&self) -> impl Future<Output = Result<DeviceInfo, AirmonError>> + Send {
        (**self).info()
    }

    fn set_switch_on(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<serde_json::Value, AirmonError>> + Send {
        (**self).set_switch_on(key)
    }

    fn set_switch_off(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<serde_json::Value, AirmonError>> + Send {
        (**self).set_switch_off(key)
    }

    fn set_value(
        &self,
        key: &str,
        value: f64,
    ) -> impl Future<Output = Result<serde_json::Value, AirmonError>> + Send {
        (**self).set_value(key, value)
    }
}
