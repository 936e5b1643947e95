//! Status snapshot: one polled reading of the monitor.
//!
//! The two firmware dialects report different property names, so the
//! snapshot is a tagged union with one optional field per property. Missing
//! properties and values of the wrong JSON type both read as `None`; callers
//! never see a lookup error.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::entity::AttributeValue;
use crate::model::{Dialect, Feature};

/// Charging-state codes reported by the MIoT dialect.
pub const BATTERY_STATES: [(i64, &str); 3] =
    [(1, "Charging"), (2, "Not charging"), (3, "Not chargeable")];

/// Label for a MIoT charging-state code.
#[must_use]
pub fn battery_state_label(code: i64) -> Option<&'static str> {
    BATTERY_STATES
        .iter()
        .find(|(value, _)| *value == code)
        .map(|(_, label)| *label)
}

/// A status snapshot in either dialect.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "dialect", rename_all = "lowercase")]
pub enum Status {
    Miio(MiioStatus),
    Miot(MiotStatus),
}

/// Snapshot reported by `get_prop` firmware.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MiioStatus {
    /// °C, -20 to 50.
    pub temperature: Option<f64>,
    /// %, 0 to 100.
    pub humidity: Option<f64>,
    /// ppm, 400 to 9999.
    pub co2: Option<i64>,
    /// ppb, 1 to 2187.
    pub tvoc: Option<i64>,
    /// µg/m³, 0 to 999.
    pub pm25: Option<i64>,
    /// µg/m³, 0 to 999.
    pub pm10: Option<i64>,
    /// %, 0 to 100.
    pub battery: Option<i64>,
    /// `charging` / `discharging` as reported by the device.
    pub battery_state: Option<String>,
}

/// Snapshot reported by MIoT firmware, keyed by property name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MiotStatus {
    pub relative_humidity: Option<f64>,
    pub pm25_density: Option<i64>,
    pub pm10_density: Option<i64>,
    pub temperature: Option<f64>,
    pub co2_density: Option<i64>,
    pub tvoc_density: Option<i64>,
    pub battery_level: Option<i64>,
    pub charging_state: Option<i64>,
    /// mV.
    pub voltage: Option<i64>,
    pub monitoring_frequency: Option<i64>,
    pub screen_off: Option<i64>,
    pub device_off: Option<i64>,
    pub screensaver_time: Option<i64>,
    pub auto_slideing_time: Option<i64>,
    pub screensaver_type: Option<i64>,
    pub device_off_new: Option<i64>,
    pub is_twelve_hours_sys: Option<i64>,
    pub pm_tpf_standard: Option<i64>,
}

fn int(value: Option<&Value>) -> Option<i64> {
    let value = value?;
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|v| v.fract() == 0.0)
            .map(|v| {
                #[allow(clippy::cast_possible_truncation)]
                let whole = v as i64;
                whole
            })
    })
}

fn float(value: Option<&Value>) -> Option<f64> {
    value?.as_f64()
}

fn string(value: Option<&Value>) -> Option<String> {
    value?.as_str().map(str::to_string)
}

impl MiioStatus {
    /// Build from a `property name → value` map. Unknown keys are ignored.
    #[must_use]
    pub fn from_properties(props: &Map<String, Value>) -> Self {
        Self {
            temperature: float(props.get("temperature")),
            humidity: float(props.get("humidity")),
            co2: int(props.get("co2")),
            tvoc: int(props.get("tvoc")),
            pm25: int(props.get("pm25")),
            pm10: int(props.get("pm10")),
            battery: int(props.get("battery")),
            battery_state: string(props.get("battery_state")),
        }
    }

    fn get(&self, feature: Feature) -> Option<AttributeValue> {
        match feature {
            Feature::Co2 => self.co2.map(AttributeValue::Int),
            Feature::Humidity => self.humidity.map(AttributeValue::Float),
            Feature::Pm25 => self.pm25.map(AttributeValue::Int),
            Feature::Temperature => self.temperature.map(AttributeValue::Float),
            Feature::Battery => self.battery.map(AttributeValue::Int),
            Feature::BatteryState => self.battery_state.clone().map(AttributeValue::String),
            Feature::Tvoc => self.tvoc.map(AttributeValue::Int),
            Feature::Pm10 => self.pm10.map(AttributeValue::Int),
            _ => None,
        }
    }
}

/// MIoT property names, as used in `did` fields.
pub mod miot_props {
    pub const RELATIVE_HUMIDITY: &str = "relative-humidity";
    pub const PM25_DENSITY: &str = "pm2.5-density";
    pub const PM10_DENSITY: &str = "pm10-density";
    pub const TEMPERATURE: &str = "temperature";
    pub const CO2_DENSITY: &str = "co2-density";
    pub const TVOC_DENSITY: &str = "tvoc-density";
    pub const BATTERY_LEVEL: &str = "battery-level";
    pub const CHARGING_STATE: &str = "charging-state";
    pub const VOLTAGE: &str = "voltage";
    pub const MONITORING_FREQUENCY: &str = "monitoring-frequency";
    pub const SCREEN_OFF: &str = "screen-off";
    pub const DEVICE_OFF: &str = "device-off";
    pub const SCREENSAVER_TIME: &str = "screensaver-time";
    pub const AUTO_SLIDEING_TIME: &str = "auto-slideing-time";
    pub const SCREENSAVER_TYPE: &str = "screensaver-type";
    pub const DEVICE_OFF_NEW: &str = "device-off-new";
    pub const IS_TWELVE_HOURS_SYS: &str = "is-twelve-hours-sys";
    pub const PM_TPF_STANDARD: &str = "pm-tpf-standard";
}

/// MIoT property name carrying a feature.
#[must_use]
pub fn miot_property(feature: Feature) -> &'static str {
    use miot_props as p;
    match feature {
        Feature::Co2 => p::CO2_DENSITY,
        Feature::Humidity => p::RELATIVE_HUMIDITY,
        Feature::Pm25 => p::PM25_DENSITY,
        Feature::Temperature => p::TEMPERATURE,
        Feature::Battery => p::BATTERY_LEVEL,
        Feature::BatteryState => p::CHARGING_STATE,
        Feature::Tvoc => p::TVOC_DENSITY,
        Feature::Pm10 => p::PM10_DENSITY,
        Feature::Voltage => p::VOLTAGE,
        Feature::MonitoringFrequency => p::MONITORING_FREQUENCY,
        Feature::ScreenOff => p::SCREEN_OFF,
        Feature::DeviceOff => p::DEVICE_OFF,
        Feature::ScreensaverTime => p::SCREENSAVER_TIME,
        Feature::AutoSlideingTime => p::AUTO_SLIDEING_TIME,
        Feature::ScreensaverType => p::SCREENSAVER_TYPE,
        Feature::DeviceOffNew => p::DEVICE_OFF_NEW,
        Feature::IsTwelveHoursSys => p::IS_TWELVE_HOURS_SYS,
        Feature::PmTpfStandard => p::PM_TPF_STANDARD,
    }
}

impl MiotStatus {
    /// Build from a `did → value` map. Unknown keys are ignored.
    #[must_use]
    pub fn from_properties(props: &Map<String, Value>) -> Self {
        use miot_props as p;
        Self {
            relative_humidity: float(props.get(p::RELATIVE_HUMIDITY)),
            pm25_density: int(props.get(p::PM25_DENSITY)),
            pm10_density: int(props.get(p::PM10_DENSITY)),
            temperature: float(props.get(p::TEMPERATURE)),
            co2_density: int(props.get(p::CO2_DENSITY)),
            tvoc_density: int(props.get(p::TVOC_DENSITY)),
            battery_level: int(props.get(p::BATTERY_LEVEL)),
            charging_state: int(props.get(p::CHARGING_STATE)),
            voltage: int(props.get(p::VOLTAGE)),
            monitoring_frequency: int(props.get(p::MONITORING_FREQUENCY)),
            screen_off: int(props.get(p::SCREEN_OFF)),
            device_off: int(props.get(p::DEVICE_OFF)),
            screensaver_time: int(props.get(p::SCREENSAVER_TIME)),
            auto_slideing_time: int(props.get(p::AUTO_SLIDEING_TIME)),
            screensaver_type: int(props.get(p::SCREENSAVER_TYPE)),
            device_off_new: int(props.get(p::DEVICE_OFF_NEW)),
            is_twelve_hours_sys: int(props.get(p::IS_TWELVE_HOURS_SYS)),
            pm_tpf_standard: int(props.get(p::PM_TPF_STANDARD)),
        }
    }

    fn get(&self, feature: Feature) -> Option<AttributeValue> {
        let int = |v: Option<i64>| v.map(AttributeValue::Int);
        match feature {
            Feature::Co2 => int(self.co2_density),
            Feature::Humidity => self.relative_humidity.map(AttributeValue::Float),
            Feature::Pm25 => int(self.pm25_density),
            Feature::Temperature => self.temperature.map(AttributeValue::Float),
            Feature::Battery => int(self.battery_level),
            Feature::BatteryState => self
                .charging_state
                .and_then(battery_state_label)
                .map(AttributeValue::from),
            Feature::Tvoc => int(self.tvoc_density),
            Feature::Pm10 => int(self.pm10_density),
            Feature::Voltage => int(self.voltage),
            Feature::MonitoringFrequency => int(self.monitoring_frequency),
            Feature::ScreenOff => int(self.screen_off),
            Feature::DeviceOff => int(self.device_off),
            Feature::ScreensaverTime => int(self.screensaver_time),
            Feature::AutoSlideingTime => int(self.auto_slideing_time),
            Feature::ScreensaverType => int(self.screensaver_type),
            Feature::DeviceOffNew => int(self.device_off_new),
            Feature::IsTwelveHoursSys => int(self.is_twelve_hours_sys),
            Feature::PmTpfStandard => int(self.pm_tpf_standard),
        }
    }
}

impl Status {
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        match self {
            Self::Miio(_) => Dialect::Miio,
            Self::Miot(_) => Dialect::Miot,
        }
    }

    /// Value of a feature, `None` when not reported.
    #[must_use]
    pub fn get(&self, feature: Feature) -> Option<AttributeValue> {
        match self {
            Self::Miio(status) => status.get(feature),
            Self::Miot(status) => status.get(feature),
        }
    }

    /// CO2 concentration in ppm.
    #[must_use]
    pub fn co2(&self) -> Option<i64> {
        match self {
            Self::Miio(s) => s.co2,
            Self::Miot(s) => s.co2_density,
        }
    }

    /// PM2.5 concentration in µg/m³.
    #[must_use]
    pub fn pm25(&self) -> Option<i64> {
        match self {
            Self::Miio(s) => s.pm25,
            Self::Miot(s) => s.pm25_density,
        }
    }

    /// Total volatile organic compounds in ppb.
    #[must_use]
    pub fn tvoc(&self) -> Option<i64> {
        match self {
            Self::Miio(s) => s.tvoc,
            Self::Miot(s) => s.tvoc_density,
        }
    }
}
