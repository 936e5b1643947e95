//! Static entity descriptions: how each feature is presented to the host.

use std::fmt;

use serde::Serialize;

use crate::error::ValidationError;
use crate::model::Feature;

/// Measurement unit of a sensor or number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unit {
    #[serde(rename = "%")]
    Percentage,
    #[serde(rename = "°C")]
    Celsius,
    #[serde(rename = "ppm")]
    PartsPerMillion,
    #[serde(rename = "ppb")]
    PartsPerBillion,
    #[serde(rename = "µg/m³")]
    MicrogramsPerCubicMeter,
    #[serde(rename = "mV")]
    Millivolt,
    #[serde(rename = "s")]
    Seconds,
    #[serde(rename = "min")]
    Minutes,
}

impl Unit {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Percentage => "%",
            Self::Celsius => "°C",
            Self::PartsPerMillion => "ppm",
            Self::PartsPerBillion => "ppb",
            Self::MicrogramsPerCubicMeter => "µg/m³",
            Self::Millivolt => "mV",
            Self::Seconds => "s",
            Self::Minutes => "min",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorDeviceClass {
    Battery,
    Temperature,
    Humidity,
    CarbonDioxide,
    Pm25,
    Pm10,
    VolatileOrganicCompoundsParts,
    Voltage,
}

impl SensorDeviceClass {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Battery => "battery",
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::CarbonDioxide => "carbon_dioxide",
            Self::Pm25 => "pm25",
            Self::Pm10 => "pm10",
            Self::VolatileOrganicCompoundsParts => "volatile_organic_compounds_parts",
            Self::Voltage => "voltage",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateClass {
    Measurement,
}

impl StateClass {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Measurement => "measurement",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberDeviceClass {
    Duration,
}

impl NumberDeviceClass {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Duration => "duration",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensorDescription {
    pub key: Feature,
    pub name: &'static str,
    pub unit: Option<Unit>,
    pub device_class: Option<SensorDeviceClass>,
    pub state_class: Option<StateClass>,
    pub icon: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NumberDescription {
    pub key: Feature,
    pub name: &'static str,
    pub unit: Option<Unit>,
    pub device_class: Option<NumberDeviceClass>,
    pub icon: Option<&'static str>,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl NumberDescription {
    /// Check that `value` lies within `[min, max]`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OutOfRange`] otherwise (NaN included).
    pub fn validate(&self, value: f64) -> Result<(), ValidationError> {
        if (self.min..=self.max).contains(&value) {
            Ok(())
        } else {
            Err(ValidationError::OutOfRange {
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// A power switch. `key` is the command key passed to the device client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwitchDescription {
    pub key: &'static str,
    pub name: &'static str,
    pub icon: Option<&'static str>,
}

const fn sensor(
    key: Feature,
    name: &'static str,
    unit: Option<Unit>,
    device_class: Option<SensorDeviceClass>,
    icon: &'static str,
) -> SensorDescription {
    SensorDescription {
        key,
        name,
        unit,
        device_class,
        state_class: Some(StateClass::Measurement),
        icon: Some(icon),
    }
}

pub const SENSORS: &[SensorDescription] = &[
    SensorDescription {
        key: Feature::BatteryState,
        name: "Battery Status",
        unit: None,
        device_class: None,
        state_class: None,
        icon: Some("mdi:battery-charging"),
    },
    sensor(
        Feature::Battery,
        "Battery Level",
        Some(Unit::Percentage),
        Some(SensorDeviceClass::Battery),
        "mdi:battery",
    ),
    sensor(
        Feature::Temperature,
        "Temperature",
        Some(Unit::Celsius),
        Some(SensorDeviceClass::Temperature),
        "mdi:thermometer",
    ),
    sensor(
        Feature::Humidity,
        "Humidity",
        Some(Unit::Percentage),
        Some(SensorDeviceClass::Humidity),
        "mdi:water-percent",
    ),
    sensor(
        Feature::Co2,
        "CO2",
        Some(Unit::PartsPerMillion),
        Some(SensorDeviceClass::CarbonDioxide),
        "mdi:molecule-co2",
    ),
    sensor(
        Feature::Pm25,
        "PM2.5",
        Some(Unit::MicrogramsPerCubicMeter),
        Some(SensorDeviceClass::Pm25),
        "mdi:chemical-weapon",
    ),
    sensor(
        Feature::Pm10,
        "PM10",
        Some(Unit::MicrogramsPerCubicMeter),
        Some(SensorDeviceClass::Pm10),
        "mdi:chemical-weapon",
    ),
    sensor(
        Feature::Tvoc,
        "TVOC",
        Some(Unit::PartsPerBillion),
        Some(SensorDeviceClass::VolatileOrganicCompoundsParts),
        "mdi:cloud",
    ),
    sensor(
        Feature::Voltage,
        "Voltage",
        Some(Unit::Millivolt),
        Some(SensorDeviceClass::Voltage),
        "mdi:cloud",
    ),
];

const fn number(
    key: Feature,
    name: &'static str,
    unit: Option<Unit>,
    icon: &'static str,
    max: f64,
) -> NumberDescription {
    let device_class = match unit {
        Some(Unit::Seconds | Unit::Minutes) => Some(NumberDeviceClass::Duration),
        _ => None,
    };
    NumberDescription {
        key,
        name,
        unit,
        device_class,
        icon: Some(icon),
        min: 0.0,
        max,
        step: 1.0,
    }
}

pub const NUMBERS: &[NumberDescription] = &[
    number(
        Feature::MonitoringFrequency,
        "Monitoring Frequency",
        Some(Unit::Seconds),
        "mdi:clock",
        600.0,
    ),
    number(
        Feature::ScreenOff,
        "Screen Off",
        Some(Unit::Seconds),
        "mdi:clock",
        600.0,
    ),
    number(
        Feature::DeviceOff,
        "Device Off",
        Some(Unit::Minutes),
        "mdi:clock-outline",
        600.0,
    ),
    number(
        Feature::ScreensaverTime,
        "Screen Save Time",
        Some(Unit::Seconds),
        "mdi:clock",
        180.0,
    ),
    number(
        Feature::AutoSlideingTime,
        "Auto Slideing Time",
        Some(Unit::Seconds),
        "mdi:clock",
        3600.0,
    ),
    number(
        Feature::ScreensaverType,
        "Screen Saver Type",
        None,
        "mdi:cog",
        10.0,
    ),
    number(
        Feature::DeviceOffNew,
        "Device Off New",
        Some(Unit::Seconds),
        "mdi:clock-outline",
        65535.0,
    ),
    number(
        Feature::IsTwelveHoursSys,
        "Is Twelve Hours",
        None,
        "mdi:cog",
        1.0,
    ),
    number(
        Feature::PmTpfStandard,
        "PM  TPF Standard",
        None,
        "mdi:cog",
        255.0,
    ),
];

pub const SWITCHES: &[SwitchDescription] = &[
    SwitchDescription {
        key: "screen",
        name: "Screen Switch",
        icon: Some("mdi:monitor"),
    },
    SwitchDescription {
        key: "device",
        name: "Device Switch",
        icon: Some("mdi:monitor"),
    },
];

/// Description of the sensor reporting `feature`.
#[must_use]
pub fn sensor_for(feature: Feature) -> Option<&'static SensorDescription> {
    SENSORS.iter().find(|d| d.key == feature)
}

/// Description of the number writing `feature`.
#[must_use]
pub fn number_for(feature: Feature) -> Option<&'static NumberDescription> {
    NUMBERS.iter().find(|d| d.key == feature)
}
