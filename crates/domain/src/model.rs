//! Supported monitor models and the static per-model feature table.
//!
//! A model decides two things: which protocol [`Dialect`] its firmware speaks
//! and which [`Feature`]s it reports. An attribute missing from a model's
//! feature list is never exposed as an entity for that model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Monitor hardware variants handled by this integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Model {
    /// `cgllc.airmonitor.s1`
    AirMonitorS1,
    /// `cgllc.airm.cgdn1`
    AirMonitorLite,
    /// `cgllc.airm.cgd1st`, the Lite running community ESP32 firmware.
    AirMonitorLiteDany,
}

/// Request/response flavour spoken by a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Legacy `get_prop` with property names.
    Miio,
    /// `get_properties` addressed by service/property ids.
    Miot,
}

/// Every attribute a monitor may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Co2,
    Humidity,
    Pm25,
    Temperature,
    Battery,
    BatteryState,
    Tvoc,
    Pm10,
    Voltage,
    MonitoringFrequency,
    ScreenOff,
    DeviceOff,
    ScreensaverTime,
    AutoSlideingTime,
    ScreensaverType,
    DeviceOffNew,
    IsTwelveHoursSys,
    PmTpfStandard,
}

const S1_FEATURES: &[Feature] = &[
    Feature::Co2,
    Feature::Humidity,
    Feature::Pm25,
    Feature::Temperature,
    Feature::Battery,
    Feature::BatteryState,
    Feature::Tvoc,
];

const LITE_FEATURES: &[Feature] = &[
    Feature::Co2,
    Feature::Humidity,
    Feature::Pm25,
    Feature::Temperature,
    Feature::Battery,
    Feature::BatteryState,
    Feature::Pm10,
];

const LITE_DANY_FEATURES: &[Feature] = &[
    Feature::Co2,
    Feature::Humidity,
    Feature::Pm25,
    Feature::Temperature,
    Feature::Battery,
    Feature::BatteryState,
    Feature::Voltage,
    Feature::Pm10,
    Feature::MonitoringFrequency,
    Feature::ScreenOff,
    Feature::DeviceOff,
    Feature::ScreensaverTime,
    Feature::AutoSlideingTime,
    Feature::ScreensaverType,
    Feature::DeviceOffNew,
    Feature::IsTwelveHoursSys,
    Feature::PmTpfStandard,
];

impl Model {
    /// All supported models.
    pub const ALL: [Self; 3] = [
        Self::AirMonitorS1,
        Self::AirMonitorLite,
        Self::AirMonitorLiteDany,
    ];

    /// Vendor model identifier as reported by `miIO.info`.
    #[must_use]
    pub fn identifier(self) -> &'static str {
        match self {
            Self::AirMonitorS1 => "cgllc.airmonitor.s1",
            Self::AirMonitorLite => "cgllc.airm.cgdn1",
            Self::AirMonitorLiteDany => "cgllc.airm.cgd1st",
        }
    }

    /// Human readable product name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::AirMonitorS1 => "QingPing Air Quality Monitor",
            Self::AirMonitorLite => "QingPing Air Quality Monitor Lite",
            Self::AirMonitorLiteDany => "QingPing Air Quality Monitor Lite (Dany ESP32)",
        }
    }

    #[must_use]
    pub fn dialect(self) -> Dialect {
        match self {
            Self::AirMonitorS1 => Dialect::Miio,
            Self::AirMonitorLite | Self::AirMonitorLiteDany => Dialect::Miot,
        }
    }

    /// Static feature list for this model.
    #[must_use]
    pub fn features(self) -> &'static [Feature] {
        match self {
            Self::AirMonitorS1 => S1_FEATURES,
            Self::AirMonitorLite => LITE_FEATURES,
            Self::AirMonitorLiteDany => LITE_DANY_FEATURES,
        }
    }

    #[must_use]
    pub fn supports(self, feature: Feature) -> bool {
        self.features().contains(&feature)
    }

    /// Whether the screen/device power switches are exposed.
    #[must_use]
    pub fn has_switches(self) -> bool {
        matches!(self, Self::AirMonitorLite | Self::AirMonitorLiteDany)
    }

    /// Whether writable configuration numbers are exposed.
    #[must_use]
    pub fn has_numbers(self) -> bool {
        self.dialect() == Dialect::Miot
    }

    /// Manufacturer derived from the model identifier.
    #[must_use]
    pub fn manufacturer(self) -> String {
        manufacturer_from_model(self.identifier())
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

impl FromStr for Model {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|model| model.identifier() == s)
            .ok_or_else(|| ValidationError::UnsupportedModel(s.to_string()))
    }
}

impl TryFrom<String> for Model {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Model> for String {
    fn from(model: Model) -> Self {
        model.identifier().to_string()
    }
}

impl Feature {
    /// Attribute name used by the feature table and the `get_prop` dialect.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Co2 => "co2",
            Self::Humidity => "humidity",
            Self::Pm25 => "pm25",
            Self::Temperature => "temperature",
            Self::Battery => "battery",
            Self::BatteryState => "battery_state",
            Self::Tvoc => "tvoc",
            Self::Pm10 => "pm10",
            Self::Voltage => "voltage",
            Self::MonitoringFrequency => "monitoring_frequency",
            Self::ScreenOff => "screen_off",
            Self::DeviceOff => "device_off",
            Self::ScreensaverTime => "screensaver_time",
            Self::AutoSlideingTime => "auto_slideing_time",
            Self::ScreensaverType => "screensaver_type",
            Self::DeviceOffNew => "device_off_new",
            Self::IsTwelveHoursSys => "is_twelve_hours_sys",
            Self::PmTpfStandard => "pm_tpf_standard",
        }
    }
}

impl Feature {
    /// All features, in feature-table order.
    pub const ALL: [Self; 18] = [
        Self::Co2,
        Self::Humidity,
        Self::Pm25,
        Self::Temperature,
        Self::Battery,
        Self::BatteryState,
        Self::Tvoc,
        Self::Pm10,
        Self::Voltage,
        Self::MonitoringFrequency,
        Self::ScreenOff,
        Self::DeviceOff,
        Self::ScreensaverTime,
        Self::AutoSlideingTime,
        Self::ScreensaverType,
        Self::DeviceOffNew,
        Self::IsTwelveHoursSys,
        Self::PmTpfStandard,
    ];
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The string is not a known feature name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown feature {0:?}")]
pub struct UnknownFeature(pub String);

impl FromStr for Feature {
    type Err = UnknownFeature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|feature| feature.key() == s)
            .ok_or_else(|| UnknownFeature(s.to_string()))
    }
}

/// Manufacturer name from a dotted model identifier: the first segment,
/// capitalised. Falls back to `Xiaomi` for an empty identifier.
#[must_use]
pub fn manufacturer_from_model(model: &str) -> String {
    let vendor = model.split('.').next().unwrap_or_default();
    let mut chars = vendor.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => "Xiaomi".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_every_supported_identifier() {
        for model in Model::ALL {
            assert_eq!(model.identifier().parse::<Model>().unwrap(), model);
        }
    }

    #[test]
    fn should_reject_unknown_identifier() {
        let err = "zhimi.airpurifier.v7".parse::<Model>().unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnsupportedModel("zhimi.airpurifier.v7".to_string())
        );
    }

    #[test]
    fn should_map_models_to_dialects() {
        assert_eq!(Model::AirMonitorS1.dialect(), Dialect::Miio);
        assert_eq!(Model::AirMonitorLite.dialect(), Dialect::Miot);
        assert_eq!(Model::AirMonitorLiteDany.dialect(), Dialect::Miot);
    }

    #[test]
    fn should_share_common_features_across_models() {
        for model in Model::ALL {
            for feature in [
                Feature::Co2,
                Feature::Humidity,
                Feature::Pm25,
                Feature::Temperature,
            ] {
                assert!(model.supports(feature), "{model} lacks {feature}");
            }
        }
    }

    #[test]
    fn should_report_tvoc_only_on_s1() {
        assert!(Model::AirMonitorS1.supports(Feature::Tvoc));
        assert!(!Model::AirMonitorLite.supports(Feature::Tvoc));
        assert!(!Model::AirMonitorLiteDany.supports(Feature::Tvoc));
    }

    #[test]
    fn should_report_settings_only_on_lite_dany() {
        assert!(Model::AirMonitorLiteDany.supports(Feature::ScreensaverType));
        assert!(!Model::AirMonitorLite.supports(Feature::ScreensaverType));
        assert_eq!(Model::AirMonitorLiteDany.features().len(), 17);
    }

    #[test]
    fn should_gate_switches_and_numbers_by_model() {
        assert!(!Model::AirMonitorS1.has_switches());
        assert!(!Model::AirMonitorS1.has_numbers());
        assert!(Model::AirMonitorLite.has_switches());
        assert!(Model::AirMonitorLiteDany.has_numbers());
    }

    #[test]
    fn should_capitalise_vendor_segment_as_manufacturer() {
        assert_eq!(Model::AirMonitorLite.manufacturer(), "Cgllc");
        assert_eq!(manufacturer_from_model("XIAOMI.sensor"), "Xiaomi");
        assert_eq!(manufacturer_from_model(""), "Xiaomi");
    }

    #[test]
    fn should_parse_feature_keys() {
        for feature in Feature::ALL {
            assert_eq!(feature.key().parse::<Feature>().unwrap(), feature);
        }
        assert!("monitoring-frequency".parse::<Feature>().is_err());
    }

    #[test]
    fn should_serialize_model_as_identifier() {
        let json = serde_json::to_string(&Model::AirMonitorS1).unwrap();
        assert_eq!(json, "\"cgllc.airmonitor.s1\"");
        let parsed: Model = serde_json::from_str("\"cgllc.airm.cgd1st\"").unwrap();
        assert_eq!(parsed, Model::AirMonitorLiteDany);
    }
}
