//! Nest thermostat models

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

use crate::{Error, Result};

/// Unit the thermostat displays temperatures in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString)]
pub enum TemperatureScale {
    #[serde(rename = "F")]
    #[strum(serialize = "F")]
    Fahrenheit,

    #[serde(rename = "C")]
    #[strum(serialize = "C")]
    Celsius,
}

impl TemperatureScale {
    /// Parse a caller supplied temperature in this scale
    ///
    /// Fahrenheit targets are whole degrees, Celsius ones may be fractional.
    ///
    /// # Examples
    ///
    /// ```
    /// use homegate::nest::{Temperature, TemperatureScale};
    ///
    /// let temp = TemperatureScale::Fahrenheit.parse("71", "temp").unwrap();
    /// assert_eq!(temp, Temperature::Fahrenheit(71));
    /// assert!(TemperatureScale::Fahrenheit.parse("71.5", "temp").is_err());
    ///
    /// let temp = TemperatureScale::Celsius.parse("21.5", "temp").unwrap();
    /// assert_eq!(temp, Temperature::Celsius(21.5));
    /// ```
    ///
    pub fn parse(&self, value: &str, name: &str) -> Result<Temperature> {
        let value = value.trim();
        match self {
            TemperatureScale::Fahrenheit => value
                .parse::<i32>()
                .map(Temperature::Fahrenheit)
                .map_err(|_| Error::invalid_parameter(name, value, "expected whole degrees Fahrenheit")),
            TemperatureScale::Celsius => match value.parse::<f32>() {
                Ok(v) if v.is_finite() => Ok(Temperature::Celsius(v)),
                _ => Err(Error::invalid_parameter(name, value, "expected degrees Celsius")),
            },
        }
    }
}

/// A target temperature with its unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Temperature {
    Fahrenheit(i32),
    Celsius(f32),
}

impl Temperature {
    /// Scale this value is expressed in
    pub fn scale(&self) -> TemperatureScale {
        match self {
            Temperature::Fahrenheit(_) => TemperatureScale::Fahrenheit,
            Temperature::Celsius(_) => TemperatureScale::Celsius,
        }
    }
}

impl std::fmt::Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Temperature::Fahrenheit(v) => write!(f, "{v}°F"),
            Temperature::Celsius(v) => write!(f, "{v}°C"),
        }
    }
}

/// Heating and cooling mode
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum HvacMode {
    Heat,
    Cool,
    HeatCool,
    Eco,
    Off,
}

/// Thermostat as reported by the Nest API
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Thermostat {
    pub device_id: String,
    pub name: Option<String>,
    pub name_long: Option<String>,
    pub label: Option<String>,
    pub is_online: Option<bool>,
    pub temperature_scale: Option<TemperatureScale>,
    pub hvac_mode: Option<HvacMode>,
    pub humidity: Option<u8>,
    pub ambient_temperature_f: Option<i32>,
    pub ambient_temperature_c: Option<f32>,
    pub target_temperature_f: Option<i32>,
    pub target_temperature_c: Option<f32>,
    pub target_temperature_high_f: Option<i32>,
    pub target_temperature_high_c: Option<f32>,
    pub target_temperature_low_f: Option<i32>,
    pub target_temperature_low_c: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_hvac_mode_names() {
        let names: Vec<String> = HvacMode::iter().map(|m| m.to_string()).collect();
        assert_eq!(names, ["heat", "cool", "heat-cool", "eco", "off"]);
        assert_eq!(HvacMode::from_str("heat-cool").unwrap(), HvacMode::HeatCool);
        assert!(HvacMode::from_str("warm").is_err());
        assert_eq!(serde_json::to_string(&HvacMode::HeatCool).unwrap(), r#""heat-cool""#);
    }

    #[test]
    fn test_scale_parse_rejects_garbage() {
        let err = TemperatureScale::Celsius.parse("warm", "high").unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
        assert!(TemperatureScale::Celsius.parse("NaN", "high").is_err());
    }

    #[test]
    fn test_thermostat_decode() {
        let thermostat: Thermostat = serde_json::from_value(serde_json::json!({
            "device_id": "peyiJNo0IldT2YlIVtYaGQ",
            "name": "Hallway (Upstairs)",
            "temperature_scale": "C",
            "hvac_mode": "heat-cool",
            "target_temperature_c": 21.5,
            "software_version": "5.9"
        }))
        .unwrap();
        assert_eq!(thermostat.temperature_scale, Some(TemperatureScale::Celsius));
        assert_eq!(thermostat.hvac_mode, Some(HvacMode::HeatCool));
        assert_eq!(thermostat.target_temperature_c, Some(21.5));
    }
}
