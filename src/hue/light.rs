//! Typed snapshot of one bridge light

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::{Error, Result};

/// Which color settings the light is currently honouring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString)]
pub enum ColorMode {
    /// Hue and saturation
    #[serde(rename = "hs")]
    #[strum(serialize = "hs")]
    HueSaturation,

    /// CIE xy chromaticity
    #[serde(rename = "xy")]
    #[strum(serialize = "xy")]
    Xy,

    /// Color temperature in mireds
    #[serde(rename = "ct")]
    #[strum(serialize = "ct")]
    ColorTemperature,
}

/// CIE 1931 chromaticity coordinates, each within 0 to 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Chromaticity {
    pub x: f32,
    pub y: f32,
}

/// Current lighting state as reported by the bridge
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LightState {
    /// Emitting or not
    pub on: bool,

    #[schema(minimum = 0, maximum = 255)]
    pub brightness: u8,

    #[schema(minimum = 0, maximum = 65535)]
    pub hue: u16,

    #[schema(minimum = 0, maximum = 254)]
    pub saturation: u8,

    /// Absent on lights without color support
    pub chromaticity: Option<Chromaticity>,

    /// Mireds, absent on lights without white tuning
    pub color_temperature: Option<u16>,

    pub color_mode: Option<ColorMode>,
}

/// One light known to the bridge
///
/// Produced fresh on every directory fetch, there is no way to mutate one.
/// Use [crate::hue::HueClient::set_power] or
/// [crate::hue::HueClient::set_color_state] to change the physical light.
///
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Light {
    /// Bridge key, a decimal number as a string
    #[schema(example = "1")]
    id: String,
    name: String,
    #[serde(rename = "type")]
    kind: String,
    reachable: bool,
    state: LightState,
    model_id: Option<String>,
    manufacturer: Option<String>,
    product_name: Option<String>,
    unique_id: Option<String>,
    software_version: Option<String>,
}

impl Light {
    /// Bridge id of this light
    pub fn id(&self) -> &str {
        &self.id
    }

    /// User assigned name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bridge light type, e.g. "Extended color light"
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Whether the bridge can currently talk to the light
    pub fn reachable(&self) -> bool {
        self.reachable
    }

    /// Lighting state at fetch time
    pub fn state(&self) -> &LightState {
        &self.state
    }

    pub fn model_id(&self) -> Option<&str> {
        self.model_id.as_deref()
    }

    pub fn unique_id(&self) -> Option<&str> {
        self.unique_id.as_deref()
    }

    /// Decode one nested value of the bridge's light listing
    pub(crate) fn from_bridge(id: &str, value: Value) -> Result<Self> {
        let raw: BridgeLight = serde_json::from_value(value)
            .map_err(|e| Error::decode(&format!("light {id}"), e))?;
        Ok(Light::from_raw(id, raw))
    }

    fn from_raw(id: &str, raw: BridgeLight) -> Self {
        let state = raw.state;
        Light {
            id: id.to_string(),
            name: raw.name,
            kind: raw.kind,
            reachable: state.reachable,
            state: LightState {
                on: state.on,
                brightness: state.bri,
                hue: state.hue,
                saturation: state.sat,
                chromaticity: state.xy.map(|[x, y]| Chromaticity { x, y }),
                color_temperature: state.ct,
                color_mode: state
                    .colormode
                    .as_deref()
                    .and_then(|mode| ColorMode::from_str(mode).ok()),
            },
            model_id: raw.modelid,
            manufacturer: raw.manufacturername,
            product_name: raw.productname,
            unique_id: raw.uniqueid,
            software_version: raw.swversion,
        }
    }
}

/// Wire shape of one light in the bridge protocol
#[derive(Debug, Deserialize)]
struct BridgeLight {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    state: BridgeLightState,
    modelid: Option<String>,
    manufacturername: Option<String>,
    productname: Option<String>,
    uniqueid: Option<String>,
    swversion: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BridgeLightState {
    on: bool,
    #[serde(default)]
    bri: u8,
    #[serde(default)]
    hue: u16,
    #[serde(default)]
    sat: u8,
    xy: Option<[f32; 2]>,
    ct: Option<u16>,
    colormode: Option<String>,
    #[serde(default)]
    reachable: bool,
}
