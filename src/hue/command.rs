//! Partial light state changes

use log::debug;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::session::BridgeSession;
use super::{bridge_errors, RESOURCE_NOT_AVAILABLE};
use crate::transport::{Reply, Transport};
use crate::{Error, Result};

/// Requested color for a light
///
/// Fields left at zero are not sent. A command with every field at zero
/// cannot be told apart from "no color requested" and only turns the
/// light on, see [ColorCommand::is_power_only].
///
/// # Examples
///
/// ```
/// use homegate::hue::ColorCommand;
///
/// assert!(ColorCommand::default().is_power_only());
///
/// let command = ColorCommand { brightness: 200, ..Default::default() };
/// assert!(!command.is_power_only());
/// assert!(command.validate().is_ok());
///
/// let command = ColorCommand { x: 1.5, y: 0.3, ..Default::default() };
/// assert!(command.validate().is_err());
/// ```
///
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct ColorCommand {
    /// CIE x coordinate (0-1)
    pub x: f64,

    /// CIE y coordinate (0-1)
    pub y: f64,

    /// Brightness (1-254)
    #[serde(rename = "bri")]
    pub brightness: u8,

    /// Hue (0-65535)
    pub hue: u16,

    /// Saturation (0-254)
    #[serde(rename = "sat")]
    pub saturation: u8,
}

impl ColorCommand {
    /// True when no color field is set
    pub fn is_power_only(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.brightness == 0 && self.hue == 0 && self.saturation == 0
    }

    /// Check the values are within what the bridge accepts
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("x", self.x), ("y", self.y)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::invalid_parameter(name, value, "must be within 0 and 1"));
            }
        }
        if self.saturation > 254 {
            return Err(Error::invalid_parameter(
                "sat",
                self.saturation,
                "must be within 0 and 254",
            ));
        }
        Ok(())
    }
}

/// JSON body of a partial state change, only set fields are sent
///
/// # Examples
///
/// ```
/// use homegate::hue::{ColorCommand, StatePatch};
///
/// let patch = StatePatch::power(false);
/// assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"on":false}"#);
///
/// let patch = StatePatch::from(&ColorCommand { hue: 100, saturation: 20, ..Default::default() });
/// assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"hue":100,"sat":20}"#);
/// ```
///
#[serde_with::skip_serializing_none]
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct StatePatch {
    on: Option<bool>,
    bri: Option<u8>,
    hue: Option<u16>,
    sat: Option<u8>,
    xy: Option<[f64; 2]>,
}

impl StatePatch {
    /// Patch touching only the power field
    pub fn power(on: bool) -> Self {
        StatePatch {
            on: Some(on),
            ..Default::default()
        }
    }

    /// Checks if this patch changes anything
    pub fn is_valid(&self) -> bool {
        self.on.is_some()
            || self.bri.is_some()
            || self.hue.is_some()
            || self.sat.is_some()
            || self.xy.is_some()
    }
}

impl From<&ColorCommand> for StatePatch {
    fn from(command: &ColorCommand) -> Self {
        if command.is_power_only() {
            return StatePatch::power(true);
        }

        let non_zero_u8 = |v: u8| Some(v).filter(|v| *v != 0);
        StatePatch {
            on: None,
            bri: non_zero_u8(command.brightness),
            hue: Some(command.hue).filter(|v| *v != 0),
            sat: non_zero_u8(command.saturation),
            xy: if command.x != 0.0 || command.y != 0.0 {
                Some([command.x, command.y])
            } else {
                None
            },
        }
    }
}

/// PUT a patch to the light's state endpoint
pub(crate) async fn send(
    transport: &dyn Transport,
    session: &BridgeSession,
    light_id: &str,
    patch: &StatePatch,
) -> Result<()> {
    if !patch.is_valid() {
        return Err(Error::command(light_id, "empty state change"));
    }

    let body = serde_json::to_value(patch).map_err(|e| Error::JsonDump(e.to_string()))?;
    debug!("light {light_id} state change: {body}");

    let reply = transport.put(&session.state_url(light_id), &body, None).await?;
    check_reply(light_id, &reply)
}

/// The bridge answers 200 with a list of per-field success or error entries
fn check_reply(light_id: &str, reply: &Reply) -> Result<()> {
    if !reply.is_success() {
        return Err(Error::command(
            light_id,
            format!("bridge answered {}: {}", reply.status, reply.reason()),
        ));
    }

    match bridge_errors(&reply.body).into_iter().next() {
        Some(err) if err.kind == RESOURCE_NOT_AVAILABLE => {
            Err(Error::LightNotFound(light_id.to_string()))
        }
        Some(err) => Err(Error::command(light_id, err.description)),
        None => Ok(()),
    }
}
