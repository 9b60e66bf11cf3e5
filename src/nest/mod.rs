//! Nest thermostat client
//!
//! Plain REST calls against the Nest developer API with a bearer token.
//! Targets have to be written in the thermostat's own temperature scale,
//! see [NestClient::temperature_scale].

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;
use serde_json::{json, Value};

mod models;

pub use models::{HvacMode, Temperature, TemperatureScale, Thermostat};

use crate::config::{Config, NEST_ACCESS_TOKEN_VAR};
use crate::credentials::{CredentialProvider, EnvCredential};
use crate::transport::{Reply, Transport};
use crate::{Error, Result};

/// Thermostat service client
pub struct NestClient {
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialProvider>,
    api_url: String,
}

impl NestClient {
    /// Create a new client against `api_url`
    pub fn new(
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialProvider>,
        api_url: &str,
    ) -> Self {
        NestClient {
            transport,
            credentials,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a client reading the token from `NEST_ACCESS_TOKEN`
    pub fn from_config(config: &Config, transport: Arc<dyn Transport>) -> Self {
        Self::new(
            transport,
            Arc::new(EnvCredential::new(NEST_ACCESS_TOKEN_VAR)),
            &config.nest_api_url,
        )
    }

    fn thermostats_url(&self) -> String {
        format!("{}/devices/thermostats", self.api_url)
    }

    fn thermostat_url(&self, id: &str) -> String {
        format!("{}/devices/thermostats/{}", self.api_url, id)
    }

    async fn fetch(&self, url: &str, action: &str, id: Option<&str>) -> Result<Value> {
        let token = self.credentials.credential().await?;
        let reply = self.transport.get(url, Some(&token)).await?;
        Ok(Self::checked(reply, action, id)?.body)
    }

    async fn update(&self, id: &str, body: Value, action: &str) -> Result<()> {
        let token = self.credentials.credential().await?;
        debug!("thermostat {id} {action}: {body}");
        let reply = self
            .transport
            .put(&self.thermostat_url(id), &body, Some(&token))
            .await?;
        Self::checked(reply, action, Some(id)).map(|_| ())
    }

    fn checked(reply: Reply, action: &str, id: Option<&str>) -> Result<Reply> {
        match (reply.status, id) {
            (404, Some(id)) => Err(Error::ThermostatNotFound(id.to_string())),
            _ if !reply.is_success() => Err(Error::rejected(action, reply.status, reply.reason())),
            _ => Ok(reply),
        }
    }

    /// All thermostats, sorted by device id
    pub async fn thermostats(&self) -> Result<Vec<Thermostat>> {
        let body = self
            .fetch(&self.thermostats_url(), "thermostat listing", None)
            .await?;
        if body.is_null() {
            return Ok(Vec::new());
        }

        let thermostats: BTreeMap<String, Thermostat> =
            serde_json::from_value(body).map_err(|e| Error::decode("thermostat listing", e))?;
        Ok(thermostats.into_values().collect())
    }

    /// One thermostat by device id
    pub async fn thermostat(&self, id: &str) -> Result<Thermostat> {
        let body = self
            .fetch(&self.thermostat_url(id), "thermostat lookup", Some(id))
            .await?;
        if body.is_null() {
            return Err(Error::ThermostatNotFound(id.to_string()));
        }
        serde_json::from_value(body).map_err(|e| Error::decode(&format!("thermostat {id}"), e))
    }

    /// Scale the thermostat expects targets in
    pub async fn temperature_scale(&self, id: &str) -> Result<TemperatureScale> {
        let url = format!("{}/temperature_scale", self.thermostat_url(id));
        let body = self.fetch(&url, "temperature scale lookup", Some(id)).await?;
        if body.is_null() {
            return Err(Error::ThermostatNotFound(id.to_string()));
        }
        serde_json::from_value(body)
            .map_err(|e| Error::decode(&format!("thermostat {id} temperature scale"), e))
    }

    /// Set the target temperature (not for heat-cool mode)
    pub async fn set_target_temperature(&self, id: &str, target: Temperature) -> Result<()> {
        let body = match target {
            Temperature::Fahrenheit(v) => json!({ "target_temperature_f": v }),
            Temperature::Celsius(v) => json!({ "target_temperature_c": v }),
        };
        self.update(id, body, "target temperature change").await
    }

    /// Set the high and low targets (heat-cool mode only)
    pub async fn set_target_range(&self, id: &str, high: Temperature, low: Temperature) -> Result<()> {
        let body = match (high, low) {
            (Temperature::Fahrenheit(high), Temperature::Fahrenheit(low)) => json!({
                "target_temperature_high_f": high,
                "target_temperature_low_f": low,
            }),
            (Temperature::Celsius(high), Temperature::Celsius(low)) => json!({
                "target_temperature_high_c": high,
                "target_temperature_low_c": low,
            }),
            (high, low) => {
                return Err(Error::invalid_parameter(
                    "low",
                    low,
                    &format!("must use the same scale as high ({})", high.scale()),
                ))
            }
        };
        self.update(id, body, "target range change").await
    }

    /// Switch the HVAC mode
    pub async fn set_hvac_mode(&self, id: &str, mode: HvacMode) -> Result<()> {
        self.update(id, json!({ "hvac_mode": mode }), "hvac mode change")
            .await
    }

    /// Set the user visible label
    pub async fn set_label(&self, id: &str, label: &str) -> Result<()> {
        self.update(id, json!({ "label": label }), "label change")
            .await
    }
}
