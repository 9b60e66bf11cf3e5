//! Nest thermostat routes

use std::str::FromStr;

use actix_web::{
    web::{Data, Path, Query, ServiceConfig},
    HttpResponse, Responder, Result,
};
use log::info;
use serde::Deserialize;
use strum::IntoEnumIterator;
use utoipa::IntoParams;

use super::{failure, required, resource, GET, POST};
use crate::nest::{HvacMode, NestClient, Thermostat};
use crate::Error;

pub(crate) fn configure(cfg: &mut ServiceConfig) {
    cfg.service(resource("/api/nest/getThermostats", GET, list))
        .service(resource("/api/nest/getThermostat/{id}", GET, read))
        .service(resource(
            "/api/nest/setTargetTemperature/{id}",
            POST,
            set_target_temperature,
        ))
        .service(resource(
            "/api/nest/setTargetHighLowTemperature/{id}",
            POST,
            set_target_range,
        ))
        .service(resource("/api/nest/setHVACMode/{id}", POST, set_hvac_mode))
        .service(resource("/api/nest/setLabel/{id}", POST, set_label));
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TargetQuery {
    /// Target temperature in the thermostat's scale
    temp: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RangeQuery {
    /// Target high temperature in the thermostat's scale
    high: Option<String>,

    /// Target low temperature in the thermostat's scale
    low: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ModeQuery {
    /// One of heat, cool, heat-cool, eco, off
    mode: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LabelQuery {
    /// Text identifying the thermostat
    label: Option<String>,
}

/// List all thermostats
///
/// # Path
///   `GET /api/nest/getThermostats`
///
/// # Responses
///   - `200`: [Vec] of [Thermostat]
///   - `500`: [String]
///   - `502`: [String]
///
#[utoipa::path(
    get,
    path = "/api/nest/getThermostats",
    responses(
        (status = 200, description = "OK", body = Vec<Thermostat>),
        (status = 500, description = "Missing credential", body = String),
        (status = 502, description = "Bad Gateway", body = String),
    ),
)]
pub async fn list(nest: Data<NestClient>) -> Result<impl Responder> {
    let thermostats = nest
        .thermostats()
        .await
        .map_err(failure("list thermostats"))?;
    Ok(HttpResponse::Ok().json(thermostats))
}

/// Read one thermostat
///
/// # Path
///   `GET /api/nest/getThermostat/{id}`
///
/// # Responses
///   - `200`: [Thermostat]
///   - `404`: [String]
///   - `502`: [String]
///
#[utoipa::path(
    get,
    path = "/api/nest/getThermostat/{id}",
    responses(
        (status = 200, description = "OK", body = Thermostat),
        (status = 404, description = "Not Found", body = String),
        (status = 502, description = "Bad Gateway", body = String),
    ),
    params(
        ("id" = String, Path, description = "Thermostat device ID"),
    )
)]
pub async fn read(id: Path<String>, nest: Data<NestClient>) -> Result<impl Responder> {
    let thermostat = nest
        .thermostat(&id)
        .await
        .map_err(failure("read thermostat"))?;
    Ok(HttpResponse::Ok().json(thermostat))
}

/// Set the target temperature
///
/// Only meaningful when the HVAC mode is not heat-cool. The value is read
/// in the thermostat's own scale: whole degrees for Fahrenheit, decimals
/// allowed for Celsius.
///
/// # Path
///   `POST /api/nest/setTargetTemperature/{id}?temp=`
///
/// # Responses
///   - `200`: [String]
///   - `400`: [String]
///   - `404`: [String]
///   - `502`: [String]
///
#[utoipa::path(
    post,
    path = "/api/nest/setTargetTemperature/{id}",
    responses(
        (status = 200, description = "OK", body = String),
        (status = 400, description = "Bad Request", body = String),
        (status = 404, description = "Not Found", body = String),
        (status = 502, description = "Bad Gateway", body = String),
    ),
    params(
        ("id" = String, Path, description = "Thermostat device ID"),
        TargetQuery,
    )
)]
pub async fn set_target_temperature(
    id: Path<String>,
    query: Query<TargetQuery>,
    nest: Data<NestClient>,
) -> Result<impl Responder> {
    let action = "set target temperature";
    let raw = required("temp", query.into_inner().temp).map_err(failure(action))?;

    let scale = nest.temperature_scale(&id).await.map_err(failure(action))?;
    let target = scale.parse(&raw, "temp").map_err(failure(action))?;

    nest.set_target_temperature(&id, target)
        .await
        .map_err(failure(action))?;

    info!("thermostat {id} target set to {target}");
    Ok(HttpResponse::Ok().json(format!("Target temperature set to {raw}")))
}

/// Set the target high and low temperatures
///
/// Only meaningful when the HVAC mode is heat-cool.
///
/// # Path
///   `POST /api/nest/setTargetHighLowTemperature/{id}?high=&low=`
///
/// # Responses
///   - `200`: [String]
///   - `400`: [String]
///   - `404`: [String]
///   - `502`: [String]
///
#[utoipa::path(
    post,
    path = "/api/nest/setTargetHighLowTemperature/{id}",
    responses(
        (status = 200, description = "OK", body = String),
        (status = 400, description = "Bad Request", body = String),
        (status = 404, description = "Not Found", body = String),
        (status = 502, description = "Bad Gateway", body = String),
    ),
    params(
        ("id" = String, Path, description = "Thermostat device ID"),
        RangeQuery,
    )
)]
pub async fn set_target_range(
    id: Path<String>,
    query: Query<RangeQuery>,
    nest: Data<NestClient>,
) -> Result<impl Responder> {
    let action = "set target range";
    let query = query.into_inner();
    let high = required("high", query.high).map_err(failure(action))?;
    let low = required("low", query.low).map_err(failure(action))?;

    let scale = nest.temperature_scale(&id).await.map_err(failure(action))?;
    let high_target = scale.parse(&high, "high").map_err(failure(action))?;
    let low_target = scale.parse(&low, "low").map_err(failure(action))?;

    nest.set_target_range(&id, high_target, low_target)
        .await
        .map_err(failure(action))?;

    info!("thermostat {id} range set to {low_target} - {high_target}");
    Ok(HttpResponse::Ok().json(format!(
        "Target high temperature set to {high}, and target low temperature set to {low}"
    )))
}

/// Set the HVAC mode
///
/// # Path
///   `POST /api/nest/setHVACMode/{id}?mode=`
///
/// # Responses
///   - `200`: [String]
///   - `400`: [String]
///   - `404`: [String]
///   - `502`: [String]
///
#[utoipa::path(
    post,
    path = "/api/nest/setHVACMode/{id}",
    responses(
        (status = 200, description = "OK", body = String),
        (status = 400, description = "Bad Request", body = String),
        (status = 404, description = "Not Found", body = String),
        (status = 502, description = "Bad Gateway", body = String),
    ),
    params(
        ("id" = String, Path, description = "Thermostat device ID"),
        ModeQuery,
    )
)]
pub async fn set_hvac_mode(
    id: Path<String>,
    query: Query<ModeQuery>,
    nest: Data<NestClient>,
) -> Result<impl Responder> {
    let action = "set hvac mode";
    let raw = required("mode", query.into_inner().mode).map_err(failure(action))?;
    let mode = HvacMode::from_str(&raw)
        .map_err(|_| {
            let valid: Vec<String> = HvacMode::iter().map(|m| m.to_string()).collect();
            Error::invalid_parameter("mode", &raw, &format!("must be one of {}", valid.join(", ")))
        })
        .map_err(failure(action))?;

    nest.set_hvac_mode(&id, mode)
        .await
        .map_err(failure(action))?;

    Ok(HttpResponse::Ok().json(format!("HVAC Mode set to {mode}")))
}

/// Set the thermostat label
///
/// # Path
///   `POST /api/nest/setLabel/{id}?label=`
///
/// # Responses
///   - `200`: [String]
///   - `400`: [String]
///   - `404`: [String]
///   - `502`: [String]
///
#[utoipa::path(
    post,
    path = "/api/nest/setLabel/{id}",
    responses(
        (status = 200, description = "OK", body = String),
        (status = 400, description = "Bad Request", body = String),
        (status = 404, description = "Not Found", body = String),
        (status = 502, description = "Bad Gateway", body = String),
    ),
    params(
        ("id" = String, Path, description = "Thermostat device ID"),
        LabelQuery,
    )
)]
pub async fn set_label(
    id: Path<String>,
    query: Query<LabelQuery>,
    nest: Data<NestClient>,
) -> Result<impl Responder> {
    let action = "set label";
    let label = required("label", query.into_inner().label).map_err(failure(action))?;

    nest.set_label(&id, &label).await.map_err(failure(action))?;

    Ok(HttpResponse::Ok().json(format!("Label set to {label}")))
}
