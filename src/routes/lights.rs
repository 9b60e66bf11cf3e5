//! Hue light routes

use actix_web::{
    web::{Data, Path, Query, ServiceConfig},
    HttpResponse, Responder, Result,
};
use log::info;

use super::{failure, resource, GET, WRITE};
use crate::hue::{ColorCommand, HueClient, Light};
use crate::Error;

pub(crate) fn configure(cfg: &mut ServiceConfig) {
    cfg.service(resource("/api/hue/getLights", GET, list))
        .service(resource("/api/hue/getLight/{id}", GET, read))
        .service(resource("/api/hue/turnOnLight/{id}", WRITE, turn_on))
        .service(resource("/api/hue/turnOffLight/{id}", WRITE, turn_off));
}

/// Bridge light ids are decimal numbers
fn light_id(raw: &str) -> Result<&str, Error> {
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        Ok(raw)
    } else {
        Err(Error::invalid_parameter("light id", raw, "must be a number"))
    }
}

/// List all lights on the bridge
///
/// Entries the bridge reports which cannot be decoded are left out and
/// logged.
///
/// # Path
///   `GET /api/hue/getLights`
///
/// # Responses
///   - `200`: [Vec] of [crate::hue::Light]
///   - `500`: [String]
///   - `502`: [String]
///   - `503`: [String]
///
#[utoipa::path(
    get,
    path = "/api/hue/getLights",
    responses(
        (status = 200, description = "OK", body = Vec<Light>),
        (status = 500, description = "Missing credential", body = String),
        (status = 502, description = "Bridge unreachable or invalid reply", body = String),
        (status = 503, description = "No bridge discovered", body = String),
    ),
)]
pub async fn list(hue: Data<HueClient>) -> Result<impl Responder> {
    let directory = hue.get_lights().await.map_err(failure("list lights"))?;
    Ok(HttpResponse::Ok().json(directory.lights()))
}

/// Read a single light
///
/// # Path
///   `GET /api/hue/getLight/{id}`
///
/// # Responses
///   - `200`: [crate::hue::Light]
///   - `400`: [String]
///   - `404`: [String]
///   - `502`: [String]
///
#[utoipa::path(
    get,
    path = "/api/hue/getLight/{id}",
    responses(
        (status = 200, description = "OK", body = Light),
        (status = 400, description = "Bad Request", body = String),
        (status = 404, description = "Not Found", body = String),
        (status = 502, description = "Bad Gateway", body = String),
    ),
    params(
        ("id" = String, Path, description = "Light ID"),
    )
)]
pub async fn read(id: Path<String>, hue: Data<HueClient>) -> Result<impl Responder> {
    let id = light_id(&id).map_err(failure("read light"))?;
    let light = hue.light(id).await.map_err(failure("read light"))?;
    Ok(HttpResponse::Ok().json(light))
}

/// Turn a light on, optionally changing its color
///
/// Without any of the color parameters (or with all of them at zero) this
/// only turns the light on. Otherwise only the given parameters are sent.
///
/// # Path
///   `POST /api/hue/turnOnLight/{id}?x=&y=&bri=&hue=&sat=`
///
/// # Responses
///   - `200`: [String]
///   - `400`: [String]
///   - `404`: [String]
///   - `502`: [String]
///
#[utoipa::path(
    post,
    path = "/api/hue/turnOnLight/{id}",
    responses(
        (status = 200, description = "OK", body = String),
        (status = 400, description = "Bad Request", body = String),
        (status = 404, description = "Not Found", body = String),
        (status = 502, description = "Bad Gateway", body = String),
    ),
    params(
        ("id" = String, Path, description = "Light ID"),
        ColorCommand,
    )
)]
pub async fn turn_on(
    id: Path<String>,
    color: Query<ColorCommand>,
    hue: Data<HueClient>,
) -> Result<impl Responder> {
    let id = light_id(&id).map_err(failure("turn on light"))?;
    let color = color.into_inner();

    hue.set_color_state(id, &color)
        .await
        .map_err(failure("turn on light"))?;

    info!("light {id} turned on");
    Ok(HttpResponse::Ok().json("Success"))
}

/// Turn a light off
///
/// # Path
///   `POST /api/hue/turnOffLight/{id}`
///
/// # Responses
///   - `200`: [String]
///   - `400`: [String]
///   - `404`: [String]
///   - `502`: [String]
///
#[utoipa::path(
    post,
    path = "/api/hue/turnOffLight/{id}",
    responses(
        (status = 200, description = "OK", body = String),
        (status = 400, description = "Bad Request", body = String),
        (status = 404, description = "Not Found", body = String),
        (status = 502, description = "Bad Gateway", body = String),
    ),
    params(
        ("id" = String, Path, description = "Light ID"),
    )
)]
pub async fn turn_off(id: Path<String>, hue: Data<HueClient>) -> Result<impl Responder> {
    let id = light_id(&id).map_err(failure("turn off light"))?;

    hue.set_power(id, false)
        .await
        .map_err(failure("turn off light"))?;

    info!("light {id} turned off");
    Ok(HttpResponse::Ok().json("Success"))
}
