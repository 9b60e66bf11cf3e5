//! Gateway health route

use actix_web::{web::Data, HttpResponse, Responder, Result};
use serde::Serialize;
use utoipa::ToSchema;

use crate::hue::HueClient;

/// Health report
#[derive(Debug, Serialize, ToSchema)]
pub struct Health {
    status: &'static str,

    /// Whether the bridge session has been built yet
    bridge_session: bool,
}

/// Simple ping route
///
/// Never contacts a vendor, only reports whether the bridge session exists.
///
/// # Path
///   `GET /api/ping`
///
/// # Responses
///   - `200`: [Health]
///
#[utoipa::path(
    get,
    path = "/api/ping",
    responses(
        (status = 200, description = "OK", body = Health),
    ),
)]
pub async fn ping(hue: Data<HueClient>) -> Result<impl Responder> {
    Ok(HttpResponse::Ok().json(Health {
        status: "ok",
        bridge_session: hue.session_ready(),
    }))
}
