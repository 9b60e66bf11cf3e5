//! HTTP routes of the gateway

use actix_web::{
    http::{header, Method, StatusCode},
    web::{self, ServiceConfig},
    FromRequest, Handler, HttpRequest, HttpResponse, Resource, Responder, ResponseError,
};
use log::error;

use crate::errors::{Error, ErrorKind};

pub mod health;
pub mod lights;
pub mod thermostats;

pub(crate) const GET: &[Method] = &[Method::GET];
pub(crate) const POST: &[Method] = &[Method::POST];
pub(crate) const WRITE: &[Method] = &[Method::POST, Method::PUT];

/// Register every gateway route
pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(resource("/api/ping", GET, health::ping));
    lights::configure(cfg);
    thermostats::configure(cfg);
}

/// A resource serving `handler` for the `allowed` methods only
///
/// Any other method is answered with 405 and the list of allowed ones.
///
pub(crate) fn resource<F, Args>(path: &str, allowed: &'static [Method], handler: F) -> Resource
where
    F: Handler<Args>,
    Args: FromRequest + 'static,
    F::Output: Responder + 'static,
{
    let mut resource = web::resource(path);
    for method in allowed {
        resource = resource.route(web::method(method.clone()).to(handler.clone()));
    }
    resource.default_service(web::to(move |req: HttpRequest| async move {
        method_not_allowed(&req, allowed)
    }))
}

fn method_not_allowed(req: &HttpRequest, allowed: &[Method]) -> HttpResponse {
    let names: Vec<&str> = allowed.iter().map(Method::as_str).collect();
    HttpResponse::MethodNotAllowed()
        .insert_header((header::ALLOW, names.join(", ")))
        .body(format!(
            "HTTP request method must be one of the following {:?} for {}",
            names,
            req.uri()
        ))
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::NoBridge => StatusCode::SERVICE_UNAVAILABLE,
            Error::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => match self.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Config => StatusCode::INTERNAL_SERVER_ERROR,
                ErrorKind::Network | ErrorKind::Protocol => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

/// Log a failed request and hand the error to actix
pub(crate) fn failure(action: &str) -> impl Fn(Error) -> actix_web::Error + '_ {
    move |e| {
        match e.kind() {
            ErrorKind::Validation | ErrorKind::NotFound => log::warn!("Failed to {action}: {e}"),
            _ => error!("Failed to {action}: {e}"),
        }
        e.into()
    }
}

/// A query parameter which has to be present and non-blank
pub(crate) fn required(name: &str, value: Option<String>) -> Result<String, Error> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(Error::invalid_parameter(name, "", "must be provided")),
    }
}
