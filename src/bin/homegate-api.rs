use std::{env, error::Error, net::Ipv4Addr, sync::Arc};

use actix_cors::Cors;
use actix_web::{http::header, middleware::Logger, web::Data, App, HttpServer, Result};
use log::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use homegate::{
    health, hue, lights, nest, thermostats, transport::HttpTransport, Config,
};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn Error>> {
    if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    #[derive(OpenApi)]
    #[openapi(
        paths(
            health::ping,
            lights::list,
            lights::read,
            lights::turn_on,
            lights::turn_off,
            thermostats::list,
            thermostats::read,
            thermostats::set_target_temperature,
            thermostats::set_target_range,
            thermostats::set_hvac_mode,
            thermostats::set_label,
        ),
        components(schemas(
            health::Health,
            hue::Light,
            hue::LightState,
            hue::Chromaticity,
            hue::ColorMode,
            hue::ColorCommand,
            nest::Thermostat,
            nest::HvacMode,
            nest::TemperatureScale,
        ))
    )]
    struct ApiDoc;

    let openapi = ApiDoc::openapi();

    let config = Config::from_env();
    let transport = Arc::new(HttpTransport::new(config.timeout)?);

    let hue = Data::new(hue::HueClient::from_config(&config, transport.clone()));
    let nest = Data::new(nest::NestClient::from_config(&config, transport));

    match &config.bridge_address {
        Some(address) => info!("Using bridge at {address}"),
        None => info!("Bridge will be discovered through {}", config.discovery_url),
    }

    let port = config.port;
    info!("Listening on port: {port}");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&config.cors_origin)
            .allow_any_method()
            .allowed_header(header::CONTENT_TYPE)
            .max_age(600);

        App::new()
            .wrap(cors)
            .app_data(Data::clone(&hue))
            .app_data(Data::clone(&nest))
            .wrap(Logger::default())
            .configure(homegate::configure)
            .service(
                SwaggerUi::new("/api/swagger-ui/{_:.*}")
                    .url("/api/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((Ipv4Addr::UNSPECIFIED, port))?
    .run()
    .await?;

    Ok(())
}
