use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod repository;
mod routes;

use auth::TokenService;
use config::Config;
use routes::AppState;

fn cors(origins: &[String]) -> Cors {
    origins.iter().fold(
        Cors::default()
            .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE"])
            .allow_any_header()
            .supports_credentials()
            .max_age(3600),
        |cors, origin| cors.allowed_origin(origin),
    )
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("FATAL: {}", e);
        io::Error::new(io::ErrorKind::Other, e)
    })?;

    let database = db::Database::connect(&config.database_url, &config.database_name)
        .await
        .map_err(|e| {
            log::error!("FATAL: could not connect to MongoDB: {}", e);
            io::Error::new(io::ErrorKind::Other, e)
        })?;

    let state = AppState::new(
        Arc::new(database.foods()),
        Arc::new(database.orders()),
        Arc::new(database.users()),
        TokenService::new(&config.jwt_secret, config.secure_cookies),
    );
    let origins = config.allowed_origins.clone();

    log::info!("server is running on {}:{}", config.host, config.port);

    let served = HttpServer::new(move || {
        App::new()
            .wrap(cors(&origins))
            // Logger goes last so it sees every response, CORS rejections included.
            .wrap(Logger::default())
            .configure(|cfg| routes::configure(cfg, &state))
            .default_service(web::to(routes::not_found))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await;

    database.shutdown().await;
    served
}
