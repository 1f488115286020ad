#[macro_use]
extern crate diesel;

use std::io;

use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenvy::dotenv;
use log::{error, info};

mod api;
mod db;
mod db_config;
mod errors;
mod logic;
mod router;
mod schema;
mod storage;

use db_config::AppConfig;
use storage::build_storage;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init();
    let config = AppConfig::from_env();

    let storage = build_storage(&config).map_err(|error| {
        error!("Storage initialization failed: {}", error);
        io::Error::new(io::ErrorKind::Other, error)
    })?;
    let storage = web::Data::new(storage);

    info!("Listening on {}", config.bind_address);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(storage.clone())
            .configure(router::configure)
            .default_service(web::route().to(router::not_found))
    })
    .bind(&config.bind_address)?
    .run()
    .await
}
