// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, persistence, and start HTTP server

mod auth;
mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod services;

use actix_web::{middleware::Logger, web, App, HttpServer};
use auth::JwtVerifier;
use config::{Config, StoreBackend};
use db::{MemoryPlaceStore, PgPlaceStore, PlaceStore};
use dotenv::dotenv;
use std::io;
use std::sync::Arc;

/// Build the configured persistence backend
async fn init_store(config: &Config) -> anyhow::Result<Arc<dyn PlaceStore>> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let pool = config::init_db_pool(config).await?;
            Ok(Arc::new(PgPlaceStore::new(pool)))
        }
        StoreBackend::Memory => {
            log::warn!("Using in-memory store - data is lost on restart");
            let store = match &config.memory_seed_path {
                Some(path) => MemoryPlaceStore::from_seed_file(path).await?,
                None => MemoryPlaceStore::new(),
            };
            Ok(Arc::new(store))
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        let log_level = if !config.log_level.is_empty() {
            &config.log_level
        } else {
            "info,actix_web=info,sqlx=warn"
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    if let Err(e) = config.validate() {
        log::error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    log::info!("Starting places-api...");
    log::info!("Environment: {}", config.environment);
    log::info!("Response mode: {:?}", config.response_mode);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Initialize persistence
    let store = match init_store(&config).await {
        Ok(store) => store,
        Err(e) => {
            log::error!("Failed to initialize {:?} store: {:#}", config.store_backend, e);
            std::process::exit(1);
        }
    };
    log::info!("Store backend: {}", store.backend_name());

    // 5. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);
    let store = web::Data::from(store);
    let mode = web::Data::new(config.response_mode);
    let verifier = web::Data::new(JwtVerifier::new(&config.jwt_secret));

    HttpServer::new(move || {
        App::new()
            // Application state (store, response mode, token verifier)
            .app_data(store.clone())
            .app_data(mode.clone())
            .app_data(verifier.clone())
            // Middleware
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            // Routes
            .configure(handlers::health_config)
            .configure(handlers::places_config)
    })
    .bind(&server_addr)?
    .run()
    .await
}
