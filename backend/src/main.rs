//! # Cliente Service Backend
//!
//! This is the main entry point for the backend service that manages
//! clients, their accounts and transfers between them. It provides:
//!
//! - REST API for registration, login and balance queries
//! - Transfers between the primary accounts of two clients
//! - Name lookups for clients and stores
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        BACKEND SERVICE                           │
//! │                                                                  │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │                    REST API (Actix)                        │  │
//! │  │  /auth/*   /cuenta/*   /cliente/*   /persona*   /tienda*   │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! │                          │                                       │
//! │  ┌───────────────────────┴───────────────────────────────────┐  │
//! │  │                    SERVICE LAYER                           │  │
//! │  │                   ClienteService                           │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! │                          │                                       │
//! │         ┌────────────────┴────────────────┐                     │
//! │         │                                 │                      │
//! │  ┌──────┴──────┐                   ┌──────┴──────┐              │
//! │  │  PostgreSQL │                   │  In-memory  │              │
//! │  │  Database   │                   │  Store      │              │
//! │  └─────────────┘                   └─────────────┘              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! 1. Set up PostgreSQL and create the database
//! 2. Copy `.env.example` to `.env` and configure
//! 3. Start the server: `cargo run` (the schema is created on startup)
//!
//! Set `STORE_BACKEND=memory` to run without a database.
//!
//! ## Environment Variables
//!
//! See `.env.example` for all supported configuration.

use std::io;
use std::sync::Arc;

use actix_web::{middleware, web, App, HttpServer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod db;
mod models;
mod services;
mod utils;

use config::{AppConfig, StoreBackend};
use db::{ClienteStore, Database, MemoryStore};
use services::ClienteService;

/// Application state shared across all handlers.
///
/// Wrapped in an `Arc` and registered once per worker as
/// `web::Data<Arc<AppState>>`.
pub struct AppState {
    /// Business logic over the configured store
    pub service: ClienteService,
}

/// Main entry point for the backend service.
///
/// This function:
/// 1. Initializes logging
/// 2. Loads configuration from environment
/// 3. Opens the configured store
/// 4. Launches the HTTP server
#[actix_web::main]
async fn main() -> io::Result<()> {
    // =========================================
    // STEP 1: Initialize Logging
    // =========================================
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .try_init()
        .map_err(|e| io::Error::other(format!("Failed to set tracing subscriber: {}", e)))?;

    info!("Starting Cliente Service");

    // =========================================
    // STEP 2: Load Configuration
    // =========================================
    dotenvy::dotenv().ok(); // It's okay if .env doesn't exist

    let config = AppConfig::from_env().map_err(io::Error::other)?;

    info!("Configuration loaded");
    info!("   Store backend: {:?}", config.store_backend);
    info!("   Initial balance: {}", config.initial_balance);

    // =========================================
    // STEP 3: Initialize Store
    // =========================================
    let store: Arc<dyn ClienteStore> = match config.store_backend {
        StoreBackend::Postgres => {
            // from_env guarantees a URL for this backend
            let database_url = config.database_url.as_deref().unwrap_or_default();
            let db = Database::connect(database_url, config.db_pool_size)
                .await
                .map_err(io::Error::other)?;

            if config.init_schema {
                db.ensure_schema().await.map_err(io::Error::other)?;
            }

            Arc::new(db)
        }
        StoreBackend::Memory => {
            warn!("Using in-memory store; data is lost on shutdown");
            Arc::new(MemoryStore::new())
        }
    };

    // =========================================
    // STEP 4: Create Application State
    // =========================================
    let app_state = Arc::new(AppState {
        service: ClienteService::new(store, config.initial_balance),
    });

    // =========================================
    // STEP 5: Start HTTP Server
    // =========================================
    let server_host = config.server_host.clone();
    let server_port = config.server_port;

    info!("Starting HTTP server on {}:{}", server_host, server_port);

    HttpServer::new(move || {
        App::new()
            // Attach shared application state
            .app_data(web::Data::new(app_state.clone()))
            // JSON bodies that fail to parse get a JSON 400
            .app_data(api::json_config())
            // Add logging middleware
            .wrap(middleware::Logger::default())
            // Configure API routes
            .configure(api::configure_routes)
    })
    .bind((server_host, server_port))?
    .run()
    .await
}
