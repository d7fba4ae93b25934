//! # API Route Configuration
//!
//! This module sets up all the HTTP routes for the API.

use actix_web::web;

use super::handlers;

/// Configure all API routes.
///
/// This function is called from main.rs to set up
/// all the endpoint routes.
///
/// ## Route Structure
///
/// ```text
/// /
/// ├── /health                          GET - Health check
/// ├── /auth
/// │   ├── /register                    POST - Register client
/// │   └── /login                       POST - Log in
/// ├── /cuenta/{id}/saldo               GET - Account balance
/// ├── /cliente
/// │   ├── /                            GET - Sender balance
/// │   └── /{remitente_id}/monto        PUT - Transfer
/// ├── /personas/nombre                 GET - Client names
/// ├── /persona/telefono/{telefono}     GET - Client id by phone
/// ├── /tiendas/nombre                  GET - Store names
/// └── /tienda/{tienda_id}/nombre       GET - Store name
/// ```
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        // Health check endpoint
        .route("/health", web::get().to(handlers::health_check))

        // Registration and login
        .service(
            web::scope("/auth")
                .route("/register", web::post().to(handlers::register))
                .route("/login", web::post().to(handlers::login))
        )

        // Account balance
        .route("/cuenta/{id}/saldo", web::get().to(handlers::get_saldo))

        // Sender balance and transfers
        .service(
            web::scope("/cliente")
                .route("/", web::get().to(handlers::get_saldo_remitente))
                .route("/{remitente_id}/monto", web::put().to(handlers::transfer_monto))
        )

        // Name lookups
        .route("/personas/nombre", web::get().to(handlers::get_personas_nombres))
        .route(
            "/persona/telefono/{telefono}",
            web::get().to(handlers::get_cliente_por_telefono),
        )
        .route("/tiendas/nombre", web::get().to(handlers::get_tiendas_nombres))
        .route("/tienda/{tienda_id}/nombre", web::get().to(handlers::get_nombre_tienda));
}
