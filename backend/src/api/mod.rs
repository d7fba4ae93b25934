//! # REST API Module
//!
//! This module defines all HTTP endpoints of the cliente service.
//!
//! ## Endpoint Overview
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | POST | `/auth/register` | Register a client |
//! | POST | `/auth/login` | Log in by phone number |
//! | GET | `/cuenta/{id}/saldo` | Account balance |
//! | GET | `/cliente/` | Primary balance of `remitente_id` (JSON body) |
//! | PUT | `/cliente/{remitente_id}/monto` | Transfer to another client |
//! | GET | `/personas/nombre` | Client names for a list of ids |
//! | GET | `/persona/telefono/{telefono}` | Client id by phone |
//! | GET | `/tiendas/nombre` | Store names for a list of ids |
//! | GET | `/tienda/{tienda_id}/nombre` | Store name |
//! | GET | `/health` | Health check |
//!
//! ## Request/Response Format
//!
//! Bodies are bare JSON objects, not wrapped in an envelope:
//!
//! ```json
//! // Success
//! { "id": 7 }
//!
//! // Error
//! { "error": "Tienda no encontrada" }
//! ```
//!
//! The transfer route is the exception: it answers in plain text.

pub mod routes;
pub mod handlers;

use actix_web::{error::InternalError, web, HttpResponse};
use tracing::warn;

use crate::models::ErrorResponse;

pub use routes::configure_routes;

/// JSON extractor settings shared by every route.
///
/// A malformed or incomplete body becomes `400 {"error": "<reason>"}`
/// instead of actix-web's default plain-text error.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req| {
        warn!("Rejected JSON body on {}: {}", req.path(), err);
        let response = HttpResponse::BadRequest().json(ErrorResponse::message(err.to_string()));
        InternalError::from_response(err, response).into()
    })
}
