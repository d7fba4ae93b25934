//! # API Response Models
//!
//! Structures for outgoing API response bodies.
//!
//! Unlike a generic envelope, every route returns the bare object its
//! clients expect, e.g. `{"id": 7}` or `{"error": "Tienda no encontrada"}`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// `{"id": ...}` - returned by register, login and phone lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdResponse {
    pub id: i64,
}

/// Account balance.
///
/// Returned by `GET /cuenta/{id}/saldo`
///
/// ```json
/// { "saldo": 1500.25 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaldoResponse {
    pub saldo: Decimal,
}

/// Primary account balance of a client.
///
/// Returned by `GET /cliente/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaldoRemitenteResponse {
    pub saldo_remitente: Decimal,
}

/// Name record returned by `GET /personas/nombre`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersonaNombre {
    pub id: i64,
    pub nombre: String,
}

/// Name record returned by `GET /tiendas/nombre`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TiendaNombre {
    pub tienda_id: i64,
    pub nombre_tienda: String,
}

/// Returned by `GET /tienda/{tienda_id}/nombre`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NombreTiendaResponse {
    pub nombre_tienda: String,
}

/// Error body: `{"error": ...}`.
///
/// The payload type varies by route for compatibility with existing
/// clients: a message string on most routes, the bare status code on
/// login and phone lookup (`400`) and on balance lookup (`404.0`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse<T> {
    pub error: T,
}

impl<T> ErrorResponse<T> {
    pub fn new(error: T) -> Self {
        Self { error }
    }
}

impl ErrorResponse<String> {
    /// Error body carrying a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(message.into())
    }
}

/// Health check response.
///
/// Returned by `GET /health`
///
/// ```json
/// {
///     "status": "healthy",
///     "store": true,
///     "version": "0.1.0",
///     "timestamp": "2026-01-10T12:00:00Z"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status: "healthy" or "unhealthy".
    pub status: String,

    /// Whether the backing store answered.
    pub store: bool,

    /// Service version.
    pub version: String,

    /// Current timestamp.
    pub timestamp: DateTime<Utc>,
}
