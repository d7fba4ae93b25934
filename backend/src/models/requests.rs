//! # API Request Models
//!
//! Structures for incoming API request bodies.
//! Each struct represents the expected JSON body for an endpoint.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Request to register a new client.
///
/// ## Example JSON
///
/// ```json
/// {
///     "nombre": "Ana López",
///     "telefono": "55 1234 5678"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Display name. Trimmed; must not be empty.
    pub nombre: String,

    /// Phone number in any common notation; stored normalized.
    pub telefono: String,
}

/// Request to log in with a phone number.
///
/// ```json
/// { "telefono": "5512345678" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub telefono: String,
}

/// Body of `GET /cliente/`.
///
/// ```json
/// { "remitente_id": 1 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaldoRemitenteRequest {
    pub remitente_id: i64,
}

/// Request to transfer money to another client.
///
/// The sender comes from the path (`/cliente/{remitente_id}/monto`).
///
/// ## Example JSON
///
/// ```json
/// {
///     "destinatarioId": 2,
///     "monto": 150.75
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// Client receiving the money.
    pub destinatario_id: i64,

    /// Amount to move. Positive, at most two decimals.
    pub monto: Decimal,
}

/// One element of the `GET /personas/nombre` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaIdRequest {
    pub id: i64,
}

/// One element of the `GET /tiendas/nombre` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TiendaIdRequest {
    pub tienda_id: i64,
}
