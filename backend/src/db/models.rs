//! # Database Models
//!
//! This module defines the data structures that map to database tables.
//!
//! ## Table Overview
//!
//! | Table | Description |
//! |-------|-------------|
//! | `clientes` | Registered people, unique by phone number |
//! | `cuentas` | Monetary accounts owned by a client |
//! | `tiendas` | Stores, referenced by id/name lookups only |
//!
//! ## Relationship Diagram
//!
//! ```text
//! ┌─────────────┐       ┌──────────────────┐
//! │  clientes   │──────<│     cuentas      │
//! │             │       │                  │
//! │ id (PK)     │       │ id (PK)          │
//! │ nombre      │       │ cliente_id (FK)  │
//! │ telefono    │       │ saldo            │
//! └─────────────┘       └──────────────────┘
//!
//! ┌─────────────┐
//! │   tiendas   │
//! │ id (PK)     │
//! │ nombre      │
//! └─────────────┘
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A registered client together with the accounts it owns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cliente {
    /// Primary key.
    pub id: i64,

    /// Display name.
    pub nombre: String,

    /// Normalized phone number. Unique across clients.
    pub telefono: String,

    /// Owned accounts, ordered by ascending id.
    pub cuentas: Vec<Cuenta>,
}

impl Cliente {
    /// The account used for "the client's balance": the lowest account id.
    pub fn cuenta_principal(&self) -> Option<&Cuenta> {
        self.cuentas.iter().min_by_key(|c| c.id)
    }
}

/// A monetary account.
///
/// `saldo` is never negative; the transfer operation and the
/// `CHECK (saldo >= 0)` constraint both enforce it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cuenta {
    pub id: i64,
    pub cliente_id: i64,
    pub saldo: Decimal,
}

/// Id and name of a client, without its accounts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Persona {
    pub id: i64,
    pub nombre: String,
}

/// A store referenced by id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tienda {
    pub id: i64,
    pub nombre: String,
}

/// Fields needed to insert a client. Already validated and normalized.
#[derive(Debug, Clone)]
pub struct NuevoCliente {
    pub nombre: String,
    pub telefono: String,
    /// Balance of the primary account opened with the client.
    pub saldo_inicial: Decimal,
}

/// Balances after a committed transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRecord {
    pub cuenta_origen: i64,
    pub cuenta_destino: i64,
    pub monto: Decimal,
    pub saldo_origen: Decimal,
    pub saldo_destino: Decimal,
}
