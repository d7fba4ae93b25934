//! # Database Queries
//!
//! This module contains all the SQL for the PostgreSQL store.
//! Each function performs a specific database operation.
//!
//! ## Query Organization
//!
//! Queries are grouped by the table they operate on:
//! - `cliente_*` - Client table operations (plus their accounts)
//! - `cuenta_*` - Account reads and the transfer
//! - `tienda_*` - Store lookups
//!
//! ## Error Handling
//!
//! All queries return `Result<T, DatabaseError>`. Lookups return
//! `Ok(None)` for missing rows; `NotFound` is reserved for writes that
//! reference a missing row.

use std::collections::HashMap;

use deadpool_postgres::{Object, Pool};
use rust_decimal::Decimal;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, Row};
use tracing::{debug, info, warn};

use super::models::*;
use super::DatabaseError;
use crate::utils::mask_telefono;

// ============================================
// HELPER FUNCTIONS
// ============================================

async fn get_client(pool: &Pool) -> Result<Object, DatabaseError> {
    pool.get()
        .await
        .map_err(|e| DatabaseError::ConnectionError(e.to_string()))
}

fn row_to_cuenta(row: &Row) -> Cuenta {
    Cuenta {
        id: row.get("id"),
        cliente_id: row.get("cliente_id"),
        saldo: row.get("saldo"),
    }
}

/// Load the accounts of a client, lowest id first.
async fn get_cuentas_for_cliente(
    client: &Client,
    cliente_id: i64,
) -> Result<Vec<Cuenta>, DatabaseError> {
    let rows = client
        .query(
            r#"
            SELECT id, cliente_id, saldo
            FROM cuentas
            WHERE cliente_id = $1
            ORDER BY id ASC
            "#,
            &[&cliente_id],
        )
        .await?;

    Ok(rows.iter().map(row_to_cuenta).collect())
}

/// Turn an optional client row into a `Cliente` with its accounts.
async fn hydrate_cliente(client: &Client, row: Option<Row>) -> Result<Option<Cliente>, DatabaseError> {
    let Some(row) = row else {
        return Ok(None);
    };

    let id: i64 = row.get("id");
    let cuentas = get_cuentas_for_cliente(client, id).await?;

    Ok(Some(Cliente {
        id,
        nombre: row.get("nombre"),
        telefono: row.get("telefono"),
        cuentas,
    }))
}

// ============================================
// CLIENTE QUERIES
// ============================================

/// Insert a client and its primary account in one transaction.
pub async fn insert_cliente(pool: &Pool, nuevo: &NuevoCliente) -> Result<Cliente, DatabaseError> {
    debug!("Inserting cliente with telefono: {}", mask_telefono(&nuevo.telefono));

    let mut client = get_client(pool).await?;
    let tx = client.transaction().await?;

    let row = match tx
        .query_one(
            r#"
            INSERT INTO clientes (nombre, telefono)
            VALUES ($1, $2)
            RETURNING id
            "#,
            &[&nuevo.nombre, &nuevo.telefono],
        )
        .await
    {
        Ok(row) => row,
        Err(e) if e.code() == Some(&SqlState::UNIQUE_VIOLATION) => {
            return Err(DatabaseError::Duplicate(format!(
                "telefono {}",
                mask_telefono(&nuevo.telefono)
            )));
        }
        Err(e) => return Err(e.into()),
    };
    let cliente_id: i64 = row.get("id");

    let cuenta_row = tx
        .query_one(
            r#"
            INSERT INTO cuentas (cliente_id, saldo)
            VALUES ($1, $2)
            RETURNING id, cliente_id, saldo
            "#,
            &[&cliente_id, &nuevo.saldo_inicial],
        )
        .await?;

    tx.commit().await?;

    info!("Cliente {} created", cliente_id);
    Ok(Cliente {
        id: cliente_id,
        nombre: nuevo.nombre.clone(),
        telefono: nuevo.telefono.clone(),
        cuentas: vec![row_to_cuenta(&cuenta_row)],
    })
}

/// Get a client by id.
pub async fn get_cliente_by_id(pool: &Pool, id: i64) -> Result<Option<Cliente>, DatabaseError> {
    debug!("Fetching cliente: {}", id);

    let client = get_client(pool).await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, nombre, telefono
            FROM clientes
            WHERE id = $1
            "#,
            &[&id],
        )
        .await?;

    hydrate_cliente(&client, row).await
}

/// Get a client by its normalized phone number.
pub async fn get_cliente_by_telefono(
    pool: &Pool,
    telefono: &str,
) -> Result<Option<Cliente>, DatabaseError> {
    debug!("Fetching cliente by telefono: {}", mask_telefono(telefono));

    let client = get_client(pool).await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, nombre, telefono
            FROM clientes
            WHERE telefono = $1
            "#,
            &[&telefono],
        )
        .await?;

    hydrate_cliente(&client, row).await
}

/// Get id and name for every client in `ids`.
pub async fn get_personas_by_ids(pool: &Pool, ids: &[i64]) -> Result<Vec<Persona>, DatabaseError> {
    debug!("Fetching names for {} clientes", ids.len());

    let client = get_client(pool).await?;
    let rows = client
        .query(
            r#"
            SELECT id, nombre
            FROM clientes
            WHERE id = ANY($1)
            "#,
            &[&ids],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| Persona {
            id: row.get("id"),
            nombre: row.get("nombre"),
        })
        .collect())
}

// ============================================
// CUENTA QUERIES
// ============================================

/// Get an account by id.
pub async fn get_cuenta(pool: &Pool, id: i64) -> Result<Option<Cuenta>, DatabaseError> {
    debug!("Fetching cuenta: {}", id);

    let client = get_client(pool).await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, cliente_id, saldo
            FROM cuentas
            WHERE id = $1
            "#,
            &[&id],
        )
        .await?;

    Ok(row.as_ref().map(row_to_cuenta))
}

/// Look up the primary account of `cliente_id` in a `cliente -> cuenta` map.
fn resolve_cuenta_principal(
    primary: &HashMap<i64, Option<i64>>,
    cliente_id: i64,
    role: &str,
) -> Result<i64, DatabaseError> {
    match primary.get(&cliente_id) {
        None => Err(DatabaseError::NotFound(format!(
            "{} no encontrado: {}",
            role, cliente_id
        ))),
        Some(None) => Err(DatabaseError::NotFound(format!(
            "El {} {} no tiene cuentas asociadas",
            role.to_lowercase(),
            cliente_id
        ))),
        Some(Some(cuenta_id)) => Ok(*cuenta_id),
    }
}

/// Move `monto` between the primary accounts of two clients.
///
/// Runs in a single transaction. Both account rows are locked with
/// `FOR UPDATE` in ascending id order so concurrent transfers in opposite
/// directions cannot deadlock. Any early return drops the transaction,
/// which rolls it back.
pub async fn transfer_between_clientes(
    pool: &Pool,
    remitente_id: i64,
    destinatario_id: i64,
    monto: Decimal,
) -> Result<TransferRecord, DatabaseError> {
    debug!(
        "Transferring {} from cliente {} to cliente {}",
        monto, remitente_id, destinatario_id
    );

    let mut client = get_client(pool).await?;
    let tx = client.transaction().await?;

    let cliente_ids = vec![remitente_id, destinatario_id];
    let rows = tx
        .query(
            r#"
            SELECT
                c.id AS cliente_id,
                (SELECT cu.id FROM cuentas cu
                 WHERE cu.cliente_id = c.id
                 ORDER BY cu.id ASC
                 LIMIT 1) AS cuenta_id
            FROM clientes c
            WHERE c.id = ANY($1)
            "#,
            &[&cliente_ids],
        )
        .await?;

    let primary: HashMap<i64, Option<i64>> = rows
        .iter()
        .map(|row| {
            (
                row.get::<_, i64>("cliente_id"),
                row.get::<_, Option<i64>>("cuenta_id"),
            )
        })
        .collect();

    let cuenta_origen = resolve_cuenta_principal(&primary, remitente_id, "Remitente")?;
    let cuenta_destino = resolve_cuenta_principal(&primary, destinatario_id, "Destinatario")?;

    let cuenta_ids = vec![cuenta_origen, cuenta_destino];
    let locked = tx
        .query(
            r#"
            SELECT id, saldo
            FROM cuentas
            WHERE id = ANY($1)
            ORDER BY id ASC
            FOR UPDATE
            "#,
            &[&cuenta_ids],
        )
        .await?;

    let saldo_actual = locked
        .iter()
        .find(|row| row.get::<_, i64>("id") == cuenta_origen)
        .map(|row| row.get::<_, Decimal>("saldo"))
        .ok_or_else(|| DatabaseError::NotFound(format!("Cuenta no encontrada: {}", cuenta_origen)))?;

    if saldo_actual < monto {
        warn!(
            "Transfer rejected: cuenta {} has {}, requested {}",
            cuenta_origen, saldo_actual, monto
        );
        return Err(DatabaseError::InsufficientFunds {
            available: saldo_actual,
            requested: monto,
        });
    }

    let saldo_origen: Decimal = tx
        .query_one(
            r#"
            UPDATE cuentas
            SET saldo = saldo - $2
            WHERE id = $1
            RETURNING saldo
            "#,
            &[&cuenta_origen, &monto],
        )
        .await?
        .get("saldo");

    let saldo_destino: Decimal = tx
        .query_one(
            r#"
            UPDATE cuentas
            SET saldo = saldo + $2
            WHERE id = $1
            RETURNING saldo
            "#,
            &[&cuenta_destino, &monto],
        )
        .await?
        .get("saldo");

    tx.commit().await?;

    Ok(TransferRecord {
        cuenta_origen,
        cuenta_destino,
        monto,
        saldo_origen,
        saldo_destino,
    })
}

// ============================================
// TIENDA QUERIES
// ============================================

/// Get a store by id.
pub async fn get_tienda(pool: &Pool, id: i64) -> Result<Option<Tienda>, DatabaseError> {
    debug!("Fetching tienda: {}", id);

    let client = get_client(pool).await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, nombre
            FROM tiendas
            WHERE id = $1
            "#,
            &[&id],
        )
        .await?;

    Ok(row.map(|row| Tienda {
        id: row.get("id"),
        nombre: row.get("nombre"),
    }))
}

/// Get every store in `ids`.
pub async fn get_tiendas_by_ids(pool: &Pool, ids: &[i64]) -> Result<Vec<Tienda>, DatabaseError> {
    debug!("Fetching names for {} tiendas", ids.len());

    let client = get_client(pool).await?;
    let rows = client
        .query(
            r#"
            SELECT id, nombre
            FROM tiendas
            WHERE id = ANY($1)
            "#,
            &[&ids],
        )
        .await?;

    Ok(rows
        .iter()
        .map(|row| Tienda {
            id: row.get("id"),
            nombre: row.get("nombre"),
        })
        .collect())
}
