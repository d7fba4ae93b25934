//! # Database Module
//!
//! This module owns everything the service persists: clients, their
//! accounts and the store catalogue.
//!
//! The service never talks to a backend directly. It holds an
//! `Arc<dyn ClienteStore>` and the concrete store is chosen at startup:
//!
//! - [`Database`] - PostgreSQL through a deadpool connection pool
//! - [`MemoryStore`] - process-local maps, for local runs and tests
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      DATABASE LAYER                              │
//! │                                                                  │
//! │  ┌──────────────────────────────────────────────────────────┐   │
//! │  │                ClienteStore (trait object)                │   │
//! │  └──────────────────────────────────────────────────────────┘   │
//! │                  │                          │                    │
//! │                  ▼                          ▼                    │
//! │  ┌──────────────────────────┐   ┌──────────────────────────┐    │
//! │  │ Database                 │   │ MemoryStore              │    │
//! │  │ (deadpool-postgres)      │   │ (tokio RwLock)           │    │
//! │  └──────────────────────────┘   └──────────────────────────┘    │
//! │                  │                                               │
//! │     ┌────────────┼────────────┐                                  │
//! │     ▼            ▼            ▼                                  │
//! │  clientes     cuentas      tiendas                               │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod memory;
pub mod models;
pub mod queries;

use async_trait::async_trait;
use deadpool_postgres::{Config, Pool, Runtime};
use rust_decimal::Decimal;
use tokio_postgres::{Config as TokioConfig, NoTls};
use thiserror::Error;
use tracing::{debug, error, info};

pub use memory::MemoryStore;
pub use models::*;

/// Schema applied by [`Database::ensure_schema`].
const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

/// Database-related errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to connect to the database
    #[error("Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryError(#[from] tokio_postgres::Error),

    /// Schema bootstrap failed
    #[error("Schema setup failed: {0}")]
    SchemaError(String),

    /// Record not found
    #[error("{0}")]
    NotFound(String),

    /// A unique constraint rejected the write
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// The debited account cannot cover the amount
    #[error("Saldo insuficiente: disponible {available}, solicitado {requested}")]
    InsufficientFunds { available: Decimal, requested: Decimal },

    /// A balance would not fit the `NUMERIC(19, 2)` column
    #[error("Saldo fuera de rango: {0}")]
    OutOfRange(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

/// Persistence operations the cliente service depends on.
///
/// Implementations must make [`ClienteStore::transfer`] atomic: either both
/// balances change or neither does.
#[async_trait]
pub trait ClienteStore: Send + Sync {
    /// Insert a client and open its primary account.
    ///
    /// Fails with `Duplicate` when the phone number is already registered.
    async fn insert_cliente(&self, nuevo: &NuevoCliente) -> Result<Cliente, DatabaseError>;

    async fn find_cliente_by_id(&self, id: i64) -> Result<Option<Cliente>, DatabaseError>;

    async fn find_cliente_by_telefono(&self, telefono: &str)
        -> Result<Option<Cliente>, DatabaseError>;

    async fn find_cuenta(&self, id: i64) -> Result<Option<Cuenta>, DatabaseError>;

    /// Move `monto` from the primary account of `remitente_id` to the
    /// primary account of `destinatario_id`.
    async fn transfer(
        &self,
        remitente_id: i64,
        destinatario_id: i64,
        monto: Decimal,
    ) -> Result<TransferRecord, DatabaseError>;

    /// Clients whose id is in `ids`, in no particular order.
    async fn find_clientes_by_ids(&self, ids: &[i64]) -> Result<Vec<Persona>, DatabaseError>;

    /// Stores whose id is in `ids`, in no particular order.
    async fn find_tiendas_by_ids(&self, ids: &[i64]) -> Result<Vec<Tienda>, DatabaseError>;

    async fn find_tienda(&self, id: i64) -> Result<Option<Tienda>, DatabaseError>;

    /// Whether the backend is reachable.
    async fn ping(&self) -> bool;
}

/// Database connection wrapper.
///
/// This struct wraps the connection pool and implements [`ClienteStore`]
/// on top of the SQL in [`queries`].
///
/// ## Usage
///
/// ```rust,ignore
/// let db = Database::connect("postgres://...", 10).await?;
/// db.ensure_schema().await?;
/// let cliente = db.find_cliente_by_telefono("5512345678").await?;
/// ```
#[derive(Clone)]
pub struct Database {
    /// The connection pool
    pool: Pool,
}

impl Database {
    /// Connect to the PostgreSQL database.
    ///
    /// Builds a pool of at most `pool_size` connections and runs a
    /// `SELECT 1` so a bad URL fails at startup rather than on the first
    /// request.
    pub async fn connect(database_url: &str, pool_size: usize) -> Result<Self, DatabaseError> {
        info!("Connecting to database...");

        let tokio_config = database_url
            .parse::<TokioConfig>()
            .map_err(|e| DatabaseError::ConfigError(format!("Invalid database URL: {}", e)))?;

        // deadpool has its own config type; copy the parsed fields over
        let mut config = Config::new();

        if let Some(dbname) = tokio_config.get_dbname() {
            config.dbname = Some(dbname.to_string());
        }
        if let Some(user) = tokio_config.get_user() {
            config.user = Some(user.to_string());
        }
        if let Some(password) = tokio_config.get_password() {
            config.password = Some(String::from_utf8_lossy(password).to_string());
        }
        if let Some(tokio_postgres::config::Host::Tcp(host)) = tokio_config.get_hosts().first() {
            config.host = Some(host.clone());
        }
        if let Some(port) = tokio_config.get_ports().first() {
            config.port = Some(*port);
        }

        config.pool = Some(deadpool_postgres::PoolConfig {
            max_size: pool_size,
            ..Default::default()
        });

        let pool = config
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        let client = pool
            .get()
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        client
            .query("SELECT 1", &[])
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        info!("Database connection established (pool size {})", pool_size);

        Ok(Self { pool })
    }

    /// Create the tables if they do not exist yet.
    ///
    /// The script only uses `IF NOT EXISTS` statements, so running it
    /// against an initialized database is a no-op.
    pub async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        info!("Ensuring database schema...");

        let client = self
            .pool
            .get()
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        debug!("Executing schema SQL ({} bytes)", SCHEMA_SQL.len());

        client.batch_execute(SCHEMA_SQL).await.map_err(|e| {
            let detail = e
                .as_db_error()
                .and_then(|db_err| db_err.detail())
                .unwrap_or("No detail available")
                .to_string();
            error!("Schema setup failed: {} ({})", e, detail);
            DatabaseError::SchemaError(format!("{}: {}", e, detail))
        })?;

        info!("Database schema ready");
        Ok(())
    }
}

#[async_trait]
impl ClienteStore for Database {
    async fn insert_cliente(&self, nuevo: &NuevoCliente) -> Result<Cliente, DatabaseError> {
        queries::insert_cliente(&self.pool, nuevo).await
    }

    async fn find_cliente_by_id(&self, id: i64) -> Result<Option<Cliente>, DatabaseError> {
        queries::get_cliente_by_id(&self.pool, id).await
    }

    async fn find_cliente_by_telefono(
        &self,
        telefono: &str,
    ) -> Result<Option<Cliente>, DatabaseError> {
        queries::get_cliente_by_telefono(&self.pool, telefono).await
    }

    async fn find_cuenta(&self, id: i64) -> Result<Option<Cuenta>, DatabaseError> {
        queries::get_cuenta(&self.pool, id).await
    }

    async fn transfer(
        &self,
        remitente_id: i64,
        destinatario_id: i64,
        monto: Decimal,
    ) -> Result<TransferRecord, DatabaseError> {
        queries::transfer_between_clientes(&self.pool, remitente_id, destinatario_id, monto).await
    }

    async fn find_clientes_by_ids(&self, ids: &[i64]) -> Result<Vec<Persona>, DatabaseError> {
        queries::get_personas_by_ids(&self.pool, ids).await
    }

    async fn find_tiendas_by_ids(&self, ids: &[i64]) -> Result<Vec<Tienda>, DatabaseError> {
        queries::get_tiendas_by_ids(&self.pool, ids).await
    }

    async fn find_tienda(&self, id: i64) -> Result<Option<Tienda>, DatabaseError> {
        queries::get_tienda(&self.pool, id).await
    }

    async fn ping(&self) -> bool {
        match self.pool.get().await {
            Ok(client) => client.simple_query("SELECT 1").await.is_ok(),
            Err(_) => false,
        }
    }
}
