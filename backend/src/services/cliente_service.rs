//! # Cliente Service
//!
//! The ClienteService is the single business-logic service of the backend.
//! Handlers call it; it validates input and talks to the store.
//!
//! ## Responsibilities
//!
//! - Register clients and open their primary account
//! - Log clients in by phone number
//! - Query account balances
//! - Transfer money between clients
//! - Resolve client and store names from ids
//!
//! ## Flow Example: Transfer
//!
//! ```text
//! 1. Client requests transfer via API
//!                ↓
//! 2. ClienteService.transferir_monto() validates amount and parties
//!                ↓
//! 3. Store debits sender and credits recipient atomically
//!                ↓
//! 4. Resulting balances are logged
//!                ↓
//! 5. Return success to client
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use crate::db::{Cliente, ClienteStore, Cuenta, DatabaseError, NuevoCliente};
use crate::models::{LoginRequest, PersonaNombre, RegisterRequest, TiendaNombre};
use crate::utils::{mask_telefono, normalize_telefono, validate_monto};

/// Longest accepted client name, matching the `clientes.nombre` column.
const MAX_NOMBRE_LEN: usize = 120;

/// Errors that can occur in cliente operations.
#[derive(Debug, thiserror::Error)]
pub enum ClienteError {
    /// The phone number already belongs to a client.
    #[error("Usuario ya registrado")]
    AlreadyRegistered,

    /// Invalid input provided.
    #[error("{0}")]
    InvalidInput(String),

    /// A referenced client or account does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The sender cannot cover the amount.
    #[error("Saldo insuficiente: disponible {available}, solicitado {requested}")]
    InsufficientFunds { available: Decimal, requested: Decimal },

    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<DatabaseError> for ClienteError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::Duplicate(_) => ClienteError::AlreadyRegistered,
            DatabaseError::NotFound(message) => ClienteError::NotFound(message),
            DatabaseError::InsufficientFunds {
                available,
                requested,
            } => ClienteError::InsufficientFunds {
                available,
                requested,
            },
            other => ClienteError::DatabaseError(other.to_string()),
        }
    }
}

/// Client management service.
///
/// Holds the store as a trait object so the same service runs against
/// PostgreSQL in production and the in-memory store in tests.
///
/// ## Usage
///
/// ```rust,ignore
/// let service = ClienteService::new(Arc::new(db), Decimal::ZERO);
///
/// let cliente = service.register_cliente(request).await?;
/// service.transferir_monto(cliente.id, 2, Decimal::new(1050, 2)).await?;
/// ```
#[derive(Clone)]
pub struct ClienteService {
    /// Backing store.
    store: Arc<dyn ClienteStore>,

    /// Balance of the account opened at registration.
    initial_balance: Decimal,
}

impl ClienteService {
    pub fn new(store: Arc<dyn ClienteStore>, initial_balance: Decimal) -> Self {
        Self {
            store,
            initial_balance,
        }
    }

    // ==========================================
    // REGISTRATION & LOGIN
    // ==========================================

    /// Register a new client and open its primary account.
    ///
    /// ## Returns
    ///
    /// * `Ok(Cliente)` - The stored client, with its single account
    /// * `Err(ClienteError::AlreadyRegistered)` - Phone already in use
    /// * `Err(ClienteError::InvalidInput)` - Empty name or malformed phone
    pub async fn register_cliente(&self, request: RegisterRequest) -> Result<Cliente, ClienteError> {
        let nombre = request.nombre.trim();
        if nombre.is_empty() {
            return Err(ClienteError::InvalidInput("El nombre es obligatorio".to_string()));
        }
        if nombre.chars().count() > MAX_NOMBRE_LEN {
            return Err(ClienteError::InvalidInput(format!(
                "El nombre admite como máximo {} caracteres",
                MAX_NOMBRE_LEN
            )));
        }

        let telefono = normalize_telefono(&request.telefono).map_err(ClienteError::InvalidInput)?;

        info!("Registering cliente with telefono {}", mask_telefono(&telefono));

        let nuevo = NuevoCliente {
            nombre: nombre.to_string(),
            telefono,
            saldo_inicial: self.initial_balance,
        };

        let cliente = self.store.insert_cliente(&nuevo).await.map_err(|e| {
            if matches!(e, DatabaseError::Duplicate(_)) {
                warn!("Registration rejected, telefono already registered");
            } else {
                error!("Registration failed: {}", e);
            }
            ClienteError::from(e)
        })?;

        info!("Cliente {} registered", cliente.id);
        Ok(cliente)
    }

    /// Find the client a phone number belongs to.
    ///
    /// A phone that cannot be normalized cannot belong to anyone, so it is
    /// reported as not found rather than as invalid input.
    pub async fn login_cliente(&self, request: LoginRequest) -> Result<Option<Cliente>, ClienteError> {
        let cliente = self.get_cliente_por_telefono(&request.telefono).await?;
        match &cliente {
            Some(c) => info!("Cliente {} logged in", c.id),
            None => info!("Login failed for unknown telefono"),
        }
        Ok(cliente)
    }

    // ==========================================
    // QUERIES
    // ==========================================

    /// Get an account by id.
    pub async fn get_saldo(&self, cuenta_id: i64) -> Result<Option<Cuenta>, ClienteError> {
        debug!("Getting saldo for cuenta {}", cuenta_id);
        Ok(self.store.find_cuenta(cuenta_id).await?)
    }

    /// Get a client with its accounts.
    pub async fn get_cliente_by_id(&self, id: i64) -> Result<Option<Cliente>, ClienteError> {
        debug!("Getting cliente {}", id);
        Ok(self.store.find_cliente_by_id(id).await?)
    }

    /// Get a client by phone number, in any notation `normalize_telefono`
    /// accepts.
    pub async fn get_cliente_por_telefono(&self, telefono: &str) -> Result<Option<Cliente>, ClienteError> {
        let Ok(telefono) = normalize_telefono(telefono) else {
            debug!("Telefono lookup with malformed number");
            return Ok(None);
        };

        Ok(self.store.find_cliente_by_telefono(&telefono).await?)
    }

    /// Names of the given clients.
    ///
    /// Records follow the order of `ids`. Unknown ids are skipped and
    /// repeated ids are repeated in the output.
    pub async fn get_personas_nombres(&self, ids: &[i64]) -> Result<Vec<PersonaNombre>, ClienteError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let nombres: HashMap<i64, String> = self
            .store
            .find_clientes_by_ids(ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p.nombre))
            .collect();

        Ok(in_request_order(ids, &nombres)
            .map(|(id, nombre)| PersonaNombre { id, nombre })
            .collect())
    }

    /// Names of the given stores. Same ordering rules as
    /// [`get_personas_nombres`](Self::get_personas_nombres).
    pub async fn get_tiendas_nombres(&self, ids: &[i64]) -> Result<Vec<TiendaNombre>, ClienteError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let nombres: HashMap<i64, String> = self
            .store
            .find_tiendas_by_ids(ids)
            .await?
            .into_iter()
            .map(|t| (t.id, t.nombre))
            .collect();

        Ok(in_request_order(ids, &nombres)
            .map(|(tienda_id, nombre_tienda)| TiendaNombre {
                tienda_id,
                nombre_tienda,
            })
            .collect())
    }

    /// Name of a store.
    pub async fn get_nombre_tienda(&self, tienda_id: i64) -> Result<Option<String>, ClienteError> {
        Ok(self.store.find_tienda(tienda_id).await?.map(|t| t.nombre))
    }

    // ==========================================
    // TRANSFERS
    // ==========================================

    /// Transfer `monto` from the sender's primary account to the
    /// recipient's primary account.
    ///
    /// ## Returns
    ///
    /// * `Ok(())` - Both balances updated
    /// * `Err(ClienteError::InvalidInput)` - Bad amount, or sender equals recipient
    /// * `Err(ClienteError::NotFound)` - A client is missing or has no account
    /// * `Err(ClienteError::InsufficientFunds)` - Sender balance below `monto`
    ///
    /// On error no balance changes.
    pub async fn transferir_monto(
        &self,
        remitente_id: i64,
        destinatario_id: i64,
        monto: Decimal,
    ) -> Result<(), ClienteError> {
        info!(
            "Transfer request: {} from cliente {} to cliente {}",
            monto, remitente_id, destinatario_id
        );

        let monto = validate_monto(monto).map_err(ClienteError::InvalidInput)?;

        if remitente_id == destinatario_id {
            return Err(ClienteError::InvalidInput(
                "El remitente y el destinatario deben ser distintos".to_string(),
            ));
        }

        let record = self
            .store
            .transfer(remitente_id, destinatario_id, monto)
            .await
            .map_err(|e| {
                warn!("Transfer from cliente {} failed: {}", remitente_id, e);
                ClienteError::from(e)
            })?;

        info!(
            "Transferred {} from cuenta {} (saldo {}) to cuenta {} (saldo {})",
            record.monto,
            record.cuenta_origen,
            record.saldo_origen,
            record.cuenta_destino,
            record.saldo_destino
        );
        Ok(())
    }

    // ==========================================
    // HEALTH
    // ==========================================

    /// Whether the backing store answers.
    pub async fn is_store_healthy(&self) -> bool {
        self.store.ping().await
    }
}

/// Pair each requested id with its name, keeping request order and
/// dropping ids without a name.
fn in_request_order<'a>(
    ids: &'a [i64],
    nombres: &'a HashMap<i64, String>,
) -> impl Iterator<Item = (i64, String)> + 'a {
    ids.iter()
        .filter_map(move |id| nombres.get(id).map(|nombre| (*id, nombre.clone())))
}
