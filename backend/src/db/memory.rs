//! In-memory [`ClienteStore`].
//!
//! Mirrors the PostgreSQL semantics: unique phone numbers, the primary
//! account is the lowest account id, transfers are all-or-nothing. A single
//! `RwLock` guards all state, so a transfer sees and writes both balances
//! under the same write guard.

use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::debug;

use super::models::*;
use super::{ClienteStore, DatabaseError};
use crate::utils::{mask_telefono, validate_saldo};

#[derive(Debug)]
struct ClienteRow {
    nombre: String,
    telefono: String,
}

#[derive(Debug, Default)]
struct MemoryState {
    clientes: BTreeMap<i64, ClienteRow>,
    telefonos: BTreeMap<String, i64>,
    cuentas: BTreeMap<i64, Cuenta>,
    tiendas: BTreeMap<i64, Tienda>,
    next_cliente_id: i64,
    next_cuenta_id: i64,
}

impl MemoryState {
    fn cuentas_of(&self, cliente_id: i64) -> Vec<Cuenta> {
        // BTreeMap iteration is ordered by id
        self.cuentas
            .values()
            .filter(|c| c.cliente_id == cliente_id)
            .cloned()
            .collect()
    }

    fn cliente(&self, id: i64) -> Option<Cliente> {
        let row = self.clientes.get(&id)?;
        Some(Cliente {
            id,
            nombre: row.nombre.clone(),
            telefono: row.telefono.clone(),
            cuentas: self.cuentas_of(id),
        })
    }

    fn open_cuenta(&mut self, cliente_id: i64, saldo: Decimal) -> Cuenta {
        self.next_cuenta_id += 1;
        let cuenta = Cuenta {
            id: self.next_cuenta_id,
            cliente_id,
            saldo,
        };
        self.cuentas.insert(cuenta.id, cuenta.clone());
        cuenta
    }

    fn cuenta_principal(&self, cliente_id: i64, role: &str) -> Result<i64, DatabaseError> {
        if !self.clientes.contains_key(&cliente_id) {
            return Err(DatabaseError::NotFound(format!(
                "{} no encontrado: {}",
                role, cliente_id
            )));
        }

        self.cuentas
            .values()
            .find(|c| c.cliente_id == cliente_id)
            .map(|c| c.id)
            .ok_or_else(|| {
                DatabaseError::NotFound(format!(
                    "El {} {} no tiene cuentas asociadas",
                    role.to_lowercase(),
                    cliente_id
                ))
            })
    }
}

/// Process-local store. Cheap to construct; data is lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or rename a store. Stores have no HTTP write path.
    #[cfg(test)]
    pub async fn insert_tienda(&self, id: i64, nombre: &str) {
        let mut state = self.state.write().await;
        state.tiendas.insert(
            id,
            Tienda {
                id,
                nombre: nombre.to_string(),
            },
        );
    }

    /// Open an extra account for an existing client.
    #[cfg(test)]
    pub async fn open_cuenta(&self, cliente_id: i64, saldo: Decimal) -> Option<Cuenta> {
        let mut state = self.state.write().await;
        if !state.clientes.contains_key(&cliente_id) {
            return None;
        }
        Some(state.open_cuenta(cliente_id, saldo))
    }
}

#[async_trait]
impl ClienteStore for MemoryStore {
    async fn insert_cliente(&self, nuevo: &NuevoCliente) -> Result<Cliente, DatabaseError> {
        let mut state = self.state.write().await;

        validate_saldo(nuevo.saldo_inicial).map_err(DatabaseError::OutOfRange)?;

        if state.telefonos.contains_key(&nuevo.telefono) {
            return Err(DatabaseError::Duplicate(format!(
                "telefono {}",
                mask_telefono(&nuevo.telefono)
            )));
        }

        state.next_cliente_id += 1;
        let id = state.next_cliente_id;
        state.clientes.insert(
            id,
            ClienteRow {
                nombre: nuevo.nombre.clone(),
                telefono: nuevo.telefono.clone(),
            },
        );
        state.telefonos.insert(nuevo.telefono.clone(), id);
        let cuenta = state.open_cuenta(id, nuevo.saldo_inicial);

        debug!("Cliente {} stored in memory", id);
        Ok(Cliente {
            id,
            nombre: nuevo.nombre.clone(),
            telefono: nuevo.telefono.clone(),
            cuentas: vec![cuenta],
        })
    }

    async fn find_cliente_by_id(&self, id: i64) -> Result<Option<Cliente>, DatabaseError> {
        Ok(self.state.read().await.cliente(id))
    }

    async fn find_cliente_by_telefono(
        &self,
        telefono: &str,
    ) -> Result<Option<Cliente>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .telefonos
            .get(telefono)
            .and_then(|id| state.cliente(*id)))
    }

    async fn find_cuenta(&self, id: i64) -> Result<Option<Cuenta>, DatabaseError> {
        Ok(self.state.read().await.cuentas.get(&id).cloned())
    }

    async fn transfer(
        &self,
        remitente_id: i64,
        destinatario_id: i64,
        monto: Decimal,
    ) -> Result<TransferRecord, DatabaseError> {
        let mut state = self.state.write().await;

        let cuenta_origen = state.cuenta_principal(remitente_id, "Remitente")?;
        let cuenta_destino = state.cuenta_principal(destinatario_id, "Destinatario")?;

        let available = state
            .cuentas
            .get(&cuenta_origen)
            .map(|c| c.saldo)
            .unwrap_or_default();
        if available < monto {
            return Err(DatabaseError::InsufficientFunds {
                available,
                requested: monto,
            });
        }

        // Compute both balances before writing either
        let saldo_origen = available
            .checked_sub(monto)
            .ok_or_else(|| DatabaseError::OutOfRange(format!("cuenta {}", cuenta_origen)))?;
        let saldo_destino = state
            .cuentas
            .get(&cuenta_destino)
            .and_then(|c| c.saldo.checked_add(monto))
            .filter(|saldo| validate_saldo(*saldo).is_ok())
            .ok_or_else(|| DatabaseError::OutOfRange(format!("cuenta {}", cuenta_destino)))?;

        if let Some(origen) = state.cuentas.get_mut(&cuenta_origen) {
            origen.saldo = saldo_origen;
        }
        if let Some(destino) = state.cuentas.get_mut(&cuenta_destino) {
            destino.saldo = saldo_destino;
        }

        Ok(TransferRecord {
            cuenta_origen,
            cuenta_destino,
            monto,
            saldo_origen,
            saldo_destino,
        })
    }

    async fn find_clientes_by_ids(&self, ids: &[i64]) -> Result<Vec<Persona>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .clientes
            .iter()
            .filter(|(id, _)| ids.contains(*id))
            .map(|(id, row)| Persona {
                id: *id,
                nombre: row.nombre.clone(),
            })
            .collect())
    }

    async fn find_tiendas_by_ids(&self, ids: &[i64]) -> Result<Vec<Tienda>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .tiendas
            .values()
            .filter(|t| ids.contains(&t.id))
            .cloned()
            .collect())
    }

    async fn find_tienda(&self, id: i64) -> Result<Option<Tienda>, DatabaseError> {
        Ok(self.state.read().await.tiendas.get(&id).cloned())
    }

    async fn ping(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nuevo(nombre: &str, telefono: &str, saldo: i64) -> NuevoCliente {
        NuevoCliente {
            nombre: nombre.to_string(),
            telefono: telefono.to_string(),
            saldo_inicial: Decimal::from(saldo),
        }
    }

    #[actix_web::test]
    async fn test_insert_rejects_duplicate_telefono() {
        let store = MemoryStore::new();
        store.insert_cliente(&nuevo("Ana", "5511111111", 0)).await.unwrap();

        let err = store
            .insert_cliente(&nuevo("Otra Ana", "5511111111", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Duplicate(_)));
        assert_eq!(err.to_string(), "Duplicate record: telefono ******1111");
    }

    #[actix_web::test]
    async fn test_transfer_moves_between_primary_accounts() {
        let store = MemoryStore::new();
        let ana = store.insert_cliente(&nuevo("Ana", "5511111111", 100)).await.unwrap();
        let luis = store.insert_cliente(&nuevo("Luis", "5522222222", 5)).await.unwrap();
        // a second account must not receive the money
        let extra = store.open_cuenta(luis.id, Decimal::ZERO).await.unwrap();

        let record = store
            .transfer(ana.id, luis.id, Decimal::new(2550, 2))
            .await
            .unwrap();

        assert_eq!(record.saldo_origen, Decimal::new(7450, 2));
        assert_eq!(record.saldo_destino, Decimal::new(3050, 2));
        assert_eq!(record.cuenta_destino, luis.cuentas[0].id);
        assert_eq!(
            store.find_cuenta(extra.id).await.unwrap().unwrap().saldo,
            Decimal::ZERO
        );
    }

    #[actix_web::test]
    async fn test_failed_transfer_changes_nothing() {
        let store = MemoryStore::new();
        let ana = store.insert_cliente(&nuevo("Ana", "5511111111", 10)).await.unwrap();
        let luis = store.insert_cliente(&nuevo("Luis", "5522222222", 0)).await.unwrap();

        let err = store.transfer(ana.id, luis.id, Decimal::from(11)).await.unwrap_err();
        assert!(matches!(err, DatabaseError::InsufficientFunds { .. }));

        let err = store.transfer(ana.id, 99, Decimal::ONE).await.unwrap_err();
        assert_eq!(err.to_string(), "Destinatario no encontrado: 99");

        let ana = store.find_cliente_by_id(ana.id).await.unwrap().unwrap();
        let luis = store.find_cliente_by_id(luis.id).await.unwrap().unwrap();
        assert_eq!(ana.cuentas[0].saldo, Decimal::from(10));
        assert_eq!(luis.cuentas[0].saldo, Decimal::ZERO);
    }

    #[actix_web::test]
    async fn test_transfer_past_column_limit_changes_nothing() {
        let store = MemoryStore::new();
        let ana = store.insert_cliente(&nuevo("Ana", "5511111111", 100)).await.unwrap();
        let tope = Decimal::from_i128_with_scale(9_999_999_999_999_999_999, 2);
        let luis = store
            .insert_cliente(&NuevoCliente {
                nombre: "Luis".to_string(),
                telefono: "5522222222".to_string(),
                saldo_inicial: tope,
            })
            .await
            .unwrap();

        let err = store.transfer(ana.id, luis.id, Decimal::ONE).await.unwrap_err();
        assert!(matches!(err, DatabaseError::OutOfRange(_)));

        let ana = store.find_cliente_by_id(ana.id).await.unwrap().unwrap();
        let luis = store.find_cliente_by_id(luis.id).await.unwrap().unwrap();
        assert_eq!(ana.cuentas[0].saldo, Decimal::from(100));
        assert_eq!(luis.cuentas[0].saldo, tope);
    }

    #[actix_web::test]
    async fn test_transfer_near_decimal_max_does_not_panic() {
        let store = MemoryStore::new();
        let ana = store.insert_cliente(&nuevo("Ana", "5511111111", 0)).await.unwrap();
        let luis = store.insert_cliente(&nuevo("Luis", "5522222222", 0)).await.unwrap();
        // seeded past the column limit, as a corrupted row would be
        let ana_extra = store.open_cuenta(ana.id, Decimal::MAX).await.unwrap();
        let luis_extra = store.open_cuenta(luis.id, Decimal::MAX).await.unwrap();
        {
            let mut state = store.state.write().await;
            state.cuentas.remove(&ana.cuentas[0].id);
            state.cuentas.remove(&luis.cuentas[0].id);
        }

        let err = store.transfer(ana.id, luis.id, Decimal::from(10)).await.unwrap_err();
        assert!(matches!(err, DatabaseError::OutOfRange(_)));
        assert_eq!(
            store.find_cuenta(ana_extra.id).await.unwrap().unwrap().saldo,
            Decimal::MAX
        );
        assert_eq!(
            store.find_cuenta(luis_extra.id).await.unwrap().unwrap().saldo,
            Decimal::MAX
        );
    }

    #[actix_web::test]
    async fn test_insert_rejects_saldo_outside_column() {
        let store = MemoryStore::new();
        let err = store
            .insert_cliente(&NuevoCliente {
                nombre: "Ana".to_string(),
                telefono: "5511111111".to_string(),
                saldo_inicial: Decimal::new(5, 3),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::OutOfRange(_)));
        assert!(store.find_cliente_by_telefono("5511111111").await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn test_lookup_by_telefono_includes_cuentas() {
        let store = MemoryStore::new();
        let ana = store.insert_cliente(&nuevo("Ana", "5511111111", 3)).await.unwrap();

        let found = store.find_cliente_by_telefono("5511111111").await.unwrap().unwrap();
        assert_eq!(found, ana);
        assert!(store.find_cliente_by_telefono("5599999999").await.unwrap().is_none());
    }
}
