//! # Services Module
//!
//! This module contains the business logic of the backend.
//!
//! ## Services Overview
//!
//! | Service | Responsibility |
//! |---------|---------------|
//! | `ClienteService` | Registration, login, balances, transfers, name lookups |
//!
//! ## Service Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        SERVICES LAYER                            │
//! │                                                                  │
//! │  ┌──────────────────────────────────────────────────────────┐   │
//! │  │                    ClienteService                         │   │
//! │  │  • register_cliente()   • login_cliente()                 │   │
//! │  │  • get_saldo()          • transferir_monto()              │   │
//! │  │  • get_personas_nombres()  • get_tiendas_nombres()        │   │
//! │  └──────────────────────────────────────────────────────────┘   │
//! │                              │                                   │
//! │                              ▼                                   │
//! │                   Arc<dyn ClienteStore>                          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod cliente_service;

pub use cliente_service::{ClienteError, ClienteService};
