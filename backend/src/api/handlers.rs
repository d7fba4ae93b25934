//! # API Request Handlers
//!
//! This module contains the handler functions for each API endpoint.
//! Each handler:
//! 1. Extracts request data
//! 2. Calls the cliente service
//! 3. Maps the result to the status and body its clients expect
//!
//! ## Error Handling
//!
//! Handlers never propagate errors to actix-web. Expected outcomes
//! (not found, duplicate, invalid transfer) get their fixed 4xx body;
//! storage failures are logged and answered with:
//!
//! ```json
//! { "error": "Error interno del servidor" }
//! ```

use std::sync::Arc;

use actix_web::{web, HttpResponse};
use chrono::Utc;
use tracing::{error, info, warn};

use crate::models::{
    ErrorResponse,
    HealthResponse,
    IdResponse,
    LoginRequest,
    NombreTiendaResponse,
    PersonaIdRequest,
    RegisterRequest,
    SaldoRemitenteRequest,
    SaldoRemitenteResponse,
    SaldoResponse,
    TiendaIdRequest,
    TransferRequest,
};
use crate::services::ClienteError;
use crate::AppState;

const INTERNAL_ERROR: &str = "Error interno del servidor";
const TRANSFER_OK: &str = "Transferencia realizada con éxito";

fn internal_error(operation: &str, e: &ClienteError) -> HttpResponse {
    error!("{} failed: {}", operation, e);
    HttpResponse::InternalServerError().json(ErrorResponse::message(INTERNAL_ERROR))
}

fn plain_text(mut builder: actix_web::HttpResponseBuilder, body: String) -> HttpResponse {
    builder.content_type("text/plain; charset=utf-8").body(body)
}

/// Health check endpoint.
///
/// ## Endpoint
///
/// `GET /health`
///
/// ## Example
///
/// ```bash
/// curl http://127.0.0.1:8080/health
/// ```
pub async fn health_check(state: web::Data<Arc<AppState>>) -> HttpResponse {
    let store_healthy = state.service.is_store_healthy().await;

    let response = HealthResponse {
        status: if store_healthy { "healthy" } else { "unhealthy" }.to_string(),
        store: store_healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    };

    if store_healthy {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

/// Register a new client.
///
/// ## Endpoint
///
/// `POST /auth/register`
///
/// ```bash
/// curl -X POST http://127.0.0.1:8080/auth/register \
///   -H "Content-Type: application/json" \
///   -d '{"nombre": "Ana López", "telefono": "5512345678"}'
/// ```
///
/// ## Responses
///
/// - `201 {"id": 7}`
/// - `409 {"error": "Usuario ya registrado"}` - phone already registered
/// - `400 {"error": "<reason>"}` - blank name or malformed phone
pub async fn register(
    state: web::Data<Arc<AppState>>,
    body: web::Json<RegisterRequest>,
) -> HttpResponse {
    match state.service.register_cliente(body.into_inner()).await {
        Ok(cliente) => HttpResponse::Created().json(IdResponse { id: cliente.id }),
        Err(e @ ClienteError::AlreadyRegistered) => {
            HttpResponse::Conflict().json(ErrorResponse::message(e.to_string()))
        }
        Err(ClienteError::InvalidInput(message)) => {
            warn!("Registration rejected: {}", message);
            HttpResponse::BadRequest().json(ErrorResponse::message(message))
        }
        Err(e) => internal_error("Register", &e),
    }
}

/// Log in with a phone number.
///
/// ## Endpoint
///
/// `POST /auth/login`
///
/// ## Responses
///
/// - `200 {"id": 7}`
/// - `400 {"error": 400}` - no client with that phone
pub async fn login(
    state: web::Data<Arc<AppState>>,
    body: web::Json<LoginRequest>,
) -> HttpResponse {
    match state.service.login_cliente(body.into_inner()).await {
        Ok(Some(cliente)) => HttpResponse::Ok().json(IdResponse { id: cliente.id }),
        Ok(None) => HttpResponse::BadRequest().json(ErrorResponse::new(400)),
        Err(e) => internal_error("Login", &e),
    }
}

/// Get the balance of an account.
///
/// ## Endpoint
///
/// `GET /cuenta/{id}/saldo`
///
/// ## Responses
///
/// - `200 {"saldo": 1500.25}`
/// - `404 {"error": 404.0}`
pub async fn get_saldo(
    state: web::Data<Arc<AppState>>,
    path: web::Path<i64>,
) -> HttpResponse {
    let cuenta_id = path.into_inner();

    match state.service.get_saldo(cuenta_id).await {
        Ok(Some(cuenta)) => HttpResponse::Ok().json(SaldoResponse { saldo: cuenta.saldo }),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse::new(404.0)),
        Err(e) => internal_error("Get saldo", &e),
    }
}

/// Get the primary account balance of a client.
///
/// ## Endpoint
///
/// `GET /cliente/` with body `{"remitente_id": 1}`
///
/// ## Responses
///
/// - `200 {"saldo_remitente": 320.00}`
/// - `404 {"error": "Usuario no encontrado"}`
/// - `404 {"error": "El cliente no tiene cuentas asociadas"}`
pub async fn get_saldo_remitente(
    state: web::Data<Arc<AppState>>,
    body: web::Json<SaldoRemitenteRequest>,
) -> HttpResponse {
    let remitente_id = body.remitente_id;

    match state.service.get_cliente_by_id(remitente_id).await {
        Ok(Some(cliente)) => match cliente.cuenta_principal() {
            Some(cuenta) => HttpResponse::Ok().json(SaldoRemitenteResponse {
                saldo_remitente: cuenta.saldo,
            }),
            None => HttpResponse::NotFound()
                .json(ErrorResponse::message("El cliente no tiene cuentas asociadas")),
        },
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse::message("Usuario no encontrado")),
        Err(e) => internal_error("Get saldo remitente", &e),
    }
}

/// Transfer money to another client.
///
/// Moves `monto` from the sender's primary account to the recipient's
/// primary account. Both balances change or neither does.
///
/// ## Endpoint
///
/// `PUT /cliente/{remitente_id}/monto`
///
/// ```bash
/// curl -X PUT http://127.0.0.1:8080/cliente/1/monto \
///   -H "Content-Type: application/json" \
///   -d '{"destinatarioId": 2, "monto": 150.75}'
/// ```
///
/// ## Responses (plain text)
///
/// - `200 Transferencia realizada con éxito`
/// - `400 <reason>` - invalid amount, unknown client, insufficient funds
pub async fn transfer_monto(
    state: web::Data<Arc<AppState>>,
    path: web::Path<i64>,
    body: web::Json<TransferRequest>,
) -> HttpResponse {
    let remitente_id = path.into_inner();
    let request = body.into_inner();

    match state
        .service
        .transferir_monto(remitente_id, request.destinatario_id, request.monto)
        .await
    {
        Ok(()) => plain_text(HttpResponse::Ok(), TRANSFER_OK.to_string()),
        Err(e @ ClienteError::DatabaseError(_)) => {
            error!("Transfer failed: {}", e);
            plain_text(HttpResponse::InternalServerError(), INTERNAL_ERROR.to_string())
        }
        Err(e) => plain_text(HttpResponse::BadRequest(), e.to_string()),
    }
}

/// Get client names for a list of ids.
///
/// ## Endpoint
///
/// `GET /personas/nombre` with body `[{"id": 1}, {"id": 2}]`
///
/// ## Response
///
/// ```json
/// [{"id": 1, "nombre": "Ana"}, {"id": 2, "nombre": "Luis"}]
/// ```
///
/// Records follow the request order; unknown ids are left out.
pub async fn get_personas_nombres(
    state: web::Data<Arc<AppState>>,
    body: web::Json<Vec<PersonaIdRequest>>,
) -> HttpResponse {
    let ids: Vec<i64> = body.iter().map(|p| p.id).collect();
    info!("Persona names request for {} ids", ids.len());

    match state.service.get_personas_nombres(&ids).await {
        Ok(personas) => HttpResponse::Ok().json(personas),
        Err(e) => internal_error("Get personas nombres", &e),
    }
}

/// Get the id of the client owning a phone number.
///
/// ## Endpoint
///
/// `GET /persona/telefono/{telefono}`
///
/// ## Responses
///
/// - `200 {"id": 7}`
/// - `400 {"error": 400}`
pub async fn get_cliente_por_telefono(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> HttpResponse {
    let telefono = path.into_inner();

    match state.service.get_cliente_por_telefono(&telefono).await {
        Ok(Some(cliente)) => HttpResponse::Ok().json(IdResponse { id: cliente.id }),
        Ok(None) => HttpResponse::BadRequest().json(ErrorResponse::new(400)),
        Err(e) => internal_error("Get cliente por telefono", &e),
    }
}

/// Get store names for a list of ids.
///
/// ## Endpoint
///
/// `GET /tiendas/nombre` with body `[{"tienda_id": 3}]`
///
/// ## Response
///
/// ```json
/// [{"tienda_id": 3, "nombre_tienda": "Farmacia Central"}]
/// ```
pub async fn get_tiendas_nombres(
    state: web::Data<Arc<AppState>>,
    body: web::Json<Vec<TiendaIdRequest>>,
) -> HttpResponse {
    let ids: Vec<i64> = body.iter().map(|t| t.tienda_id).collect();
    info!("Tienda names request for {} ids", ids.len());

    match state.service.get_tiendas_nombres(&ids).await {
        Ok(tiendas) => HttpResponse::Ok().json(tiendas),
        Err(e) => internal_error("Get tiendas nombres", &e),
    }
}

/// Get the name of a store.
///
/// ## Endpoint
///
/// `GET /tienda/{tienda_id}/nombre`
///
/// ## Responses
///
/// - `200 {"nombre_tienda": "Farmacia Central"}`
/// - `404 {"error": "Tienda no encontrada"}`
pub async fn get_nombre_tienda(
    state: web::Data<Arc<AppState>>,
    path: web::Path<i64>,
) -> HttpResponse {
    let tienda_id = path.into_inner();

    match state.service.get_nombre_tienda(tienda_id).await {
        Ok(Some(nombre_tienda)) => HttpResponse::Ok().json(NombreTiendaResponse { nombre_tienda }),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse::message("Tienda no encontrada")),
        Err(e) => internal_error("Get nombre tienda", &e),
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::header::CONTENT_TYPE;
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use serde_json::{json, Value};

    use super::*;
    use crate::api::{configure_routes, json_config};
    use crate::db::{
        Cliente, ClienteStore, Cuenta, DatabaseError, MemoryStore, NuevoCliente, Persona, Tienda,
        TransferRecord,
    };
    use crate::services::ClienteService;

    /// Build the full routing table over `store`; new accounts start at `balance`.
    macro_rules! init_app {
        ($store:expr, $balance:expr) => {{
            let service = ClienteService::new($store.clone(), Decimal::from($balance));
            let state = Arc::new(AppState { service });
            test::init_service(
                App::new()
                    .app_data(web::Data::new(state))
                    .app_data(json_config())
                    .configure(configure_routes),
            )
            .await
        }};
    }

    /// Register a client and return its id.
    macro_rules! register {
        ($app:expr, $nombre:expr, $telefono:expr) => {{
            let req = test::TestRequest::post()
                .uri("/auth/register")
                .set_json(json!({ "nombre": $nombre, "telefono": $telefono }))
                .to_request();
            let resp = test::call_service(&$app, req).await;
            assert_eq!(resp.status(), StatusCode::CREATED);
            let body: Value = test::read_body_json(resp).await;
            body["id"].as_i64().expect("id in register response")
        }};
    }

    #[actix_web::test]
    async fn test_register_and_duplicate() {
        let store = Arc::new(MemoryStore::new());
        let app = init_app!(store, 0);

        let id = register!(app, "Ana", "5511111111");
        assert!(id > 0);

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({ "nombre": "Ana Bis", "telefono": "55-1111-1111" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Usuario ya registrado" }));
    }

    #[actix_web::test]
    async fn test_register_invalid_phone() {
        let store = Arc::new(MemoryStore::new());
        let app = init_app!(store, 0);

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({ "nombre": "Ana", "telefono": "123" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }

    #[actix_web::test]
    async fn test_login_known_and_unknown() {
        let store = Arc::new(MemoryStore::new());
        let app = init_app!(store, 0);
        let id = register!(app, "Ana", "5511111111");

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "telefono": "5511111111" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "id": id }));

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "telefono": "5599999999" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": 400 }));
    }

    #[actix_web::test]
    async fn test_saldo_lookup() {
        let store = Arc::new(MemoryStore::new());
        let app = init_app!(store, 250);
        let id = register!(app, "Ana", "5511111111");
        let cliente = store.find_cliente_by_id(id).await.unwrap().unwrap();

        let req = test::TestRequest::get()
            .uri(&format!("/cuenta/{}/saldo", cliente.cuentas[0].id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["saldo"].as_f64(), Some(250.0));

        let req = test::TestRequest::get().uri("/cuenta/9999/saldo").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"].as_f64(), Some(404.0));
    }

    #[actix_web::test]
    async fn test_saldo_remitente() {
        let store = Arc::new(MemoryStore::new());
        let app = init_app!(store, 80);
        let id = register!(app, "Ana", "5511111111");
        // the primary account is the oldest one
        store.open_cuenta(id, Decimal::from(5)).await.unwrap();

        let req = test::TestRequest::get()
            .uri("/cliente/")
            .set_json(json!({ "remitente_id": id }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["saldo_remitente"].as_f64(), Some(80.0));

        let req = test::TestRequest::get()
            .uri("/cliente/")
            .set_json(json!({ "remitente_id": 9999 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Usuario no encontrado" }));
    }

    #[actix_web::test]
    async fn test_transfer_success_and_insufficient_funds() {
        let store = Arc::new(MemoryStore::new());
        let app = init_app!(store, 100);
        let ana = register!(app, "Ana", "5511111111");
        let luis = register!(app, "Luis", "5522222222");

        let req = test::TestRequest::put()
            .uri(&format!("/cliente/{}/monto", ana))
            .set_json(json!({ "destinatarioId": luis, "monto": 40.5 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert_eq!(body, TRANSFER_OK.as_bytes());

        let ana_cliente = store.find_cliente_by_id(ana).await.unwrap().unwrap();
        let luis_cliente = store.find_cliente_by_id(luis).await.unwrap().unwrap();
        assert_eq!(ana_cliente.cuentas[0].saldo, Decimal::new(595, 1));
        assert_eq!(luis_cliente.cuentas[0].saldo, Decimal::new(1405, 1));

        let req = test::TestRequest::put()
            .uri(&format!("/cliente/{}/monto", ana))
            .set_json(json!({ "destinatarioId": luis, "monto": 60 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = test::read_body(resp).await;
        let message = String::from_utf8(body.to_vec()).unwrap();
        assert!(message.starts_with("Saldo insuficiente"), "got: {}", message);

        // nothing moved
        let ana_cliente = store.find_cliente_by_id(ana).await.unwrap().unwrap();
        assert_eq!(ana_cliente.cuentas[0].saldo, Decimal::new(595, 1));
    }

    #[actix_web::test]
    async fn test_transfer_to_unknown_recipient() {
        let store = Arc::new(MemoryStore::new());
        let app = init_app!(store, 100);
        let ana = register!(app, "Ana", "5511111111");

        let req = test::TestRequest::put()
            .uri(&format!("/cliente/{}/monto", ana))
            .set_json(json!({ "destinatarioId": 777, "monto": 1 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = test::read_body(resp).await;
        assert_eq!(body, "Destinatario no encontrado: 777".as_bytes());
    }

    #[actix_web::test]
    async fn test_personas_nombres_keep_order() {
        let store = Arc::new(MemoryStore::new());
        let app = init_app!(store, 0);
        let ana = register!(app, "Ana", "5511111111");
        let luis = register!(app, "Luis", "5522222222");

        let req = test::TestRequest::get()
            .uri("/personas/nombre")
            .set_json(json!([{ "id": luis }, { "id": ana }]))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!([
                { "id": luis, "nombre": "Luis" },
                { "id": ana, "nombre": "Ana" }
            ])
        );
    }

    #[actix_web::test]
    async fn test_persona_por_telefono() {
        let store = Arc::new(MemoryStore::new());
        let app = init_app!(store, 0);
        let ana = register!(app, "Ana", "5511111111");

        let req = test::TestRequest::get()
            .uri("/persona/telefono/5511111111")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "id": ana }));

        let req = test::TestRequest::get()
            .uri("/persona/telefono/5500000000")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": 400 }));
    }

    #[actix_web::test]
    async fn test_tienda_lookups() {
        let store = Arc::new(MemoryStore::new());
        store.insert_tienda(3, "Farmacia Central").await;
        store.insert_tienda(8, "Panadería Lupita").await;
        let app = init_app!(store, 0);

        let req = test::TestRequest::get()
            .uri("/tiendas/nombre")
            .set_json(json!([{ "tienda_id": 8 }, { "tienda_id": 5 }, { "tienda_id": 3 }]))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!([
                { "tienda_id": 8, "nombre_tienda": "Panadería Lupita" },
                { "tienda_id": 3, "nombre_tienda": "Farmacia Central" }
            ])
        );

        let req = test::TestRequest::get().uri("/tienda/3/nombre").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "nombre_tienda": "Farmacia Central" }));

        let req = test::TestRequest::get().uri("/tienda/5/nombre").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Tienda no encontrada" }));
    }

    #[actix_web::test]
    async fn test_malformed_body_is_json_400() {
        let store = Arc::new(MemoryStore::new());
        let app = init_app!(store, 0);

        let req = test::TestRequest::put()
            .uri("/cliente/1/monto")
            .set_json(json!({ "monto": 10 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("destinatarioId"));
    }

    #[actix_web::test]
    async fn test_health_check() {
        let store = Arc::new(MemoryStore::new());
        let app = init_app!(store, 0);

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["store"], true);
    }

    /// Store whose backend is down, except that it knows one client with
    /// no accounts.
    struct UnreachableStore;

    const SIN_CUENTAS_ID: i64 = 42;

    fn unreachable() -> DatabaseError {
        DatabaseError::ConnectionError("connection refused".to_string())
    }

    #[async_trait]
    impl ClienteStore for UnreachableStore {
        async fn insert_cliente(&self, _nuevo: &NuevoCliente) -> Result<Cliente, DatabaseError> {
            Err(unreachable())
        }

        async fn find_cliente_by_id(&self, id: i64) -> Result<Option<Cliente>, DatabaseError> {
            if id != SIN_CUENTAS_ID {
                return Err(unreachable());
            }
            Ok(Some(Cliente {
                id,
                nombre: "Sin Cuentas".to_string(),
                telefono: "5500000042".to_string(),
                cuentas: vec![],
            }))
        }

        async fn find_cliente_by_telefono(
            &self,
            _telefono: &str,
        ) -> Result<Option<Cliente>, DatabaseError> {
            Err(unreachable())
        }

        async fn find_cuenta(&self, _id: i64) -> Result<Option<Cuenta>, DatabaseError> {
            Err(unreachable())
        }

        async fn transfer(
            &self,
            _remitente_id: i64,
            _destinatario_id: i64,
            _monto: Decimal,
        ) -> Result<TransferRecord, DatabaseError> {
            Err(unreachable())
        }

        async fn find_clientes_by_ids(&self, _ids: &[i64]) -> Result<Vec<Persona>, DatabaseError> {
            Err(unreachable())
        }

        async fn find_tiendas_by_ids(&self, _ids: &[i64]) -> Result<Vec<Tienda>, DatabaseError> {
            Err(unreachable())
        }

        async fn find_tienda(&self, _id: i64) -> Result<Option<Tienda>, DatabaseError> {
            Err(unreachable())
        }

        async fn ping(&self) -> bool {
            false
        }
    }

    #[actix_web::test]
    async fn test_saldo_remitente_without_cuentas() {
        let store = Arc::new(UnreachableStore);
        let app = init_app!(store, 0);

        let req = test::TestRequest::get()
            .uri("/cliente/")
            .set_json(json!({ "remitente_id": SIN_CUENTAS_ID }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "El cliente no tiene cuentas asociadas" }));
    }

    #[actix_web::test]
    async fn test_store_failure_is_internal_error() {
        let store = Arc::new(UnreachableStore);
        let app = init_app!(store, 0);

        let requests = vec![
            test::TestRequest::post()
                .uri("/auth/register")
                .set_json(json!({ "nombre": "Ana", "telefono": "5511111111" })),
            test::TestRequest::post()
                .uri("/auth/login")
                .set_json(json!({ "telefono": "5511111111" })),
            test::TestRequest::get().uri("/cuenta/1/saldo"),
            test::TestRequest::get()
                .uri("/cliente/")
                .set_json(json!({ "remitente_id": 1 })),
            test::TestRequest::get()
                .uri("/personas/nombre")
                .set_json(json!([{ "id": 1 }])),
            test::TestRequest::get().uri("/tienda/1/nombre"),
        ];

        for req in requests {
            let resp = test::call_service(&app, req.to_request()).await;
            assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body, json!({ "error": INTERNAL_ERROR }));
        }
    }

    #[actix_web::test]
    async fn test_transfer_store_failure_is_plain_text() {
        let store = Arc::new(UnreachableStore);
        let app = init_app!(store, 0);

        let req = test::TestRequest::put()
            .uri("/cliente/1/monto")
            .set_json(json!({ "destinatarioId": 2, "monto": 10 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let content_type = resp.headers().get(CONTENT_TYPE).unwrap().to_str().unwrap();
        assert!(content_type.starts_with("text/plain"));
        let body = test::read_body(resp).await;
        assert_eq!(body, INTERNAL_ERROR.as_bytes());
    }

    #[actix_web::test]
    async fn test_health_check_unhealthy() {
        let store = Arc::new(UnreachableStore);
        let app = init_app!(store, 0);

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "unhealthy");
        assert_eq!(body["store"], false);
    }
}
