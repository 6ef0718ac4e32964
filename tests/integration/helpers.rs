//! Shared test helpers: an in-process mock SMS gateway.
//!
//! The gateway is a small axum app served on an ephemeral port. Its
//! state (credit requests, billing exercises, manager accounts) lives
//! behind a shared mutex so tests can seed scenarios and count how many
//! times an endpoint was actually hit.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use jsonwebtoken::{EncodingKey, Header};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use smsadmin_client::ApiTransport;
use smsadmin_core::config::api::ApiConfig;
use smsadmin_core::config::retry::RetryConfig;
use smsadmin_session::{MemoryTokenStore, SessionManager};

const JWT_SECRET: &[u8] = b"mock-gateway-secret";

/// Mutable gateway-side state, shared with the test body.
#[derive(Debug)]
pub struct GatewayState {
    /// Credit requests, in wire shape.
    pub credits: Vec<Value>,
    /// Approve endpoint hit counter.
    pub approve_hits: usize,
    /// Reject endpoint hit counter.
    pub reject_hits: usize,
    /// Last rejection reason the gateway received.
    pub last_reject_reason: Option<String>,
    /// Years with an open billing exercise.
    pub exercice_years: Vec<i32>,
    /// Calendar entries served for any known year.
    pub calendrier: Vec<Value>,
    /// Invoices; populated by the generation trigger.
    pub factures: Vec<Value>,
    /// Manager accounts, in wire shape.
    pub managers: Vec<Value>,
    /// Remaining 500s to serve before manager listings succeed.
    pub manager_failures_remaining: usize,
    /// Manager listing hit counter (failures included).
    pub manager_list_hits: usize,
    /// Invoice letterhead record.
    pub footer: Value,
    /// When set, authenticated endpoints answer 401 (revoked token).
    pub force_unauthorized: bool,
}

impl Default for GatewayState {
    fn default() -> Self {
        Self {
            credits: Vec::new(),
            approve_hits: 0,
            reject_hits: 0,
            last_reject_reason: None,
            exercice_years: Vec::new(),
            calendrier: Vec::new(),
            factures: Vec::new(),
            managers: Vec::new(),
            manager_failures_remaining: 0,
            manager_list_hits: 0,
            footer: json!({
                "raisonSociale": "SMS Gateway SA",
                "adresse": "Dakar",
                "telephone": "+221338000000",
                "email": "billing@gateway.sn",
                "registre": "SN-DKR-2020-1234",
            }),
            force_unauthorized: false,
        }
    }
}

/// A credit request in wire shape.
pub fn credit(id: u64, status: &str) -> Value {
    json!({
        "id": id,
        "clientId": 3,
        "quantity": 5000,
        "status": status,
        "makerEmail": "maker@tenant.sn",
        "checkerEmail": if status == "PENDING" { Value::Null } else { json!("checker@gateway.sn") },
        "idempotencyKey": "f9c1",
        "pricePerSmsTtc": 18.0,
        "estimatedAmountTtc": 90000.0,
    })
}

/// A manager account in wire shape.
pub fn manager(id: u64, status: &str) -> Value {
    json!({
        "idManager": id,
        "nomManager": "Ndiaye",
        "prenomManager": "Awa",
        "email": format!("m{id}@gateway.sn"),
        "numeroTelephoneManager": "+221770000000",
        "role": "ADMIN",
        "statutCompte": status,
    })
}

/// One calendar entry in wire shape.
pub fn calendrier_mois(mois: u32) -> Value {
    json!({
        "id": mois,
        "mois": mois,
        "dateDebutConsommation": format!("2025-{mois:02}-01"),
        "dateFinConsommation": format!("2025-{mois:02}-28"),
        "dateGenerationFacture": format!("2025-{mois:02}-05"),
        "exerciceId": 1,
    })
}

#[derive(serde::Serialize)]
struct TokenClaims<'a> {
    sub: &'a str,
    id: u64,
    nom: &'a str,
    role: &'a str,
    #[serde(rename = "abonneExpire")]
    abonne_expire: bool,
    iat: i64,
    exp: i64,
}

/// Mint a gateway token for the given email and role.
pub fn make_token(email: &str, role: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = TokenClaims {
        sub: email,
        id: 42,
        nom: "Awa Ndiaye",
        role,
        abonne_expire: false,
        iat: now,
        exp: now + 3600,
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET),
    )
    .expect("Failed to mint token")
}

type SharedState = Arc<Mutex<GatewayState>>;

/// Test application: mock gateway + console-side wiring against it.
pub struct TestApp {
    /// Gateway state handle for seeding and hit-count assertions.
    pub gateway: SharedState,
    /// Session manager backing the transport.
    pub session: Arc<SessionManager>,
    /// Transport pointed at the mock gateway.
    pub transport: ApiTransport,
    /// Retry settings with short delays for tests.
    pub retry: RetryConfig,
}

impl TestApp {
    /// Start the mock gateway and wire a console transport against it.
    pub async fn new() -> Self {
        let gateway: SharedState = Arc::new(Mutex::new(GatewayState::default()));
        let router = build_router(Arc::clone(&gateway));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock gateway");
        let addr = listener.local_addr().expect("No local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Mock gateway died");
        });

        let session = Arc::new(SessionManager::new(Arc::new(MemoryTokenStore::new())));
        let config = ApiConfig {
            base_url: format!("http://{addr}"),
            timeout_seconds: 5,
        };
        let transport =
            ApiTransport::new(&config, Arc::clone(&session)).expect("Failed to build transport");

        Self {
            gateway,
            session,
            transport,
            retry: RetryConfig {
                max_attempts: 3,
                base_delay_ms: 10,
            },
        }
    }

    /// Open a session directly with a minted token.
    pub fn sign_in(&self, role: &str) {
        self.session
            .login(&make_token("ops@gateway.sn", role))
            .expect("Failed to open session");
    }
}

fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/api/V1/auth/login", post(login))
        .route("/api/V1/credits", get(list_credits))
        .route("/api/V1/credits/{id}/approve", post(approve_credit))
        .route("/api/V1/credits/{id}/reject", post(reject_credit))
        .route("/api/V1/billing/exercices", post(create_exercice))
        .route(
            "/api/V1/billing/exercices/{annee}/calendrier",
            get(fetch_calendrier),
        )
        .route("/api/V1/billing/generer", post(generate_invoices))
        .route("/api/V1/billing/factures", get(list_factures))
        .route("/api/V1/billing/factures/{id}/pdf", get(invoice_pdf))
        .route("/api/V1/billing/factures/{id}/send", post(send_invoice))
        .route("/api/v1/footer", get(get_footer).put(put_footer))
        .route("/api/V1/managers", get(list_managers))
        .route("/api/V1/managers/{id}", axum::routing::patch(update_manager))
        .route("/api/V1/managers/{id}/{action}", post(manager_action))
        .with_state(state)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        axum::Json(json!({"message": "Session expired or unauthorized"})),
    )
        .into_response()
}

fn require_bearer(headers: &HeaderMap) -> Result<(), Response> {
    let ok = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer "));
    if ok { Ok(()) } else { Err(unauthorized()) }
}

async fn login(axum::Json(body): axum::Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["motDePasse"].as_str().unwrap_or_default();
    if password != "secret" {
        return (
            StatusCode::UNAUTHORIZED,
            axum::Json(json!({"message": "Bad credentials"})),
        )
            .into_response();
    }
    let role = if email.starts_with("root@") {
        "SUPER_ADMIN"
    } else {
        "ADMIN"
    };
    axum::Json(json!({"token": make_token(email, role)})).into_response()
}

async fn list_credits(
    State(state): State<SharedState>,
    Query(params): Query<std::collections::HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = require_bearer(&headers) {
        return resp;
    }
    let state = state.lock().await;
    if state.force_unauthorized {
        return unauthorized();
    }
    let status = params.get("status").map(String::as_str);
    let content: Vec<Value> = state
        .credits
        .iter()
        .filter(|c| status.is_none_or(|s| c["status"] == s))
        .cloned()
        .collect();
    axum::Json(json!({
        "content": content,
        "totalPages": 1,
        "totalElements": content.len(),
        "number": 0,
    }))
    .into_response()
}

async fn approve_credit(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = require_bearer(&headers) {
        return resp;
    }
    let mut state = state.lock().await;
    state.approve_hits += 1;
    resolve_credit(&mut state, id, "APPROVED", None)
}

async fn reject_credit(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    if let Err(resp) = require_bearer(&headers) {
        return resp;
    }
    let mut state = state.lock().await;
    state.reject_hits += 1;
    let reason = body["reason"].as_str().map(str::to_string);
    state.last_reject_reason = reason.clone();
    resolve_credit(&mut state, id, "REJECTED", reason)
}

fn resolve_credit(
    state: &mut GatewayState,
    id: u64,
    target: &str,
    reason: Option<String>,
) -> Response {
    let Some(record) = state.credits.iter_mut().find(|c| c["id"] == id) else {
        return (
            StatusCode::NOT_FOUND,
            axum::Json(json!({"message": "Credit request not found"})),
        )
            .into_response();
    };
    if record["status"] != "PENDING" {
        return (
            StatusCode::CONFLICT,
            axum::Json(json!({"message": "Request already resolved"})),
        )
            .into_response();
    }
    record["status"] = json!(target);
    record["checkerEmail"] = json!("checker@gateway.sn");
    record["validatedAt"] = json!(chrono::Utc::now().to_rfc3339());
    if let Some(reason) = reason {
        record["rejectReason"] = json!(reason);
    }
    axum::Json(json!({})).into_response()
}

async fn create_exercice(
    State(state): State<SharedState>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    if let Err(resp) = require_bearer(&headers) {
        return resp;
    }
    let mut state = state.lock().await;
    let annee = body["annee"].as_i64().unwrap_or_default() as i32;
    let overwrite = body["overwriteIfExists"].as_bool().unwrap_or(false);
    if state.exercice_years.contains(&annee) && !overwrite {
        return (
            StatusCode::CONFLICT,
            axum::Json(json!({"message": "Exercice already exists"})),
        )
            .into_response();
    }
    if !state.exercice_years.contains(&annee) {
        state.exercice_years.push(annee);
    }
    axum::Json(json!({"id": 1, "annee": annee, "statut": "OUVERT"})).into_response()
}

async fn fetch_calendrier(
    State(state): State<SharedState>,
    Path(_annee): Path<i32>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = require_bearer(&headers) {
        return resp;
    }
    let state = state.lock().await;
    axum::Json(Value::Array(state.calendrier.clone())).into_response()
}

async fn generate_invoices(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = require_bearer(&headers) {
        return resp;
    }
    let mut state = state.lock().await;
    state.factures = (1..=12)
        .map(|i| {
            json!({
                "id": i,
                "clientId": i,
                "dateDebut": "2025-03-01",
                "dateFin": "2025-03-31",
                "consommationSms": 1000 * i,
                "prixUnitaire": 18.0,
                "montant": 18000.0 * i as f64,
            })
        })
        .collect();
    axum::Json(json!({"generated": 12, "skippedZero": 3})).into_response()
}

async fn list_factures(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = require_bearer(&headers) {
        return resp;
    }
    let state = state.lock().await;
    axum::Json(Value::Array(state.factures.clone())).into_response()
}

async fn invoice_pdf(Path(id): Path<u64>, headers: HeaderMap) -> Response {
    if let Err(resp) = require_bearer(&headers) {
        return resp;
    }
    (
        [(header::CONTENT_TYPE, "application/pdf")],
        format!("%PDF-1.4 mock invoice {id}"),
    )
        .into_response()
}

async fn send_invoice(Path(_id): Path<u64>, headers: HeaderMap) -> Response {
    if let Err(resp) = require_bearer(&headers) {
        return resp;
    }
    axum::Json(json!({})).into_response()
}

async fn get_footer(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    if let Err(resp) = require_bearer(&headers) {
        return resp;
    }
    let state = state.lock().await;
    axum::Json(state.footer.clone()).into_response()
}

async fn put_footer(
    State(state): State<SharedState>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    if let Err(resp) = require_bearer(&headers) {
        return resp;
    }
    state.lock().await.footer = body;
    axum::Json(json!({})).into_response()
}

async fn list_managers(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    if let Err(resp) = require_bearer(&headers) {
        return resp;
    }
    let mut state = state.lock().await;
    state.manager_list_hits += 1;
    if state.manager_failures_remaining > 0 {
        state.manager_failures_remaining -= 1;
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            axum::Json(json!({"message": "Gateway overloaded"})),
        )
            .into_response();
    }
    axum::Json(Value::Array(state.managers.clone())).into_response()
}

async fn update_manager(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    if let Err(resp) = require_bearer(&headers) {
        return resp;
    }
    let mut state = state.lock().await;
    let Some(record) = state.managers.iter_mut().find(|m| m["idManager"] == id) else {
        return (
            StatusCode::NOT_FOUND,
            axum::Json(json!({"message": "Manager not found"})),
        )
            .into_response();
    };
    // Patch semantics: only the fields the client sent change.
    if let Value::Object(fields) = body {
        for (field, value) in fields {
            record[field.as_str()] = value;
        }
    }
    axum::Json(json!({})).into_response()
}

async fn manager_action(
    State(state): State<SharedState>,
    Path((id, action)): Path<(u64, String)>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = require_bearer(&headers) {
        return resp;
    }
    let target = match action.as_str() {
        "suspend" => "SUSPENDU",
        "reactivate" | "unarchive" => "ACTIF",
        "archive" => "ARCHIVE",
        _ => {
            return (
                StatusCode::NOT_FOUND,
                axum::Json(json!({"message": "Unknown action"})),
            )
                .into_response();
        }
    };
    let mut state = state.lock().await;
    let Some(record) = state.managers.iter_mut().find(|m| m["idManager"] == id) else {
        return (
            StatusCode::NOT_FOUND,
            axum::Json(json!({"message": "Manager not found"})),
        )
            .into_response();
    };
    record["statutCompte"] = json!(target);
    axum::Json(json!({})).into_response()
}
