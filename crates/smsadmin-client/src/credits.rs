//! Credit-request approval workflow.
//!
//! Credit requests follow a maker/checker state machine owned by the
//! gateway: `PENDING → APPROVED` or `PENDING → REJECTED(reason)`, both
//! terminal. The client enforces the same guard before the wire — no
//! action is ever sent for a resolved request — and treats a lost race
//! with a concurrent admin (a 409) as an idempotent no-op.

use serde::{Deserialize, Serialize};
use tracing::info;

use smsadmin_core::error::{AppError, ErrorKind};
use smsadmin_core::types::{Page, PageQuery, Searchable};

use crate::transport::{ApiTransport, normalize_page};

/// Lifecycle state of a credit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditStatus {
    /// Awaiting a checker's decision.
    Pending,
    /// Approved; terminal.
    Approved,
    /// Rejected with a reason; terminal.
    Rejected,
}

impl CreditStatus {
    /// Return the status as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

impl std::fmt::Display for CreditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An SMS-credit purchase request, as the gateway reports it.
///
/// Requests are created elsewhere (by tenants); the console only reads
/// and resolves them. `idempotency_key` is generated and enforced
/// server-side and passed through for display only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditRequest {
    /// Request identifier.
    pub id: u64,
    /// Owning tenant.
    #[serde(default)]
    pub client_id: u64,
    /// Number of SMS credits requested.
    #[serde(default)]
    pub quantity: u64,
    /// Current state.
    pub status: CreditStatus,
    /// Requesting user (maker).
    #[serde(default)]
    pub maker_email: String,
    /// Resolving admin (checker); absent until resolved.
    #[serde(default)]
    pub checker_email: Option<String>,
    /// Server-side idempotency key, display only.
    #[serde(default)]
    pub idempotency_key: String,
    /// Rejection reason; present only when rejected.
    #[serde(default)]
    pub reject_reason: Option<String>,
    /// When the request was created.
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    /// When the request was resolved; absent while pending.
    #[serde(default)]
    pub validated_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Unit price applied, tax included.
    #[serde(default)]
    pub price_per_sms_ttc: f64,
    /// Estimated total, tax included.
    #[serde(default)]
    pub estimated_amount_ttc: f64,
}

impl CreditRequest {
    /// Whether approve/reject actions are still permitted.
    pub fn is_pending(&self) -> bool {
        self.status == CreditStatus::Pending
    }
}

impl Searchable for CreditRequest {
    fn search_fields(&self) -> Vec<String> {
        vec![
            self.client_id.to_string(),
            self.maker_email.clone(),
            self.checker_email.clone().unwrap_or_default(),
            self.quantity.to_string(),
        ]
    }
}

/// Outcome of an approve/reject call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    /// The gateway applied the transition.
    Applied,
    /// The request was already resolved — locally, or by a concurrent
    /// admin who won the race. Not an error; the caller re-lists either
    /// way.
    AlreadyResolved,
}

/// Body of a rejection.
#[derive(Debug, Serialize)]
struct RejectBody<'a> {
    reason: &'a str,
}

/// Client for the credit-request workflow endpoints.
#[derive(Debug, Clone)]
pub struct CreditClient {
    transport: ApiTransport,
}

impl CreditClient {
    /// Creates a credit client over the shared transport.
    pub fn new(transport: ApiTransport) -> Self {
        Self { transport }
    }

    /// List credit requests, optionally narrowed to one status.
    ///
    /// Not retried automatically; a load failure surfaces as-is.
    pub async fn list(
        &self,
        query: PageQuery,
        status: Option<CreditStatus>,
    ) -> Result<Page<CreditRequest>, AppError> {
        let mut params = vec![
            ("page", query.page.to_string()),
            ("size", query.size.to_string()),
        ];
        if let Some(status) = status {
            params.push(("status", status.as_str().to_string()));
        }

        let value: serde_json::Value = self.transport.get("/api/V1/credits", &params).await?;
        Ok(normalize_page(value))
    }

    /// Approve a pending request.
    ///
    /// A request that is no longer `PENDING` short-circuits to
    /// [`ApprovalOutcome::AlreadyResolved`] without touching the network.
    /// Server-assigned fields (`checkerEmail`, `validatedAt`) only appear
    /// on the next listing; there is no optimistic mutation here.
    pub async fn approve(&self, request: &CreditRequest) -> Result<ApprovalOutcome, AppError> {
        if !request.is_pending() {
            return Ok(ApprovalOutcome::AlreadyResolved);
        }

        let path = format!("/api/V1/credits/{}/approve", request.id);
        match self.transport.post_unit::<()>(&path, None).await {
            Ok(()) => {
                info!(id = request.id, "Credit request approved");
                Ok(ApprovalOutcome::Applied)
            }
            Err(e) if e.kind == ErrorKind::Conflict => Ok(ApprovalOutcome::AlreadyResolved),
            Err(e) => Err(e),
        }
    }

    /// Reject a pending request with a non-empty reason.
    ///
    /// A blank or whitespace reason is refused client-side with a
    /// validation error and no network call.
    pub async fn reject(
        &self,
        request: &CreditRequest,
        reason: &str,
    ) -> Result<ApprovalOutcome, AppError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::validation("A rejection reason is required"));
        }
        if !request.is_pending() {
            return Ok(ApprovalOutcome::AlreadyResolved);
        }

        let path = format!("/api/V1/credits/{}/reject", request.id);
        match self
            .transport
            .post_unit(&path, Some(&RejectBody { reason }))
            .await
        {
            Ok(()) => {
                info!(id = request.id, "Credit request rejected");
                Ok(ApprovalOutcome::Applied)
            }
            Err(e) if e.kind == ErrorKind::Conflict => Ok(ApprovalOutcome::AlreadyResolved),
            Err(e) => Err(e),
        }
    }
}
