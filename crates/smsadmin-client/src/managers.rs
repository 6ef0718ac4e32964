//! Dashboard manager accounts.
//!
//! Managers are the operators of the console itself. Status transitions
//! (suspend, reactivate, archive, unarchive) are one-directional actions
//! confirmed server-side; the roster applies an optimistic local change
//! for immediate feedback and is then replaced wholesale by the next
//! authoritative listing — never merged field by field.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use smsadmin_core::config::retry::RetryConfig;
use smsadmin_core::error::{AppError, ErrorKind};
use smsadmin_core::types::{Role, Searchable};

use crate::transport::{ApiTransport, normalize_page};

/// Account status of a manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Active account.
    Actif,
    /// Temporarily suspended.
    Suspendu,
    /// Archived; hidden from day-to-day views.
    Archive,
}

impl AccountStatus {
    /// Return the status as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Actif => "ACTIF",
            Self::Suspendu => "SUSPENDU",
            Self::Archive => "ARCHIVE",
        }
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A dashboard user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manager {
    /// Manager identifier.
    #[serde(rename = "idManager")]
    pub id_manager: u64,
    /// Family name.
    #[serde(rename = "nomManager", default)]
    pub nom_manager: String,
    /// Given name.
    #[serde(rename = "prenomManager", default)]
    pub prenom_manager: String,
    /// Login email.
    #[serde(default)]
    pub email: String,
    /// Phone number.
    #[serde(rename = "numeroTelephoneManager", default)]
    pub numero_telephone_manager: String,
    /// Assigned role.
    pub role: Role,
    /// Account status.
    #[serde(rename = "statutCompte")]
    pub statut_compte: AccountStatus,
}

impl Searchable for Manager {
    fn search_fields(&self) -> Vec<String> {
        vec![
            self.nom_manager.clone(),
            self.prenom_manager.clone(),
            self.email.clone(),
            self.numero_telephone_manager.clone(),
        ]
    }
}

/// Payload for creating a manager account.
#[derive(Debug, Clone, Serialize)]
pub struct CreateManager {
    /// Family name.
    #[serde(rename = "nomManager")]
    pub nom_manager: String,
    /// Given name.
    #[serde(rename = "prenomManager")]
    pub prenom_manager: String,
    /// Login email.
    pub email: String,
    /// Phone number.
    #[serde(rename = "numeroTelephoneManager")]
    pub numero_telephone_manager: String,
    /// Assigned role.
    pub role: Role,
}

/// Partial update of a manager account.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateManager {
    /// New family name.
    #[serde(rename = "nomManager", skip_serializing_if = "Option::is_none")]
    pub nom_manager: Option<String>,
    /// New given name.
    #[serde(rename = "prenomManager", skip_serializing_if = "Option::is_none")]
    pub prenom_manager: Option<String>,
    /// New phone number.
    #[serde(
        rename = "numeroTelephoneManager",
        skip_serializing_if = "Option::is_none"
    )]
    pub numero_telephone_manager: Option<String>,
    /// New role.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Client for the manager endpoints.
#[derive(Debug, Clone)]
pub struct ManagerClient {
    transport: ApiTransport,
    retry: RetryConfig,
}

impl ManagerClient {
    /// Creates a manager client over the shared transport.
    pub fn new(transport: ApiTransport, retry: RetryConfig) -> Self {
        Self { transport, retry }
    }

    /// Single listing attempt, no retry. Used by the silent poller.
    pub async fn fetch_once(&self) -> Result<Vec<Manager>, AppError> {
        let value: serde_json::Value = self.transport.get("/api/V1/managers", &[]).await?;
        Ok(normalize_page(value).content)
    }

    /// List manager accounts with bounded exponential backoff.
    ///
    /// The only auto-retried foreground load in the console: transient
    /// failures (network, 5xx) are retried up to the configured attempt
    /// count with a doubling delay; authentication, authorization, and
    /// validation failures are returned immediately.
    pub async fn list(&self) -> Result<Vec<Manager>, AppError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut delay = Duration::from_millis(self.retry.base_delay_ms);

        let mut attempt = 1;
        loop {
            match self.fetch_once().await {
                Ok(managers) => return Ok(managers),
                Err(e) if attempt < max_attempts && is_transient(&e) => {
                    warn!(
                        attempt,
                        max_attempts,
                        error = %e,
                        "Manager list failed; retrying after backoff"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Create a manager account.
    pub async fn create(&self, payload: &CreateManager) -> Result<Manager, AppError> {
        let manager: Manager = self
            .transport
            .post("/api/V1/managers", &[], Some(payload))
            .await?;
        info!(id = manager.id_manager, "Manager created");
        Ok(manager)
    }

    /// Apply a partial update to a manager account.
    pub async fn update(&self, id: u64, payload: &UpdateManager) -> Result<(), AppError> {
        self.transport
            .patch_unit(&format!("/api/V1/managers/{id}"), payload)
            .await
    }

    /// Suspend an account.
    pub async fn suspend(&self, id: u64) -> Result<(), AppError> {
        self.status_action(id, "suspend").await
    }

    /// Reactivate a suspended account.
    pub async fn reactivate(&self, id: u64) -> Result<(), AppError> {
        self.status_action(id, "reactivate").await
    }

    /// Archive an account.
    pub async fn archive(&self, id: u64) -> Result<(), AppError> {
        self.status_action(id, "archive").await
    }

    /// Restore an archived account.
    pub async fn unarchive(&self, id: u64) -> Result<(), AppError> {
        self.status_action(id, "unarchive").await
    }

    async fn status_action(&self, id: u64, action: &str) -> Result<(), AppError> {
        let path = format!("/api/V1/managers/{id}/{action}");
        self.transport.post_unit::<()>(&path, None).await?;
        info!(id, action, "Manager status action confirmed");
        Ok(())
    }
}

fn is_transient(e: &AppError) -> bool {
    matches!(e.kind, ErrorKind::Network | ErrorKind::ExternalService)
}

/// Locally held manager list with optimistic status changes.
///
/// A status action tags a tentative local transition so the view updates
/// immediately; the next authoritative listing replaces the whole roster
/// and drops the tag.
#[derive(Debug, Default)]
pub struct ManagerRoster {
    entries: Vec<Manager>,
    pending: Option<(u64, AccountStatus)>,
}

impl ManagerRoster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current (possibly tentative) entries.
    pub fn entries(&self) -> &[Manager] {
        &self.entries
    }

    /// Whether an optimistic change awaits server confirmation.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Apply a tentative local status change for immediate feedback.
    pub fn apply_optimistic(&mut self, id: u64, status: AccountStatus) {
        if let Some(manager) = self.entries.iter_mut().find(|m| m.id_manager == id) {
            manager.statut_compte = status;
            self.pending = Some((id, status));
        }
    }

    /// Replace the roster wholesale with an authoritative listing.
    pub fn reconcile(&mut self, authoritative: Vec<Manager>) {
        self.entries = authoritative;
        self.pending = None;
    }
}

/// Silent background refresher for a shared roster.
///
/// Poll failures are logged at debug level and swallowed — an idle
/// console must not accumulate error toasts. Foreground loads go through
/// [`ManagerClient::list`] and always surface their failures.
pub struct ManagerPoller {
    client: ManagerClient,
    roster: Arc<Mutex<ManagerRoster>>,
    interval: Duration,
}

impl ManagerPoller {
    /// Creates a poller refreshing `roster` every `interval_seconds`.
    pub fn new(
        client: ManagerClient,
        roster: Arc<Mutex<ManagerRoster>>,
        interval_seconds: u64,
    ) -> Self {
        Self {
            client,
            roster,
            interval: Duration::from_secs(interval_seconds.max(1)),
        }
    }

    /// Runs one silent refresh cycle.
    pub async fn poll_once(&self) {
        match self.client.fetch_once().await {
            Ok(managers) => {
                self.roster.lock().await.reconcile(managers);
            }
            Err(e) => {
                debug!(error = %e, "Silent manager poll failed");
            }
        }
    }

    /// Spawns the background polling loop.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                self.poll_once().await;
            }
        })
    }
}
