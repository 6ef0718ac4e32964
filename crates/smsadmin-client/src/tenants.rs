//! Tenant (client) accounts of the SMS gateway.

use serde::{Deserialize, Serialize};
use tracing::info;

use smsadmin_core::error::AppError;
use smsadmin_core::types::Searchable;

use crate::transport::{ApiTransport, normalize_page};

/// A tenant buying SMS credits through the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    /// Tenant identifier.
    pub id: u64,
    /// Legal company name.
    #[serde(default)]
    pub raison_sociale: String,
    /// Contact email.
    #[serde(default)]
    pub email: String,
    /// Contact phone number.
    #[serde(default)]
    pub telephone: String,
    /// City, from the referentiel.
    #[serde(default)]
    pub ville: String,
    /// Business sector, from the referentiel.
    #[serde(default)]
    pub secteur: String,
    /// Free-form account status string.
    #[serde(default)]
    pub statut: String,
}

impl Searchable for Tenant {
    fn search_fields(&self) -> Vec<String> {
        vec![
            self.raison_sociale.clone(),
            self.email.clone(),
            self.telephone.clone(),
            self.ville.clone(),
        ]
    }
}

/// Payload for registering a tenant.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenant {
    /// Legal company name.
    pub raison_sociale: String,
    /// Contact email.
    pub email: String,
    /// Contact phone number.
    pub telephone: String,
    /// City code from the referentiel.
    pub ville: String,
    /// Sector code from the referentiel.
    pub secteur: String,
}

/// Partial update of a tenant.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTenant {
    /// New legal name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raison_sociale: Option<String>,
    /// New contact email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,
    /// New city code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ville: Option<String>,
    /// New sector code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secteur: Option<String>,
}

/// Client for the tenant endpoints.
#[derive(Debug, Clone)]
pub struct TenantClient {
    transport: ApiTransport,
}

impl TenantClient {
    /// Creates a tenant client over the shared transport.
    pub fn new(transport: ApiTransport) -> Self {
        Self { transport }
    }

    /// List all tenants.
    pub async fn list(&self) -> Result<Vec<Tenant>, AppError> {
        let value: serde_json::Value = self.transport.get("/api/V1/clients", &[]).await?;
        Ok(normalize_page(value).content)
    }

    /// Register a tenant.
    pub async fn create(&self, payload: &CreateTenant) -> Result<Tenant, AppError> {
        let tenant: Tenant = self
            .transport
            .post("/api/V1/clients", &[], Some(payload))
            .await?;
        info!(id = tenant.id, "Tenant created");
        Ok(tenant)
    }

    /// Apply a partial update. The caller re-lists afterwards; the
    /// response body is not trusted as the new state.
    pub async fn update(&self, id: u64, payload: &UpdateTenant) -> Result<(), AppError> {
        self.transport
            .patch_unit(&format!("/api/V1/clients/{id}"), payload)
            .await
    }

    /// Suspend a tenant.
    pub async fn suspend(&self, id: u64) -> Result<(), AppError> {
        self.transport
            .post_unit::<()>(&format!("/api/V1/clients/{id}/suspend"), None)
            .await
    }

    /// Reactivate a suspended tenant.
    pub async fn reactivate(&self, id: u64) -> Result<(), AppError> {
        self.transport
            .post_unit::<()>(&format!("/api/V1/clients/{id}/reactivate"), None)
            .await
    }
}
