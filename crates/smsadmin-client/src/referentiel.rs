//! Referentiel (reference data) lookups.
//!
//! Cities, business sectors, and country codes live in a referentiel
//! keyed by category code. Page mounts fetch several categories at once;
//! the requests are independent and share only the bearer token.

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use smsadmin_core::error::AppError;

use crate::transport::{ApiTransport, normalize_page};

/// One entry of a referentiel category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferentielEntry {
    /// Stable entry code.
    #[serde(default)]
    pub code: String,
    /// Display label.
    #[serde(default)]
    pub libelle: String,
}

/// Client for referentiel lookups.
#[derive(Debug, Clone)]
pub struct ReferentielClient {
    transport: ApiTransport,
}

impl ReferentielClient {
    /// Creates a referentiel client over the shared transport.
    pub fn new(transport: ApiTransport) -> Self {
        Self { transport }
    }

    /// Fetch the entries of one category.
    pub async fn lookup(&self, categorie: &str) -> Result<Vec<ReferentielEntry>, AppError> {
        let path = format!("/api/V1/referentiel/categorie/{categorie}");
        let value: serde_json::Value = self.transport.get(&path, &[]).await?;
        Ok(normalize_page(value).content)
    }

    /// Fetch several categories concurrently, in input order.
    pub async fn lookup_many(
        &self,
        categories: &[&str],
    ) -> Result<Vec<Vec<ReferentielEntry>>, AppError> {
        try_join_all(categories.iter().map(|c| self.lookup(c))).await
    }
}
