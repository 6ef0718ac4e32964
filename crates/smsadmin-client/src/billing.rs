//! Billing exercises, invoice calendar, and invoice actions.
//!
//! A billing exercise covers one fiscal year; the gateway derives its
//! month-by-month calendar (consumption window + invoice generation date)
//! server-side. The console creates exercises, reads calendars, triggers
//! invoice generation, and fetches/sends/downloads the resulting invoice
//! documents. All amounts are computed by the gateway.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use smsadmin_core::error::{AppError, ErrorKind};

use crate::transport::{ApiTransport, normalize_page};

/// A fiscal-year billing exercise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercice {
    /// Exercise identifier.
    pub id: u64,
    /// Fiscal year.
    pub annee: i32,
    /// Free-form server status string (e.g. `OUVERT`, `EN_COURS`).
    #[serde(default)]
    pub statut: String,
    /// When the exercise was created.
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// One month of an exercise's billing calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendrierMois {
    /// Entry identifier.
    pub id: u64,
    /// Month number, 1–12.
    pub mois: u32,
    /// First day of the consumption window.
    pub date_debut_consommation: NaiveDate,
    /// Last day of the consumption window.
    pub date_fin_consommation: NaiveDate,
    /// Scheduled invoice generation date.
    pub date_generation_facture: NaiveDate,
    /// Owning exercise.
    #[serde(default)]
    pub exercice_id: u64,
}

/// An invoice row, read-only from the console.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facture {
    /// Invoice identifier.
    pub id: u64,
    /// Billed tenant.
    #[serde(default)]
    pub client_id: u64,
    /// Billing period start.
    #[serde(default)]
    pub date_debut: Option<NaiveDate>,
    /// Billing period end.
    #[serde(default)]
    pub date_fin: Option<NaiveDate>,
    /// SMS consumed over the period.
    #[serde(default)]
    pub consommation_sms: u64,
    /// Unit price.
    #[serde(default)]
    pub prix_unitaire: f64,
    /// Total amount — computed by the gateway, never locally.
    #[serde(default)]
    pub montant: f64,
}

/// Result of an invoice-generation trigger.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    /// Invoices created.
    pub generated: u32,
    /// Tenants skipped for zero consumption.
    #[serde(default)]
    pub skipped_zero: u32,
}

/// Company letterhead fields shown on invoices. Last-write-wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterConfig {
    /// Legal company name.
    #[serde(default)]
    pub raison_sociale: String,
    /// Postal address.
    #[serde(default)]
    pub adresse: String,
    /// Contact phone number.
    #[serde(default)]
    pub telephone: String,
    /// Contact email.
    #[serde(default)]
    pub email: String,
    /// Company registration number.
    #[serde(default)]
    pub registre: String,
}

/// Payload for creating a fiscal-year exercise.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExercice {
    /// Fiscal year to open.
    #[validate(range(min = 2000, max = 2100, message = "year out of range"))]
    pub annee: i32,
    /// Day of the following month on which invoices are generated.
    /// Capped at 28 to avoid month-length edge cases.
    #[validate(range(min = 1, max = 28, message = "invoice day must be between 1 and 28"))]
    pub invoice_day_of_next_month: u8,
    /// Replace an existing exercise for the same year instead of
    /// conflicting. Always an explicit caller decision.
    pub overwrite_if_exists: bool,
}

/// A downloaded invoice PDF, held in a scoped temporary file.
///
/// The file is removed when the handle drops, whether or not the
/// consumer managed to open it — the release side of the discipline is
/// unconditional.
#[derive(Debug)]
pub struct InvoiceDocument {
    path: PathBuf,
}

impl InvoiceDocument {
    /// Write `bytes` under `dir` as `facture-{id}.pdf`.
    pub fn write(dir: &Path, facture_id: u64, bytes: &Bytes) -> Result<Self, AppError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("facture-{facture_id}.pdf"));
        std::fs::write(&path, bytes)?;
        Ok(Self { path })
    }

    /// Where the document lives until this handle drops.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for InvoiceDocument {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "Failed to remove invoice document");
            }
        }
    }
}

/// Client for the billing endpoints.
#[derive(Debug, Clone)]
pub struct BillingClient {
    transport: ApiTransport,
}

impl BillingClient {
    /// Creates a billing client over the shared transport.
    pub fn new(transport: ApiTransport) -> Self {
        Self { transport }
    }

    /// Open a billing exercise for a fiscal year.
    ///
    /// The invoice day is validated client-side before any call. A 409
    /// means an exercise already exists for that year; it is reported as
    /// a distinct conflict and never retried here — resubmitting with
    /// `overwrite_if_exists = true` is the caller's decision.
    pub async fn create_exercice(&self, payload: &CreateExercice) -> Result<Exercice, AppError> {
        payload
            .validate()
            .map_err(|e| AppError::validation(format!("Invalid year or invoice day: {e}")))?;

        match self
            .transport
            .post("/api/V1/billing/exercices", &[], Some(payload))
            .await
        {
            Ok(exercice) => {
                info!(annee = payload.annee, "Billing exercice created");
                Ok(exercice)
            }
            Err(e) if e.kind == ErrorKind::Conflict => Err(AppError::conflict(format!(
                "A billing exercice already exists for {}",
                payload.annee
            ))),
            Err(e) => Err(e),
        }
    }

    /// Fetch the calendar entries for a year: 0–12 entries, at most one
    /// per month. An absent month means "no exercise scheduled", not an
    /// error.
    pub async fn fetch_calendrier(&self, annee: i32) -> Result<Vec<CalendrierMois>, AppError> {
        let path = format!("/api/V1/billing/exercices/{annee}/calendrier");
        let value: serde_json::Value = self.transport.get(&path, &[]).await?;
        Ok(normalize_page(value).content)
    }

    /// Trigger invoice generation for a month. Fire-and-forget: the
    /// report carries counts only, and new rows are observed by
    /// re-fetching the invoice list.
    pub async fn generate_invoices(
        &self,
        annee: i32,
        mois: u32,
    ) -> Result<GenerationReport, AppError> {
        let query = [("annee", annee.to_string()), ("mois", mois.to_string())];
        let report: GenerationReport = self
            .transport
            .post::<(), _>("/api/V1/billing/generer", &query, None)
            .await?;
        info!(
            annee,
            mois,
            generated = report.generated,
            skipped = report.skipped_zero,
            "Invoice generation triggered"
        );
        Ok(report)
    }

    /// List the invoices for a period.
    pub async fn list_factures(&self, annee: i32, mois: u32) -> Result<Vec<Facture>, AppError> {
        let query = [("annee", annee.to_string()), ("mois", mois.to_string())];
        let value: serde_json::Value = self
            .transport
            .get("/api/V1/billing/factures", &query)
            .await?;
        Ok(normalize_page(value).content)
    }

    /// Download an invoice PDF into a scoped temporary document under
    /// `dir`. The file disappears when the returned handle drops.
    pub async fn download_invoice(
        &self,
        facture_id: u64,
        dir: &Path,
    ) -> Result<InvoiceDocument, AppError> {
        let path = format!("/api/V1/billing/factures/{facture_id}/pdf");
        let bytes = self.transport.get_bytes(&path).await?;
        InvoiceDocument::write(dir, facture_id, &bytes)
    }

    /// Ask the gateway to email an invoice. No local state changes.
    pub async fn send_invoice(&self, facture_id: u64) -> Result<(), AppError> {
        let path = format!("/api/V1/billing/factures/{facture_id}/send");
        self.transport.post_unit::<()>(&path, None).await
    }

    /// Fetch the invoice letterhead configuration.
    ///
    /// Note the lowercase `v1` segment: this endpoint predates the rest
    /// of the API surface.
    pub async fn footer(&self) -> Result<FooterConfig, AppError> {
        self.transport.get("/api/v1/footer", &[]).await
    }

    /// Overwrite the letterhead configuration wholesale.
    pub async fn save_footer(&self, config: &FooterConfig) -> Result<(), AppError> {
        self.transport.put_unit("/api/v1/footer", config).await
    }
}

/// Arrange calendar entries into one slot per month.
///
/// Duplicate months keep the first entry seen and log the anomaly; the
/// gateway guarantees at most one entry per `(annee, mois)`.
pub fn month_slots(entries: Vec<CalendrierMois>) -> [Option<CalendrierMois>; 12] {
    let mut slots: [Option<CalendrierMois>; 12] = Default::default();
    for entry in entries {
        match entry.mois {
            1..=12 => {
                let idx = (entry.mois - 1) as usize;
                if slots[idx].is_some() {
                    warn!(mois = entry.mois, "Duplicate calendar entry for month; keeping first");
                } else {
                    slots[idx] = Some(entry);
                }
            }
            other => warn!(mois = other, "Calendar entry with out-of-range month"),
        }
    }
    slots
}
