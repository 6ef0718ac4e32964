//! Billing exercise, calendar, invoice, and footer commands.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use smsadmin_client::billing::{
    BillingClient, CalendrierMois, CreateExercice, Facture, FooterConfig, month_slots,
};
use smsadmin_core::error::{AppError, ErrorKind};
use smsadmin_core::types::Role;

use crate::output::{self, OutputFormat};

use super::Context;

/// Arguments for `smsadmin billing`
#[derive(Debug, Args)]
pub struct BillingArgs {
    /// Billing action
    #[command(subcommand)]
    pub command: BillingCommands,
}

/// Billing actions
#[derive(Debug, Subcommand)]
pub enum BillingCommands {
    /// Open a billing exercise for a fiscal year
    Exercice {
        /// Fiscal year
        annee: i32,
        /// Day of the following month on which invoices are generated (1-28)
        #[arg(long, default_value_t = 5)]
        invoice_day: u8,
        /// Replace an existing exercise for the same year
        #[arg(long)]
        overwrite: bool,
    },
    /// Show the 12-month calendar for a year
    Calendrier {
        /// Fiscal year
        annee: i32,
    },
    /// Trigger invoice generation for a month
    Generer {
        /// Fiscal year
        annee: i32,
        /// Month, 1-12
        mois: u32,
    },
    /// List invoices for a period
    Factures {
        /// Fiscal year
        annee: i32,
        /// Month, 1-12
        mois: u32,
    },
    /// Download an invoice PDF
    Pdf {
        /// Invoice id
        id: u64,
        /// Destination path
        #[arg(long, default_value = "facture.pdf")]
        out: PathBuf,
    },
    /// Email an invoice to the tenant
    Send {
        /// Invoice id
        id: u64,
    },
    /// Invoice letterhead configuration
    Footer {
        #[command(subcommand)]
        command: FooterCommands,
    },
}

/// Letterhead actions
#[derive(Debug, Subcommand)]
pub enum FooterCommands {
    /// Show the current letterhead
    Show,
    /// Update letterhead fields (unset fields keep their current value)
    Set {
        /// Legal company name
        #[arg(long)]
        raison_sociale: Option<String>,
        /// Postal address
        #[arg(long)]
        adresse: Option<String>,
        /// Contact phone
        #[arg(long)]
        telephone: Option<String>,
        /// Contact email
        #[arg(long)]
        email: Option<String>,
        /// Registration number
        #[arg(long)]
        registre: Option<String>,
    },
}

/// Calendar row, one per month.
#[derive(Debug, Serialize, Tabled)]
struct CalendarRow {
    month: u32,
    consumption_start: String,
    consumption_end: String,
    invoice_date: String,
}

impl CalendarRow {
    fn from_slot(month: u32, slot: &Option<CalendrierMois>) -> Self {
        match slot {
            Some(entry) => Self {
                month,
                consumption_start: entry.date_debut_consommation.to_string(),
                consumption_end: entry.date_fin_consommation.to_string(),
                invoice_date: entry.date_generation_facture.to_string(),
            },
            None => Self {
                month,
                consumption_start: "-".into(),
                consumption_end: "-".into(),
                invoice_date: "no exercise planned".into(),
            },
        }
    }
}

/// Invoice row.
#[derive(Debug, Serialize, Tabled)]
struct FactureRow {
    id: u64,
    client: u64,
    period: String,
    sms: u64,
    unit_price: f64,
    amount: f64,
}

impl From<&Facture> for FactureRow {
    fn from(f: &Facture) -> Self {
        let period = match (f.date_debut, f.date_fin) {
            (Some(start), Some(end)) => format!("{start} .. {end}"),
            _ => "-".into(),
        };
        Self {
            id: f.id,
            client: f.client_id,
            period,
            sms: f.consommation_sms,
            unit_price: f.prix_unitaire,
            amount: f.montant,
        }
    }
}

/// Dispatch a billing command.
pub async fn execute(args: &BillingArgs, ctx: &Context, format: OutputFormat) -> Result<(), AppError> {
    let client = BillingClient::new(ctx.transport.clone());

    match &args.command {
        BillingCommands::Exercice { annee, invoice_day, overwrite } => {
            ctx.require(Some(Role::SuperAdmin))?;
            let payload = CreateExercice {
                annee: *annee,
                invoice_day_of_next_month: *invoice_day,
                overwrite_if_exists: *overwrite,
            };
            match client.create_exercice(&payload).await {
                Ok(exercice) => {
                    output::print_success(&format!("Billing exercice {} opened", exercice.annee));
                    Ok(())
                }
                Err(e) if e.kind == ErrorKind::Conflict && !overwrite => {
                    output::print_warning(&e.message);
                    println!("Pass --overwrite to replace it.");
                    Err(e)
                }
                Err(e) => Err(e),
            }
        }
        BillingCommands::Calendrier { annee } => {
            ctx.require(None)?;
            let entries = client.fetch_calendrier(*annee).await?;
            let slots = month_slots(entries);
            let rows: Vec<CalendarRow> = slots
                .iter()
                .enumerate()
                .map(|(i, slot)| CalendarRow::from_slot(i as u32 + 1, slot))
                .collect();
            output::print_list(&rows, format);
            Ok(())
        }
        BillingCommands::Generer { annee, mois } => {
            ctx.require(Some(Role::SuperAdmin))?;
            let report = client.generate_invoices(*annee, *mois).await?;
            output::print_success(&format!(
                "{} invoice(s) generated, {} tenant(s) skipped for zero consumption",
                report.generated, report.skipped_zero
            ));

            // The trigger response carries counts only; the new rows come
            // from a fresh listing.
            let factures = client.list_factures(*annee, *mois).await?;
            let rows: Vec<FactureRow> = factures.iter().map(FactureRow::from).collect();
            output::print_list(&rows, format);
            Ok(())
        }
        BillingCommands::Factures { annee, mois } => {
            ctx.require(None)?;
            let factures = client.list_factures(*annee, *mois).await?;
            let rows: Vec<FactureRow> = factures.iter().map(FactureRow::from).collect();
            output::print_list(&rows, format);
            Ok(())
        }
        BillingCommands::Pdf { id, out } => {
            ctx.require(None)?;
            // The download lands in a scoped temp file that disappears on
            // drop; the user's copy is made before that.
            let tmp = tempfile::tempdir()?;
            let document = client.download_invoice(*id, tmp.path()).await?;
            std::fs::copy(document.path(), out)?;
            output::print_success(&format!("Invoice {} saved to {}", id, out.display()));
            Ok(())
        }
        BillingCommands::Send { id } => {
            ctx.require(None)?;
            client.send_invoice(*id).await?;
            output::print_success(&format!("Invoice {id} queued for sending"));
            Ok(())
        }
        BillingCommands::Footer { command } => {
            ctx.require(Some(Role::SuperAdmin))?;
            match command {
                FooterCommands::Show => {
                    let footer = client.footer().await?;
                    output::print_item(&footer, format);
                    Ok(())
                }
                FooterCommands::Set { raison_sociale, adresse, telephone, email, registre } => {
                    // Read-modify-write: the save endpoint replaces the
                    // whole record, last write wins.
                    let mut footer = match client.footer().await {
                        Ok(footer) => footer,
                        Err(e) if e.kind == ErrorKind::NotFound => FooterConfig::default(),
                        Err(e) => return Err(e),
                    };
                    apply(&mut footer.raison_sociale, raison_sociale);
                    apply(&mut footer.adresse, adresse);
                    apply(&mut footer.telephone, telephone);
                    apply(&mut footer.email, email);
                    apply(&mut footer.registre, registre);
                    client.save_footer(&footer).await?;
                    output::print_success("Letterhead updated");
                    Ok(())
                }
            }
        }
    }
}

fn apply(field: &mut String, value: &Option<String>) {
    if let Some(v) = value {
        *field = v.clone();
    }
}
