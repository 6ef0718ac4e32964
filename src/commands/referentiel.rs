//! Referentiel lookup command.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use smsadmin_client::referentiel::ReferentielClient;
use smsadmin_core::error::AppError;

use crate::output::{self, OutputFormat};

use super::Context;

/// Arguments for `smsadmin referentiel`
#[derive(Debug, Args)]
pub struct ReferentielArgs {
    /// Category codes to look up (e.g. VILLE SECTEUR)
    #[arg(required = true)]
    pub categories: Vec<String>,
}

/// Table row for a referentiel entry.
#[derive(Debug, Serialize, Tabled)]
struct EntryRow {
    category: String,
    code: String,
    label: String,
}

/// Look up one or more referentiel categories concurrently.
pub async fn execute(
    args: &ReferentielArgs,
    ctx: &Context,
    format: OutputFormat,
) -> Result<(), AppError> {
    ctx.require(None)?;
    let client = ReferentielClient::new(ctx.transport.clone());

    let categories: Vec<&str> = args.categories.iter().map(String::as_str).collect();
    let results = client.lookup_many(&categories).await?;

    let rows: Vec<EntryRow> = categories
        .iter()
        .zip(results)
        .flat_map(|(category, entries)| {
            entries.into_iter().map(|entry| EntryRow {
                category: category.to_string(),
                code: entry.code,
                label: entry.libelle,
            })
        })
        .collect();
    output::print_list(&rows, format);
    Ok(())
}
