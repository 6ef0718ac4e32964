//! Tenant (client) management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use smsadmin_client::tenants::{CreateTenant, Tenant, TenantClient};
use smsadmin_core::error::AppError;
use smsadmin_core::types::filter;

use crate::output::{self, OutputFormat};

use super::Context;

/// Arguments for `smsadmin clients`
#[derive(Debug, Args)]
pub struct ClientArgs {
    /// Tenant action
    #[command(subcommand)]
    pub command: ClientCommands,
}

/// Tenant actions
#[derive(Debug, Subcommand)]
pub enum ClientCommands {
    /// List tenants
    List {
        /// Substring search over name, email, phone, and city
        #[arg(long)]
        search: Option<String>,
    },
    /// Register a tenant
    Create {
        /// Legal company name
        #[arg(long)]
        raison_sociale: String,
        /// Contact email
        #[arg(long)]
        email: String,
        /// Contact phone
        #[arg(long)]
        telephone: String,
        /// City code from the referentiel
        #[arg(long)]
        ville: String,
        /// Sector code from the referentiel
        #[arg(long)]
        secteur: String,
    },
    /// Suspend a tenant
    Suspend {
        /// Tenant id
        id: u64,
    },
    /// Reactivate a suspended tenant
    Reactivate {
        /// Tenant id
        id: u64,
    },
}

/// Table row for a tenant.
#[derive(Debug, Serialize, Tabled)]
struct TenantRow {
    id: u64,
    name: String,
    email: String,
    phone: String,
    city: String,
    sector: String,
    status: String,
}

impl From<&Tenant> for TenantRow {
    fn from(t: &Tenant) -> Self {
        Self {
            id: t.id,
            name: t.raison_sociale.clone(),
            email: t.email.clone(),
            phone: t.telephone.clone(),
            city: t.ville.clone(),
            sector: t.secteur.clone(),
            status: t.statut.clone(),
        }
    }
}

/// Dispatch a tenant command.
pub async fn execute(args: &ClientArgs, ctx: &Context, format: OutputFormat) -> Result<(), AppError> {
    ctx.require(None)?;
    let client = TenantClient::new(ctx.transport.clone());

    match &args.command {
        ClientCommands::List { search } => {
            let tenants = client.list().await?;
            print_tenants(&tenants, search.as_deref(), format);
            Ok(())
        }
        ClientCommands::Create { raison_sociale, email, telephone, ville, secteur } => {
            let payload = CreateTenant {
                raison_sociale: raison_sociale.clone(),
                email: email.clone(),
                telephone: telephone.clone(),
                ville: ville.clone(),
                secteur: secteur.clone(),
            };
            let tenant = client.create(&payload).await?;
            output::print_success(&format!("Tenant {} registered", tenant.id));
            Ok(())
        }
        ClientCommands::Suspend { id } => {
            client.suspend(*id).await?;
            output::print_success(&format!("Tenant {id} suspended"));
            relist(&client, format).await
        }
        ClientCommands::Reactivate { id } => {
            client.reactivate(*id).await?;
            output::print_success(&format!("Tenant {id} reactivated"));
            relist(&client, format).await
        }
    }
}

fn print_tenants(tenants: &[Tenant], search: Option<&str>, format: OutputFormat) {
    let rows: Vec<TenantRow> = match search {
        Some(query) => filter::search(tenants, query)
            .into_iter()
            .map(TenantRow::from)
            .collect(),
        None => tenants.iter().map(TenantRow::from).collect(),
    };
    output::print_list(&rows, format);
}

/// Mutation responses are not trusted as state; show a fresh listing.
async fn relist(client: &TenantClient, format: OutputFormat) -> Result<(), AppError> {
    let tenants = client.list().await?;
    print_tenants(&tenants, None, format);
    Ok(())
}
