//! Manager account commands.
//!
//! Every manager view is super-admin only. Status mutations go through
//! the roster: the optimistic change gives immediate feedback and the
//! authoritative re-listing replaces it wholesale.

use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use tokio::sync::Mutex;

use smsadmin_client::managers::{
    AccountStatus, CreateManager, Manager, ManagerClient, ManagerPoller, ManagerRoster,
};
use smsadmin_core::error::AppError;
use smsadmin_core::types::{Role, filter};
use smsadmin_session::AuthState;
use smsadmin_session::revalidate::SessionRevalidator;

use crate::output::{self, OutputFormat};

use super::Context;

/// Arguments for `smsadmin managers`
#[derive(Debug, Args)]
pub struct ManagerArgs {
    /// Manager action
    #[command(subcommand)]
    pub command: ManagerCommands,
}

/// Manager actions
#[derive(Debug, Subcommand)]
pub enum ManagerCommands {
    /// List manager accounts
    List {
        /// Substring search over names, email, and phone
        #[arg(long)]
        search: Option<String>,
    },
    /// Create a manager account
    Create {
        /// Family name
        #[arg(long)]
        nom: String,
        /// Given name
        #[arg(long)]
        prenom: String,
        /// Login email
        #[arg(long)]
        email: String,
        /// Phone number
        #[arg(long)]
        telephone: String,
        /// Role (ADMIN, SUPER_ADMIN, AUDITEUR)
        #[arg(long, default_value = "ADMIN")]
        role: String,
    },
    /// Suspend an account
    Suspend {
        /// Manager id
        id: u64,
    },
    /// Reactivate a suspended account
    Reactivate {
        /// Manager id
        id: u64,
    },
    /// Archive an account
    Archive {
        /// Manager id
        id: u64,
    },
    /// Restore an archived account
    Unarchive {
        /// Manager id
        id: u64,
    },
    /// Watch the roster, refreshing silently until interrupted
    Watch,
}

/// Table row for a manager account.
#[derive(Debug, Serialize, Tabled)]
struct ManagerRow {
    id: u64,
    name: String,
    email: String,
    phone: String,
    role: String,
    status: String,
}

impl From<&Manager> for ManagerRow {
    fn from(m: &Manager) -> Self {
        Self {
            id: m.id_manager,
            name: format!("{} {}", m.prenom_manager, m.nom_manager),
            email: m.email.clone(),
            phone: m.numero_telephone_manager.clone(),
            role: m.role.to_string(),
            status: m.statut_compte.to_string(),
        }
    }
}

/// Dispatch a manager command.
pub async fn execute(args: &ManagerArgs, ctx: &Context, format: OutputFormat) -> Result<(), AppError> {
    ctx.require(Some(Role::SuperAdmin))?;
    let client = ManagerClient::new(ctx.transport.clone(), ctx.config.retry.clone());

    match &args.command {
        ManagerCommands::List { search } => {
            let managers = client.list().await?;
            let rows: Vec<ManagerRow> = match search {
                Some(query) => filter::search(&managers, query)
                    .into_iter()
                    .map(ManagerRow::from)
                    .collect(),
                None => managers.iter().map(ManagerRow::from).collect(),
            };
            output::print_list(&rows, format);
            Ok(())
        }
        ManagerCommands::Create { nom, prenom, email, telephone, role } => {
            let payload = CreateManager {
                nom_manager: nom.clone(),
                prenom_manager: prenom.clone(),
                email: email.clone(),
                numero_telephone_manager: telephone.clone(),
                role: role.parse()?,
            };
            let manager = client.create(&payload).await?;
            output::print_success(&format!("Manager {} created", manager.id_manager));
            Ok(())
        }
        ManagerCommands::Suspend { id } => {
            status_action(&client, *id, StatusAction::Suspend, format).await
        }
        ManagerCommands::Reactivate { id } => {
            status_action(&client, *id, StatusAction::Reactivate, format).await
        }
        ManagerCommands::Archive { id } => {
            status_action(&client, *id, StatusAction::Archive, format).await
        }
        ManagerCommands::Unarchive { id } => {
            status_action(&client, *id, StatusAction::Unarchive, format).await
        }
        ManagerCommands::Watch => watch(ctx, client, format).await,
    }
}

/// Keep the roster fresh in the background until Ctrl-C or sign-out.
///
/// This is the idle-dashboard mode: the poller refreshes silently, the
/// revalidator notices passive token expiry, and the watch channel ends
/// the loop the moment the session dies.
async fn watch(ctx: &Context, client: ManagerClient, format: OutputFormat) -> Result<(), AppError> {
    let roster = Arc::new(Mutex::new(ManagerRoster::new()));
    roster.lock().await.reconcile(client.list().await?);
    print_roster(&roster, format).await;

    let interval = ctx.config.polling.managers_interval_seconds;
    let poller_handle =
        ManagerPoller::new(client, Arc::clone(&roster), interval).spawn();
    let revalidator_handle = SessionRevalidator::new(
        Arc::clone(&ctx.session),
        ctx.config.session.revalidate_interval_seconds,
    )
    .spawn();

    let mut auth_rx = ctx.session.subscribe();
    loop {
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(interval.max(1))) => {
                print_roster(&roster, format).await;
            }
            changed = auth_rx.changed() => {
                if changed.is_err() || *auth_rx.borrow() == AuthState::SignedOut {
                    output::print_warning("Session ended; stopping watch");
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    poller_handle.abort();
    revalidator_handle.abort();
    Ok(())
}

async fn print_roster(roster: &Arc<Mutex<ManagerRoster>>, format: OutputFormat) {
    let roster = roster.lock().await;
    let rows: Vec<ManagerRow> = roster.entries().iter().map(ManagerRow::from).collect();
    output::print_list(&rows, format);
}

#[derive(Debug, Clone, Copy)]
enum StatusAction {
    Suspend,
    Reactivate,
    Archive,
    Unarchive,
}

impl StatusAction {
    fn target(self) -> AccountStatus {
        match self {
            Self::Suspend => AccountStatus::Suspendu,
            Self::Reactivate | Self::Unarchive => AccountStatus::Actif,
            Self::Archive => AccountStatus::Archive,
        }
    }
}

/// Run one status transition through the roster discipline: load, apply
/// the optimistic change, confirm server-side, then reconcile against a
/// fresh authoritative listing.
async fn status_action(
    client: &ManagerClient,
    id: u64,
    action: StatusAction,
    format: OutputFormat,
) -> Result<(), AppError> {
    let mut roster = ManagerRoster::new();
    roster.reconcile(client.list().await?);

    roster.apply_optimistic(id, action.target());
    if !roster.has_pending() {
        return Err(AppError::not_found(format!("Manager {id} not found")));
    }

    match action {
        StatusAction::Suspend => client.suspend(id).await?,
        StatusAction::Reactivate => client.reactivate(id).await?,
        StatusAction::Archive => client.archive(id).await?,
        StatusAction::Unarchive => client.unarchive(id).await?,
    }
    roster.reconcile(client.list().await?);

    output::print_success(&format!("Manager {id} is now {}", action.target()));
    let rows: Vec<ManagerRow> = roster.entries().iter().map(ManagerRow::from).collect();
    output::print_list(&rows, format);
    Ok(())
}
