//! Console command definitions and dispatch.

pub mod auth;
pub mod billing;
pub mod clients;
pub mod credits;
pub mod managers;
pub mod referentiel;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use smsadmin_client::ApiTransport;
use smsadmin_core::config::AppConfig;
use smsadmin_core::error::AppError;
use smsadmin_core::types::Role;
use smsadmin_session::{AccessDecision, FileTokenStore, SessionManager, check_access};

use crate::output::OutputFormat;

/// SMS Admin Console — operator dashboard for the SMS gateway
#[derive(Debug, Parser)]
#[command(name = "smsadmin", version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Log in to the gateway
    Login(auth::LoginArgs),
    /// Close the current session
    Logout,
    /// Show the current session
    Whoami,
    /// Credit-request approval workflow
    Credits(credits::CreditArgs),
    /// Billing exercises, calendar, and invoices
    Billing(billing::BillingArgs),
    /// Tenant (client) management
    Clients(clients::ClientArgs),
    /// Manager account management
    Managers(managers::ManagerArgs),
    /// Referentiel lookups
    Referentiel(referentiel::ReferentielArgs),
}

impl Cli {
    /// Execute the console command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        let ctx = Context::new(config)?;

        match &self.command {
            Commands::Login(args) => auth::login(args, &ctx).await,
            Commands::Logout => auth::logout(&ctx),
            Commands::Whoami => auth::whoami(&ctx, self.format),
            Commands::Credits(args) => credits::execute(args, &ctx, self.format).await,
            Commands::Billing(args) => billing::execute(args, &ctx, self.format).await,
            Commands::Clients(args) => clients::execute(args, &ctx, self.format).await,
            Commands::Managers(args) => managers::execute(args, &ctx, self.format).await,
            Commands::Referentiel(args) => referentiel::execute(args, &ctx, self.format).await,
        }
    }
}

/// Shared wiring for every command: session manager + gateway transport.
pub struct Context {
    /// Session manager over the file-backed token store.
    pub session: Arc<SessionManager>,
    /// Transport to the gateway API.
    pub transport: ApiTransport,
    /// Loaded configuration.
    pub config: AppConfig,
}

impl Context {
    fn new(config: &AppConfig) -> Result<Self, AppError> {
        let store = Arc::new(FileTokenStore::new(config.session.token_file.clone()));
        let session = Arc::new(SessionManager::new(store));
        let transport = ApiTransport::new(&config.api, Arc::clone(&session))?;
        Ok(Self {
            session,
            transport,
            config: config.clone(),
        })
    }

    /// Enforce the route guard for a command, mapping the two redirect
    /// outcomes onto their console messages.
    pub fn require(&self, role: Option<Role>) -> Result<(), AppError> {
        match check_access(&self.session, role) {
            AccessDecision::Granted => Ok(()),
            AccessDecision::RedirectLogin => Err(AppError::authentication(
                "Not logged in. Run `smsadmin login` first",
            )),
            AccessDecision::RedirectUnauthorized => Err(AppError::authorization(
                "Your role does not permit this view",
            )),
        }
    }
}
