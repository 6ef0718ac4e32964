//! Credit-request approval commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use smsadmin_client::credits::{
    ApprovalOutcome, CreditClient, CreditRequest, CreditStatus,
};
use smsadmin_core::error::AppError;
use smsadmin_core::types::{PageQuery, filter};

use crate::output::{self, OutputFormat};

use super::Context;

/// Arguments for `smsadmin credits`
#[derive(Debug, Args)]
pub struct CreditArgs {
    /// Workflow action
    #[command(subcommand)]
    pub command: CreditCommands,
}

/// Credit workflow actions
#[derive(Debug, Subcommand)]
pub enum CreditCommands {
    /// List credit requests
    List {
        /// Page number (0-based)
        #[arg(long, default_value_t = 0)]
        page: u32,
        /// Page size
        #[arg(long, default_value_t = 10)]
        size: u32,
        /// Narrow to one status (PENDING, APPROVED, REJECTED)
        #[arg(long)]
        status: Option<String>,
        /// Substring search over the fetched page
        #[arg(long)]
        search: Option<String>,
    },
    /// Approve a pending request
    Approve {
        /// Request id
        id: u64,
    },
    /// Reject a pending request
    Reject {
        /// Request id
        id: u64,
        /// Rejection reason (required, non-empty)
        reason: String,
    },
}

/// Table row for a credit request.
#[derive(Debug, Serialize, Tabled)]
struct CreditRow {
    id: u64,
    client: u64,
    quantity: u64,
    status: String,
    maker: String,
    checker: String,
    amount_ttc: f64,
}

impl From<&CreditRequest> for CreditRow {
    fn from(r: &CreditRequest) -> Self {
        Self {
            id: r.id,
            client: r.client_id,
            quantity: r.quantity,
            status: r.status.to_string(),
            maker: r.maker_email.clone(),
            checker: r.checker_email.clone().unwrap_or_default(),
            amount_ttc: r.estimated_amount_ttc,
        }
    }
}

/// Dispatch a credit command.
pub async fn execute(args: &CreditArgs, ctx: &Context, format: OutputFormat) -> Result<(), AppError> {
    ctx.require(None)?;
    let client = CreditClient::new(ctx.transport.clone());

    match &args.command {
        CreditCommands::List { page, size, status, search } => {
            let status = status.as_deref().map(parse_status).transpose()?;
            let page = client.list(PageQuery::new(*page, *size), status).await?;

            // Search narrows the fetched page only, before display.
            let rows: Vec<CreditRow> = match search {
                Some(query) => filter::search(&page.content, query)
                    .into_iter()
                    .map(CreditRow::from)
                    .collect(),
                None => page.content.iter().map(CreditRow::from).collect(),
            };
            output::print_list(&rows, format);
            println!(
                "Page {}/{} — {} request(s) total",
                page.number + 1,
                page.total_pages.max(1),
                page.total_elements
            );
            Ok(())
        }
        CreditCommands::Approve { id } => {
            let request = find_request(&client, *id).await?;
            match client.approve(&request).await? {
                ApprovalOutcome::Applied => output::print_success("Request approved"),
                ApprovalOutcome::AlreadyResolved => {
                    output::print_warning("Request was already resolved")
                }
            }
            reload_and_show(&client, *id, format).await
        }
        CreditCommands::Reject { id, reason } => {
            let request = find_request(&client, *id).await?;
            match client.reject(&request, reason).await? {
                ApprovalOutcome::Applied => output::print_success("Request rejected"),
                ApprovalOutcome::AlreadyResolved => {
                    output::print_warning("Request was already resolved")
                }
            }
            reload_and_show(&client, *id, format).await
        }
    }
}

fn parse_status(s: &str) -> Result<CreditStatus, AppError> {
    match s.to_uppercase().as_str() {
        "PENDING" => Ok(CreditStatus::Pending),
        "APPROVED" => Ok(CreditStatus::Approved),
        "REJECTED" => Ok(CreditStatus::Rejected),
        other => Err(AppError::validation(format!(
            "Unknown status '{other}'. Expected PENDING, APPROVED, or REJECTED"
        ))),
    }
}

/// Walk the listing pages until the request shows up.
async fn find_request(client: &CreditClient, id: u64) -> Result<CreditRequest, AppError> {
    let mut page_number = 0;
    loop {
        let page = client.list(PageQuery::new(page_number, 50), None).await?;
        if let Some(request) = page.content.into_iter().find(|r| r.id == id) {
            return Ok(request);
        }
        if page_number + 1 >= page.total_pages {
            return Err(AppError::not_found(format!("Credit request {id} not found")));
        }
        page_number += 1;
    }
}

/// Re-fetch after a mutation so server-assigned fields (checker,
/// validation time) are shown, not guessed.
async fn reload_and_show(
    client: &CreditClient,
    id: u64,
    format: OutputFormat,
) -> Result<(), AppError> {
    let request = find_request(client, id).await?;
    output::print_list(&[CreditRow::from(&request)], format);
    Ok(())
}
