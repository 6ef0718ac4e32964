//! Login, logout, and session display.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use smsadmin_client::auth::AuthClient;
use smsadmin_core::error::AppError;

use crate::output::{self, OutputFormat};

use super::Context;

/// Arguments for `smsadmin login`
#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Operator email
    pub email: String,

    /// Password (prompted interactively when omitted)
    #[arg(long)]
    pub password: Option<String>,
}

/// Row describing the current session.
#[derive(Debug, Serialize, Tabled)]
struct SessionRow {
    /// Operator email.
    email: String,
    /// Display name.
    name: String,
    /// Role.
    role: String,
    /// Expiry timestamp.
    expires_at: String,
    /// Subscription state.
    subscription: String,
}

/// Log in and persist the received token.
pub async fn login(args: &LoginArgs, ctx: &Context) -> Result<(), AppError> {
    let password = match &args.password {
        Some(p) => p.clone(),
        None => dialoguer::Password::new()
            .with_prompt("Password")
            .interact()
            .map_err(|e| AppError::internal(format!("Password prompt failed: {e}")))?,
    };

    let client = AuthClient::new(ctx.transport.clone());
    let session = client.login(&args.email, &password).await?;
    output::print_success(&format!(
        "Logged in as {} ({})",
        session.email, session.role
    ));
    Ok(())
}

/// Clear the stored session.
pub fn logout(ctx: &Context) -> Result<(), AppError> {
    ctx.session.logout();
    output::print_success("Logged out");
    Ok(())
}

/// Show who is logged in right now.
pub fn whoami(ctx: &Context, format: OutputFormat) -> Result<(), AppError> {
    ctx.require(None)?;

    // require() refreshed the session; it exists here.
    let session = ctx
        .session
        .current_session()
        .ok_or_else(|| AppError::session("Session vanished between check and read"))?;

    let row = SessionRow {
        email: session.email,
        name: session.display_name,
        role: session.role.to_string(),
        expires_at: session.expires_at.to_rfc3339(),
        subscription: if session.subscription_expired {
            "expired".to_string()
        } else {
            "active".to_string()
        },
    };
    output::print_list(&[row], format);
    Ok(())
}
