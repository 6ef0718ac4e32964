//! Role-based route guarding.
//!
//! Views declare a required role; the guard resolves the current session
//! into one of three outcomes. An invalid or absent session always routes
//! to login; a valid session with the wrong role routes to a distinct
//! unauthorized surface, never back to login.

use smsadmin_core::types::Role;

use crate::manager::SessionManager;

/// Outcome of an access check for a guarded view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// The session is valid and the role requirement is satisfied.
    Granted,
    /// No valid session; the caller must route to the login entry point.
    RedirectLogin,
    /// Valid session, insufficient role; route to the unauthorized view.
    RedirectUnauthorized,
}

/// Check access to a view requiring `required` (or any valid session when
/// `None`). A super admin satisfies every requirement; other roles must
/// match exactly.
pub fn check_access(manager: &SessionManager, required: Option<Role>) -> AccessDecision {
    // Re-derive from storage so a token cleared or expired elsewhere is
    // noticed immediately.
    let Some(session) = manager.refresh() else {
        return AccessDecision::RedirectLogin;
    };

    match required {
        None => AccessDecision::Granted,
        Some(role) if session.role == role || session.role.is_super_admin() => {
            AccessDecision::Granted
        }
        Some(_) => AccessDecision::RedirectUnauthorized,
    }
}
