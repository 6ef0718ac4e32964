//! Dashboard user role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles carried in the gateway JWT and on manager accounts.
///
/// `SuperAdmin` gates the most sensitive views; `Auditeur` is read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Day-to-day operator: credit approvals, client management.
    Admin,
    /// Full operator: everything Admin can do, plus manager and billing
    /// administration.
    SuperAdmin,
    /// Read-only auditor.
    Auditeur,
}

impl Role {
    /// Check if this role is the super administrator.
    pub fn is_super_admin(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }

    /// Check if this role may mutate gateway state at all.
    pub fn can_write(&self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }

    /// Return the role as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::SuperAdmin => "SUPER_ADMIN",
            Self::Auditeur => "AUDITEUR",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = crate::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "SUPER_ADMIN" => Ok(Self::SuperAdmin),
            "AUDITEUR" => Ok(Self::Auditeur),
            _ => Err(crate::AppError::validation(format!(
                "Invalid role: '{s}'. Expected one of: ADMIN, SUPER_ADMIN, AUDITEUR"
            ))),
        }
    }
}
