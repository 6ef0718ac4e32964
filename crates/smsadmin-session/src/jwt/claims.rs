//! JWT claims payload issued by the gateway on login.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use smsadmin_core::types::Role;

/// Claims embedded in every gateway bearer token.
///
/// Optional display fields default to empty values so a sparse token does
/// not fail decoding; `sub`, `role` and `exp` are the contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject — the user's email address.
    pub sub: String,
    /// Numeric user identifier.
    #[serde(default)]
    pub id: u64,
    /// Display name.
    #[serde(default)]
    pub nom: String,
    /// Role at the time of token issuance.
    pub role: Role,
    /// Whether the operator's subscription has lapsed.
    #[serde(default, rename = "abonneExpire")]
    pub abonne_expire: bool,
    /// Issued-at timestamp (seconds since epoch).
    #[serde(default)]
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl SessionClaims {
    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }

    /// Returns the issued-at time as a `DateTime<Utc>`.
    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.iat, 0).unwrap_or_else(Utc::now)
    }

    /// Checks whether this token has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Returns the remaining TTL in seconds (0 if expired).
    pub fn remaining_ttl_seconds(&self) -> u64 {
        let remaining = self.exp - Utc::now().timestamp();
        if remaining > 0 { remaining as u64 } else { 0 }
    }
}
