//! Login against the gateway.

use serde::{Deserialize, Serialize};

use smsadmin_core::error::AppError;
use smsadmin_session::Session;

use crate::transport::ApiTransport;

/// Login request body.
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    /// Operator email.
    pub email: String,
    /// Password, under its French wire name.
    #[serde(rename = "motDePasse")]
    pub mot_de_passe: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

/// Authentication entry point.
#[derive(Debug, Clone)]
pub struct AuthClient {
    transport: ApiTransport,
}

impl AuthClient {
    /// Creates an auth client over the shared transport.
    pub fn new(transport: ApiTransport) -> Self {
        Self { transport }
    }

    /// Exchange credentials for a bearer token and open the session.
    ///
    /// A 401 here means bad credentials and leaves any stored session
    /// untouched; only the received token's own decode/expiry can fail
    /// the second half.
    pub async fn login(&self, email: &str, mot_de_passe: &str) -> Result<Session, AppError> {
        let body = LoginRequest {
            email: email.to_string(),
            mot_de_passe: mot_de_passe.to_string(),
        };
        let resp: LoginResponse = self
            .transport
            .post_public("/api/V1/auth/login", &body)
            .await?;

        self.transport.session().login(&resp.token)
    }

    /// Close the current session.
    pub fn logout(&self) {
        self.transport.session().logout();
    }
}
