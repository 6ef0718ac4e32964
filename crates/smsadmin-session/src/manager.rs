//! Session state derived from the stored bearer token.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{info, warn};

use smsadmin_core::error::AppError;
use smsadmin_core::types::Role;

use crate::jwt;
use crate::store::TokenStore;

/// The decoded identity of the logged-in operator.
#[derive(Debug, Clone)]
pub struct Session {
    /// The raw bearer token backing this session.
    pub token: String,
    /// Operator email (the JWT subject).
    pub email: String,
    /// Numeric user identifier.
    pub user_id: u64,
    /// Display name.
    pub display_name: String,
    /// Operator role.
    pub role: Role,
    /// Whether the operator's subscription has lapsed.
    pub subscription_expired: bool,
    /// When the token was issued.
    pub issued_at: DateTime<Utc>,
    /// When the token expires.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether this session is still valid right now.
    pub fn is_valid(&self) -> bool {
        Utc::now() < self.expires_at
    }
}

/// Coarse authentication state, broadcast to long-lived consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No valid session.
    SignedOut,
    /// A valid session exists.
    SignedIn,
}

/// Single source of truth for "who is logged in".
///
/// The manager owns the token store and the derived session state. The
/// token itself is re-read from the store at the start of every privileged
/// operation rather than cached across operations; writes are a full
/// overwrite (login) or a full clear (logout).
pub struct SessionManager {
    store: Arc<dyn TokenStore>,
    current: RwLock<Option<Session>>,
    auth_tx: watch::Sender<AuthState>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager").finish()
    }
}

impl SessionManager {
    /// Creates a manager over the given store, deriving the initial state
    /// from whatever token the store already holds (the page-load analog).
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        let (auth_tx, _) = watch::channel(AuthState::SignedOut);
        let manager = Self {
            store,
            current: RwLock::new(None),
            auth_tx,
        };
        manager.refresh();
        manager
    }

    /// Subscribe to authentication state changes.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.auth_tx.subscribe()
    }

    /// Accept a freshly issued token: decode it, persist it, and replace
    /// any prior session state unconditionally.
    pub fn login(&self, token: &str) -> Result<Session, AppError> {
        let claims = jwt::decode_claims(token)?;
        if claims.is_expired() {
            return Err(AppError::authentication("Received an already-expired token"));
        }

        let issued_at = claims.issued_at();
        let expires_at = claims.expires_at();
        let session = Session {
            token: token.to_string(),
            email: claims.sub,
            user_id: claims.id,
            display_name: claims.nom,
            role: claims.role,
            subscription_expired: claims.abonne_expire,
            issued_at,
            expires_at,
        };

        self.store.save(token);
        self.set_current(Some(session.clone()));
        info!(email = %session.email, role = %session.role, "Session opened");
        Ok(session)
    }

    /// Destroy the session: clear both the raw token and the derived state.
    pub fn logout(&self) {
        self.store.clear();
        self.set_current(None);
        info!("Session closed");
    }

    /// The currently derived session, if any.
    pub fn current_session(&self) -> Option<Session> {
        self.current.read().ok().and_then(|s| s.clone())
    }

    /// The persisted raw token, straight from the store. Never errors.
    pub fn token(&self) -> Option<String> {
        self.store.load()
    }

    /// Token exists and is not expired.
    pub fn is_authenticated(&self) -> bool {
        match self.store.load() {
            Some(token) => !jwt::is_token_expired(&token),
            None => false,
        }
    }

    /// Re-derive the session from the stored token.
    ///
    /// An absent, undecodable, or expired token tears the session down
    /// (fail closed) and returns `None`.
    pub fn refresh(&self) -> Option<Session> {
        let Some(token) = self.store.load() else {
            self.set_current(None);
            return None;
        };

        let Some(claims) = jwt::try_decode(&token) else {
            warn!("Stored token is undecodable; clearing session");
            self.logout();
            return None;
        };

        if claims.is_expired() {
            warn!(email = %claims.sub, "Stored token has expired; clearing session");
            self.logout();
            return None;
        }

        let issued_at = claims.issued_at();
        let expires_at = claims.expires_at();
        let session = Session {
            token,
            email: claims.sub,
            user_id: claims.id,
            display_name: claims.nom,
            role: claims.role,
            subscription_expired: claims.abonne_expire,
            issued_at,
            expires_at,
        };
        self.set_current(Some(session.clone()));
        Some(session)
    }

    /// A valid bearer token for an outgoing request, or an authentication
    /// error after tearing the session down.
    ///
    /// Called at the start of every privileged operation so no stale
    /// authorization header can outlive its token.
    pub fn bearer_token(&self) -> Result<String, AppError> {
        match self.store.load() {
            Some(token) if !jwt::is_token_expired(&token) => Ok(token),
            Some(_) => {
                self.logout();
                Err(AppError::authentication("Session expired"))
            }
            None => Err(AppError::authentication("Not logged in")),
        }
    }

    fn set_current(&self, session: Option<Session>) {
        let state = if session.is_some() {
            AuthState::SignedIn
        } else {
            AuthState::SignedOut
        };
        if let Ok(mut slot) = self.current.write() {
            *slot = session;
        }
        // Only notify on actual transitions.
        self.auth_tx.send_if_modified(|current| {
            if *current != state {
                *current = state;
                true
            } else {
                false
            }
        });
    }
}
