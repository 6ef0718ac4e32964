//! Periodic session revalidation.
//!
//! A console left open on a desk must notice its token dying without any
//! user interaction. The revalidator re-checks the stored token on a
//! fixed interval and tears the session down on passive expiry; the
//! `AuthState` watch channel tells long-lived consumers to fall back to
//! the login surface.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::manager::SessionManager;

/// Clock-driven validity checker for the active session.
#[derive(Clone)]
pub struct SessionRevalidator {
    manager: Arc<SessionManager>,
    interval: Duration,
}

impl SessionRevalidator {
    /// Creates a revalidator ticking at `interval_seconds`.
    pub fn new(manager: Arc<SessionManager>, interval_seconds: u64) -> Self {
        Self {
            manager,
            interval: Duration::from_secs(interval_seconds.max(1)),
        }
    }

    /// Runs one validity check. Returns whether a valid session remains.
    pub fn run_check(&self) -> bool {
        if self.manager.current_session().is_none() {
            return false;
        }
        if self.manager.is_authenticated() {
            debug!("Session still valid");
            true
        } else {
            warn!("Session expired while idle; signing out");
            self.manager.logout();
            false
        }
    }

    /// Spawns the background revalidation loop.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            // The first tick fires immediately; skip it, the manager
            // already refreshed on construction.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                self.run_check();
            }
        })
    }
}
