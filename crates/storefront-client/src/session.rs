//! # Session Store
//!
//! Persists the logged-in shopper between shell invocations as a small JSON
//! file in the platform data directory.
//!
//! ```json
//! {
//!   "token": "eyJhbGciOi...",
//!   "username": "crio.do",
//!   "balance": 5000,
//!   "savedAt": "2026-01-04T10:00:00Z"
//! }
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storefront_core::Money;
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};

/// A logged-in shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub username: String,
    /// Wallet balance reported at login. Checkout validates against this.
    pub balance: Money,
    pub saved_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: impl Into<String>, username: impl Into<String>, balance: Money) -> Self {
        Session {
            token: token.into(),
            username: username.into(),
            balance,
            saved_at: Utc::now(),
        }
    }
}

/// File-backed session persistence.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the saved session.
    ///
    /// A missing file means nobody is logged in. An unreadable or corrupt
    /// file is logged and treated the same way.
    pub fn load(&self) -> Option<Session> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "No saved session");
                return None;
            }
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Could not read session file");
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Ignoring corrupt session file");
                None
            }
        }
    }

    pub fn save(&self, session: &Session) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(session_error)?;
        }

        let contents = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, contents).map_err(session_error)?;

        info!(username = %session.username, "Session saved");
        Ok(())
    }

    /// Removes the saved session. Clearing an absent session is not an error.
    pub fn clear(&self) -> ClientResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!("Session cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(session_error(e)),
        }
    }
}

fn session_error(err: std::io::Error) -> ClientError {
    ClientError::SessionStore(err.to_string())
}
