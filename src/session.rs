//! Session credential storage and the authenticated-area gate.
//!
//! Token issuance belongs to the external identity provider; this module
//! only stores and resolves an already-issued bearer credential. The
//! credential is persisted as pretty JSON in the XDG state dir, and an
//! expired or absent credential resolves to a session without tokens —
//! that is a normal outcome, not an error.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{GovResult, SessionError};
use crate::paths::GovPaths;

/// A stored bearer credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    /// Expiry as unix seconds. Zero means "no recorded expiry".
    pub expires_at: u64,
}

impl Credential {
    pub fn is_expired(&self, now_unix: u64) -> bool {
        self.expires_at != 0 && now_unix >= self.expires_at
    }
}

/// Result of one session resolution.
#[derive(Debug, Clone)]
pub struct Session {
    /// `None` when signed out or the stored credential has expired.
    pub tokens: Option<Credential>,
}

/// Boundary to the identity/session collaborator.
pub trait SessionProvider: Send + Sync {
    fn resolve(&self) -> GovResult<Session>;
    fn sign_out(&self) -> GovResult<()>;
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// Session store backed by a JSON file in the state directory.
pub struct FileSession {
    path: std::path::PathBuf,
}

impl FileSession {
    pub fn new(paths: &GovPaths) -> Self {
        Self {
            path: paths.session_file(),
        }
    }

    /// Persist a freshly issued credential (`govgraph login`).
    pub fn store(&self, credential: &Credential) -> GovResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|source| SessionError::Io { source })?;
        }
        let json = serde_json::to_string_pretty(credential)
            .expect("Credential is always serializable");
        std::fs::write(&self.path, json).map_err(|source| SessionError::Io { source })?;
        Ok(())
    }

    fn now_unix() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

impl SessionProvider for FileSession {
    fn resolve(&self) -> GovResult<Session> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Session { tokens: None });
            }
            Err(source) => return Err(SessionError::Io { source }.into()),
        };
        let credential: Credential =
            serde_json::from_str(&contents).map_err(|e| SessionError::Corrupt {
                message: e.to_string(),
            })?;
        if credential.is_expired(Self::now_unix()) {
            tracing::debug!("stored credential expired");
            return Ok(Session { tokens: None });
        }
        Ok(Session {
            tokens: Some(credential),
        })
    }

    fn sign_out(&self) -> GovResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionError::Io { source }.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Session gate
// ---------------------------------------------------------------------------

/// Gate protecting the authenticated area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Initial state: block rendering, show a placeholder.
    Pending,
    /// Session carries a credential: render children.
    Authenticated,
    /// Resolution failed or the session has no credential: redirect to login.
    Unauthenticated,
}

/// One-shot session check per mount. Any resolution error, or a resolved
/// session without tokens, goes to `Unauthenticated`; there is no retry.
pub struct SessionGate {
    state: GateState,
    redirect_pending: bool,
}

impl SessionGate {
    pub fn new() -> Self {
        Self {
            state: GateState::Pending,
            redirect_pending: false,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Resolve the session. Only transitions out of `Pending`; later calls
    /// are no-ops so one mount performs exactly one check.
    pub fn resolve(&mut self, provider: &dyn SessionProvider) -> GateState {
        if self.state != GateState::Pending {
            return self.state;
        }
        self.state = match provider.resolve() {
            Ok(Session {
                tokens: Some(_), ..
            }) => GateState::Authenticated,
            Ok(Session { tokens: None }) => {
                self.redirect_pending = true;
                GateState::Unauthenticated
            }
            Err(e) => {
                tracing::warn!("session resolution failed: {e}");
                self.redirect_pending = true;
                GateState::Unauthenticated
            }
        };
        self.state
    }

    /// Consume the pending redirect. Returns true exactly once per gate.
    pub fn take_redirect(&mut self) -> bool {
        std::mem::take(&mut self.redirect_pending)
    }
}

impl Default for SessionGate {
    fn default() -> Self {
        Self::new()
    }
}
