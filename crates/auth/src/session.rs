//! Login session with an explicit lifecycle.
//!
//! A `SessionStore` is populated at login and cleared at logout. Everything
//! else (HTTP client, permission checks) gets a `SessionHandle`, which can
//! read the session but never change it.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Permission, Role};

/// What the console knows about the signed-in operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token for protected endpoints. A session may exist without one;
    /// protected calls then go out unauthenticated and the server rejects them.
    pub token: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(token: impl Into<String>, role: Role) -> Self {
        Self {
            token: Some(token.into()),
            role,
            permissions: Vec::new(),
            expires_at: None,
        }
    }

    pub fn with_permissions(mut self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        self.permissions = permissions.into_iter().collect();
        self
    }

    pub fn expiring_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }

    /// Admins can do everything; sub-admins only what they were granted.
    pub fn can(&self, required: &Permission) -> bool {
        self.role.is_admin() || self.permissions.iter().any(|p| p.grants(required))
    }
}

/// Owner of the current session.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(&self, session: Session) {
        tracing::info!(role = %session.role, "session started");
        *self.write() = Some(session);
    }

    pub fn logout(&self) {
        if self.write().take().is_some() {
            tracing::info!("session cleared");
        }
    }

    /// Read-only view sharing this store's state.
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            inner: Arc::clone(&self.inner),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Session>> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Read-only view of a `SessionStore`.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionHandle {
    /// A handle that never has a session.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Session> {
        self.read().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.read().is_some()
    }

    /// Token to send as `Authorization: Bearer`, if any.
    ///
    /// Missing sessions, missing tokens and expired sessions all yield `None`.
    pub fn bearer_token(&self) -> Option<String> {
        self.bearer_token_at(Utc::now())
    }

    pub fn bearer_token_at(&self, now: DateTime<Utc>) -> Option<String> {
        let guard = self.read();
        let session = guard.as_ref()?;
        if session.is_expired(now) {
            tracing::warn!("session expired; sending request without credentials");
            return None;
        }
        session.token.clone().filter(|t| !t.trim().is_empty())
    }

    pub fn can(&self, required: &Permission) -> bool {
        self.read().as_ref().is_some_and(|s| s.can(required))
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Session>> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
