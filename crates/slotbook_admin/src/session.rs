// --- File: crates/slotbook_admin/src/session.rs ---
//! Administrator sessions.
//!
//! A successful login issues an opaque bearer token that maps to an [`AdminSession`]
//! held in memory. Sessions expire after the configured TTL and are discarded on
//! logout or on the first access after expiry.

use crate::error::AdminError;
use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use serde::{Deserialize, Serialize};
use slotbook_config::AdminConfig;
use std::collections::HashMap;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AdminSession {
    pub username: String,
    pub authenticated: bool,
    pub login_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.authenticated && now < self.expires_at
    }
}

/// A freshly issued session and the token that names it.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub session: AdminSession,
}

/// Counts consecutive failed logins and locks the login out once the limit is hit.
#[derive(Debug, Clone)]
pub struct LoginThrottle {
    max_failures: u32,
    lockout: Duration,
    failures: u32,
    locked_until: Option<DateTime<Utc>>,
}

impl LoginThrottle {
    pub fn new(max_failures: u32, lockout: Duration) -> Self {
        Self {
            max_failures,
            lockout,
            failures: 0,
            locked_until: None,
        }
    }

    /// Fails while a lockout is running. An expired lockout resets the counter.
    pub fn check(&mut self, now: DateTime<Utc>) -> Result<(), AdminError> {
        match self.locked_until {
            Some(until) if now < until => Err(AdminError::TooManyAttempts {
                retry_after_secs: (until - now).num_seconds().max(1),
            }),
            Some(_) => {
                self.locked_until = None;
                self.failures = 0;
                Ok(())
            }
            None => Ok(()),
        }
    }

    pub fn record_failure(&mut self, now: DateTime<Utc>) {
        self.failures += 1;
        if self.max_failures > 0 && self.failures >= self.max_failures {
            warn!(
                "{} failed admin logins, locking login for {} minutes",
                self.failures,
                self.lockout.num_minutes()
            );
            self.locked_until = Some(now + self.lockout);
        }
    }

    pub fn record_success(&mut self) {
        self.failures = 0;
        self.locked_until = None;
    }
}

pub struct SessionStore {
    username: String,
    password: String,
    ttl: Duration,
    sessions: RwLock<HashMap<String, AdminSession>>,
    throttle: Mutex<LoginThrottle>,
}

impl SessionStore {
    pub fn new(config: &AdminConfig) -> Self {
        Self {
            username: config.username.clone(),
            password: config.password.clone(),
            ttl: Duration::minutes(config.session_ttl_minutes),
            sessions: RwLock::new(HashMap::new()),
            throttle: Mutex::new(LoginThrottle::new(
                config.max_failed_logins,
                Duration::minutes(config.lockout_minutes),
            )),
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedSession, AdminError> {
        self.login_at(username, password, Utc::now()).await
    }

    pub async fn login_at(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedSession, AdminError> {
        let mut throttle = self.throttle.lock().await;
        throttle.check(now)?;

        // Both comparisons always run.
        let user_ok = constant_time_eq(username.as_bytes(), self.username.as_bytes());
        let pass_ok = constant_time_eq(password.as_bytes(), self.password.as_bytes());
        if self.password.is_empty() || !(user_ok & pass_ok) {
            throttle.record_failure(now);
            warn!("Rejected admin login for '{}'", username);
            return Err(AdminError::InvalidCredentials);
        }
        throttle.record_success();
        drop(throttle);

        let token = uuid::Uuid::new_v4().simple().to_string();
        let session = AdminSession {
            username: self.username.clone(),
            authenticated: true,
            login_at: now,
            expires_at: now + self.ttl,
        };
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| s.is_valid_at(now));
        sessions.insert(token.clone(), session.clone());
        info!("Admin '{}' logged in, session expires {}", session.username, session.expires_at);

        Ok(IssuedSession { token, session })
    }

    pub async fn validate(&self, token: &str) -> Result<AdminSession, AdminError> {
        self.validate_at(token, Utc::now()).await
    }

    pub async fn validate_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<AdminSession, AdminError> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                Some(session) if session.is_valid_at(now) => return Ok(session.clone()),
                Some(_) => {}
                None => return Err(AdminError::NotAuthenticated),
            }
        }
        debug!("Discarding expired admin session");
        self.sessions.write().await.remove(token);
        Err(AdminError::NotAuthenticated)
    }

    /// Destroys the session. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) {
        if let Some(session) = self.sessions.write().await.remove(token) {
            info!("Admin '{}' logged out", session.username);
        }
    }
}
