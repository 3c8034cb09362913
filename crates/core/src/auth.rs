use chrono::{DateTime, Duration, Utc};
use nanoid::nanoid;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;

pub const SESSION_PREFIX: &str = "adm_";
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// The single administrator login.
#[derive(Debug)]
pub struct AdminCredentials {
    username: String,
    password: SecretString,
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        let user_ok = digest_eq(&self.username, username);
        let pass_ok = digest_eq(self.password.expose_secret(), password);
        user_ok & pass_ok
    }
}

/// Compares SHA-256 digests so the comparison time does not depend on input length.
fn digest_eq(expected: &str, given: &str) -> bool {
    let expected = Sha256::digest(expected.as_bytes());
    let given = Sha256::digest(given.as_bytes());
    expected.as_slice().ct_eq(given.as_slice()).into()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub created_at: DateTime<Utc>,
}

impl AdminSession {
    pub fn is_valid(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at < ttl
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub fn generate_session_token() -> String {
    format!("{}{}", SESSION_PREFIX, nanoid!(24))
}

/// Credential check plus the table of live admin sessions.
pub struct AdminGate {
    credentials: AdminCredentials,
    ttl: Duration,
    sessions: RwLock<HashMap<String, AdminSession>>,
}

impl AdminGate {
    pub fn new(credentials: AdminCredentials, ttl: Duration) -> Self {
        Self {
            credentials,
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn login(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Option<IssuedSession> {
        if !self.credentials.verify(username, password) {
            return None;
        }
        // A ttl that runs past the representable range issues nothing.
        let expires_at = now.checked_add_signed(self.ttl)?;

        let token = generate_session_token();
        self.sessions
            .write()
            .await
            .insert(token.clone(), AdminSession { created_at: now });

        Some(IssuedSession { token, expires_at })
    }

    /// Expired sessions are dropped by the check that finds them.
    pub async fn is_session_valid(&self, token: &str, now: DateTime<Utc>) -> bool {
        let valid = match self.sessions.read().await.get(token) {
            Some(session) => session.is_valid(now, self.ttl),
            None => return false,
        };

        if !valid {
            self.sessions.write().await.remove(token);
        }
        valid
    }

    pub async fn logout(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }
}
