//! Email/password credential handling.
//!
//! Passwords are stored as uid-salted SHA-256 digests and compared in
//! constant time to mitigate timing attacks.

use chrono::Utc;
use sha2::{Digest, Sha256};
use sqlx::Row;
use subtle::ConstantTimeEq;
use tokio::sync::watch;

use crate::errors::AppError;

use super::SqliteStore;

/// A signed-in credential's basic fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub uid: String,
    pub email: String,
}

impl SqliteStore {
    /// Create a credential for a new account and sign it in.
    pub async fn create_credential(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AppError> {
        let existing = sqlx::query("SELECT uid FROM credentials WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::Credential(format!(
                "Email {} is already in use",
                email
            )));
        }

        let uid = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO credentials (email, uid, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(email)
        .bind(&uid)
        .bind(password_digest(&uid, password))
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let session = Session {
            uid,
            email: email.to_string(),
        };
        self.session.send_replace(Some(session.clone()));
        Ok(session)
    }

    /// Sign in with an existing credential.
    ///
    /// Distinguishes a missing account (`CredentialNotFound`) from a wrong
    /// password (`Credential`) so callers can drive fallback behavior.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let row = sqlx::query("SELECT uid, password_hash FROM credentials WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Err(AppError::CredentialNotFound(format!(
                "No account exists for {}",
                email
            )));
        };

        let uid: String = row.get("uid");
        let stored: String = row.get("password_hash");

        if !constant_time_compare(&password_digest(&uid, password), &stored) {
            return Err(AppError::Credential("Invalid password".to_string()));
        }

        let session = Session {
            uid,
            email: email.to_string(),
        };
        self.session.send_replace(Some(session.clone()));
        Ok(session)
    }

    /// Sign out the current session.
    pub fn sign_out(&self) {
        self.session.send_replace(None);
    }

    /// Observe authentication-state transitions.
    pub fn sessions(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }
}

/// Hex digest of the password, salted with the account uid.
fn password_digest(uid: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(uid.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    // Constant-time comparison
    a_bytes.ct_eq(b_bytes).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare_equal() {
        assert!(constant_time_compare("test-key-123", "test-key-123"));
    }

    #[test]
    fn test_constant_time_compare_not_equal() {
        assert!(!constant_time_compare("test-key-123", "test-key-124"));
    }

    #[test]
    fn test_constant_time_compare_different_lengths() {
        assert!(!constant_time_compare("short", "much-longer-key"));
    }

    #[test]
    fn test_digest_depends_on_salt() {
        assert_ne!(password_digest("a", "pw"), password_digest("b", "pw"));
        assert_eq!(password_digest("a", "pw"), password_digest("a", "pw"));
    }
}
