//! Password reset tokens.
//!
//! A token is 32 random bytes, hex-encoded, handed to the account owner once.
//! Only its SHA-256 digest is stored, next to an expiry one hour after the
//! request. Redeeming a token re-hashes the password and clears both columns.

use chrono::{DateTime, Duration, Utc};
use connect_core::user::canonical_email;
use log::info;
use rusqlite::{OptionalExtension, params};
use sha2::{Digest, Sha256};

use crate::accounts::check_password;
use crate::store::to_millis;
use crate::{SqliteCommunityStore, StoreError};

/// How long a reset token stays valid.
pub const RESET_TOKEN_TTL: Duration = Duration::hours(1);

/// A freshly issued reset token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetToken {
    /// Secret to deliver to the account owner.
    pub token: String,
    /// Instant after which the token is rejected.
    pub expires_at: DateTime<Utc>,
}

impl SqliteCommunityStore {
    /// Issue a reset token for the account registered under `email`.
    ///
    /// Unknown addresses yield `Ok(None)` so callers can answer identically
    /// whether or not the account exists. A new request replaces any earlier
    /// token.
    ///
    /// # Errors
    /// Returns [`StoreError`] on database failures.
    pub fn request_password_reset(
        &mut self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ResetToken>, StoreError> {
        let Ok(canonical) = canonical_email(email) else {
            return Ok(None);
        };
        let Some(id) = self.user_id_by_email(&canonical)? else {
            return Ok(None);
        };
        let token = hex::encode(rand::random::<[u8; 32]>());
        let expires_at = now + RESET_TOKEN_TTL;
        self.connection.execute(
            "UPDATE users SET reset_token_hash = ?1, reset_expires_at = ?2 WHERE id = ?3",
            params![digest(&token), to_millis(expires_at), id.get()],
        )?;
        info!("issued password reset token for user {id}");
        Ok(Some(ResetToken { token, expires_at }))
    }

    /// Return the e-mail address a live token was issued for.
    ///
    /// # Errors
    /// [`StoreError::InvalidResetToken`] when the token is unknown or expired,
    /// or database failures.
    pub fn verify_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<String, StoreError> {
        self.live_token_owner(token, now).map(|(_, email)| email)
    }

    /// Replace the password of the account a live token was issued for.
    ///
    /// # Errors
    /// [`StoreError::InvalidResetToken`], [`StoreError::PasswordTooShort`],
    /// or database and hashing failures.
    pub fn reset_password(
        &mut self,
        token: &str,
        new_password: &str,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let (id, _) = self.live_token_owner(token, now)?;
        check_password(new_password)?;
        let hash = bcrypt::hash(new_password, self.password_cost)?;
        self.connection.execute(
            "UPDATE users
             SET password_hash = ?1, reset_token_hash = NULL, reset_expires_at = NULL
             WHERE id = ?2",
            params![hash, id],
        )?;
        info!("reset password for user {id}");
        Ok(())
    }

    fn live_token_owner(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<(u64, String), StoreError> {
        self.connection
            .query_row(
                "SELECT id, email FROM users
                 WHERE reset_token_hash = ?1 AND reset_expires_at > ?2",
                params![digest(token.trim()), to_millis(now)],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?
            .ok_or(StoreError::InvalidResetToken)
    }
}

fn digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
