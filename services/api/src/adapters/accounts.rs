//! services/api/src/adapters/accounts.rs
//!
//! Email/password identity provider. Implements the `IdentityProvider` port
//! with Argon2 password hashes stored in the `accounts` table.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use mentor_booking_core::domain::Identity;
use mentor_booking_core::ports::{AuthError, IdentityProvider};
use sqlx::{FromRow, PgPool};
use tracing::{error, info};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone)]
pub struct PasswordIdentityAdapter {
    pool: PgPool,
}

impl PasswordIdentityAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct AccountRecord {
    uid: Uuid,
    email: String,
    display_name: String,
    photo_url: Option<String>,
    hashed_password: String,
}
impl AccountRecord {
    fn to_identity(self) -> Identity {
        Identity {
            uid: self.uid,
            display_name: self.display_name,
            email: self.email,
            photo_url: self.photo_url,
        }
    }
}

//=========================================================================================
// Password Hashing
//=========================================================================================

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            AuthError::Provider("Failed to hash password".to_string())
        })
}

pub fn verify_password(password: &str, hashed: &str) -> Result<bool, AuthError> {
    let parsed_hash = PasswordHash::new(hashed).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        AuthError::Provider("Authentication error".to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

//=========================================================================================
// `IdentityProvider` Trait Implementation
//=========================================================================================

#[async_trait]
impl IdentityProvider for PasswordIdentityAdapter {
    async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
        photo_url: Option<&str>,
    ) -> Result<Identity, AuthError> {
        let email = normalize_email(email);
        let display_name = display_name.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::Provider("A valid email is required".to_string()));
        }
        if password.len() < 8 {
            return Err(AuthError::Provider(
                "Password must be at least 8 characters".to_string(),
            ));
        }
        if display_name.is_empty() {
            return Err(AuthError::Provider("A display name is required".to_string()));
        }

        let hashed = hash_password(password)?;
        let record = sqlx::query_as::<_, AccountRecord>(
            "INSERT INTO accounts (uid, email, display_name, photo_url, hashed_password) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING uid, email, display_name, photo_url, hashed_password",
        )
        .bind(Uuid::new_v4())
        .bind(&email)
        .bind(display_name)
        .bind(photo_url)
        .bind(&hashed)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AuthError::AccountExists(email.clone())
            }
            other => {
                error!("Failed to create account: {:?}", other);
                AuthError::Provider("Failed to create account".to_string())
            }
        })?;

        info!(uid = %record.uid, "Account registered");
        Ok(record.to_identity())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = normalize_email(email);
        let record = sqlx::query_as::<_, AccountRecord>(
            "SELECT uid, email, display_name, photo_url, hashed_password \
             FROM accounts WHERE email = $1",
        )
        .bind(&email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to look up account: {:?}", e);
            AuthError::Provider("Sign-in is unavailable right now".to_string())
        })?
        .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &record.hashed_password)? {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(record.to_identity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_verify_only_the_original_password() {
        let hashed = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hashed).unwrap());
        assert!(!verify_password("wrong horse", &hashed).unwrap());
    }

    #[test]
    fn garbage_hash_is_a_provider_error() {
        let err = verify_password("anything", "not-a-phc-string").unwrap_err();
        assert!(matches!(err, AuthError::Provider(_)));
    }

    #[test]
    fn emails_are_compared_case_insensitively() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }
}
