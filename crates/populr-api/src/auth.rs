//! Signup, login and logout: the three points where the rotating session
//! token changes.
//!
//! - signup issues the first token and returns it
//! - login replaces it and returns the new one
//! - logout replaces it with a value that is never disclosed

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::extract::State;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use tracing::{error, info};
use uuid::Uuid;

use populr_types::PublicView;
use populr_types::api::{LoginRequest, SignupRequest};
use populr_types::models::{Session, User};

use crate::envelope::Envelope;
use crate::error::ApiError;
use crate::extract::{AuthedAccount, VndJson};
use crate::state::{AppState, run_blocking};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 16;

pub async fn signup(
    State(state): State<AppState>,
    VndJson(req): VndJson<SignupRequest>,
) -> Result<Envelope<Session>, ApiError> {
    validate_username(&req.username)?;
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::PasswordTooShort);
    }

    let session = run_blocking(&state, move |db| {
        // Cheap check before paying for the hash; create_account re-checks.
        if db.get_account_by_username(&req.username)?.is_some() {
            return Err(ApiError::UserAlreadyExists);
        }

        let password_hash = hash_password(&req.password)?;
        let token = issue_token();
        let account = db
            .create_account(Uuid::new_v4(), &req.username, &password_hash, &token)?
            .ok_or(ApiError::UserAlreadyExists)?;

        Ok(Session {
            user: account.public_view(),
            token,
        })
    })
    .await?;

    info!("Created account {} ({})", session.user.username, session.user.id);
    Ok(Envelope::created(session))
}

pub async fn login(
    State(state): State<AppState>,
    VndJson(req): VndJson<LoginRequest>,
) -> Result<Envelope<Session>, ApiError> {
    let session = run_blocking(&state, move |db| {
        let account = db
            .get_account_by_username(&req.username)?
            .ok_or(ApiError::InvalidLogin)?;
        verify_password(&req.password, &account.password)?;

        let user = account.public_view();
        let token = issue_token();
        if !db.set_token(user.id, &token)? {
            return Err(ApiError::InvalidLogin);
        }

        Ok(Session { user, token })
    })
    .await?;

    info!("{} logged in", session.user.username);
    Ok(Envelope::ok(session))
}

pub async fn logout(
    State(state): State<AppState>,
    account: AuthedAccount,
) -> Result<Envelope<User>, ApiError> {
    let user = run_blocking(&state, move |db| {
        db.set_token(account.id, &issue_token())?;
        let row = db
            .get_account_by_id(account.id)?
            .ok_or(ApiError::NoUserForId)?;
        Ok(row.public_view())
    })
    .await?;

    info!("{} logged out", user.username);
    Ok(Envelope::ok(user))
}

/// 3-16 characters, lowercase ASCII letters and digits.
pub fn validate_username(username: &str) -> Result<(), ApiError> {
    let len_ok = (MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&username.len());
    let chars_ok = username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    if len_ok && chars_ok {
        Ok(())
    } else {
        Err(ApiError::UsernameInvalid)
    }
}

/// A fresh session token: 32 random bytes, URL-safe base64.
pub fn issue_token() -> String {
    let bytes: [u8; 32] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Failed to hash password: {}", e);
            ApiError::InternalServerError
        })
}

pub fn verify_password(password: &str, stored: &str) -> Result<(), ApiError> {
    let parsed = PasswordHash::new(stored).map_err(|e| {
        error!("Stored password hash is unreadable: {}", e);
        ApiError::InternalServerError
    })?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| ApiError::InvalidLogin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        for ok in ["abc", "alice", "user42", "abcdefghijklmnop"] {
            assert!(validate_username(ok).is_ok(), "{ok}");
        }
        for bad in ["ab", "Alice", "al ice", "al_ice", "abcdefghijklmnopq", "ålice", ""] {
            assert_eq!(validate_username(bad), Err(ApiError::UsernameInvalid), "{bad}");
        }
    }

    #[test]
    fn tokens_are_fresh_and_url_safe() {
        let a = issue_token();
        let b = issue_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert_eq!(
            verify_password("battery staple", &hash),
            Err(ApiError::InvalidLogin)
        );
    }
}
