//! Password hashing and the account operations: register, login, authenticate.
//!
//! Passwords are hashed with Argon2 (default parameters, random 16-byte salt)
//! and stored as PHC strings; the plaintext is never retained. Login failure is
//! deliberately uniform: an unknown handle and a wrong password produce the
//! same error, so a caller cannot probe which handles are registered.

use anyhow::{anyhow, Result};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::storage::{Identity, SharedStore};
use crate::token::TokenKeys;

pub const MIN_HANDLE_CHARS: usize = 6;
pub const MIN_PASSWORD_CHARS: usize = 6;

pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let argon2 = Argon2::default();
    let phc = argon2.hash_password(password.as_bytes(), &salt).map_err(|e| anyhow!(e.to_string()))?.to_string();
    Ok(phc)
}

pub fn verify_password(hash: &str, password: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        let argon2 = Argon2::default();
        argon2.verify_password(password.as_bytes(), &parsed).is_ok()
    } else { false }
}

fn invalid_credentials() -> AppError {
    AppError::auth("invalid_credentials", "Invalid username or password.")
}

/// Register a new account and issue its first session token.
///
/// All validations run before any state is written; a failed registration
/// leaves the store untouched.
pub fn register(
    store: &SharedStore,
    keys: &TokenKeys,
    handle: Option<&str>,
    password: Option<&str>,
) -> AppResult<String> {
    let (Some(handle), Some(password)) = (handle, password) else {
        return Err(AppError::user("missing_credentials", "UserHandle and password are required."));
    };
    if handle.chars().count() < MIN_HANDLE_CHARS {
        return Err(AppError::user("handle_too_short", "UserHandle must be at least 6 characters."));
    }
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AppError::user("password_too_short", "Password must be at least 6 characters."));
    }
    if store.0.lock().contains_handle(handle) {
        return Err(AppError::conflict("user_exists", "User already exists."));
    }

    // Hash outside the lock; the insert re-checks so a concurrent registration
    // of the same handle cannot slip in while hashing.
    let password_hash = hash_password(password).map_err(AppError::from)?;
    let identity = Identity { handle: handle.to_string(), password_hash };
    if !store.0.lock().insert_identity(identity) {
        return Err(AppError::conflict("user_exists", "User already exists."));
    }

    info!(target: "podium::security", "registered handle='{}'", handle);
    keys.issue(handle).map_err(AppError::from)
}

/// Verify a handle/password pair and issue a fresh session token.
///
/// No state is mutated by login.
pub fn login(
    store: &SharedStore,
    keys: &TokenKeys,
    handle: Option<&str>,
    password: Option<&str>,
) -> AppResult<String> {
    let (Some(handle), Some(password)) = (handle, password) else {
        return Err(AppError::user("malformed_login", "Invalid request. userHandle and password must be strings."));
    };
    let stored_hash = {
        let guard = store.0.lock();
        guard.identity(handle).map(|id| id.password_hash.clone())
    };
    let Some(stored_hash) = stored_hash else {
        return Err(invalid_credentials());
    };
    if !verify_password(&stored_hash, password) {
        return Err(invalid_credentials());
    }
    keys.issue(handle).map_err(AppError::from)
}

/// Recover the identity behind a bearer token.
///
/// Fails on a missing or invalid token, and also when the embedded handle no
/// longer exists in the store; a signed claim is never trusted blindly.
pub fn authenticate(store: &SharedStore, keys: &TokenKeys, token: Option<&str>) -> AppResult<Identity> {
    let Some(token) = token else {
        return Err(AppError::auth("missing_token", "Unauthorized."));
    };
    let handle = keys.verify(token).map_err(AppError::from)?;
    let identity = {
        let guard = store.0.lock();
        guard.identity(&handle).cloned()
    };
    identity.ok_or_else(|| AppError::auth("unknown_handle", "Unauthorized."))
}
