//! Canonical request payloads for the two auth operations.
//!
//! Exactly one structured shape per operation. Unknown keys are rejected at
//! deserialization time and there is no alias or fallback parsing; a body
//! that does not match the shape is a client error, never a disguised
//! success. Validation errors never echo secret material.

use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Minimum accepted secret length, in characters.
pub const MIN_SECRET_LEN: usize = 8;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterPayload {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginPayload {
    /// Username or email; either identifies the account.
    pub identifier: String,
    pub password: String,
}

impl RegisterPayload {
    /// Full validation: identity fields plus secret quality.
    pub fn validate(&self) -> AppResult<()> {
        self.validate_identity()?;
        self.validate_secret()
    }

    /// Username and email shape only. The register handler checks for
    /// identifier conflicts between this and the secret check, so a
    /// duplicate registration reports `Conflict` whatever the secret.
    pub fn validate_identity(&self) -> AppResult<()> {
        validate_username(&self.username)?;
        validate_email(&self.email)
    }

    pub fn validate_secret(&self) -> AppResult<()> {
        validate_secret(&self.password)
    }
}

impl LoginPayload {
    pub fn validate(&self) -> AppResult<()> {
        if self.identifier.trim().is_empty() {
            return Err(AppError::invalid_input("identifier_missing", "identifier must not be empty"));
        }
        if self.password.is_empty() {
            return Err(AppError::invalid_input("password_missing", "password must not be empty"));
        }
        Ok(())
    }
}

fn validate_username(username: &str) -> AppResult<()> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("username_missing", "username must not be empty"));
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(AppError::invalid_input("username_invalid", "username must not contain whitespace"));
    }
    Ok(())
}

fn validate_email(email: &str) -> AppResult<()> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("email_missing", "email must not be empty"));
    }
    let mut parts = trimmed.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(AppError::invalid_input("email_invalid", "email must be of the form local@domain"));
    }
    Ok(())
}

fn validate_secret(secret: &str) -> AppResult<()> {
    if secret.chars().count() < MIN_SECRET_LEN {
        return Err(AppError::invalid_input(
            "password_too_short",
            "password does not meet the minimum length",
        ));
    }
    Ok(())
}
