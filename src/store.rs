//! Credential store: durable account persistence and identifier uniqueness.
//!
//! Two backends implement [`AccountStore`]: a Postgres store for production
//! and an in-memory store used by tests and as the default when no database
//! URL is configured. Accounts are created once and read many times; there
//! is no update or delete path.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{AppError, AppResult};

// Accounts never serialize whole; response bodies are built field by field
// so the stored hash cannot leak through a derive.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub secret_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub secret_hash: String,
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account. Fails with `Conflict` when the username or the
    /// email is already taken; the uniqueness check and the insert are a
    /// single atomic step in every backend.
    async fn create(&self, account: NewAccount) -> AppResult<Account>;

    /// Look up an account by identifier: username match first, then email.
    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<Account>>;
}

/// Shared store handle injected into the verifier and the HTTP state.
pub type SharedStore = Arc<dyn AccountStore>;

fn check_new_account(account: &NewAccount) -> AppResult<()> {
    if account.username.trim().is_empty() {
        return Err(AppError::invalid_input("username_missing", "username must not be empty"));
    }
    if account.email.trim().is_empty() {
        return Err(AppError::invalid_input("email_missing", "email must not be empty"));
    }
    Ok(())
}
