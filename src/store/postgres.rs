//! Postgres-backed account store over tokio-postgres.
//!
//! Uniqueness is enforced by the database's UNIQUE constraints, so the
//! check and the insert are one atomic statement; the 23505 sqlstate is
//! translated to `Conflict` in the error layer. Every call is bounded by
//! the configured operation timeout and surfaces as a retryable `Storage`
//! error instead of hanging the caller.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tokio_postgres::{Client, NoTls, Row};
use tracing::info;

use super::{check_new_account, Account, AccountStore, NewAccount};
use crate::error::{AppError, AppResult};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS accounts (
    id          BIGSERIAL PRIMARY KEY,
    username    TEXT NOT NULL UNIQUE,
    email       TEXT NOT NULL UNIQUE,
    secret_hash TEXT NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
)";

const INSERT_ACCOUNT: &str = "INSERT INTO accounts (username, email, secret_hash)
    VALUES ($1, $2, $3)
    RETURNING id, username, email, secret_hash, created_at";

const SELECT_BY_USERNAME: &str =
    "SELECT id, username, email, secret_hash, created_at FROM accounts WHERE username = $1";

const SELECT_BY_EMAIL: &str =
    "SELECT id, username, email, secret_hash, created_at FROM accounts WHERE email = $1";

pub struct PgAccountStore {
    client: Client,
    op_timeout: Duration,
}

impl PgAccountStore {
    /// Connect using a libpq-style connection string. The connection task is
    /// driven in the background; its failure only surfaces as `Storage`
    /// errors on subsequent calls.
    pub async fn connect(conn_str: &str, op_timeout: Duration) -> AppResult<Self> {
        let (client, connection) = match timeout(op_timeout, tokio_postgres::connect(conn_str, NoTls)).await {
            Ok(res) => res?,
            Err(_) => return Err(AppError::storage("storage_timeout", "storage connection timed out")),
        };
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("postgres connection error: {e}");
            }
        });
        Ok(Self { client, op_timeout })
    }

    /// Explicit schema migration. Invoked separately by the caller at
    /// startup; construction never touches the schema.
    pub async fn migrate(&self) -> AppResult<()> {
        self.bounded(self.client.batch_execute(SCHEMA)).await?;
        info!("accounts schema ensured");
        Ok(())
    }

    async fn bounded<T, F>(&self, fut: F) -> AppResult<T>
    where
        F: Future<Output = Result<T, tokio_postgres::Error>>,
    {
        match timeout(self.op_timeout, fut).await {
            Ok(res) => res.map_err(AppError::from),
            Err(_) => Err(AppError::storage("storage_timeout", "storage operation timed out")),
        }
    }
}

fn account_from_row(row: &Row) -> Account {
    Account {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        secret_hash: row.get("secret_hash"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create(&self, account: NewAccount) -> AppResult<Account> {
        check_new_account(&account)?;
        let row = self
            .bounded(self.client.query_one(
                INSERT_ACCOUNT,
                &[&account.username, &account.email, &account.secret_hash],
            ))
            .await?;
        Ok(account_from_row(&row))
    }

    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<Account>> {
        // Username takes precedence over email for the same identifier.
        if let Some(row) = self
            .bounded(self.client.query_opt(SELECT_BY_USERNAME, &[&identifier]))
            .await?
        {
            return Ok(Some(account_from_row(&row)));
        }
        let row = self
            .bounded(self.client.query_opt(SELECT_BY_EMAIL, &[&identifier]))
            .await?;
        Ok(row.as_ref().map(account_from_row))
    }
}
