//! In-memory account store. Check-and-insert runs under a single lock, so
//! concurrent registrations of the same identifier cannot both succeed.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use super::{check_new_account, Account, AccountStore, NewAccount};
use crate::error::{AppError, AppResult};

pub struct MemAccountStore {
    inner: Mutex<MemInner>,
}

struct MemInner {
    // Monotonic; never reused even if deletion is ever added.
    next_id: i64,
    accounts: Vec<Account>,
}

impl MemAccountStore {
    pub fn new() -> Self {
        Self { inner: Mutex::new(MemInner { next_id: 1, accounts: Vec::new() }) }
    }
}

impl Default for MemAccountStore {
    fn default() -> Self { Self::new() }
}

#[async_trait]
impl AccountStore for MemAccountStore {
    async fn create(&self, account: NewAccount) -> AppResult<Account> {
        check_new_account(&account)?;
        let mut inner = self.inner.lock();
        let taken = inner
            .accounts
            .iter()
            .any(|a| a.username == account.username || a.email == account.email);
        if taken {
            return Err(AppError::conflict("account_exists", "account already exists"));
        }
        let created = Account {
            id: inner.next_id,
            username: account.username,
            email: account.email,
            secret_hash: account.secret_hash,
            created_at: Utc::now(),
        };
        inner.next_id += 1;
        inner.accounts.push(created.clone());
        Ok(created)
    }

    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<Account>> {
        let inner = self.inner.lock();
        if let Some(a) = inner.accounts.iter().find(|a| a.username == identifier) {
            return Ok(Some(a.clone()));
        }
        Ok(inner.accounts.iter().find(|a| a.email == identifier).cloned())
    }
}
