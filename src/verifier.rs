//! Login verification against the credential store.

use crate::error::AppResult;
use crate::security;
use crate::store::SharedStore;

/// Terminal outcome of one verification attempt. There are no intermediate
/// states and `Unauthorized` carries no detail about which check failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Authorized { account_id: i64 },
    Unauthorized,
}

#[derive(Clone)]
pub struct LoginVerifier {
    store: SharedStore,
}

impl LoginVerifier {
    pub fn new(store: SharedStore) -> Self { Self { store } }

    /// Decide whether the presented identifier+secret pair authorizes as an
    /// existing account. Unknown identifier and wrong secret both yield
    /// `Unauthorized`; a lookup miss still verifies against a dummy hash so
    /// the two paths do comparable work. Never mutates stored state.
    pub async fn verify(&self, identifier: &str, presented_secret: &str) -> AppResult<Verification> {
        match self.store.find_by_identifier(identifier).await? {
            Some(account) => {
                if security::verify_secret(&account.secret_hash, presented_secret) {
                    Ok(Verification::Authorized { account_id: account.id })
                } else {
                    Ok(Verification::Unauthorized)
                }
            }
            None => {
                let _ = security::verify_secret(security::dummy_hash(), presented_secret);
                Ok(Verification::Unauthorized)
            }
        }
    }
}
