use std::sync::Arc;

use chrono::Duration;

use crate::auth::{PasswordHasher, TokenKeys};
use crate::store::Store;

/// Shared application state handed to every handler through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub hasher: PasswordHasher,
    pub tokens: TokenKeys,
    pub token_ttl: Duration,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        hasher: PasswordHasher,
        tokens: TokenKeys,
        token_ttl: Duration,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            token_ttl,
        }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }
}
