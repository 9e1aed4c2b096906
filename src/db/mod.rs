//! Account storage: the store interface plus Postgres and in-memory backends.

mod memory;
mod pool;
mod repositories;

pub use memory::MemoryAccountStore;
pub use pool::{create_pool, run_migrations, DbPool};
pub use repositories::PgAccountStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Account, NewAccount};

/// Persistence for account records. Emails passed in are already normalized.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>>;

    /// Fails with a field-level validation error when the email is taken.
    async fn insert(&self, account: NewAccount) -> AppResult<Account>;

    /// Replaces name, email and avatar of an existing account.
    async fn update(&self, account: &Account) -> AppResult<Account>;
}

pub(crate) const DUPLICATE_EMAIL: &str = "User already exists";
