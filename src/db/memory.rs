//! Process-local account store, used when no database is configured and in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AccountStore, DUPLICATE_EMAIL};
use crate::error::{AppError, AppResult};
use crate::models::{Account, NewAccount};

#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<HashMap<Uuid, Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn insert(&self, account: NewAccount) -> AppResult<Account> {
        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|a| a.email == account.email) {
            return Err(AppError::field("email", DUPLICATE_EMAIL));
        }
        let row = Account {
            id: Uuid::new_v4(),
            name: account.name,
            email: account.email,
            avatar: account.avatar,
            password_hash: account.password_hash,
            created_at: Utc::now(),
        };
        accounts.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(&self, account: &Account) -> AppResult<Account> {
        let mut accounts = self.accounts.write().await;
        if accounts
            .values()
            .any(|a| a.id != account.id && a.email == account.email)
        {
            return Err(AppError::field("email", DUPLICATE_EMAIL));
        }
        let stored = accounts
            .get_mut(&account.id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        stored.name = account.name.clone();
        stored.email = account.email.clone();
        stored.avatar = account.avatar.clone();
        Ok(stored.clone())
    }
}
