//! Postgres-backed account store.

use async_trait::async_trait;
use uuid::Uuid;

use super::{AccountStore, DbPool, DUPLICATE_EMAIL};
use crate::error::{AppError, AppResult};
use crate::models::{Account, NewAccount};

const ACCOUNT_COLUMNS: &str = "id, name, email, avatar, password_hash, created_at";

#[derive(Clone)]
pub struct PgAccountStore {
    pool: DbPool,
}

impl PgAccountStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_unique_violation(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::field("email", DUPLICATE_EMAIL)
        }
        _ => AppError::Db(e),
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let row = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        let row = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert(&self, account: NewAccount) -> AppResult<Account> {
        let row = sqlx::query_as::<_, Account>(&format!(
            r#"
            INSERT INTO users (name, email, avatar, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.avatar)
        .bind(&account.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_unique_violation)?;
        Ok(row)
    }

    async fn update(&self, account: &Account) -> AppResult<Account> {
        let row = sqlx::query_as::<_, Account>(&format!(
            r#"
            UPDATE users SET name = $2, email = $3, avatar = $4
            WHERE id = $1
            RETURNING {ACCOUNT_COLUMNS}
            "#
        ))
        .bind(account.id)
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.avatar)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_unique_violation)?;
        row.ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}
