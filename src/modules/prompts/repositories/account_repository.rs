use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{FromRow, MySqlPool};

use super::super::models::Account;
use crate::core::in_memory::InMemoryRepository;
use crate::core::traits::contains_pattern;
use crate::core::{AppError, EntityMeta, Extras, Repository, Result};

#[async_trait]
pub trait AccountRepository: Repository<Account> {
    /// # Errors
    /// * `NotFound` - no account with that number in that country
    async fn get_by_account_number(&self, account_number: &str, country_code: &str)
        -> Result<Account>;
}

fn missing(account_number: &str, country_code: &str) -> AppError {
    AppError::not_found(format!(
        "Account '{}' ({}) not found",
        account_number, country_code
    ))
}

#[async_trait]
impl AccountRepository for InMemoryRepository<Account> {
    async fn get_by_account_number(
        &self,
        account_number: &str,
        country_code: &str,
    ) -> Result<Account> {
        self.filter(|a| a.account_number == account_number && a.country_code == country_code)
            .await
            .into_iter()
            .next()
            .ok_or_else(|| missing(account_number, country_code))
    }
}

#[derive(Clone)]
pub struct MySqlAccountRepository {
    pool: MySqlPool,
}

impl MySqlAccountRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AccountRow {
    #[sqlx(flatten)]
    meta: EntityMeta,
    account_number: String,
    country_code: String,
    name: String,
    extras: Json<Extras>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            meta: row.meta,
            account_number: row.account_number,
            country_code: row.country_code,
            name: row.name,
            extras: row.extras.0,
        }
    }
}

const SELECT_ACCOUNT: &str = r#"
    SELECT
        id, tenant_id, partition_id, access_id, created_at, modified_at,
        account_number, country_code, name, extras
    FROM accounts
"#;

#[async_trait]
impl Repository<Account> for MySqlAccountRepository {
    async fn get_by_id(&self, id: &str) -> Result<Account> {
        sqlx::query_as::<_, AccountRow>(&format!("{} WHERE id = ?", SELECT_ACCOUNT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Account::from)
            .ok_or_else(|| AppError::not_found(format!("Account '{}' not found", id)))
    }

    async fn search(&self, query: &str) -> Result<Vec<Account>> {
        let pattern = contains_pattern(query);
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "{} WHERE LOWER(account_number) LIKE ? OR LOWER(name) LIKE ? ORDER BY created_at, id",
            SELECT_ACCOUNT
        ))
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Account::from).collect())
    }

    async fn save(&self, account: &Account) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (
                id, tenant_id, partition_id, access_id, created_at, modified_at,
                account_number, country_code, name, extras
            )
            VALUES (?, ?, ?, ?, ?, NOW(6), ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                tenant_id = VALUES(tenant_id),
                partition_id = VALUES(partition_id),
                access_id = VALUES(access_id),
                modified_at = NOW(6),
                account_number = VALUES(account_number),
                country_code = VALUES(country_code),
                name = VALUES(name),
                extras = VALUES(extras)
            "#,
        )
        .bind(&account.meta.id)
        .bind(&account.meta.tenant_id)
        .bind(&account.meta.partition_id)
        .bind(&account.meta.access_id)
        .bind(account.meta.created_at)
        .bind(&account.account_number)
        .bind(&account.country_code)
        .bind(&account.name)
        .bind(Json(&account.extras))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl AccountRepository for MySqlAccountRepository {
    async fn get_by_account_number(
        &self,
        account_number: &str,
        country_code: &str,
    ) -> Result<Account> {
        sqlx::query_as::<_, AccountRow>(&format!(
            "{} WHERE account_number = ? AND country_code = ? ORDER BY created_at, id LIMIT 1",
            SELECT_ACCOUNT
        ))
        .bind(account_number)
        .bind(country_code)
        .fetch_optional(&self.pool)
        .await?
        .map(Account::from)
        .ok_or_else(|| missing(account_number, country_code))
    }
}
