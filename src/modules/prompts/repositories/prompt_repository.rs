use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, MySqlPool};

use super::super::models::Prompt;
use crate::core::in_memory::InMemoryRepository;
use crate::core::traits::contains_pattern;
use crate::core::{Amount, AppError, EntityMeta, Extras, Repository, Result};
use crate::modules::payments::models::Identity;

pub trait PromptRepository: Repository<Prompt> {}

impl PromptRepository for InMemoryRepository<Prompt> {}

#[derive(Clone)]
pub struct MySqlPromptRepository {
    pool: MySqlPool,
}

impl MySqlPromptRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PromptRow {
    #[sqlx(flatten)]
    meta: EntityMeta,
    source: Json<Identity>,
    recipient: Json<Identity>,
    amount: Option<Decimal>,
    currency: Option<String>,
    account_number: String,
    country_code: String,
    account_name: String,
    account_id: Option<String>,
    device_id: String,
    extras: Json<Extras>,
}

impl From<PromptRow> for Prompt {
    fn from(row: PromptRow) -> Self {
        let amount = match (row.amount, row.currency) {
            (Some(value), Some(currency)) => Some(Amount::new(value, currency)),
            _ => None,
        };

        Prompt {
            meta: row.meta,
            source: row.source.0,
            recipient: row.recipient.0,
            amount,
            account_number: row.account_number,
            country_code: row.country_code,
            account_name: row.account_name,
            account_id: row.account_id,
            device_id: row.device_id,
            extras: row.extras.0,
        }
    }
}

const SELECT_PROMPT: &str = r#"
    SELECT
        id, tenant_id, partition_id, access_id, created_at, modified_at,
        source, recipient, amount, currency, account_number, country_code,
        account_name, account_id, device_id, extras
    FROM prompts
"#;

#[async_trait]
impl Repository<Prompt> for MySqlPromptRepository {
    async fn get_by_id(&self, id: &str) -> Result<Prompt> {
        sqlx::query_as::<_, PromptRow>(&format!("{} WHERE id = ?", SELECT_PROMPT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Prompt::from)
            .ok_or_else(|| AppError::not_found(format!("Prompt '{}' not found", id)))
    }

    async fn search(&self, query: &str) -> Result<Vec<Prompt>> {
        let pattern = contains_pattern(query);
        let rows = sqlx::query_as::<_, PromptRow>(&format!(
            "{} WHERE LOWER(id) LIKE ? OR LOWER(account_number) LIKE ? ORDER BY created_at, id",
            SELECT_PROMPT
        ))
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Prompt::from).collect())
    }

    async fn save(&self, prompt: &Prompt) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO prompts (
                id, tenant_id, partition_id, access_id, created_at, modified_at,
                source, recipient, amount, currency, account_number, country_code,
                account_name, account_id, device_id, extras
            )
            VALUES (?, ?, ?, ?, ?, NOW(6), ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                tenant_id = VALUES(tenant_id),
                partition_id = VALUES(partition_id),
                access_id = VALUES(access_id),
                modified_at = NOW(6),
                source = VALUES(source),
                recipient = VALUES(recipient),
                amount = VALUES(amount),
                currency = VALUES(currency),
                account_number = VALUES(account_number),
                country_code = VALUES(country_code),
                account_name = VALUES(account_name),
                account_id = VALUES(account_id),
                device_id = VALUES(device_id),
                extras = VALUES(extras)
            "#,
        )
        .bind(&prompt.meta.id)
        .bind(&prompt.meta.tenant_id)
        .bind(&prompt.meta.partition_id)
        .bind(&prompt.meta.access_id)
        .bind(prompt.meta.created_at)
        .bind(Json(&prompt.source))
        .bind(Json(&prompt.recipient))
        .bind(prompt.amount.as_ref().map(|a| a.value))
        .bind(prompt.amount.as_ref().map(|a| a.currency.clone()))
        .bind(&prompt.account_number)
        .bind(&prompt.country_code)
        .bind(&prompt.account_name)
        .bind(&prompt.account_id)
        .bind(&prompt.device_id)
        .bind(Json(&prompt.extras))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl PromptRepository for MySqlPromptRepository {}
