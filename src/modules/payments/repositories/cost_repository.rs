use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, MySqlPool};

use super::super::models::Cost;
use crate::core::in_memory::InMemoryRepository;
use crate::core::traits::contains_pattern;
use crate::core::{Amount, AppError, EntityMeta, Extras, Repository, Result};

/// Persistence gateway for payment costs
pub trait CostRepository: Repository<Cost> {}

impl CostRepository for InMemoryRepository<Cost> {}

#[derive(Clone)]
pub struct MySqlCostRepository {
    pool: MySqlPool,
}

impl MySqlCostRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct CostRow {
    #[sqlx(flatten)]
    meta: EntityMeta,
    payment_id: String,
    amount: Option<Decimal>,
    currency: Option<String>,
    description: String,
    extras: Json<Extras>,
}

impl From<CostRow> for Cost {
    fn from(row: CostRow) -> Self {
        let amount = match (row.amount, row.currency) {
            (Some(value), Some(currency)) => Some(Amount::new(value, currency)),
            _ => None,
        };

        Cost {
            meta: row.meta,
            payment_id: row.payment_id,
            amount,
            description: row.description,
            extras: row.extras.0,
        }
    }
}

const SELECT_COST: &str = r#"
    SELECT
        id, tenant_id, partition_id, access_id, created_at, modified_at,
        payment_id, amount, currency, description, extras
    FROM costs
"#;

#[async_trait]
impl Repository<Cost> for MySqlCostRepository {
    async fn get_by_id(&self, id: &str) -> Result<Cost> {
        let row = sqlx::query_as::<_, CostRow>(&format!("{} WHERE id = ?", SELECT_COST))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Cost::from)
            .ok_or_else(|| AppError::not_found(format!("Cost '{}' not found", id)))
    }

    async fn search(&self, query: &str) -> Result<Vec<Cost>> {
        let pattern = contains_pattern(query);
        let rows = sqlx::query_as::<_, CostRow>(&format!(
            r#"{}
            WHERE LOWER(payment_id) LIKE ? OR LOWER(description) LIKE ?
            ORDER BY created_at, id
            "#,
            SELECT_COST
        ))
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Cost::from).collect())
    }

    async fn save(&self, cost: &Cost) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO costs (
                id, tenant_id, partition_id, access_id, created_at, modified_at,
                payment_id, amount, currency, description, extras
            )
            VALUES (?, ?, ?, ?, ?, NOW(6), ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                tenant_id = VALUES(tenant_id),
                partition_id = VALUES(partition_id),
                access_id = VALUES(access_id),
                modified_at = NOW(6),
                payment_id = VALUES(payment_id),
                amount = VALUES(amount),
                currency = VALUES(currency),
                description = VALUES(description),
                extras = VALUES(extras)
            "#,
        )
        .bind(&cost.meta.id)
        .bind(&cost.meta.tenant_id)
        .bind(&cost.meta.partition_id)
        .bind(&cost.meta.access_id)
        .bind(cost.meta.created_at)
        .bind(&cost.payment_id)
        .bind(cost.amount.as_ref().map(|a| a.value))
        .bind(cost.amount.as_ref().map(|a| a.currency.clone()))
        .bind(&cost.description)
        .bind(Json(&cost.extras))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl CostRepository for MySqlCostRepository {}
