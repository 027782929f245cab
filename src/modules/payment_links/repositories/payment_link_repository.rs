use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, MySqlPool};

use super::super::models::{Customer, PaymentLink};
use crate::core::in_memory::InMemoryRepository;
use crate::core::traits::contains_pattern;
use crate::core::{Amount, AppError, EntityMeta, Extras, Repository, Result};

pub trait PaymentLinkRepository: Repository<PaymentLink> {}

impl PaymentLinkRepository for InMemoryRepository<PaymentLink> {}

#[derive(Clone)]
pub struct MySqlPaymentLinkRepository {
    pool: MySqlPool,
}

impl MySqlPaymentLinkRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PaymentLinkRow {
    #[sqlx(flatten)]
    meta: EntityMeta,
    name: String,
    description: String,
    amount: Option<Decimal>,
    currency: Option<String>,
    open_amount: bool,
    sale_date: Option<DateTime<Utc>>,
    expiry_date: Option<DateTime<Utc>>,
    customers: Json<Vec<Customer>>,
    notifications: Json<Vec<String>>,
    external_reference: String,
    extras: Json<Extras>,
}

impl From<PaymentLinkRow> for PaymentLink {
    fn from(row: PaymentLinkRow) -> Self {
        let amount = match (row.amount, row.currency) {
            (Some(value), Some(currency)) => Some(Amount::new(value, currency)),
            _ => None,
        };

        PaymentLink {
            meta: row.meta,
            name: row.name,
            description: row.description,
            amount,
            open_amount: row.open_amount,
            sale_date: row.sale_date,
            expiry_date: row.expiry_date,
            customers: row.customers.0,
            notifications: row.notifications.0,
            external_reference: row.external_reference,
            extras: row.extras.0,
        }
    }
}

const SELECT_PAYMENT_LINK: &str = r#"
    SELECT
        id, tenant_id, partition_id, access_id, created_at, modified_at,
        name, description, amount, currency, open_amount, sale_date, expiry_date,
        customers, notifications, external_reference, extras
    FROM payment_links
"#;

#[async_trait]
impl Repository<PaymentLink> for MySqlPaymentLinkRepository {
    async fn get_by_id(&self, id: &str) -> Result<PaymentLink> {
        sqlx::query_as::<_, PaymentLinkRow>(&format!("{} WHERE id = ?", SELECT_PAYMENT_LINK))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(PaymentLink::from)
            .ok_or_else(|| AppError::not_found(format!("PaymentLink '{}' not found", id)))
    }

    async fn search(&self, query: &str) -> Result<Vec<PaymentLink>> {
        let pattern = contains_pattern(query);
        let rows = sqlx::query_as::<_, PaymentLinkRow>(&format!(
            r#"{}
            WHERE LOWER(name) LIKE ? OR LOWER(external_reference) LIKE ?
            ORDER BY created_at, id
            "#,
            SELECT_PAYMENT_LINK
        ))
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PaymentLink::from).collect())
    }

    async fn save(&self, link: &PaymentLink) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payment_links (
                id, tenant_id, partition_id, access_id, created_at, modified_at,
                name, description, amount, currency, open_amount, sale_date, expiry_date,
                customers, notifications, external_reference, extras
            )
            VALUES (?, ?, ?, ?, ?, NOW(6), ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                tenant_id = VALUES(tenant_id),
                partition_id = VALUES(partition_id),
                access_id = VALUES(access_id),
                modified_at = NOW(6),
                name = VALUES(name),
                description = VALUES(description),
                amount = VALUES(amount),
                currency = VALUES(currency),
                open_amount = VALUES(open_amount),
                sale_date = VALUES(sale_date),
                expiry_date = VALUES(expiry_date),
                customers = VALUES(customers),
                notifications = VALUES(notifications),
                external_reference = VALUES(external_reference),
                extras = VALUES(extras)
            "#,
        )
        .bind(&link.meta.id)
        .bind(&link.meta.tenant_id)
        .bind(&link.meta.partition_id)
        .bind(&link.meta.access_id)
        .bind(link.meta.created_at)
        .bind(&link.name)
        .bind(&link.description)
        .bind(link.amount.as_ref().map(|a| a.value))
        .bind(link.amount.as_ref().map(|a| a.currency.clone()))
        .bind(link.open_amount)
        .bind(link.sale_date)
        .bind(link.expiry_date)
        .bind(Json(&link.customers))
        .bind(Json(&link.notifications))
        .bind(&link.external_reference)
        .bind(Json(&link.extras))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl PaymentLinkRepository for MySqlPaymentLinkRepository {}
