use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, MySqlPool};

use super::super::models::{Identity, Payment};
use crate::core::in_memory::InMemoryRepository;
use crate::core::traits::contains_pattern;
use crate::core::{Amount, AppError, Entity, EntityMeta, Extras, Repository, Result, TenancyContext};

/// Persistence gateway for payments
#[async_trait]
pub trait PaymentRepository: Repository<Payment> {
    /// Fetch a payment owned by `scope`
    ///
    /// # Errors
    /// * `NotFound` - no payment with that id exists inside the scope
    async fn get_scoped(&self, scope: &TenancyContext, id: &str) -> Result<Payment>;

    /// Case-insensitive substring search over the payments owned by `scope`
    async fn search_scoped(&self, scope: &TenancyContext, query: &str) -> Result<Vec<Payment>>;
}

fn missing(id: &str) -> AppError {
    AppError::not_found(format!("Payment '{}' not found", id))
}

#[async_trait]
impl PaymentRepository for InMemoryRepository<Payment> {
    async fn get_scoped(&self, scope: &TenancyContext, id: &str) -> Result<Payment> {
        match self.get_by_id(id).await {
            Ok(payment) if scope.owns(&payment.meta) => Ok(payment),
            Ok(_) => Err(missing(id)),
            Err(e) => Err(e),
        }
    }

    async fn search_scoped(&self, scope: &TenancyContext, query: &str) -> Result<Vec<Payment>> {
        let needle = query.trim().to_lowercase();
        Ok(self
            .filter(|payment| {
                scope.owns(&payment.meta)
                    && payment
                        .search_text()
                        .iter()
                        .any(|text| text.to_lowercase().contains(&needle))
            })
            .await)
    }
}

/// MySQL-backed payment repository
///
/// `save` upserts by id so that redelivered `payment.save` events converge
/// on a single row.
#[derive(Clone)]
pub struct MySqlPaymentRepository {
    pool: MySqlPool,
}

impl MySqlPaymentRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct PaymentRow {
    #[sqlx(flatten)]
    meta: EntityMeta,
    sender_profile_type: String,
    sender_profile_id: String,
    sender_contact_id: String,
    recipient_profile_type: String,
    recipient_profile_id: String,
    recipient_contact_id: String,
    amount: Option<Decimal>,
    currency: Option<String>,
    cost_ids: Json<Vec<String>>,
    reference_id: String,
    batch_id: String,
    transaction_id: String,
    route_id: Option<String>,
    outbound: bool,
    released_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    extras: Json<Extras>,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        let amount = match (row.amount, row.currency) {
            (Some(value), Some(currency)) => Some(Amount::new(value, currency)),
            _ => None,
        };

        Payment {
            meta: row.meta,
            sender: Identity {
                profile_type: row.sender_profile_type,
                profile_id: row.sender_profile_id,
                contact_id: row.sender_contact_id,
            },
            recipient: Identity {
                profile_type: row.recipient_profile_type,
                profile_id: row.recipient_profile_id,
                contact_id: row.recipient_contact_id,
            },
            amount,
            cost_ids: row.cost_ids.0,
            reference_id: row.reference_id,
            batch_id: row.batch_id,
            transaction_id: row.transaction_id,
            route_id: row.route_id,
            outbound: row.outbound,
            released_at: row.released_at,
            cancelled_at: row.cancelled_at,
            extras: row.extras.0,
        }
    }
}

const SELECT_PAYMENT: &str = r#"
    SELECT
        id, tenant_id, partition_id, access_id, created_at, modified_at,
        sender_profile_type, sender_profile_id, sender_contact_id,
        recipient_profile_type, recipient_profile_id, recipient_contact_id,
        amount, currency, cost_ids, reference_id, batch_id, transaction_id,
        route_id, outbound, released_at, cancelled_at, extras
    FROM payments
"#;

#[async_trait]
impl Repository<Payment> for MySqlPaymentRepository {
    async fn get_by_id(&self, id: &str) -> Result<Payment> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!("{} WHERE id = ?", SELECT_PAYMENT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Payment::from).ok_or_else(|| missing(id))
    }

    async fn search(&self, query: &str) -> Result<Vec<Payment>> {
        let pattern = contains_pattern(query);
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            r#"{}
            WHERE LOWER(id) LIKE ?
               OR LOWER(reference_id) LIKE ?
               OR LOWER(transaction_id) LIKE ?
               OR LOWER(batch_id) LIKE ?
            ORDER BY created_at, id
            "#,
            SELECT_PAYMENT
        ))
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Payment::from).collect())
    }

    async fn save(&self, payment: &Payment) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, tenant_id, partition_id, access_id, created_at, modified_at,
                sender_profile_type, sender_profile_id, sender_contact_id,
                recipient_profile_type, recipient_profile_id, recipient_contact_id,
                amount, currency, cost_ids, reference_id, batch_id, transaction_id,
                route_id, outbound, released_at, cancelled_at, extras
            )
            VALUES (?, ?, ?, ?, ?, NOW(6), ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                tenant_id = VALUES(tenant_id),
                partition_id = VALUES(partition_id),
                access_id = VALUES(access_id),
                modified_at = NOW(6),
                sender_profile_type = VALUES(sender_profile_type),
                sender_profile_id = VALUES(sender_profile_id),
                sender_contact_id = VALUES(sender_contact_id),
                recipient_profile_type = VALUES(recipient_profile_type),
                recipient_profile_id = VALUES(recipient_profile_id),
                recipient_contact_id = VALUES(recipient_contact_id),
                amount = VALUES(amount),
                currency = VALUES(currency),
                cost_ids = VALUES(cost_ids),
                reference_id = VALUES(reference_id),
                batch_id = VALUES(batch_id),
                transaction_id = VALUES(transaction_id),
                route_id = VALUES(route_id),
                outbound = VALUES(outbound),
                released_at = VALUES(released_at),
                cancelled_at = VALUES(cancelled_at),
                extras = VALUES(extras)
            "#,
        )
        .bind(&payment.meta.id)
        .bind(&payment.meta.tenant_id)
        .bind(&payment.meta.partition_id)
        .bind(&payment.meta.access_id)
        .bind(payment.meta.created_at)
        .bind(&payment.sender.profile_type)
        .bind(&payment.sender.profile_id)
        .bind(&payment.sender.contact_id)
        .bind(&payment.recipient.profile_type)
        .bind(&payment.recipient.profile_id)
        .bind(&payment.recipient.contact_id)
        .bind(payment.amount.as_ref().map(|a| a.value))
        .bind(payment.amount.as_ref().map(|a| a.currency.clone()))
        .bind(Json(&payment.cost_ids))
        .bind(&payment.reference_id)
        .bind(&payment.batch_id)
        .bind(&payment.transaction_id)
        .bind(&payment.route_id)
        .bind(payment.outbound)
        .bind(payment.released_at)
        .bind(payment.cancelled_at)
        .bind(Json(&payment.extras))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl PaymentRepository for MySqlPaymentRepository {
    async fn get_scoped(&self, scope: &TenancyContext, id: &str) -> Result<Payment> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "{} WHERE id = ? AND tenant_id = ? AND partition_id = ?",
            SELECT_PAYMENT
        ))
        .bind(id)
        .bind(&scope.tenant_id)
        .bind(&scope.partition_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Payment::from).ok_or_else(|| missing(id))
    }

    async fn search_scoped(&self, scope: &TenancyContext, query: &str) -> Result<Vec<Payment>> {
        let pattern = contains_pattern(query);
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            r#"{}
            WHERE tenant_id = ?
              AND partition_id = ?
              AND (LOWER(id) LIKE ?
                OR LOWER(reference_id) LIKE ?
                OR LOWER(transaction_id) LIKE ?
                OR LOWER(batch_id) LIKE ?)
            ORDER BY created_at, id
            "#,
            SELECT_PAYMENT
        ))
        .bind(&scope.tenant_id)
        .bind(&scope.partition_id)
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Payment::from).collect())
    }
}
