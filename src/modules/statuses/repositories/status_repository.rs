use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{FromRow, MySqlPool};

use super::super::models::{EntityType, State, Status, StatusCode};
use crate::core::in_memory::InMemoryRepository;
use crate::core::traits::contains_pattern;
use crate::core::{AppError, EntityMeta, Extras, Repository, Result, TenancyContext};

/// Persistence gateway for status transitions
#[async_trait]
pub trait StatusRepository: Repository<Status> {
    /// The most recently written status for an entity inside `scope`
    ///
    /// # Errors
    /// * `NotFound` - no status was ever recorded for the pair in that scope
    async fn get_by_entity(
        &self,
        scope: &TenancyContext,
        entity_id: &str,
        entity_type: EntityType,
    ) -> Result<Status>;
}

fn missing(entity_id: &str, entity_type: EntityType) -> AppError {
    AppError::not_found(format!(
        "Status for {} '{}' not found",
        entity_type, entity_id
    ))
}

#[async_trait]
impl StatusRepository for InMemoryRepository<Status> {
    async fn get_by_entity(
        &self,
        scope: &TenancyContext,
        entity_id: &str,
        entity_type: EntityType,
    ) -> Result<Status> {
        self.find_latest(|s| {
            s.entity_id == entity_id && s.entity_type == entity_type && scope.owns(&s.meta)
        })
        .await
            .ok_or_else(|| missing(entity_id, entity_type))
    }
}

/// MySQL-backed status repository
///
/// Rows are never updated in place by the tracker; "latest" is resolved by
/// `modified_at` with the time-ordered id as tie-breaker.
#[derive(Clone)]
pub struct MySqlStatusRepository {
    pool: MySqlPool,
}

impl MySqlStatusRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct StatusRow {
    #[sqlx(flatten)]
    meta: EntityMeta,
    entity_id: String,
    entity_type: String,
    state: i32,
    status: i32,
    extras: Json<Extras>,
}

impl TryFrom<StatusRow> for Status {
    type Error = AppError;

    fn try_from(row: StatusRow) -> Result<Self> {
        Ok(Status {
            meta: row.meta,
            entity_id: row.entity_id,
            entity_type: row.entity_type.parse()?,
            state: State::try_from(row.state)?,
            status: StatusCode::try_from(row.status)?,
            extras: row.extras.0,
        })
    }
}

const SELECT_STATUS: &str = r#"
    SELECT
        id, tenant_id, partition_id, access_id, created_at, modified_at,
        entity_id, entity_type, state, status, extras
    FROM statuses
"#;

#[async_trait]
impl Repository<Status> for MySqlStatusRepository {
    async fn get_by_id(&self, id: &str) -> Result<Status> {
        let row = sqlx::query_as::<_, StatusRow>(&format!("{} WHERE id = ?", SELECT_STATUS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Status '{}' not found", id)))?;

        Status::try_from(row)
    }

    async fn search(&self, query: &str) -> Result<Vec<Status>> {
        let rows = sqlx::query_as::<_, StatusRow>(&format!(
            "{} WHERE LOWER(entity_id) LIKE ? ORDER BY created_at, id",
            SELECT_STATUS
        ))
        .bind(contains_pattern(query))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Status::try_from).collect()
    }

    async fn save(&self, status: &Status) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO statuses (
                id, tenant_id, partition_id, access_id, created_at, modified_at,
                entity_id, entity_type, state, status, extras
            )
            VALUES (?, ?, ?, ?, ?, NOW(6), ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                tenant_id = VALUES(tenant_id),
                partition_id = VALUES(partition_id),
                access_id = VALUES(access_id),
                modified_at = NOW(6),
                entity_id = VALUES(entity_id),
                entity_type = VALUES(entity_type),
                state = VALUES(state),
                status = VALUES(status),
                extras = VALUES(extras)
            "#,
        )
        .bind(&status.meta.id)
        .bind(&status.meta.tenant_id)
        .bind(&status.meta.partition_id)
        .bind(&status.meta.access_id)
        .bind(status.meta.created_at)
        .bind(&status.entity_id)
        .bind(status.entity_type.as_str())
        .bind(status.state.as_i32())
        .bind(status.status.as_i32())
        .bind(Json(&status.extras))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl StatusRepository for MySqlStatusRepository {
    async fn get_by_entity(
        &self,
        scope: &TenancyContext,
        entity_id: &str,
        entity_type: EntityType,
    ) -> Result<Status> {
        let row = sqlx::query_as::<_, StatusRow>(&format!(
            r#"{}
            WHERE entity_id = ? AND entity_type = ?
              AND tenant_id = ? AND partition_id = ?
            ORDER BY modified_at DESC, id DESC
            LIMIT 1
            "#,
            SELECT_STATUS
        ))
        .bind(entity_id)
        .bind(entity_type.as_str())
        .bind(&scope.tenant_id)
        .bind(&scope.partition_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| missing(entity_id, entity_type))?;

        Status::try_from(row)
    }
}
