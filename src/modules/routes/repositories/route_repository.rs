use async_trait::async_trait;
use sqlx::{FromRow, MySqlPool};

use super::super::models::{Route, RouteMode, RouteType};
use crate::core::in_memory::InMemoryRepository;
use crate::core::traits::contains_pattern;
use crate::core::{AppError, EntityMeta, Repository, Result};

/// Persistence gateway for routes
#[async_trait]
pub trait RouteRepository: Repository<Route> {
    /// Routes in `partition_id` able to carry a payment in `mode` hinted as
    /// `hint`, in stable (created_at, id) order
    async fn find_matching(
        &self,
        partition_id: &str,
        mode: RouteMode,
        hint: RouteType,
    ) -> Result<Vec<Route>>;
}

#[async_trait]
impl RouteRepository for InMemoryRepository<Route> {
    async fn find_matching(
        &self,
        partition_id: &str,
        mode: RouteMode,
        hint: RouteType,
    ) -> Result<Vec<Route>> {
        Ok(self
            .filter(|route| route.matches(partition_id, mode, hint))
            .await)
    }
}

#[derive(Clone)]
pub struct MySqlRouteRepository {
    pool: MySqlPool,
}

impl MySqlRouteRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RouteRow {
    #[sqlx(flatten)]
    meta: EntityMeta,
    name: String,
    description: String,
    mode: String,
    route_type: String,
    uri: String,
}

impl TryFrom<RouteRow> for Route {
    type Error = AppError;

    fn try_from(row: RouteRow) -> Result<Self> {
        Ok(Route {
            meta: row.meta,
            name: row.name,
            description: row.description,
            mode: row.mode.parse()?,
            route_type: row.route_type.parse()?,
            uri: row.uri,
        })
    }
}

const SELECT_ROUTE: &str = r#"
    SELECT
        id, tenant_id, partition_id, access_id, created_at, modified_at,
        name, description, mode, route_type, uri
    FROM routes
"#;

#[async_trait]
impl Repository<Route> for MySqlRouteRepository {
    async fn get_by_id(&self, id: &str) -> Result<Route> {
        let row = sqlx::query_as::<_, RouteRow>(&format!("{} WHERE id = ?", SELECT_ROUTE))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Route '{}' not found", id)))?;

        Route::try_from(row)
    }

    async fn search(&self, query: &str) -> Result<Vec<Route>> {
        let rows = sqlx::query_as::<_, RouteRow>(&format!(
            "{} WHERE LOWER(name) LIKE ? ORDER BY created_at, id",
            SELECT_ROUTE
        ))
        .bind(contains_pattern(query))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Route::try_from).collect()
    }

    async fn save(&self, route: &Route) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO routes (
                id, tenant_id, partition_id, access_id, created_at, modified_at,
                name, description, mode, route_type, uri
            )
            VALUES (?, ?, ?, ?, ?, NOW(6), ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                tenant_id = VALUES(tenant_id),
                partition_id = VALUES(partition_id),
                access_id = VALUES(access_id),
                modified_at = NOW(6),
                name = VALUES(name),
                description = VALUES(description),
                mode = VALUES(mode),
                route_type = VALUES(route_type),
                uri = VALUES(uri)
            "#,
        )
        .bind(&route.meta.id)
        .bind(&route.meta.tenant_id)
        .bind(&route.meta.partition_id)
        .bind(&route.meta.access_id)
        .bind(route.meta.created_at)
        .bind(&route.name)
        .bind(&route.description)
        .bind(route.mode.as_str())
        .bind(route.route_type.as_str())
        .bind(&route.uri)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl RouteRepository for MySqlRouteRepository {
    async fn find_matching(
        &self,
        partition_id: &str,
        mode: RouteMode,
        hint: RouteType,
    ) -> Result<Vec<Route>> {
        let rows = sqlx::query_as::<_, RouteRow>(&format!(
            r#"{}
            WHERE partition_id = ?
              AND (route_type = 'any' OR route_type = ?)
              AND (mode = ? OR mode = 'trx')
            ORDER BY created_at, id
            "#,
            SELECT_ROUTE
        ))
        .bind(partition_id)
        .bind(hint.as_str())
        .bind(mode.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Route::try_from).collect()
    }
}
