use async_trait::async_trait;

use crate::core::Result;

/// Base repository trait shared by every entity store
///
/// `save` is an upsert keyed by id: it inserts when the id is unknown and
/// overwrites every column otherwise, which makes redelivered save events
/// converge on the same row.
#[async_trait]
pub trait Repository<T>: Send + Sync {
    /// Fetch by primary id, failing with `NotFound` when absent
    async fn get_by_id(&self, id: &str) -> Result<T>;

    /// Case-insensitive partial match on the entity's display fields.
    /// Returns an empty list when nothing matches.
    async fn search(&self, query: &str) -> Result<Vec<T>>;

    /// Insert or overwrite by id
    async fn save(&self, entity: &T) -> Result<()>;
}

/// SQL `LIKE` pattern matching `query` anywhere, lowercased for comparison
/// against `LOWER(column)`
pub fn contains_pattern(query: &str) -> String {
    let escaped = query
        .trim()
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
