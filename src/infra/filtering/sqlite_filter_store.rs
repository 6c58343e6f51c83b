// SQLite-backed filter store.
//
// Tables:
// - filters: one row per filter, in creation order (rowid)

use crate::core::filtering::{FilterAction, FilterError, FilterRule, FilterStore, MatchType};
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

pub struct SqliteFilterStore {
    pool: Pool<Sqlite>,
}

impl SqliteFilterStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Run database migrations to create required tables.
    pub async fn migrate(&self) -> Result<(), FilterError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS filters (
                id TEXT PRIMARY KEY,
                action TEXT,
                ping_staff BOOLEAN NOT NULL DEFAULT 0,
                match_text TEXT NOT NULL,
                match_type TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| FilterError::Storage(e.to_string()))?;

        Ok(())
    }
}

/// Turn a row back into a filter. `None` for rows we can't make sense of.
fn rule_from_row(row: &SqliteRow) -> Option<FilterRule> {
    let id: String = row.get("id");
    let action: Option<String> = row.get("action");
    let match_type: String = row.get("match_type");

    let id = Uuid::parse_str(&id).ok()?;
    let action = match action {
        Some(value) => Some(FilterAction::parse(&value)?),
        None => None,
    };

    Some(FilterRule {
        id,
        action,
        ping_staff: row.get("ping_staff"),
        pattern: row.get("match_text"),
        match_type: MatchType::parse(&match_type)?,
    })
}

#[async_trait]
impl FilterStore for SqliteFilterStore {
    async fn get_all(&self) -> Result<Vec<FilterRule>, FilterError> {
        let rows = sqlx::query(
            "SELECT id, action, ping_staff, match_text, match_type FROM filters ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| FilterError::Storage(e.to_string()))?;

        let mut rules = Vec::with_capacity(rows.len());
        for row in &rows {
            match rule_from_row(row) {
                Some(rule) => rules.push(rule),
                None => {
                    let id: String = row.get("id");
                    tracing::warn!(filter_id = %id, "Skipping unreadable filter row");
                }
            }
        }
        Ok(rules)
    }

    async fn get(&self, id: Uuid) -> Result<Option<FilterRule>, FilterError> {
        let row = sqlx::query(
            "SELECT id, action, ping_staff, match_text, match_type FROM filters WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| FilterError::Storage(e.to_string()))?;

        Ok(row.as_ref().and_then(rule_from_row))
    }

    async fn set(&self, rule: &FilterRule) -> Result<(), FilterError> {
        sqlx::query(
            r#"
            INSERT INTO filters (id, action, ping_staff, match_text, match_type)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                action = excluded.action,
                ping_staff = excluded.ping_staff,
                match_text = excluded.match_text,
                match_type = excluded.match_type
            "#,
        )
        .bind(rule.id.to_string())
        .bind(rule.action.map(FilterAction::as_str))
        .bind(rule.ping_staff)
        .bind(&rule.pattern)
        .bind(rule.match_type.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| FilterError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn remove(&self, rule: &FilterRule) -> Result<(), FilterError> {
        sqlx::query("DELETE FROM filters WHERE id = ?")
            .bind(rule.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| FilterError::Storage(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> Pool<Sqlite> {
        // A single long-lived connection: every new connection to
        // `sqlite::memory:` would be a fresh, empty database.
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    async fn store() -> SqliteFilterStore {
        let store = SqliteFilterStore::new(memory_pool().await);
        store.migrate().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = store().await;
        let rule =
            FilterRule::new("free nitro", MatchType::Contains, Some(FilterAction::Ban), true)
                .unwrap();

        store.set(&rule).await.unwrap();
        assert_eq!(store.get(rule.id).await.unwrap(), Some(rule.clone()));

        store.remove(&rule).await.unwrap();
        assert_eq!(store.get(rule.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_absent_action_survives_storage() {
        let store = store().await;
        let rule = FilterRule::new("hi", MatchType::Exact, None, false).unwrap();

        store.set(&rule).await.unwrap();
        assert_eq!(store.get(rule.id).await.unwrap().unwrap().action, None);
    }

    #[tokio::test]
    async fn test_get_all_keeps_creation_order() {
        let store = store().await;
        let rules: Vec<FilterRule> = ["a", "b", "c"]
            .iter()
            .map(|p| FilterRule::new(*p, MatchType::Contains, None, false).unwrap())
            .collect();
        for rule in &rules {
            store.set(rule).await.unwrap();
        }

        // Re-setting an existing filter keeps its position.
        store.set(&rules[0]).await.unwrap();

        let all = store.get_all().await.unwrap();
        assert_eq!(all, rules);
    }

    #[tokio::test]
    async fn test_unreadable_rows_are_skipped() {
        let store = store().await;
        let rule = FilterRule::new("ok", MatchType::Contains, None, false).unwrap();
        store.set(&rule).await.unwrap();

        sqlx::query(
            "INSERT INTO filters (id, action, ping_staff, match_text, match_type) VALUES ('nope', NULL, 0, 'x', 'WHATEVER')",
        )
        .execute(&store.pool)
        .await
        .unwrap();

        assert_eq!(store.get_all().await.unwrap(), vec![rule]);
    }
}
