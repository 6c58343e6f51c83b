// SQLite-backed audit log of enforced filters.
//
// Tables:
// - filter_events: append-only, one row per enforced filter

use crate::core::filtering::{FilterError, FilterEventStore, TriggerEvent};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

pub struct SqliteFilterEventStore {
    pool: Pool<Sqlite>,
}

impl SqliteFilterEventStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), FilterError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS filter_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                filter_id TEXT NOT NULL,
                guild_id INTEGER NOT NULL,
                author_id INTEGER NOT NULL,
                channel_id INTEGER NOT NULL,
                message_id INTEGER NOT NULL,
                triggered_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_filter_events_guild_author
                ON filter_events(guild_id, author_id);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| FilterError::Storage(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl FilterEventStore for SqliteFilterEventStore {
    async fn append(&self, event: &TriggerEvent) -> Result<(), FilterError> {
        sqlx::query(
            r#"
            INSERT INTO filter_events (filter_id, guild_id, author_id, channel_id, message_id, triggered_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.filter_id.to_string())
        .bind(event.guild_id as i64)
        .bind(event.author_id as i64)
        .bind(event.channel_id as i64)
        .bind(event.message_id as i64)
        .bind(event.triggered_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| FilterError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn events_for_user(
        &self,
        guild_id: u64,
        user_id: u64,
        limit: usize,
    ) -> Result<Vec<TriggerEvent>, FilterError> {
        let rows = sqlx::query(
            r#"
            SELECT filter_id, guild_id, author_id, channel_id, message_id, triggered_at
            FROM filter_events
            WHERE guild_id = ? AND author_id = ?
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(guild_id as i64)
        .bind(user_id as i64)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| FilterError::Storage(e.to_string()))?;

        let mut events = Vec::with_capacity(rows.len());
        for row in rows {
            let filter_id: String = row.get("filter_id");
            let triggered_at: String = row.get("triggered_at");

            let Ok(filter_id) = Uuid::parse_str(&filter_id) else {
                tracing::warn!(filter_id = %filter_id, "Skipping unreadable filter event");
                continue;
            };
            let triggered_at = DateTime::parse_from_rfc3339(&triggered_at)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now());

            events.push(TriggerEvent {
                filter_id,
                guild_id: row.get::<i64, _>("guild_id") as u64,
                author_id: row.get::<i64, _>("author_id") as u64,
                channel_id: row.get::<i64, _>("channel_id") as u64,
                message_id: row.get::<i64, _>("message_id") as u64,
                triggered_at,
            });
        }
        Ok(events)
    }
}
