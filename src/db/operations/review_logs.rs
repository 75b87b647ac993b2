use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;

use crate::db::DatabaseProxy;
use crate::mastery::types::{EventId, ItemId, Outcome, ReviewEvent, UserId};
use crate::store::{EventStore, StorageError};

/// `review_logs` table. Rows are only ever inserted.
#[derive(Clone)]
pub struct PgEventStore {
    proxy: DatabaseProxy,
}

impl PgEventStore {
    pub fn new(proxy: DatabaseProxy) -> Self {
        Self { proxy }
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn append(
        &self,
        user_id: UserId,
        item_id: ItemId,
        outcome: Outcome,
    ) -> Result<EventId, StorageError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO "review_logs" ("user_id", "vocab_id", "result", "reviewed_at")
            VALUES ($1, $2, $3, NOW())
            RETURNING "id"
            "#,
        )
        .bind(user_id)
        .bind(item_id)
        .bind(i16::from(outcome.code()))
        .fetch_one(self.proxy.pool())
        .await?;
        Ok(id)
    }

    async fn read_events(&self, user_id: UserId) -> Result<Vec<ReviewEvent>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT "id", "user_id", "vocab_id", "result", "reviewed_at"
            FROM "review_logs"
            WHERE "user_id" = $1
            ORDER BY "reviewed_at" ASC, "id" ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.proxy.pool())
        .await?;

        rows.iter().map(map_pg_row).collect()
    }
}

fn map_pg_row(row: &sqlx::postgres::PgRow) -> Result<ReviewEvent, StorageError> {
    let id: i64 = row.try_get("id")?;
    let code: i16 = row.try_get("result")?;
    let outcome = Outcome::from_code(i64::from(code))
        .ok_or_else(|| StorageError::Corrupt(format!("review_logs.id={id} has result={code}")))?;
    let reviewed_at: DateTime<Utc> = row.try_get("reviewed_at")?;

    Ok(ReviewEvent {
        id,
        user_id: row.try_get("user_id")?,
        item_id: row.try_get("vocab_id")?,
        outcome,
        reviewed_at,
    })
}
