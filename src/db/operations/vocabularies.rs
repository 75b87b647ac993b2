use async_trait::async_trait;
use sqlx::Row;

use crate::db::DatabaseProxy;
use crate::mastery::types::{Item, ItemId, TierFilter};
use crate::store::{ItemCatalog, StorageError};

const ITEM_COLUMNS: &str =
    r#""id","kanji","kana","romaji","meaning","example_sentence","difficulty_level""#;

#[derive(Clone)]
pub struct PgCatalog {
    proxy: DatabaseProxy,
}

impl PgCatalog {
    pub fn new(proxy: DatabaseProxy) -> Self {
        Self { proxy }
    }
}

#[async_trait]
impl ItemCatalog for PgCatalog {
    async fn list_items(&self, filter: &TierFilter) -> Result<Vec<Item>, StorageError> {
        let pool = self.proxy.pool();
        let rows = match filter {
            TierFilter::All => {
                sqlx::query(&format!(
                    r#"SELECT {ITEM_COLUMNS} FROM "vocabularies" ORDER BY "id""#
                ))
                .fetch_all(pool)
                .await?
            }
            TierFilter::Only(tiers) => {
                sqlx::query(&format!(
                    r#"SELECT {ITEM_COLUMNS} FROM "vocabularies" WHERE "difficulty_level" = ANY($1) ORDER BY "id""#
                ))
                .bind(tiers.as_slice())
                .fetch_all(pool)
                .await?
            }
        };

        rows.iter().map(map_pg_row).collect()
    }

    async fn count_items(&self, filter: &TierFilter) -> Result<u64, StorageError> {
        let pool = self.proxy.pool();
        let count: i64 = match filter {
            TierFilter::All => {
                sqlx::query_scalar(r#"SELECT COUNT(*) FROM "vocabularies""#)
                    .fetch_one(pool)
                    .await?
            }
            TierFilter::Only(tiers) => {
                sqlx::query_scalar(
                    r#"SELECT COUNT(*) FROM "vocabularies" WHERE "difficulty_level" = ANY($1)"#,
                )
                .bind(tiers.as_slice())
                .fetch_one(pool)
                .await?
            }
        };
        Ok(count.max(0) as u64)
    }

    async fn sample_items(
        &self,
        filter: &TierFilter,
        limit: usize,
    ) -> Result<Vec<Item>, StorageError> {
        let pool = self.proxy.pool();
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = match filter {
            TierFilter::All => {
                sqlx::query(&format!(
                    r#"SELECT {ITEM_COLUMNS} FROM "vocabularies" ORDER BY RANDOM() LIMIT $1"#
                ))
                .bind(limit)
                .fetch_all(pool)
                .await?
            }
            TierFilter::Only(tiers) => {
                sqlx::query(&format!(
                    r#"SELECT {ITEM_COLUMNS} FROM "vocabularies" WHERE "difficulty_level" = ANY($1) ORDER BY RANDOM() LIMIT $2"#
                ))
                .bind(tiers.as_slice())
                .bind(limit)
                .fetch_all(pool)
                .await?
            }
        };

        rows.iter().map(map_pg_row).collect()
    }

    async fn get_items(&self, ids: &[ItemId]) -> Result<Vec<Item>, StorageError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(&format!(
            r#"SELECT {ITEM_COLUMNS} FROM "vocabularies" WHERE "id" = ANY($1) ORDER BY "id""#
        ))
        .bind(ids)
        .fetch_all(self.proxy.pool())
        .await?;

        rows.iter().map(map_pg_row).collect()
    }
}

fn map_pg_row(row: &sqlx::postgres::PgRow) -> Result<Item, StorageError> {
    Ok(Item {
        id: row.try_get("id")?,
        tier: row.try_get("difficulty_level")?,
        kanji: row.try_get::<Option<String>, _>("kanji")?.unwrap_or_default(),
        kana: row.try_get("kana")?,
        romaji: row.try_get("romaji")?,
        meaning: row.try_get("meaning")?,
        example_sentence: row
            .try_get::<Option<String>, _>("example_sentence")?
            .unwrap_or_default(),
    })
}
