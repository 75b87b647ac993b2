use sqlx::PgPool;

/// Embedded schema files, applied in order. Names are recorded in
/// `_migrations` once applied.
const MIGRATIONS: &[(&str, &str)] = &[(
    "001_init_schema",
    include_str!("../../sql/001_init_schema.sql"),
)];

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("migration {name} failed: {source}")]
    Apply {
        name: &'static str,
        #[source]
        source: sqlx::Error,
    },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Applies every pending migration. Each file and its `_migrations` row
/// commit together, so a failed file leaves no record and is retried on
/// the next start.
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrationError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS "_migrations" (
            "name" TEXT PRIMARY KEY,
            "applied_at" TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    let applied: Vec<String> = sqlx::query_scalar(r#"SELECT "name" FROM "_migrations""#)
        .fetch_all(pool)
        .await?;

    let pending: Vec<_> = MIGRATIONS
        .iter()
        .filter(|(name, _)| !applied.iter().any(|done| done == name))
        .collect();

    if pending.is_empty() {
        tracing::debug!("schema up to date");
        return Ok(());
    }

    for &(name, sql) in pending {
        let apply_err = move |source| MigrationError::Apply { name, source };

        let mut tx = pool.begin().await?;
        sqlx::raw_sql(sql)
            .execute(&mut *tx)
            .await
            .map_err(apply_err)?;
        sqlx::query(r#"INSERT INTO "_migrations" ("name") VALUES ($1)"#)
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(apply_err)?;
        tx.commit().await.map_err(apply_err)?;

        tracing::info!(migration = name, "schema migration applied");
    }

    Ok(())
}
