use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use vault_recon_types::Result;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Opens a connection pool against `database_url` and runs pending migrations.
///
/// Mirrors `codex-state`'s `open_sqlite`: a small, size-bounded pool plus an
/// embedded migrator run once at startup, except here the backing engine is
/// Postgres so the pool is shared across worker processes rather than
/// private to one.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await?;
    MIGRATOR.run(&pool).await.map_err(|err| {
        vault_recon_types::Error::Database(format!("migration failed: {err}"))
    })?;
    Ok(pool)
}
