use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::error::ServerResult;

pub async fn create_pool(config: &DatabaseConfig) -> ServerResult<PgPool> {
    let pool = pool_options(config).connect(&config.url).await?;

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database connection pool created"
    );

    Ok(pool)
}

/// Pool that connects on first use; nothing is dialed until a query runs
pub fn create_lazy_pool(config: &DatabaseConfig) -> ServerResult<PgPool> {
    Ok(pool_options(config).connect_lazy(&config.url)?)
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
}

pub async fn run_migrations(pool: &PgPool) -> ServerResult<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    tracing::info!("Database migrations completed");
    Ok(())
}

pub async fn health_check(pool: &PgPool) -> ServerResult<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn test_lazy_pool_builds_without_database() {
        let config = Config::default().database;
        assert!(create_lazy_pool(&config).is_ok());
    }

    #[tokio::test]
    async fn test_lazy_pool_rejects_malformed_url() {
        let mut config = Config::default().database;
        config.url = "not a url".to_string();
        assert!(create_lazy_pool(&config).is_err());
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore] // Requires database
    async fn test_health_check(pool: PgPool) -> sqlx::Result<()> {
        assert!(health_check(&pool).await.is_ok());
        Ok(())
    }
}
