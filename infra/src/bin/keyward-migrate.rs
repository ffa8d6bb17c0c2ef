//! Apply pending schema migrations and report pool health.
//!
//! Reads the same configuration as the service (`.env`, `config.<env>.toml`,
//! `KEYWARD__*` variables).

use anyhow::Context;

use kw_infra::database::MIGRATOR;
use kw_infra::{init_tracing, load_config, DatabasePool};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;
    init_tracing(&config.logging).context("failed to set up tracing")?;

    let pool = DatabasePool::new(config.database.clone())
        .await
        .context("failed to connect to the database")?;

    if !pool.health_check().await.context("database health check failed")? {
        anyhow::bail!("database answered the health check unexpectedly");
    }

    pool.run_migrations()
        .await
        .context("failed to apply migrations")?;

    for migration in MIGRATOR.iter() {
        tracing::info!(
            version = migration.version,
            description = %migration.description,
            "Migration available"
        );
    }
    tracing::info!(stats = %pool.get_statistics(), "Schema is up to date");

    pool.close().await;
    Ok(())
}
