use std::path::Path;

use anyhow::{Context, Result};
use courier_config::{AppConfig, BrokerKind};
use courier_runtime::{seed_demo_users, BackendServices, DEMO_USERS};
use tempfile::TempDir;

fn sqlite_url(path: &Path) -> String {
    format!("sqlite://{}", path.to_string_lossy())
}

fn build_config(database_url: String, max_connections: u32) -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = database_url;
    config.database.max_connections = max_connections;
    config
}

async fn initialise(config: &AppConfig) -> Result<BackendServices> {
    BackendServices::initialise(config)
        .await
        .context("failed to initialise backend services")
}

#[tokio::test(flavor = "multi_thread")]
async fn initialise_runs_migrations_and_selects_memory_broker() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("runtime/init.db");
    let config = build_config(sqlite_url(&db_path), 4);

    let services = initialise(&config).await?;
    let table: String = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'messages'",
    )
    .fetch_one(&services.db_pool)
    .await?;

    assert_eq!("messages", table);
    assert_eq!(services.broker.name(), "memory");
    assert!(db_path.exists(), "database file should be created");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_redis_falls_back_to_memory_broker() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut config = build_config(sqlite_url(&temp_dir.path().join("redis.db")), 1);
    config.broker.kind = BrokerKind::Redis;
    config.broker.redis_url = "redis://127.0.0.1:1".into();

    let services = initialise(&config).await?;
    assert_eq!(services.broker.name(), "memory");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn initialise_reports_database_failures_with_context() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let blocker = temp_dir.path().join("file");
    std::fs::write(&blocker, b"not a directory")?;
    let config = build_config(sqlite_url(&blocker.join("db.sqlite")), 1);

    let error = match BackendServices::initialise(&config).await {
        Ok(_) => panic!("expected database initialisation to fail"),
        Err(error) => error,
    };
    let message = format!("{error:?}");
    assert!(
        message.contains("failed to initialise database"),
        "expected database context, got {message}"
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn app_state_shares_the_runtime_broker() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = build_config(sqlite_url(&temp_dir.path().join("state.db")), 2);

    let services = initialise(&config).await?;
    let state = services.app_state()?;
    assert_eq!(state.broker.name(), services.broker.name());
    assert_eq!(state.messages.limits().max_page_size, config.messages.max_page_size);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn seeding_demo_users_is_repeatable() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = build_config(sqlite_url(&temp_dir.path().join("seed.db")), 2);
    let services = initialise(&config).await?;

    let first = seed_demo_users(&services.db_pool).await?;
    let second = seed_demo_users(&services.db_pool).await?;
    assert_eq!(first, second);
    assert_eq!(first.user_ids.len(), DEMO_USERS.len());

    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&services.db_pool)
        .await?;
    let conversations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM conversations")
        .fetch_one(&services.db_pool)
        .await?;
    assert_eq!(users, DEMO_USERS.len() as i64);
    assert_eq!(conversations, 1);
    Ok(())
}
