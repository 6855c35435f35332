use std::sync::Arc;

use anyhow::{Context, Result};
use courier_config::AppConfig;
use courier_database::{
    initialize_database, ConversationRepository, ConversationStore, UserRepository,
};
use courier_gateway::{broker, AppState, BrokerClient};
use sqlx::SqlitePool;
use tracing::info;

pub mod telemetry {
    use anyhow::Result;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Long-lived resources shared by every request.
#[derive(Clone)]
pub struct BackendServices {
    pub config: AppConfig,
    pub db_pool: SqlitePool,
    pub broker: Arc<dyn BrokerClient>,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = initialize_database(&config.database)
            .await
            .context("failed to initialise database")?;

        let broker = broker::connect(&config.broker).await;
        info!(broker = broker.name(), "broker ready");

        Ok(Self {
            config: config.clone(),
            db_pool,
            broker,
        })
    }

    pub fn app_state(&self) -> Result<AppState> {
        AppState::from_pool(self.db_pool.clone(), self.broker.clone(), &self.config)
    }
}

/// Sample accounts for local development.
pub const DEMO_USERS: &[(&str, &str)] = &[
    ("Ana Torres", "ana.torres@example.com"),
    ("Jose Perez", "jose.perez@example.com"),
    ("Luisa Gomez", "luisa.gomez@example.com"),
    ("Marco Diaz", "marco.diaz@example.com"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub user_ids: Vec<i64>,
    pub conversation_id: i64,
}

/// Create the demo users plus a conversation between the first two.
/// Running it again reuses existing rows.
pub async fn seed_demo_users(pool: &SqlitePool) -> Result<SeedSummary> {
    let users = UserRepository::new(pool.clone());
    let mut user_ids = Vec::with_capacity(DEMO_USERS.len());
    for (name, email) in DEMO_USERS {
        let user = users
            .ensure(name, email)
            .await
            .with_context(|| format!("failed to seed user {email}"))?;
        user_ids.push(user.id);
    }

    let conversations = ConversationRepository::new(pool.clone());
    let (first, second) = (user_ids[0], user_ids[1]);
    let conversation = match conversations.find_by_participants(first, second).await? {
        Some(existing) => existing,
        None => conversations.insert_conversation(first, second).await?,
    };

    info!(
        users = user_ids.len(),
        conversation_id = conversation.id,
        "demo data seeded"
    );

    Ok(SeedSummary {
        user_ids,
        conversation_id: conversation.id,
    })
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
