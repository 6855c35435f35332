//! Courier Database Crate
//!
//! Connection management, embedded migrations, and the SQLite repositories that
//! back the chat services' storage ports.

use courier_config::DatabaseConfig;
use sqlx::SqlitePool;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod stores;
pub mod types;

pub use connection::prepare_database;
pub use migrations::{run_migrations, MIGRATOR};

pub use entities::{Conversation, Message, NewMessage, Sender, User};
pub use repos::{ConversationRepository, MessageRepository, UserRepository};
pub use stores::{ConversationStore, MessageStore, UserDirectory};
pub use types::{DatabaseError, DatabaseResult};

/// Connect and apply migrations.
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(format!("{e:#}")))?;

    run_migrations(&pool).await?;

    Ok(pool)
}
