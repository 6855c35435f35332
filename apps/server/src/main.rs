use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use courier_config::{load_from, AppConfig};
use courier_gateway::build_router;
use courier_runtime::{seed_demo_users, shutdown_signal, telemetry, BackendServices};
use sqlx::Row;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "courier-server")]
#[command(about = "Courier real-time chat server (serves by default)")]
struct Cli {
    /// Configuration file; overrides COURIER_CONFIG and the default search paths
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Create the demo users before serving
    #[arg(long)]
    seed_demo_users: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP and WebSocket server
    Serve,
    /// Create the demo users and a conversation between the first two
    SeedDemoUsers,
    /// Print the stored messages, oldest first
    DumpMessages,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing().context("failed to initialise tracing")?;

    let config = load_from(cli.config).context("failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(config, cli.seed_demo_users).await,
        Commands::SeedDemoUsers => seed(config).await,
        Commands::DumpMessages => dump_messages(config).await,
    }
}

async fn run_server(config: AppConfig, seed_first: bool) -> anyhow::Result<()> {
    info!("starting Courier");

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    if seed_first {
        seed_demo_users(&services.db_pool)
            .await
            .context("failed to seed demo users")?;
    }

    let state = services.app_state()?;
    let app = build_router(state);

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, broker = services.broker.name(), "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server error")?;

    info!("courier shut down");
    Ok(())
}

async fn seed(config: AppConfig) -> anyhow::Result<()> {
    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let summary = seed_demo_users(&services.db_pool)
        .await
        .context("failed to seed demo users")?;

    println!("Seeded users: {:?}", summary.user_ids);
    println!("Demo conversation: {}", summary.conversation_id);
    Ok(())
}

async fn dump_messages(config: AppConfig) -> anyhow::Result<()> {
    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let rows = sqlx::query(
        r#"
        SELECT m.id, m.conversation_id, m.sender_id, u.name AS sender_name,
               m.content, m.is_read, m.sent_at
        FROM messages m
        LEFT JOIN users u ON u.id = m.sender_id
        ORDER BY m.sent_at ASC, m.id ASC
        "#,
    )
    .fetch_all(&services.db_pool)
    .await
    .context("failed to fetch messages")?;

    println!("=== MESSAGES ===");
    if rows.is_empty() {
        println!("No messages found in database");
        return Ok(());
    }

    println!("Found {} messages:", rows.len());
    println!(
        "{:<6} {:<8} {:<20} {:<6} {:<32} {}",
        "ID", "Conv", "Sender", "Read", "Sent At", "Content"
    );
    println!("{}", "-".repeat(110));

    for row in rows {
        let id: i64 = row.get("id");
        let conversation_id: i64 = row.get("conversation_id");
        let sender_id: i64 = row.get("sender_id");
        let sender_name: Option<String> = row.get("sender_name");
        let is_read: bool = row.get("is_read");
        let sent_at: String = row.get("sent_at");
        let content: String = row.get("content");

        println!(
            "{:<6} {:<8} {:<20} {:<6} {:<32} {}",
            id,
            conversation_id,
            sender_name.unwrap_or_else(|| format!("#{sender_id}")),
            is_read,
            sent_at,
            content
        );
    }

    Ok(())
}
