use chrono::{Duration, TimeZone, Utc};
use courier_config::DatabaseConfig;
use courier_database::{
    initialize_database, ConversationRepository, ConversationStore, MessageRepository,
    MessageStore, NewMessage, UserDirectory, UserRepository,
};
use sqlx::SqlitePool;
use tempfile::TempDir;

type TestResult<T = ()> = anyhow::Result<T>;

struct TestContext {
    _temp_dir: TempDir,
    pool: SqlitePool,
    users: UserRepository,
    conversations: ConversationRepository,
    messages: MessageRepository,
}

impl TestContext {
    async fn new() -> TestResult<Self> {
        let temp_dir = TempDir::new()?;
        let config = DatabaseConfig {
            url: format!("sqlite://{}", temp_dir.path().join("repos.db").display()),
            max_connections: 2,
        };
        let pool = initialize_database(&config).await?;

        Ok(Self {
            _temp_dir: temp_dir,
            users: UserRepository::new(pool.clone()),
            conversations: ConversationRepository::new(pool.clone()),
            messages: MessageRepository::new(pool.clone()),
            pool,
        })
    }

    async fn seed_pair(&self) -> TestResult<(i64, i64, i64)> {
        let ana = self.users.create("Ana Torres", "ana@example.com").await?;
        let jose = self.users.create("Jose Perez", "jose@example.com").await?;
        let conversation = self.conversations.insert_conversation(ana.id, jose.id).await?;
        Ok((conversation.id, ana.id, jose.id))
    }

    async fn insert_at(
        &self,
        conversation_id: i64,
        sender_id: i64,
        content: &str,
        offset_seconds: i64,
    ) -> TestResult<i64> {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let message = self
            .messages
            .insert(NewMessage {
                conversation_id,
                sender_id,
                content: content.to_string(),
                sent_at: base + Duration::seconds(offset_seconds),
            })
            .await?;
        Ok(message.id)
    }
}

#[tokio::test]
async fn insert_returns_unread_message_with_sender() -> TestResult {
    let ctx = TestContext::new().await?;
    let (conversation_id, ana, _) = ctx.seed_pair().await?;
    let sent_at = Utc::now();

    let message = ctx
        .messages
        .insert(NewMessage {
            conversation_id,
            sender_id: ana,
            content: "hola".into(),
            sent_at,
        })
        .await?;

    assert!(message.id > 0);
    assert!(!message.read);
    assert_eq!(message.sent_at, sent_at);
    let sender = message.sender.expect("sender should be joined");
    assert_eq!(sender.name, "Ana Torres");
    assert_eq!(sender.email, "ana@example.com");
    Ok(())
}

#[tokio::test]
async fn insert_rejects_unknown_conversation() -> TestResult {
    let ctx = TestContext::new().await?;
    let (_, ana, _) = ctx.seed_pair().await?;

    let result = ctx
        .messages
        .insert(NewMessage {
            conversation_id: 999,
            sender_id: ana,
            content: "lost".into(),
            sent_at: Utc::now(),
        })
        .await;

    assert!(result.is_err(), "foreign key should reject the row");
    Ok(())
}

#[tokio::test]
async fn find_recent_orders_newest_first_and_limits() -> TestResult {
    let ctx = TestContext::new().await?;
    let (conversation_id, ana, jose) = ctx.seed_pair().await?;

    for i in 0..25 {
        let sender = if i % 2 == 0 { ana } else { jose };
        ctx.insert_at(conversation_id, sender, &format!("m{i}"), i).await?;
    }

    let recent = ctx.messages.find_recent(conversation_id, 20).await?;
    assert_eq!(recent.len(), 20);
    assert_eq!(recent[0].content, "m24");
    assert!(recent.windows(2).all(|pair| pair[0].sent_at > pair[1].sent_at));
    Ok(())
}

#[tokio::test]
async fn find_page_uses_a_stable_order_for_equal_timestamps() -> TestResult {
    let ctx = TestContext::new().await?;
    let (conversation_id, ana, _) = ctx.seed_pair().await?;

    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(ctx.insert_at(conversation_id, ana, &format!("same-{i}"), 0).await?);
    }

    let first = ctx.messages.find_page(conversation_id, 0, 2).await?;
    let second = ctx.messages.find_page(conversation_id, 1, 2).await?;
    let third = ctx.messages.find_page(conversation_id, 2, 2).await?;

    let paged: Vec<i64> = first
        .iter()
        .chain(second.iter())
        .chain(third.iter())
        .map(|message| message.id)
        .collect();
    ids.reverse();
    assert_eq!(paged, ids);
    Ok(())
}

#[tokio::test]
async fn mark_read_only_touches_messages_from_the_other_participant() -> TestResult {
    let ctx = TestContext::new().await?;
    let (conversation_id, ana, jose) = ctx.seed_pair().await?;

    ctx.insert_at(conversation_id, ana, "from ana", 1).await?;
    ctx.insert_at(conversation_id, jose, "from jose", 2).await?;
    ctx.insert_at(conversation_id, jose, "again jose", 3).await?;

    assert_eq!(ctx.messages.count_unread_for_recipient(conversation_id, ana).await?, 2);
    let unread = ctx.messages.find_unread_for_recipient(conversation_id, ana).await?;
    assert_eq!(unread.len(), 2);
    assert_eq!(unread[0].content, "from jose");

    assert_eq!(ctx.messages.mark_read_for_recipient(conversation_id, ana).await?, 2);
    assert_eq!(ctx.messages.mark_read_for_recipient(conversation_id, ana).await?, 0);

    let all = ctx.messages.find_recent(conversation_id, 20).await?;
    for message in all {
        assert_eq!(message.read, message.sender_id == jose);
    }
    Ok(())
}

#[tokio::test]
async fn conversations_are_unique_per_unordered_pair() -> TestResult {
    let ctx = TestContext::new().await?;
    let (conversation_id, ana, jose) = ctx.seed_pair().await?;

    let found = ctx
        .conversations
        .find_by_participants(jose, ana)
        .await?
        .expect("conversation should exist");
    assert_eq!(found.id, conversation_id);
    assert!(found.user_one_id < found.user_two_id);

    let duplicate = ctx.conversations.insert_conversation(jose, ana).await;
    assert!(duplicate.is_err());

    let listed = ctx.conversations.list_for_user(jose).await?;
    assert_eq!(listed.len(), 1);
    Ok(())
}

#[tokio::test]
async fn user_directory_resolves_known_users_only() -> TestResult {
    let ctx = TestContext::new().await?;
    let luisa = ctx.users.ensure("Luisa Gomez", "luisa@example.com").await?;
    let again = ctx.users.ensure("Luisa Gomez", "luisa@example.com").await?;
    assert_eq!(luisa.id, again.id);

    assert_eq!(ctx.users.find_user(luisa.id).await?.map(|u| u.name), Some("Luisa Gomez".into()));
    assert!(ctx.users.find_user(luisa.id + 100).await?.is_none());

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&ctx.pool)
        .await?;
    assert_eq!(total, 1);
    Ok(())
}
