use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::rest;

#[derive(OpenApi)]
#[openapi(
    paths(
        rest::health::health_check,
        rest::messages::send_message,
        rest::messages::list_recent_messages,
        rest::messages::list_messages_paged,
        rest::messages::mark_read,
        rest::conversations::create_conversation,
        rest::conversations::get_conversation,
        rest::conversations::list_user_conversations,
        rest::conversations::list_conversation_summaries,
    ),
    components(
        schemas(
            rest::health::HealthResponse,
            courier_chats::SendMessageRequest,
            courier_chats::MarkReadRequest,
            courier_chats::CreateConversationRequest,
            courier_chats::MessageResponse,
            courier_chats::MessageListEntry,
            courier_chats::SenderSummary,
            courier_chats::ConversationResponse,
            courier_chats::ConversationSummary,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Messages", description = "Sending, history and read tracking"),
        (name = "Conversations", description = "Two-party conversations"),
    )
)]
pub struct ApiDoc;
