//! Conversation REST endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use courier_chats::{ConversationResponse, ConversationSummary, CreateConversationRequest};

use crate::error::ApiResult;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/api/conversations",
    tag = "Conversations",
    request_body = CreateConversationRequest,
    responses(
        (status = 200, description = "New or existing conversation for the pair", body = ConversationResponse),
        (status = 400, description = "Both ids are the same user", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown user", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_conversation(
    State(state): State<AppState>,
    body: Result<Json<CreateConversationRequest>, JsonRejection>,
) -> ApiResult<Json<ConversationResponse>> {
    let Json(request) = body?;
    let conversation = state
        .conversations
        .create_conversation(request.first_user_id, request.second_user_id)
        .await?;
    Ok(Json(ConversationResponse::from(&conversation)))
}

#[utoipa::path(
    get,
    path = "/api/conversations/{conversation_id}",
    tag = "Conversations",
    params(("conversation_id" = i64, Path, description = "Conversation ID")),
    responses(
        (status = 200, description = "Conversation", body = ConversationResponse),
        (status = 404, description = "Unknown conversation", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_conversation(
    State(state): State<AppState>,
    conversation_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<ConversationResponse>> {
    let Path(conversation_id) = conversation_id?;
    let conversation = state.conversations.get_conversation(conversation_id).await?;
    Ok(Json(ConversationResponse::from(&conversation)))
}

#[utoipa::path(
    get,
    path = "/api/conversations/user/{user_id}",
    tag = "Conversations",
    params(("user_id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Conversations the user takes part in", body = [ConversationResponse]),
        (status = 404, description = "Unknown user", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_user_conversations(
    State(state): State<AppState>,
    user_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<ConversationResponse>>> {
    let Path(user_id) = user_id?;
    let conversations = state.conversations.list_for_user(user_id).await?;
    Ok(Json(
        conversations
            .iter()
            .map(ConversationResponse::from)
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/conversations/summary/{user_id}",
    tag = "Conversations",
    params(("user_id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Conversation summaries, most recently active first", body = [ConversationSummary]),
        (status = 404, description = "Unknown user", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_conversation_summaries(
    State(state): State<AppState>,
    user_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<ConversationSummary>>> {
    let Path(user_id) = user_id?;
    Ok(Json(state.conversations.summaries_for_user(user_id).await?))
}
