//! Message REST endpoints

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use courier_chats::{MarkReadRequest, MessageListEntry, MessageResponse, SendMessageRequest};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::ApiResult;
use crate::metrics::DeliveryPath;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Zero-based page index.
    pub page: Option<u32>,
    /// Page size; defaults to the configured page size.
    pub size: Option<u32>,
}

#[utoipa::path(
    post,
    path = "/api/messages",
    tag = "Messages",
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Message stored and published", body = MessageResponse),
        (status = 400, description = "Invalid message", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown conversation or sender", body = crate::error::ErrorResponse)
    )
)]
pub async fn send_message(
    State(state): State<AppState>,
    body: Result<Json<SendMessageRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(request) = body?;
    let message = state.delivery.send_and_broadcast(request).await?;
    Ok(Json(MessageResponse::from(&message)))
}

#[utoipa::path(
    get,
    path = "/api/messages/conversation/{conversation_id}",
    tag = "Messages",
    params(("conversation_id" = i64, Path, description = "Conversation ID")),
    responses(
        (status = 200, description = "Most recent messages, newest first", body = [MessageListEntry]),
        (status = 404, description = "Unknown conversation", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_recent_messages(
    State(state): State<AppState>,
    conversation_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<MessageListEntry>>> {
    let Path(conversation_id) = conversation_id?;
    let messages = state.messages.list_recent_messages(conversation_id).await?;
    Ok(Json(messages.iter().map(MessageListEntry::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/messages/conversation/{conversation_id}/paginated",
    tag = "Messages",
    params(
        ("conversation_id" = i64, Path, description = "Conversation ID"),
        PageQuery
    ),
    responses(
        (status = 200, description = "One page of messages, newest first", body = [MessageListEntry]),
        (status = 400, description = "Invalid page size", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown conversation", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_messages_paged(
    State(state): State<AppState>,
    conversation_id: Result<Path<i64>, PathRejection>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<MessageListEntry>>> {
    let Path(conversation_id) = conversation_id?;
    let Query(query) = query?;

    let page = query.page.unwrap_or(0);
    let size = query
        .size
        .unwrap_or(state.messages.limits().default_page_size);

    let messages = state
        .messages
        .list_messages_paged(conversation_id, page, size)
        .await?;
    Ok(Json(messages.iter().map(MessageListEntry::from).collect()))
}

#[utoipa::path(
    put,
    path = "/api/messages/read",
    tag = "Messages",
    request_body = MarkReadRequest,
    responses(
        (status = 200, description = "Messages from other participants marked read"),
        (status = 404, description = "Unknown conversation or user", body = crate::error::ErrorResponse)
    )
)]
pub async fn mark_read(
    State(state): State<AppState>,
    body: Result<Json<MarkReadRequest>, JsonRejection>,
) -> ApiResult<()> {
    let Json(request) = body?;
    state
        .delivery
        .mark_read_and_notify(request, DeliveryPath::Http)
        .await?;
    Ok(())
}
