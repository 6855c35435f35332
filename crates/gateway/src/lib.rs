//! # Courier Gateway Crate
//!
//! The delivery surface of Courier: HTTP endpoints, the WebSocket pub/sub
//! transport, and the broker that fans payloads out to conversation topics.
//!
//! ## Architecture
//!
//! - **REST**: message and conversation endpoints with OpenAPI documentation
//! - **WebSocket**: topic subscriptions and inbound destinations over JSON frames
//! - **Delivery**: both ingress paths persist through the message service and
//!   publish through a [`broker::BrokerClient`]
//! - **Metrics**: delivery and ingress failure counters
//!
//! ## Usage
//!
//! ```ignore
//! use courier_gateway::{broker, build_router, AppState};
//!
//! let broker = broker::connect(&config.broker).await;
//! let state = AppState::from_pool(pool, broker, &config)?;
//! let app = build_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod broker;
pub mod delivery;
pub mod docs;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod rest;
pub mod state;
pub mod topics;
pub mod websocket;

pub use broker::{BrokerClient, BrokerMessage, DeliveryError, InMemoryBroker, RedisBroker};
pub use delivery::{DeliveryGateway, InboundError};
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use metrics::{DeliveryMetrics, DeliveryPath};
pub use state::AppState;
pub use topics::{ConversationTopic, InboundDestination, TopicKind};

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Json, Router,
};
use utoipa::OpenApi;

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let cors = middleware::cors_layer(&state.cors);

    Router::new()
        .route("/health", get(rest::health::health_check))
        .route("/metrics", get(rest::metrics::render_metrics))
        .route("/api-docs/openapi.json", get(openapi_json))
        // Messages
        .route("/api/messages", post(rest::messages::send_message))
        .route("/api/messages/read", put(rest::messages::mark_read))
        .route(
            "/api/messages/conversation/:conversation_id",
            get(rest::messages::list_recent_messages),
        )
        .route(
            "/api/messages/conversation/:conversation_id/paginated",
            get(rest::messages::list_messages_paged),
        )
        // Conversations
        .route(
            "/api/conversations",
            post(rest::conversations::create_conversation),
        )
        .route(
            "/api/conversations/:conversation_id",
            get(rest::conversations::get_conversation),
        )
        .route(
            "/api/conversations/user/:user_id",
            get(rest::conversations::list_user_conversations),
        )
        .route(
            "/api/conversations/summary/:user_id",
            get(rest::conversations::list_conversation_summaries),
        )
        // Pub/sub transport
        .route("/ws", get(websocket::ws_handler))
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(docs::ApiDoc::openapi())
}
