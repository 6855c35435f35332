use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Frames received from WebSocket clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Subscribe {
        topic: String,
    },
    Unsubscribe {
        topic: String,
    },
    /// Hand a body to an inbound destination such as `app.sendMessage`.
    Send {
        destination: String,
        #[serde(default)]
        body: Value,
    },
    Ping,
}

/// Frames sent to WebSocket clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    Connected,
    Subscribed { topic: String },
    Unsubscribed { topic: String },
    Message { topic: String, body: Value },
    Pong,
    Error { message: String },
}
