//! WebSocket transport for the pub/sub side of the gateway.
//!
//! A connection can subscribe to conversation topics and send frames to the
//! inbound destinations. Each connection owns one writer task fed by an mpsc
//! channel and one forwarder task per subscribed topic.

pub mod frames;

use std::collections::HashMap;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub use frames::{ClientFrame, ServerFrame};

use crate::state::AppState;
use crate::topics::ConversationTopic;

const OUTBOUND_BUFFER: usize = 64;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<ServerFrame>(OUTBOUND_BUFFER);

    let writer = tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            let text = match serde_json::to_string(&frame) {
                Ok(text) => text,
                Err(error) => {
                    warn!(%error, "failed to encode server frame");
                    continue;
                }
            };
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    let mut session = Session {
        state,
        out_tx,
        subscriptions: HashMap::new(),
    };

    info!("websocket connected");
    session.reply(ServerFrame::Connected).await;

    while let Some(message) = stream.next().await {
        let message = match message {
            Ok(message) => message,
            Err(error) => {
                debug!(%error, "websocket read failed");
                break;
            }
        };

        match message {
            Message::Text(text) => session.handle_text(&text).await,
            Message::Close(_) => break,
            _ => {}
        }
    }

    session.close();
    writer.abort();
    info!("websocket disconnected");
}

struct Session {
    state: AppState,
    out_tx: mpsc::Sender<ServerFrame>,
    subscriptions: HashMap<String, JoinHandle<()>>,
}

impl Session {
    async fn reply(&self, frame: ServerFrame) {
        let _ = self.out_tx.send(frame).await;
    }

    async fn error(&self, message: impl Into<String>) {
        self.reply(ServerFrame::Error {
            message: message.into(),
        })
        .await;
    }

    async fn handle_text(&mut self, text: &str) {
        let frame = match serde_json::from_str::<ClientFrame>(text) {
            Ok(frame) => frame,
            Err(error) => {
                debug!(%error, "unparseable client frame");
                self.error(format!("invalid frame: {error}")).await;
                return;
            }
        };

        match frame {
            ClientFrame::Ping => self.reply(ServerFrame::Pong).await,
            ClientFrame::Subscribe { topic } => self.subscribe(topic).await,
            ClientFrame::Unsubscribe { topic } => self.unsubscribe(topic).await,
            ClientFrame::Send { destination, body } => {
                if let Err(error) = self.state.delivery.dispatch(&destination, body).await {
                    self.error(error.to_string()).await;
                }
            }
        }
    }

    async fn subscribe(&mut self, topic: String) {
        if topic.parse::<ConversationTopic>().is_err() {
            self.error(format!("cannot subscribe to {topic}")).await;
            return;
        }

        if self.subscriptions.contains_key(&topic) {
            self.reply(ServerFrame::Subscribed { topic }).await;
            return;
        }

        let mut receiver = match self.state.broker.subscribe(&topic).await {
            Ok(receiver) => receiver,
            Err(error) => {
                warn!(%topic, %error, "subscription failed");
                self.error(format!("subscription to {topic} failed")).await;
                return;
            }
        };

        let out_tx = self.out_tx.clone();
        let forwarded = topic.clone();
        let forwarder = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(message) => {
                        let body = serde_json::from_str(&message.payload)
                            .unwrap_or(Value::String(message.payload));
                        let frame = ServerFrame::Message {
                            topic: message.topic,
                            body,
                        };
                        if out_tx.send(frame).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(topic = %forwarded, skipped, "subscriber lagged, payloads dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        debug!(%topic, "subscribed");
        self.subscriptions.insert(topic.clone(), forwarder);
        self.reply(ServerFrame::Subscribed { topic }).await;
    }

    async fn unsubscribe(&mut self, topic: String) {
        if let Some(forwarder) = self.subscriptions.remove(&topic) {
            forwarder.abort();
            debug!(%topic, "unsubscribed");
        }
        self.reply(ServerFrame::Unsubscribed { topic }).await;
    }

    fn close(&mut self) {
        for (_, forwarder) in self.subscriptions.drain() {
            forwarder.abort();
        }
    }
}
