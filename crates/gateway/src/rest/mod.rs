//! REST API endpoints for the gateway

pub mod conversations;
pub mod health;
pub mod messages;
pub mod metrics;
