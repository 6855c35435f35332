//! Topic names and the inbound destination routing table.
//!
//! Outbound topics:
//! - `topic.conversation.{id}` new messages
//! - `topic.conversation.{id}.typing` typing notifications
//! - `topic.conversation.{id}.read` read receipts
//!
//! Inbound destinations: `app.sendMessage`, `app.typing`, `app.markRead`.

use std::fmt;
use std::str::FromStr;

const CONVERSATION_PREFIX: &str = "topic.conversation.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TopicKind {
    Messages,
    Typing,
    ReadReceipts,
}

impl TopicKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Messages => "messages",
            Self::Typing => "typing",
            Self::ReadReceipts => "read",
        }
    }
}

/// A parsed outbound conversation topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConversationTopic {
    pub conversation_id: i64,
    pub kind: TopicKind,
}

impl ConversationTopic {
    pub fn messages(conversation_id: i64) -> Self {
        Self {
            conversation_id,
            kind: TopicKind::Messages,
        }
    }

    pub fn typing(conversation_id: i64) -> Self {
        Self {
            conversation_id,
            kind: TopicKind::Typing,
        }
    }

    pub fn read_receipts(conversation_id: i64) -> Self {
        Self {
            conversation_id,
            kind: TopicKind::ReadReceipts,
        }
    }
}

impl fmt::Display for ConversationTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TopicKind::Messages => write!(f, "{CONVERSATION_PREFIX}{}", self.conversation_id),
            TopicKind::Typing => write!(f, "{CONVERSATION_PREFIX}{}.typing", self.conversation_id),
            TopicKind::ReadReceipts => {
                write!(f, "{CONVERSATION_PREFIX}{}.read", self.conversation_id)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTopic(pub String);

impl fmt::Display for UnknownTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown topic: {}", self.0)
    }
}

impl std::error::Error for UnknownTopic {}

impl FromStr for ConversationTopic {
    type Err = UnknownTopic;

    fn from_str(topic: &str) -> Result<Self, Self::Err> {
        let unknown = || UnknownTopic(topic.to_string());
        let rest = topic.strip_prefix(CONVERSATION_PREFIX).ok_or_else(unknown)?;

        let (id, kind) = match rest.split_once('.') {
            None => (rest, TopicKind::Messages),
            Some((id, "typing")) => (id, TopicKind::Typing),
            Some((id, "read")) => (id, TopicKind::ReadReceipts),
            Some(_) => return Err(unknown()),
        };

        let conversation_id = id.parse::<i64>().map_err(|_| unknown())?;
        // Only the canonical rendering matches what publishers emit.
        if conversation_id.to_string() != id {
            return Err(unknown());
        }
        Ok(Self {
            conversation_id,
            kind,
        })
    }
}

/// Where a client-originated pub/sub frame should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InboundDestination {
    SendMessage,
    Typing,
    MarkRead,
}

impl InboundDestination {
    pub const ALL: [InboundDestination; 3] = [Self::SendMessage, Self::Typing, Self::MarkRead];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SendMessage => "app.sendMessage",
            Self::Typing => "app.typing",
            Self::MarkRead => "app.markRead",
        }
    }
}

impl fmt::Display for InboundDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InboundDestination {
    type Err = UnknownTopic;

    fn from_str(destination: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == destination)
            .ok_or_else(|| UnknownTopic(destination.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topics_render_expected_names() {
        assert_eq!(ConversationTopic::messages(1).to_string(), "topic.conversation.1");
        assert_eq!(
            ConversationTopic::typing(1).to_string(),
            "topic.conversation.1.typing"
        );
        assert_eq!(
            ConversationTopic::read_receipts(42).to_string(),
            "topic.conversation.42.read"
        );
    }

    #[test]
    fn topics_parse_back() {
        for topic in [
            ConversationTopic::messages(7),
            ConversationTopic::typing(7),
            ConversationTopic::read_receipts(7),
        ] {
            assert_eq!(topic.to_string().parse::<ConversationTopic>(), Ok(topic));
        }
    }

    #[test]
    fn foreign_topics_are_rejected() {
        for topic in [
            "topic.conversation.",
            "topic.conversation.abc",
            "topic.conversation.1.deleted",
            "topic.conversation.+1",
            "topic.conversation.01",
            "topic.conversation.01.typing",
            "topic.conversation.-0",
            "topic.users.1",
            "/topic/conversacion/1",
        ] {
            assert!(topic.parse::<ConversationTopic>().is_err(), "{topic}");
        }
    }

    #[test]
    fn destinations_route_by_exact_name() {
        assert_eq!(
            "app.sendMessage".parse::<InboundDestination>(),
            Ok(InboundDestination::SendMessage)
        );
        assert_eq!("app.typing".parse::<InboundDestination>(), Ok(InboundDestination::Typing));
        assert_eq!("app.markRead".parse::<InboundDestination>(), Ok(InboundDestination::MarkRead));
        assert!("app.sendmessage".parse::<InboundDestination>().is_err());
    }
}
