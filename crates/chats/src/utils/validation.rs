//! Validation utilities.

use crate::types::{ChatError, ChatResult};

pub struct Validator;

impl Validator {
    /// Reject blank content and content longer than `max_chars` characters.
    pub fn message_content(content: &str, max_chars: usize) -> ChatResult<()> {
        if content.trim().is_empty() {
            return Err(ChatError::validation("Message content cannot be empty"));
        }

        let length = content.chars().count();
        if length > max_chars {
            return Err(ChatError::validation(format!(
                "Message content too long ({length} characters, max {max_chars})"
            )));
        }

        Ok(())
    }

    pub fn page_size(size: u32, max: u32) -> ChatResult<()> {
        if size == 0 || size > max {
            return Err(ChatError::validation(format!(
                "Page size must be between 1 and {max}"
            )));
        }
        Ok(())
    }

    pub fn distinct_participants(first: i64, second: i64) -> ChatResult<()> {
        if first == second {
            return Err(ChatError::validation(
                "A conversation needs two different participants",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_content_is_rejected() {
        assert!(Validator::message_content("", 10).is_err());
        assert!(Validator::message_content("  \n\t", 10).is_err());
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        assert!(Validator::message_content("ñandú", 5).is_ok());
        assert!(Validator::message_content("ñandús", 5).is_err());
    }

    #[test]
    fn page_size_bounds() {
        assert!(Validator::page_size(0, 100).is_err());
        assert!(Validator::page_size(1, 100).is_ok());
        assert!(Validator::page_size(100, 100).is_ok());
        assert!(Validator::page_size(101, 100).is_err());
    }

    #[test]
    fn participants_must_differ() {
        assert!(Validator::distinct_participants(1, 1).is_err());
        assert!(Validator::distinct_participants(1, 2).is_ok());
    }
}
