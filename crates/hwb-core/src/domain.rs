use std::fmt;

/// Telegram chat identifier as configured.
///
/// Kept opaque: a numeric id addresses a chat, anything else (`@channel`) is a
/// public username. The adapter decides how to send it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub String);

impl ChatId {
    /// Numeric form of the id, if it has one.
    pub fn as_numeric(&self) -> Option<i64> {
        self.0.trim().parse::<i64>().ok()
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a sent message.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}
