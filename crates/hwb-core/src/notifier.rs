use crate::{domain::ChatId, messaging::port::MessagingPort};

/// Send one notification, swallowing delivery failures.
///
/// Returns whether the messenger accepted the message. A failed send is logged
/// and dropped; it is not retried.
pub async fn send_message(messenger: &dyn MessagingPort, chat_id: &ChatId, text: &str) -> bool {
    match messenger.send_text(chat_id, text).await {
        Ok(sent) => {
            tracing::debug!(
                "Message sent to chat {} (message id {})",
                sent.chat_id,
                sent.message_id.0
            );
            true
        }
        Err(e) => {
            tracing::error!("Failed to send message to chat {chat_id}: {e}");
            false
        }
    }
}
