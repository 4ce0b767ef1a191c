//! Telegram adapter (teloxide).
//!
//! This crate implements the `hwb-core` MessagingPort over the Telegram Bot API.

use async_trait::async_trait;

use teloxide::{prelude::*, types::Recipient};

use hwb_core::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::port::MessagingPort,
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub fn from_token(token: &str) -> Self {
        Self::new(Bot::new(token))
    }

    fn recipient(chat_id: &ChatId) -> Recipient {
        match chat_id.as_numeric() {
            Some(id) => Recipient::Id(teloxide::types::ChatId(id)),
            None => Recipient::ChannelUsername(chat_id.0.trim().to_string()),
        }
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::Notify(format!("telegram error: {e}"))
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_text(&self, chat_id: &ChatId, text: &str) -> Result<MessageRef> {
        // Plain text: homework names may contain markup characters.
        let msg = self
            .bot
            .send_message(Self::recipient(chat_id), text.to_string())
            .await
            .map_err(Self::map_err)?;

        Ok(MessageRef {
            chat_id: chat_id.clone(),
            message_id: MessageId(msg.id.0),
        })
    }
}
