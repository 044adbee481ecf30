use async_trait::async_trait;
use teloxide::{
    prelude::*,
    types::{KeyboardButton, KeyboardMarkup, MessageId, ParseMode},
};

use crate::utils::HandlerResult;

/// Text of the single reply-keyboard button offered after onboarding and
/// after every countdown reply.
pub(crate) const COUNTDOWN_BUTTON: &str = "Узнать время 🤫";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Format {
    Plain,
    MarkdownV2,
    Html,
}

/// A reply waiting to be delivered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Outgoing {
    pub chat_id: ChatId,
    pub text: String,
    pub format: Format,
    pub countdown_keyboard: bool,
    pub reply_to: Option<MessageId>,
}

impl Outgoing {
    pub(crate) fn new<T>(chat_id: ChatId, text: T) -> Self
    where
        T: Into<String>,
    {
        Self {
            chat_id,
            text: text.into(),
            format: Format::Plain,
            countdown_keyboard: false,
            reply_to: None,
        }
    }

    pub(crate) fn markdown(mut self) -> Self {
        self.format = Format::MarkdownV2;
        self
    }

    pub(crate) fn html(mut self) -> Self {
        self.format = Format::Html;
        self
    }

    pub(crate) fn with_countdown_keyboard(mut self) -> Self {
        self.countdown_keyboard = true;
        self
    }

    pub(crate) fn reply_to(mut self, message_id: MessageId) -> Self {
        self.reply_to = Some(message_id);
        self
    }
}

/// Outbound side of the transport. An `Err` is a transport failure; callers
/// log it and carry on.
#[async_trait]
pub(crate) trait Outbound: Send + Sync {
    async fn send(&self, message: Outgoing) -> HandlerResult;
}

pub(crate) struct BotOutbound {
    bot: Bot,
}

impl BotOutbound {
    pub(crate) fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn countdown_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(COUNTDOWN_BUTTON)]]).resize_keyboard(true)
}

#[async_trait]
impl Outbound for BotOutbound {
    async fn send(&self, message: Outgoing) -> HandlerResult {
        let mut request = self.bot.send_message(message.chat_id, message.text);

        match message.format {
            Format::Plain => {}
            Format::MarkdownV2 => request = request.parse_mode(ParseMode::MarkdownV2),
            Format::Html => request = request.parse_mode(ParseMode::Html),
        }
        if message.countdown_keyboard {
            request = request.reply_markup(countdown_keyboard());
        }
        if let Some(message_id) = message.reply_to {
            request = request.reply_to_message_id(message_id);
        }

        request.await?;
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_every_field() {
        let message = Outgoing::new(ChatId(7), "hi")
            .markdown()
            .with_countdown_keyboard()
            .reply_to(MessageId(3));

        assert_eq!(message.chat_id, ChatId(7));
        assert_eq!(message.text, "hi");
        assert_eq!(message.format, Format::MarkdownV2);
        assert!(message.countdown_keyboard);
        assert_eq!(message.reply_to, Some(MessageId(3)));
    }

    #[test]
    fn keyboard_has_single_countdown_button() {
        let keyboard = countdown_keyboard();
        assert_eq!(keyboard.keyboard.len(), 1);
        assert_eq!(keyboard.keyboard[0].len(), 1);
        assert_eq!(keyboard.keyboard[0][0].text, COUNTDOWN_BUTTON);
    }
}
