use chrono::{DateTime, Utc};
use teloxide::types::{ChatId, Message, MessageId};

/// A row of the `users` table.
#[derive(Clone, Debug, PartialEq, Eq, sqlx::FromRow)]
pub(crate) struct User {
    pub id: i64,
    pub username: String,
    pub count: i64,
}

#[cfg(test)]
impl User {
    pub(crate) fn new(id: i64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            count: 0,
        }
    }
}

/// The parts of an inbound text message the bot cares about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Incoming {
    pub chat_id: ChatId,
    pub message_id: MessageId,
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl Incoming {
    /// Returns `None` for messages without a sender. Messages without text
    /// (stickers, photos, voice) get an empty text.
    pub(crate) fn from_message(msg: Message) -> Option<Self> {
        let from = msg.from()?;
        let text = msg.text().unwrap_or_default();

        Some(Self {
            chat_id: msg.chat.id,
            message_id: msg.id,
            user_id: i64::try_from(from.id.0).ok()?,
            username: from.username.clone(),
            first_name: from.first_name.clone(),
            last_name: from.last_name.clone(),
            text: text.to_owned(),
            sent_at: msg.date,
        })
    }

    /// The handle stored for this user; empty when the account has none.
    pub(crate) fn handle(&self) -> &str {
        self.username.as_deref().unwrap_or_default()
    }

    pub(crate) fn full_name(&self) -> String {
        match &self.last_name {
            Some(last_name) => format!("{} {}", self.first_name, last_name),
            None => self.first_name.clone(),
        }
    }
}

#[cfg(test)]
impl Incoming {
    /// A private-chat message from `user_id`.
    pub(crate) fn text_from(user_id: i64, text: &str) -> Self {
        Self {
            chat_id: ChatId(user_id),
            message_id: MessageId(1),
            user_id,
            username: Some(format!("user{user_id}")),
            first_name: "Test".to_owned(),
            last_name: None,
            text: text.to_owned(),
            sent_at: DateTime::<Utc>::from_timestamp(1_773_000_000, 0).unwrap(),
        }
    }
}
