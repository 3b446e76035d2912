//! Channel trait and the message types that cross it.

use std::path::PathBuf;
use std::pin::Pin;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::Stream;
use uuid::Uuid;

use crate::error::ChannelError;

/// Stream of inbound messages produced by a channel.
pub type MessageStream = Pin<Box<dyn Stream<Item = IncomingMessage> + Send>>;

/// What the user did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePayload {
    /// A typed message.
    Text(String),
    /// A button press carrying its payload string.
    Action(String),
    /// The user opened a private chat with the bot.
    ChatOpened,
}

/// A message received from a channel.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub id: Uuid,
    /// Channel name, e.g. `"telegram"`.
    pub channel: String,
    pub user_id: String,
    pub user_name: Option<String>,
    /// Conversation within the channel (Telegram chat id, CLI user).
    pub conversation_id: String,
    pub payload: MessagePayload,
    /// Channel-specific data needed to reply (chat id, callback id, ...).
    pub metadata: serde_json::Value,
    pub received_at: DateTime<Utc>,
}

impl IncomingMessage {
    pub fn new(channel: &str, user_id: &str, payload: MessagePayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel: channel.to_string(),
            user_id: user_id.to_string(),
            user_name: None,
            conversation_id: user_id.to_string(),
            payload,
            metadata: serde_json::json!({}),
            received_at: Utc::now(),
        }
    }

    pub fn with_conversation(mut self, conversation_id: &str) -> Self {
        self.conversation_id = conversation_id.to_string();
        self
    }

    pub fn with_user_name(mut self, name: &str) -> Self {
        self.user_name = Some(name.to_string());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Wizard session key: one session per conversation per channel.
    pub fn session_id(&self) -> String {
        format!("{}:{}", self.channel, self.conversation_id)
    }
}

/// A selectable option rendered under a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    /// Payload delivered back as [`MessagePayload::Action`].
    pub action: String,
}

impl Button {
    pub fn new(label: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: action.into(),
        }
    }
}

/// Rows of buttons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(mut self, buttons: Vec<Button>) -> Self {
        if !buttons.is_empty() {
            self.rows.push(buttons);
        }
        self
    }

    /// Lay `buttons` out `per_row` at a time.
    pub fn grid(mut self, buttons: Vec<Button>, per_row: usize) -> Self {
        let per_row = per_row.max(1);
        let mut buttons = buttons.into_iter().peekable();
        while buttons.peek().is_some() {
            self.rows.push(buttons.by_ref().take(per_row).collect());
        }
        self
    }

    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// An image attached to a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Logical name, e.g. `"goal"`.
    pub key: String,
    pub path: PathBuf,
}

/// A response to send back to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingResponse {
    pub content: String,
    pub image: Option<Image>,
    pub keyboard: Option<Keyboard>,
}

impl OutgoingResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_image(mut self, image: Option<Image>) -> Self {
        self.image = image;
        self
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = (!keyboard.is_empty()).then_some(keyboard);
        self
    }
}

/// A bidirectional chat transport.
#[async_trait]
pub trait Channel: Send + Sync {
    fn name(&self) -> &str;

    /// Start receiving messages.
    async fn start(&self) -> Result<MessageStream, ChannelError>;

    /// Send a response in reply to `msg`.
    async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError>;

    /// Confirm receipt of a button press. Most channels have nothing to do.
    async fn acknowledge(&self, _msg: &IncomingMessage) -> Result<(), ChannelError> {
        Ok(())
    }

    async fn health_check(&self) -> Result<(), ChannelError>;

    async fn shutdown(&self) -> Result<(), ChannelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_combines_channel_and_conversation() {
        let msg = IncomingMessage::new("telegram", "777", MessagePayload::Text("hi".into()))
            .with_conversation("-100200");
        assert_eq!(msg.session_id(), "telegram:-100200");

        let msg = IncomingMessage::new("cli", "local-user", MessagePayload::ChatOpened);
        assert_eq!(msg.session_id(), "cli:local-user");
    }

    #[test]
    fn grid_splits_rows() {
        let buttons = (0..5)
            .map(|i| Button::new(format!("b{i}"), format!("a{i}")))
            .collect();
        let kb = Keyboard::new().grid(buttons, 2);
        let sizes: Vec<usize> = kb.rows.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
        assert_eq!(kb.buttons().count(), 5);
    }

    #[test]
    fn empty_rows_are_skipped() {
        let kb = Keyboard::new().row(vec![]).grid(vec![], 3);
        assert!(kb.is_empty());
        let resp = OutgoingResponse::text("x").with_keyboard(kb);
        assert!(resp.keyboard.is_none());
    }
}
