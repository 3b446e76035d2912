//! Telegram channel: long-polls the Bot API for updates.
//!
//! Text messages, inline-keyboard button presses (`callback_query`) and the
//! "bot added to private chat" membership update are turned into
//! [`IncomingMessage`]s. Responses go out as `sendMessage` or, when an image
//! is attached, as a multipart `sendPhoto` with the text as caption.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::channels::{
    Channel, IncomingMessage, Keyboard, MessagePayload, MessageStream, OutgoingResponse,
};
use crate::error::ChannelError;

/// Telegram rejects photo captions longer than this.
const TELEGRAM_MAX_CAPTION_LENGTH: usize = 1024;

/// Delay before polling again after a failed `getUpdates`.
const POLL_BACKOFF: Duration = Duration::from_secs(5);

/// Commands shown in the bot's menu.
const BOT_COMMANDS: &[(&str, &str)] = &[("start", "Почнемо")];

/// Telegram channel: connects to the Bot API via long-polling.
pub struct TelegramChannel {
    bot_token: SecretString,
    allowed_users: Vec<String>,
    poll_timeout_secs: u64,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(
        bot_token: SecretString,
        allowed_users: Vec<String>,
        poll_timeout_secs: u64,
    ) -> Self {
        Self {
            bot_token,
            allowed_users,
            poll_timeout_secs,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        api_url(&self.bot_token, method)
    }

    /// Check if a username is in the allowed list.
    pub fn is_user_allowed(&self, username: &str) -> bool {
        check_user_allowed(&self.allowed_users, [username])
    }

    /// POST a JSON body and map any non-2xx status into a send failure.
    async fn call(&self, method: &str, body: &Value) -> Result<(), ChannelError> {
        let resp = self
            .client
            .post(self.api_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| send_failed(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let err = resp.text().await.unwrap_or_default();
            return Err(send_failed(format!("{method} returned {status}: {err}")));
        }
        Ok(())
    }

    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), ChannelError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(kb) = keyboard {
            body["reply_markup"] = reply_markup(kb);
        }
        self.call("sendMessage", &body).await
    }

    /// Upload a photo from disk with an optional caption and keyboard.
    async fn send_photo(
        &self,
        chat_id: &str,
        path: &std::path::Path,
        caption: Option<&str>,
        keyboard: Option<&Keyboard>,
    ) -> anyhow::Result<()> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("photo.jpg");

        let file_bytes = tokio::fs::read(path).await?;
        let part = Part::bytes(file_bytes).file_name(file_name.to_string());

        let mut form = Form::new()
            .text("chat_id", chat_id.to_string())
            .part("photo", part);

        if let Some(cap) = caption {
            form = form.text("caption", cap.to_string());
        }
        if let Some(kb) = keyboard {
            form = form.text("reply_markup", reply_markup(kb).to_string());
        }

        let resp = self
            .client
            .post(self.api_url("sendPhoto"))
            .multipart(form)
            .send()
            .await?;

        if !resp.status().is_success() {
            let err = resp.text().await?;
            anyhow::bail!("Telegram sendPhoto failed: {err}");
        }

        tracing::debug!("Telegram photo sent to {chat_id}: {file_name}");
        Ok(())
    }

    /// Register the bot's command menu.
    pub async fn set_my_commands(&self) -> Result<(), ChannelError> {
        let commands: Vec<Value> = BOT_COMMANDS
            .iter()
            .map(|(command, description)| {
                serde_json::json!({ "command": command, "description": description })
            })
            .collect();
        self.call("setMyCommands", &serde_json::json!({ "commands": commands }))
            .await
    }
}

// ── Channel trait implementation ────────────────────────────────────

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        if let Err(e) = self.set_my_commands().await {
            tracing::warn!("Telegram setMyCommands failed: {e}");
        }

        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let url = self.api_url("getUpdates");
        let allowed_users = self.allowed_users.clone();
        let client = self.client.clone();
        let poll_timeout = self.poll_timeout_secs;

        tokio::spawn(async move {
            let mut offset: i64 = 0;

            tracing::info!("Telegram channel listening for updates...");

            loop {
                let body = serde_json::json!({
                    "offset": offset,
                    "timeout": poll_timeout,
                    "allowed_updates": ["message", "callback_query", "my_chat_member"]
                });

                let resp = match client.post(&url).json(&body).send().await {
                    Ok(r) => r,
                    Err(e) => {
                        tracing::warn!("Telegram poll error: {e}");
                        tokio::time::sleep(POLL_BACKOFF).await;
                        continue;
                    }
                };

                let data: Value = match resp.json().await {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!("Telegram parse error: {e}");
                        tokio::time::sleep(POLL_BACKOFF).await;
                        continue;
                    }
                };

                let Some(results) = data.get("result").and_then(Value::as_array) else {
                    tracing::warn!("Telegram getUpdates returned no result: {data}");
                    tokio::time::sleep(POLL_BACKOFF).await;
                    continue;
                };

                for update in results {
                    if let Some(uid) = update.get("update_id").and_then(Value::as_i64) {
                        offset = uid + 1;
                    }

                    let Some(incoming) = parse_update(update, &allowed_users) else {
                        continue;
                    };

                    if tx.send(incoming).is_err() {
                        tracing::info!("Telegram listener channel closed");
                        return;
                    }
                }
            }
        });

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        let chat_id = msg
            .metadata
            .get("chat_id")
            .and_then(Value::as_str)
            .ok_or_else(|| send_failed("No chat_id in message metadata".into()))?;

        let keyboard = response.keyboard.as_ref();

        if let Some(image) = &response.image {
            let caption = (!response.content.is_empty()
                && response.content.chars().count() <= TELEGRAM_MAX_CAPTION_LENGTH)
                .then_some(response.content.as_str());

            let photo_keyboard = if caption.is_some() || response.content.is_empty() {
                keyboard
            } else {
                None
            };
            match self
                .send_photo(chat_id, &image.path, caption, photo_keyboard)
                .await
            {
                Ok(()) if caption.is_some() || response.content.is_empty() => return Ok(()),
                Ok(()) => {}
                Err(e) => {
                    tracing::warn!(
                        image = %image.key,
                        "Telegram photo failed, sending text only: {e}"
                    );
                }
            }
        }

        if response.content.is_empty() {
            return Ok(());
        }
        self.send_message(chat_id, &response.content, keyboard).await
    }

    async fn acknowledge(&self, msg: &IncomingMessage) -> Result<(), ChannelError> {
        let Some(callback_id) = msg.metadata.get("callback_query_id").and_then(Value::as_str)
        else {
            return Ok(());
        };
        self.call(
            "answerCallbackQuery",
            &serde_json::json!({ "callback_query_id": callback_id }),
        )
        .await
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        let resp = self
            .client
            .get(self.api_url("getMe"))
            .send()
            .await
            .map_err(|e| ChannelError::StartupFailed {
                name: "telegram".into(),
                reason: e.to_string(),
            })?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ChannelError::StartupFailed {
                name: "telegram".into(),
                reason: format!("getMe returned {}", resp.status()),
            })
        }
    }

    async fn shutdown(&self) -> Result<(), ChannelError> {
        tracing::info!("Telegram channel shutting down");
        Ok(())
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn api_url(token: &SecretString, method: &str) -> String {
    format!("https://api.telegram.org/bot{}/{method}", token.expose_secret())
}

fn send_failed(reason: String) -> ChannelError {
    ChannelError::SendFailed {
        name: "telegram".into(),
        reason,
    }
}

/// Check if any identity in the iterator matches the allowed users list.
fn check_user_allowed<'a>(
    allowed_users: &[String],
    identities: impl IntoIterator<Item = &'a str>,
) -> bool {
    let ids: Vec<&str> = identities.into_iter().collect();
    allowed_users
        .iter()
        .any(|u| u == "*" || ids.contains(&u.as_str()))
}

/// Inline keyboard markup for a [`Keyboard`].
fn reply_markup(keyboard: &Keyboard) -> Value {
    let rows: Vec<Vec<Value>> = keyboard
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|b| serde_json::json!({ "text": b.label, "callback_data": b.action }))
                .collect()
        })
        .collect();
    serde_json::json!({ "inline_keyboard": rows })
}

/// Turn one `getUpdates` entry into an [`IncomingMessage`].
///
/// Returns `None` for update kinds the bot does not handle and for senders
/// outside the allow-list.
fn parse_update(update: &Value, allowed_users: &[String]) -> Option<IncomingMessage> {
    let (from, chat, payload, callback_id) = if let Some(message) = update.get("message") {
        let text = message.get("text").and_then(Value::as_str)?;
        (
            message.get("from")?,
            message.get("chat")?,
            MessagePayload::Text(text.to_string()),
            None,
        )
    } else if let Some(query) = update.get("callback_query") {
        let data = query.get("data").and_then(Value::as_str)?;
        (
            query.get("from")?,
            query.get("message")?.get("chat")?,
            MessagePayload::Action(data.to_string()),
            query.get("id").and_then(Value::as_str),
        )
    } else if let Some(member) = update.get("my_chat_member") {
        let chat = member.get("chat")?;
        let is_private = chat.get("type").and_then(Value::as_str) == Some("private");
        let status = member
            .get("new_chat_member")
            .and_then(|m| m.get("status"))
            .and_then(Value::as_str);
        if !is_private || status != Some("member") {
            return None;
        }
        (member.get("from")?, chat, MessagePayload::ChatOpened, None)
    } else {
        return None;
    };

    let username = from
        .get("username")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let user_id = from.get("id").and_then(Value::as_i64).map(|id| id.to_string());

    let mut identities = vec![username];
    if let Some(ref id) = user_id {
        identities.push(id.as_str());
    }
    if !check_user_allowed(allowed_users, identities) {
        tracing::warn!(
            "Telegram: ignoring update from unauthorized user: username={username}, user_id={}",
            user_id.as_deref().unwrap_or("unknown")
        );
        return None;
    }

    let chat_id = chat.get("id").and_then(Value::as_i64)?.to_string();

    let mut metadata = serde_json::json!({
        "chat_id": chat_id,
        "username": username,
    });
    if let Some(id) = callback_id {
        metadata["callback_query_id"] = Value::String(id.to_string());
    }

    let display_name = from
        .get("first_name")
        .and_then(Value::as_str)
        .unwrap_or(username);

    Some(
        IncomingMessage::new("telegram", user_id.as_deref().unwrap_or(username), payload)
            .with_conversation(&chat_id)
            .with_user_name(display_name)
            .with_metadata(metadata),
    )
}

// ── Tests ───────────────────────────────────────────────────────────
