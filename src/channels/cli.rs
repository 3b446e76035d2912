//! CLI channel: stdin/stdout REPL for local testing.
//!
//! Plain lines are sent as text. A line starting with `#` presses the button
//! with that payload, e.g. `#goal_loss`.

use async_trait::async_trait;
use futures::stream;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::channels::{Channel, IncomingMessage, MessagePayload, MessageStream, OutgoingResponse};
use crate::error::ChannelError;

const CLI_USER: &str = "local-user";

/// A simple CLI channel that reads from stdin and writes to stdout.
#[derive(Default)]
pub struct CliChannel;

impl CliChannel {
    pub fn new() -> Self {
        Self
    }
}

/// Map one input line to a payload. Blank lines yield `None`.
fn parse_line(line: &str) -> Option<MessagePayload> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match line.strip_prefix('#') {
        Some(action) => Some(MessagePayload::Action(action.trim().to_string())),
        None => Some(MessagePayload::Text(line.to_string())),
    }
}

/// Render a response as terminal text.
fn render(response: &OutgoingResponse) -> String {
    let mut out = String::new();
    if let Some(image) = &response.image {
        out.push_str(&format!("[image: {}]\n", image.key));
    }
    out.push_str(&response.content);
    if let Some(keyboard) = &response.keyboard {
        for button in keyboard.buttons() {
            out.push_str(&format!("\n  #{:<16} {}", button.action, button.label));
        }
    }
    out
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

        tokio::spawn(async move {
            let stdin = tokio::io::stdin();
            let reader = BufReader::new(stdin);
            let mut lines = reader.lines();

            // Greet as if the chat had just been opened.
            let _ = tx.send(IncomingMessage::new(
                "cli",
                CLI_USER,
                MessagePayload::ChatOpened,
            ));

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let Some(payload) = parse_line(&line) else {
                            eprint!("> ");
                            continue;
                        };
                        let msg = IncomingMessage::new("cli", CLI_USER, payload);
                        if tx.send(msg).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF
                    Err(e) => {
                        tracing::error!("Error reading stdin: {}", e);
                        break;
                    }
                }
            }
        });

        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn respond(
        &self,
        _msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        println!("\n{}\n", render(&response));
        eprint!("> ");
        Ok(())
    }

    async fn health_check(&self) -> Result<(), ChannelError> {
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::{Button, Image, Keyboard};

    #[test]
    fn lines_map_to_payloads() {
        assert_eq!(parse_line("  "), None);
        assert_eq!(parse_line("80"), Some(MessagePayload::Text("80".into())));
        assert_eq!(
            parse_line("#goal_gain"),
            Some(MessagePayload::Action("goal_gain".into()))
        );
        assert_eq!(parse_line("/start"), Some(MessagePayload::Text("/start".into())));
    }

    #[test]
    fn render_lists_image_and_buttons() {
        let response = OutgoingResponse::text("Яка Ваша ціль?")
            .with_image(Some(Image {
                key: "goal".into(),
                path: "images/goal.jpg".into(),
            }))
            .with_keyboard(Keyboard::new().row(vec![Button::new("Схуднути", "goal_loss")]));
        let out = render(&response);
        assert!(out.starts_with("[image: goal]\n"));
        assert!(out.contains("Яка Ваша ціль?"));
        assert!(out.contains("#goal_loss"));
        assert!(out.contains("Схуднути"));
    }
}
