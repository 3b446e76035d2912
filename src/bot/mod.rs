//! Bot loop: turns channel messages into wizard events and sends the replies.

pub mod render;

use std::collections::HashMap;
use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::channels::{ChannelManager, IncomingMessage, MessagePayload, OutgoingResponse};
use crate::error::Result;
use crate::images::ImageCatalog;
use crate::wizard::{EventParser, WizardEngine};

pub use render::Renderer;

/// Per-session inboxes, each drained in arrival order by one worker task.
type SessionQueues = HashMap<String, mpsc::UnboundedSender<IncomingMessage>>;

pub struct Bot {
    engine: Arc<WizardEngine>,
    renderer: Renderer,
    channels: Arc<ChannelManager>,
}

impl Bot {
    pub fn new(engine: Arc<WizardEngine>, images: ImageCatalog, channels: ChannelManager) -> Self {
        Self {
            engine,
            renderer: Renderer::new(images),
            channels: Arc::new(channels),
        }
    }

    /// Run until Ctrl+C or until every channel stream ends.
    ///
    /// Messages of one session are handled strictly in the order they
    /// arrived; different sessions proceed concurrently. Queued work is
    /// finished before the channels shut down.
    pub async fn run(self) -> Result<()> {
        let mut message_stream = self.channels.start_all().await?;
        let bot = Arc::new(self);
        let mut queues = SessionQueues::new();
        let mut workers = JoinSet::new();

        tracing::info!(channels = ?bot.channels.names(), "Bot ready and listening");

        loop {
            let message = tokio::select! {
                biased;
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received, shutting down...");
                    break;
                }
                msg = message_stream.next() => {
                    match msg {
                        Some(m) => m,
                        None => {
                            tracing::info!("All channel streams ended, shutting down...");
                            break;
                        }
                    }
                }
            };

            bot.enqueue(&mut queues, &mut workers, message);
        }

        // Closing the inboxes lets each worker finish what it already holds.
        drop(queues);
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Session worker failed: {e}");
            }
        }

        bot.channels.shutdown_all().await?;
        Ok(())
    }

    /// Hand `message` to its session's worker, starting one if needed.
    fn enqueue(
        self: &Arc<Self>,
        queues: &mut SessionQueues,
        workers: &mut JoinSet<()>,
        message: IncomingMessage,
    ) {
        let session_id = message.session_id();
        let message = match queues.get(&session_id) {
            Some(inbox) => match inbox.send(message) {
                Ok(()) => return,
                // The worker is gone (it panicked); start a fresh one.
                Err(mpsc::error::SendError(message)) => message,
            },
            None => message,
        };

        let (inbox, rx) = mpsc::unbounded_channel();
        // `rx` is still held here, so this send cannot fail.
        let _ = inbox.send(message);
        workers.spawn(Arc::clone(self).drain(session_id.clone(), rx));
        queues.insert(session_id, inbox);
    }

    async fn drain(
        self: Arc<Self>,
        session_id: String,
        mut rx: mpsc::UnboundedReceiver<IncomingMessage>,
    ) {
        while let Some(message) = rx.recv().await {
            self.process(message).await;
        }
        tracing::debug!(session_id = %session_id, "Session worker finished");
    }

    async fn process(&self, message: IncomingMessage) {
        if matches!(message.payload, MessagePayload::Action(_)) {
            if let Err(e) = self.channels.acknowledge(&message).await {
                tracing::warn!(channel = %message.channel, "Failed to acknowledge action: {e}");
            }
        }

        for response in self.handle_message(&message).await {
            if let Err(e) = self.channels.respond(&message, response).await {
                tracing::warn!(channel = %message.channel, "Failed to send response: {e}");
                break;
            }
        }
    }

    /// Map one inbound message to the responses it should produce.
    pub async fn handle_message(&self, message: &IncomingMessage) -> Vec<OutgoingResponse> {
        let event = match &message.payload {
            MessagePayload::Text(text) => EventParser::parse_text(text),
            MessagePayload::Action(payload) => match EventParser::parse_action(payload) {
                Some(event) => event,
                None => {
                    tracing::warn!(payload = %payload, "Unknown button payload");
                    return Vec::new();
                }
            },
            MessagePayload::ChatOpened => return self.renderer.welcome().await,
        };

        let session_id = message.session_id();
        tracing::debug!(session_id = %session_id, ?event, "Dispatching event");

        match self.engine.dispatch(&session_id, event).await {
            Ok(outcome) => self.renderer.outcome(&outcome).await,
            Err(e) => {
                if !e.is_recoverable() {
                    tracing::error!(session_id = %session_id, "Wizard failed: {e}");
                }
                self.renderer.rejection(&e).await
            }
        }
    }
}
