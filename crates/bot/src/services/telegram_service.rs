use std::path::PathBuf;

use anyhow::bail;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};

use common::AdvisorError;
use common::actors::{Actor, ActorType, ControlMessage};

use crate::services::report_format::split_message;

/// An HTML message for the configured chat, optionally with a report file.
#[derive(Debug, Clone)]
pub struct Notification {
    pub text: String,
    pub attachment: Option<PathBuf>,
}

impl Notification {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, path: Option<PathBuf>) -> Self {
        self.attachment = path;
        self
    }
}

#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramNotifier {
    pub fn new(bot: Bot, chat_id: i64) -> Self {
        Self {
            bot,
            chat_id: ChatId(chat_id),
        }
    }

    pub async fn deliver(&self, notification: &Notification) -> Result<(), AdvisorError> {
        for chunk in split_message(&notification.text) {
            self.bot
                .send_message(self.chat_id, chunk)
                .parse_mode(ParseMode::Html)
                .await
                .map_err(AdvisorError::delivery)?;
        }

        if let Some(path) = &notification.attachment {
            self.bot
                .send_document(self.chat_id, InputFile::file(path.clone()))
                .await
                .map_err(AdvisorError::delivery)?;
        }
        Ok(())
    }

    /// Delivery failures are logged, never propagated.
    pub async fn deliver_or_log(&self, notification: &Notification) {
        if let Err(e) = self.deliver(notification).await {
            error!("Failed to send Telegram message: {}", e);
        }
    }
}

/// Drains the notification channel into the chat.
pub struct TelegramService {
    notifier: TelegramNotifier,
    rx: broadcast::Receiver<Notification>,
}

impl TelegramService {
    pub fn new(notifier: TelegramNotifier, rx: broadcast::Receiver<Notification>) -> Self {
        Self { notifier, rx }
    }
}

#[async_trait]
impl Actor for TelegramService {
    fn name(&self) -> ActorType {
        ActorType::NotifierActor
    }

    async fn run(&mut self, _supervisor_tx: mpsc::Sender<ControlMessage>) -> anyhow::Result<()> {
        info!("Starting Telegram Notification Service");

        loop {
            match self.rx.recv().await {
                Ok(notification) => self.notifier.deliver_or_log(&notification).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("Telegram service lagged behind. Missed {} messages.", n);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    bail!("Telegram notification channel closed");
                }
            }
        }
    }
}
