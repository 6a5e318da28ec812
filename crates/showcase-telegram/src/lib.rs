//! Telegram adapter (teloxide).
//!
//! Implements the `showcase-core` session port over the Telegram Bot API and
//! turns Telegram updates into inbound events.

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, InputFile, ParseMode},
    ApiError, RequestError,
};

use tokio::time::sleep;

pub mod callback_data;
pub mod inbound;
pub mod render;
pub mod router;

use showcase_core::{
    connection::DisconnectReason,
    domain::{SenderId, SentMessage},
    errors::Error,
    messaging::{
        port::SessionPort,
        types::{Card, OutboundPayload, SessionCapabilities},
    },
    Result,
};

use crate::render::{RenderedButton, RenderedMessage};

#[derive(Clone)]
pub struct TelegramSession {
    bot: Bot,
}

impl TelegramSession {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub fn bot(&self) -> Bot {
        self.bot.clone()
    }

    fn tg_chat(recipient: &SenderId) -> Result<teloxide::types::ChatId> {
        recipient
            .as_str()
            .trim()
            .parse::<i64>()
            .map(teloxide::types::ChatId)
            .map_err(|_| Error::Transport(format!("not a telegram chat id: {recipient}")))
    }

    fn map_err(e: RequestError) -> Error {
        match disconnect_reason(&e) {
            DisconnectReason::Other(_) => Error::Transport(format!("telegram error: {e}")),
            reason => Error::Disconnected(reason),
        }
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }

    async fn send_rendered(
        &self,
        chat_id: teloxide::types::ChatId,
        rendered: RenderedMessage,
    ) -> Result<teloxide::types::MessageId> {
        let markup = keyboard(&rendered.rows);
        let msg = self
            .with_retry(|| {
                let req = self
                    .bot
                    .send_message(chat_id, rendered.html.clone())
                    .parse_mode(ParseMode::Html);
                match &markup {
                    Some(m) => req.reply_markup(m.clone()),
                    None => req,
                }
            })
            .await?;
        Ok(msg.id)
    }

    async fn send_card(
        &self,
        chat_id: teloxide::types::ChatId,
        card: &Card,
    ) -> Result<teloxide::types::MessageId> {
        let rendered = render::render_card(card);
        let image = card
            .image_url
            .as_deref()
            .and_then(|u| reqwest::Url::parse(u).ok());

        // Cards without a usable image degrade to a plain message.
        let Some(image) = image else {
            return self.send_rendered(chat_id, rendered).await;
        };

        let markup = keyboard(&rendered.rows);
        let msg = self
            .with_retry(|| {
                let req = self
                    .bot
                    .send_photo(chat_id, InputFile::url(image.clone()))
                    .caption(rendered.html.clone())
                    .parse_mode(ParseMode::Html);
                match &markup {
                    Some(m) => req.reply_markup(m.clone()),
                    None => req,
                }
            })
            .await?;
        Ok(msg.id)
    }
}

/// Classify a Telegram request failure for the connection supervisor.
pub fn disconnect_reason(e: &RequestError) -> DisconnectReason {
    match e {
        RequestError::Api(ApiError::NotFound) => DisconnectReason::LoggedOut,
        RequestError::Network(err) => DisconnectReason::ConnectionLost(err.to_string()),
        RequestError::Io(err) => DisconnectReason::ConnectionLost(err.to_string()),
        other => DisconnectReason::Other(other.to_string()),
    }
}

fn keyboard(rows: &[Vec<RenderedButton>]) -> Option<InlineKeyboardMarkup> {
    if rows.is_empty() {
        return None;
    }
    let rows: Vec<Vec<InlineKeyboardButton>> = rows
        .iter()
        .map(|row| row.iter().map(to_tg_button).collect())
        .collect();
    Some(InlineKeyboardMarkup::new(rows))
}

fn to_tg_button(b: &RenderedButton) -> InlineKeyboardButton {
    match b {
        RenderedButton::Callback { label, data } => {
            InlineKeyboardButton::callback(label.clone(), data.clone())
        }
        RenderedButton::Url { label, url } => match reqwest::Url::parse(url) {
            Ok(u) => InlineKeyboardButton::url(label.clone(), u),
            // Telegram rejects unparsable URLs; keep the button clickable.
            Err(_) => InlineKeyboardButton::callback(label.clone(), "url".to_string()),
        },
    }
}

#[async_trait]
impl SessionPort for TelegramSession {
    fn capabilities(&self) -> SessionCapabilities {
        SessionCapabilities {
            supports_native_buttons: false,
            supports_carousel: false,
            max_buttons_per_message: 100,
            max_message_len: 4096,
        }
    }

    async fn send(&self, recipient: &SenderId, payload: &OutboundPayload) -> Result<SentMessage> {
        let chat_id = Self::tg_chat(recipient)?;

        let message_id = match payload {
            OutboundPayload::Text { text, footer } => {
                self.send_rendered(chat_id, render::render_text(text, footer.as_deref()))
                    .await?
            }
            OutboundPayload::Buttons {
                text,
                footer,
                buttons,
            } => {
                self.send_rendered(
                    chat_id,
                    render::render_buttons(text, footer.as_deref(), buttons),
                )
                .await?
            }
            OutboundPayload::Carousel {
                text,
                footer,
                cards,
            } => {
                let mut last = self
                    .send_rendered(chat_id, render::render_text(text, footer.as_deref()))
                    .await?;
                for card in cards {
                    last = self.send_card(chat_id, card).await?;
                }
                last
            }
        };

        Ok(SentMessage {
            recipient: recipient.clone(),
            message_id: message_id.0.to_string(),
        })
    }
}
