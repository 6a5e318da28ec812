use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*, types::UserId};

use tokio::sync::Mutex;

use showcase_core::{errors::Error, sequencer::ResponseSequencer, Result};

use crate::{disconnect_reason, inbound};

pub struct AppState {
    pub sequencer: Arc<ResponseSequencer>,
    pub bot_id: UserId,
    /// One event at a time, end to end (archive write + full sequence).
    serial: Mutex<()>,
}

impl AppState {
    pub fn new(sequencer: Arc<ResponseSequencer>, bot_id: UserId) -> Self {
        Self {
            sequencer,
            bot_id,
            serial: Mutex::new(()),
        }
    }
}

/// Connect, then dispatch updates until shutdown (Ctrl-C).
///
/// A failed handshake comes back as `Error::Disconnected` so the caller can
/// decide whether to reconnect.
pub async fn run_polling(bot: Bot, sequencer: Arc<ResponseSequencer>) -> Result<()> {
    let me = bot
        .get_me()
        .await
        .map_err(|e| Error::Disconnected(disconnect_reason(&e)))?;

    tracing::info!(
        archive = %display_path(sequencer.archive().path()),
        "messages will be archived"
    );
    tracing::info!(bot = %me.username(), "connected");
    tracing::info!("waiting for someone to send a message to start the showcase");

    let state = Arc::new(AppState::new(sequencer, me.user.id));

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handle_callback))
        .branch(Update::filter_message().endpoint(handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let event = inbound::event_from_message(&msg, state.bot_id);

    let _guard = state.serial.lock().await;
    state.sequencer.on_inbound_event(&event).await;
    Ok(())
}

async fn handle_callback(bot: Bot, q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    // Always answer so the client stops its spinner.
    let _ = bot.answer_callback_query(q.id.clone()).await;

    let Some(event) = inbound::event_from_callback(&q, state.bot_id) else {
        return Ok(());
    };

    let _guard = state.serial.lock().await;
    state.sequencer.on_inbound_event(&event).await;
    Ok(())
}

fn display_path(p: &std::path::Path) -> String {
    std::fs::canonicalize(p)
        .or_else(|_| std::env::current_dir().map(|d| d.join(p)))
        .unwrap_or_else(|_| p.to_path_buf())
        .display()
        .to_string()
}
