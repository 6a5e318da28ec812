use std::sync::Arc;

use anyhow::anyhow;
use teloxide::Bot;

use showcase_core::{
    archive::ArchiveLog,
    config::Config,
    errors::Error,
    messaging::{paced::PacedSession, port::SessionPort},
    script::{demo_script, ScriptOptions},
    sequencer::ResponseSequencer,
};
use showcase_telegram::{router, TelegramSession};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    showcase_core::logging::init("showcase")?;

    let cfg = Config::load()?;
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    let raw_session: Arc<dyn SessionPort> = Arc::new(TelegramSession::new(bot.clone()));
    let caps = raw_session.capabilities();
    tracing::info!(
        native_buttons = caps.supports_native_buttons,
        carousel = caps.supports_carousel,
        "transport capabilities"
    );
    let session: Arc<dyn SessionPort> = Arc::new(PacedSession::new(raw_session, cfg.pacing));

    let footer = cfg.script_footer.clone();
    let sequencer = Arc::new(ResponseSequencer::new(
        cfg.blocked_senders.clone(),
        ArchiveLog::new(cfg.archive_file.clone()),
        session,
        Box::new(move || {
            demo_script(&ScriptOptions {
                footer: footer.clone(),
                ..ScriptOptions::default()
            })
        }),
    ));

    let mut attempts = 0u32;
    loop {
        match router::run_polling(bot.clone(), sequencer.clone()).await {
            Ok(()) => return Ok(()),
            Err(Error::Disconnected(reason)) => {
                let Some(delay) = cfg.reconnect.next_delay(&reason, attempts) else {
                    return Err(anyhow!("not reconnecting: {reason}"));
                };
                attempts += 1;
                tracing::warn!(attempt = attempts, ?delay, "connection closed ({reason}), reconnecting");
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e.into()),
        }
    }
}
