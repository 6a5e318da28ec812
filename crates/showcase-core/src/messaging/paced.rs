use std::{collections::HashMap, sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

use crate::{
    domain::{SenderId, SentMessage},
    messaging::{
        port::SessionPort,
        types::{OutboundPayload, SessionCapabilities},
    },
    Result,
};

#[derive(Clone, Copy, Debug)]
pub struct PacingConfig {
    /// Gap kept between consecutive transport messages to one recipient.
    pub message_interval: Duration,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            // Telegram tolerates about one message per second in a single chat.
            message_interval: Duration::from_millis(1050),
        }
    }
}

/// How many transport messages `payload` turns into on a session with `caps`.
///
/// Without native carousels the adapter sends a header plus one message per
/// card, so each card takes its own slot.
pub fn transport_messages(payload: &OutboundPayload, caps: &SessionCapabilities) -> u32 {
    match payload {
        OutboundPayload::Carousel { cards, .. } if !caps.supports_carousel => {
            1 + u32::try_from(cards.len()).unwrap_or(u32::MAX - 1)
        }
        _ => 1,
    }
}

/// SessionPort decorator that paces the scripted burst per recipient.
///
/// A payload reserves as many slots as the transport messages it expands to;
/// the next payload for that recipient starts after all of them.
pub struct PacedSession {
    inner: Arc<dyn SessionPort>,
    cfg: PacingConfig,
    /// Earliest instant each recipient may receive its next message.
    free_at: Mutex<HashMap<SenderId, Instant>>,
}

impl PacedSession {
    pub fn new(inner: Arc<dyn SessionPort>, cfg: PacingConfig) -> Self {
        Self {
            inner,
            cfg,
            free_at: Mutex::new(HashMap::new()),
        }
    }

    async fn claim(&self, recipient: &SenderId, messages: u32) -> Instant {
        let now = Instant::now();
        let mut free_at = self.free_at.lock().await;
        // Recipients whose slots have all elapsed need no bookkeeping.
        free_at.retain(|_, at| *at > now);

        let start = free_at.get(recipient).copied().unwrap_or(now);
        free_at.insert(
            recipient.clone(),
            start + self.cfg.message_interval.saturating_mul(messages),
        );
        start
    }

    #[cfg(test)]
    async fn tracked_recipients(&self) -> usize {
        self.free_at.lock().await.len()
    }
}

#[async_trait::async_trait]
impl SessionPort for PacedSession {
    fn capabilities(&self) -> SessionCapabilities {
        self.inner.capabilities()
    }

    async fn send(&self, recipient: &SenderId, payload: &OutboundPayload) -> Result<SentMessage> {
        let messages = transport_messages(payload, &self.inner.capabilities());
        let start = self.claim(recipient, messages).await;
        sleep_until(start).await;
        self.inner.send(recipient, payload).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::types::Card;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSession {
        caps: SessionCapabilities,
        sends: AtomicUsize,
    }

    impl CountingSession {
        fn new(supports_carousel: bool) -> Self {
            Self {
                caps: SessionCapabilities {
                    supports_native_buttons: supports_carousel,
                    supports_carousel,
                    max_buttons_per_message: 10,
                    max_message_len: 4096,
                },
                sends: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl SessionPort for CountingSession {
        fn capabilities(&self) -> SessionCapabilities {
            self.caps
        }

        async fn send(
            &self,
            recipient: &SenderId,
            _payload: &OutboundPayload,
        ) -> Result<SentMessage> {
            let n = self.sends.fetch_add(1, Ordering::SeqCst);
            Ok(SentMessage {
                recipient: recipient.clone(),
                message_id: n.to_string(),
            })
        }
    }

    fn text() -> OutboundPayload {
        OutboundPayload::Text {
            text: "hi".to_string(),
            footer: None,
        }
    }

    fn carousel(cards: usize) -> OutboundPayload {
        OutboundPayload::Carousel {
            text: "offers".to_string(),
            footer: None,
            cards: (0..cards)
                .map(|i| Card {
                    title: format!("card {i}"),
                    image_url: None,
                    caption: None,
                    footer: None,
                    buttons: Vec::new(),
                })
                .collect(),
        }
    }

    fn paced(inner: Arc<CountingSession>, interval: Duration) -> PacedSession {
        PacedSession::new(
            inner,
            PacingConfig {
                message_interval: interval,
            },
        )
    }

    #[test]
    fn carousel_cards_count_only_without_native_carousels() {
        let fallback = CountingSession::new(false).caps;
        let native = CountingSession::new(true).caps;

        assert_eq!(transport_messages(&text(), &fallback), 1);
        assert_eq!(transport_messages(&carousel(3), &fallback), 4);
        assert_eq!(transport_messages(&carousel(3), &native), 1);
        assert_eq!(transport_messages(&carousel(0), &fallback), 1);
    }

    #[tokio::test]
    async fn spaces_messages_to_the_same_recipient() {
        let inner = Arc::new(CountingSession::new(true));
        let session = paced(inner.clone(), Duration::from_millis(40));
        let a = SenderId::new("A");

        let start = std::time::Instant::now();
        for _ in 0..3 {
            session.send(&a, &text()).await.unwrap();
        }
        assert!(start.elapsed() >= Duration::from_millis(80));
        assert_eq!(inner.sends.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn payload_after_a_fallback_carousel_waits_for_every_card() {
        let inner = Arc::new(CountingSession::new(false));
        let session = paced(inner.clone(), Duration::from_millis(30));
        let a = SenderId::new("A");

        let start = std::time::Instant::now();
        session.send(&a, &carousel(3)).await.unwrap();
        session.send(&a, &text()).await.unwrap();
        // Header + three cards occupy four slots before the text goes out.
        assert!(start.elapsed() >= Duration::from_millis(120));
        assert_eq!(inner.sends.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn recipients_are_paced_independently() {
        let session = paced(Arc::new(CountingSession::new(true)), Duration::from_secs(5));

        let start = std::time::Instant::now();
        session.send(&SenderId::new("A"), &text()).await.unwrap();
        session.send(&SenderId::new("B"), &text()).await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(session.tracked_recipients().await, 2);
    }

    #[tokio::test]
    async fn idle_recipients_are_forgotten() {
        let session = paced(Arc::new(CountingSession::new(true)), Duration::from_millis(20));

        session.send(&SenderId::new("A"), &text()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;
        session.send(&SenderId::new("B"), &text()).await.unwrap();
        assert_eq!(session.tracked_recipients().await, 1);
    }
}
