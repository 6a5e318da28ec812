//! Inbound filtering, archival dispatch and the once-per-session scripted reply.

use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use crate::{
    archive::ArchiveLog,
    domain::SenderId,
    event::InboundEvent,
    messaging::port::SessionPort,
    script::{ScriptFactory, ScriptStep},
};

/// What happened to one inbound event.
#[derive(Clone, Debug, PartialEq)]
pub enum EventOutcome {
    Blocked,
    SelfEcho,
    Empty,
    Archived {
        /// New archive size, `None` if the write failed.
        record_count: Option<usize>,
        /// Present only for the event that fired the sequence.
        sequence: Option<SequenceReport>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome {
    /// 1-based position in the script.
    pub index: usize,
    pub name: &'static str,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SequenceReport {
    pub steps: Vec<StepOutcome>,
}

impl SequenceReport {
    pub fn sent(&self) -> usize {
        self.steps.iter().filter(|s| s.error.is_none()).count()
    }

    pub fn failed(&self) -> usize {
        self.steps.len() - self.sent()
    }
}

pub struct ResponseSequencer {
    blocklist: HashSet<SenderId>,
    archive: ArchiveLog,
    session: Arc<dyn SessionPort>,
    script: ScriptFactory,
    fired: AtomicBool,
}

impl ResponseSequencer {
    pub fn new(
        blocklist: impl IntoIterator<Item = SenderId>,
        archive: ArchiveLog,
        session: Arc<dyn SessionPort>,
        script: ScriptFactory,
    ) -> Self {
        Self {
            blocklist: blocklist.into_iter().collect(),
            archive,
            session,
            script,
            fired: AtomicBool::new(false),
        }
    }

    pub fn archive(&self) -> &ArchiveLog {
        &self.archive
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    pub async fn on_inbound_event(&self, event: &InboundEvent) -> EventOutcome {
        let sender = event.sender();

        if self.blocklist.contains(sender) {
            tracing::info!(sender = %sender, "blocked sender, ignoring");
            return EventOutcome::Blocked;
        }
        if event.is_from_me() {
            return EventOutcome::SelfEcho;
        }
        if !event.has_payload() {
            return EventOutcome::Empty;
        }

        tracing::info!(
            sender = %sender,
            name = event.push_name.as_deref().unwrap_or("unknown"),
            kind = %event.message_type(),
            "message received"
        );

        let record_count = self.archive.record(event);

        // Test-and-set: only the first qualifying event gets the script.
        let sequence = if self.fired.swap(true, Ordering::SeqCst) {
            None
        } else {
            Some(self.run_script(sender).await)
        };

        EventOutcome::Archived {
            record_count,
            sequence,
        }
    }

    async fn run_script(&self, recipient: &SenderId) -> SequenceReport {
        let steps: Vec<ScriptStep> = (self.script)();
        tracing::info!(recipient = %recipient, steps = steps.len(), "sending scripted sequence");

        let mut report = SequenceReport::default();
        for (i, step) in steps.iter().enumerate() {
            let index = i + 1;
            let error = match self.session.send(recipient, &step.payload).await {
                Ok(_) => {
                    tracing::info!(step = index, name = step.name, "scripted message sent");
                    None
                }
                Err(e) => {
                    tracing::warn!(step = index, name = step.name, "scripted message failed: {e}");
                    Some(e.to_string())
                }
            };
            report.steps.push(StepOutcome {
                index,
                name: step.name,
                error,
            });
        }

        tracing::info!(
            sent = report.sent(),
            failed = report.failed(),
            "scripted sequence finished; still archiving incoming messages"
        );
        report
    }
}
