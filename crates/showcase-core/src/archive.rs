//! Append-only JSON archive of inbound events.
//!
//! The whole log is one JSON array in one file. Every `record()` is a
//! read-modify-write; a single writer per file is assumed.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    domain::MessageKey,
    event::{ButtonsResponseMessage, InboundEvent, InteractiveBody, NativeFlowResponse, SingleSelectReply},
    utils::iso_timestamp_utc,
    Result,
};

const UNKNOWN_SENDER_NAME: &str = "unknown";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveRecord {
    pub timestamp: String,
    pub key: MessageKey,
    pub push_name: String,
    pub message_type: String,
    pub message: Option<serde_json::Value>,
    pub message_timestamp: Option<i64>,
    pub text: Option<String>,
    pub button_response: Option<ButtonsResponseMessage>,
    pub list_response: Option<ListResponse>,
    pub interactive_response: Option<InteractiveResponse>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub title: Option<String>,
    pub list_type: Option<serde_json::Value>,
    pub single_select_reply: Option<SingleSelectReply>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveResponse {
    pub body: Option<InteractiveBody>,
    pub native_flow_response: Option<NativeFlowResponse>,
}

impl ArchiveRecord {
    /// Derive a record from an event captured at `captured_at` (RFC3339).
    pub fn from_event(event: &InboundEvent, captured_at: String) -> Self {
        let content = event.content();

        Self {
            timestamp: captured_at,
            key: event.key.clone(),
            push_name: event
                .push_name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| UNKNOWN_SENDER_NAME.to_string()),
            message_type: event.message_type(),
            message: event.message.clone(),
            message_timestamp: event.timestamp,
            text: content.plain_text(),
            button_response: content.buttons_response_message.clone(),
            list_response: content.list_response_message.as_ref().map(|m| ListResponse {
                title: m.title.clone(),
                list_type: m.list_type.clone(),
                single_select_reply: m.single_select_reply.clone(),
            }),
            interactive_response: content.interactive_response_message.as_ref().map(|m| {
                InteractiveResponse {
                    body: m.body.clone(),
                    native_flow_response: m.native_flow_response_message.clone(),
                }
            }),
        }
    }
}

/// File-backed archive log.
#[derive(Clone, Debug)]
pub struct ArchiveLog {
    path: PathBuf,
}

impl ArchiveLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every record. Never fails: a missing file is an empty log, an
    /// unreadable or unparsable one is logged and treated as empty.
    pub fn load(&self) -> Vec<ArchiveRecord> {
        if !self.path.exists() {
            return Vec::new();
        }
        match read_records(&self.path) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "failed to load archived messages, starting a new log: {e}"
                );
                Vec::new()
            }
        }
    }

    /// Append one event. Returns the new record count, or `None` when the
    /// write failed (logged, never propagated).
    pub fn record(&self, event: &InboundEvent) -> Option<usize> {
        let mut records = self.load();
        records.push(ArchiveRecord::from_event(event, iso_timestamp_utc()));

        match write_records(&self.path, &records) {
            Ok(()) => {
                tracing::info!(
                    path = %self.path.display(),
                    total = records.len(),
                    "message archived"
                );
                Some(records.len())
            }
            Err(e) => {
                tracing::error!(path = %self.path.display(), "failed to archive message: {e}");
                None
            }
        }
    }

    /// Replace the whole log.
    pub fn save(&self, records: &[ArchiveRecord]) -> Result<()> {
        write_records(&self.path, records)
    }
}

fn read_records(path: &Path) -> Result<Vec<ArchiveRecord>> {
    let txt = fs::read_to_string(path)?;
    if txt.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(&txt)?)
}

/// Serialize fully, write a sibling temp file, then rename over the target.
fn write_records(path: &Path, records: &[ArchiveRecord]) -> Result<()> {
    let txt = serde_json::to_string_pretty(records)?;

    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "archive.json".into());
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&tmp, txt)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}
