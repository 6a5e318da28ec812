//! Inbound event model.
//!
//! Transports deliver a raw, transport-shaped JSON payload whose top-level keys
//! name the payload variants (`conversation`, `imageMessage`, ...). The raw
//! value is kept verbatim for archival; `MessageContent` is the typed decode
//! used for extraction.

use serde::{Deserialize, Serialize};

use crate::domain::{MessageKey, SenderId};

/// One received message notification. Immutable once received.
#[derive(Clone, Debug, PartialEq)]
pub struct InboundEvent {
    pub key: MessageKey,
    pub push_name: Option<String>,
    pub message: Option<serde_json::Value>,
    /// Arrival timestamp in transport-defined units.
    pub timestamp: Option<i64>,
}

impl InboundEvent {
    pub fn sender(&self) -> &SenderId {
        &self.key.remote_id
    }

    pub fn is_from_me(&self) -> bool {
        self.key.from_me
    }

    pub fn has_payload(&self) -> bool {
        matches!(&self.message, Some(v) if !v.is_null())
    }

    /// Typed view of the payload. Undecodable payloads yield an empty content.
    pub fn content(&self) -> MessageContent {
        self.message
            .as_ref()
            .and_then(|v| MessageContent::deserialize(v).ok())
            .unwrap_or_default()
    }

    /// Variant tag: first known variant present, else the first raw key.
    pub fn message_type(&self) -> String {
        if let Some(v) = self.content().variants().first() {
            return v.tag().to_string();
        }
        self.message
            .as_ref()
            .and_then(|v| v.as_object())
            .and_then(|obj| obj.keys().next().cloned())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_text_message: Option<ExtendedTextMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_message: Option<MediaMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_message: Option<MediaMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buttons_response_message: Option<ButtonsResponseMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_response_message: Option<ListResponseMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactive_response_message: Option<InteractiveResponseMessage>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedTextMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonsResponseMessage {
    pub selected_button_id: Option<String>,
    pub selected_display_text: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponseMessage {
    pub title: Option<String>,
    /// Opaque: numeric on some transports, symbolic on others.
    pub list_type: Option<serde_json::Value>,
    pub single_select_reply: Option<SingleSelectReply>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleSelectReply {
    pub selected_row_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveResponseMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<InteractiveBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_flow_response_message: Option<NativeFlowResponse>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveBody {
    pub text: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeFlowResponse {
    pub name: Option<String>,
    pub params_json: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
}

/// One decoded payload variant, borrowed from a `MessageContent`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PayloadVariant<'a> {
    Text(&'a str),
    ExtendedText(&'a ExtendedTextMessage),
    Image(&'a MediaMessage),
    Video(&'a MediaMessage),
    ButtonReply(&'a ButtonsResponseMessage),
    ListReply(&'a ListResponseMessage),
    InteractiveReply(&'a InteractiveResponseMessage),
}

impl<'a> PayloadVariant<'a> {
    pub fn tag(&self) -> &'static str {
        match self {
            PayloadVariant::Text(_) => "conversation",
            PayloadVariant::ExtendedText(_) => "extendedTextMessage",
            PayloadVariant::Image(_) => "imageMessage",
            PayloadVariant::Video(_) => "videoMessage",
            PayloadVariant::ButtonReply(_) => "buttonsResponseMessage",
            PayloadVariant::ListReply(_) => "listResponseMessage",
            PayloadVariant::InteractiveReply(_) => "interactiveResponseMessage",
        }
    }

    /// The human-readable text this variant carries, if any.
    pub fn plain_text(&self) -> Option<&'a str> {
        match *self {
            PayloadVariant::Text(s) => Some(s),
            PayloadVariant::ExtendedText(m) => m.text.as_deref(),
            PayloadVariant::Image(m) | PayloadVariant::Video(m) => m.caption.as_deref(),
            PayloadVariant::ButtonReply(m) => m.selected_display_text.as_deref(),
            PayloadVariant::ListReply(m) => m.title.as_deref(),
            PayloadVariant::InteractiveReply(m) => m.body.as_ref().and_then(|b| b.text.as_deref()),
        }
    }
}

impl MessageContent {
    /// Present variants in extraction priority order.
    pub fn variants(&self) -> Vec<PayloadVariant<'_>> {
        let mut out = Vec::new();
        if let Some(s) = &self.conversation {
            out.push(PayloadVariant::Text(s));
        }
        if let Some(m) = &self.extended_text_message {
            out.push(PayloadVariant::ExtendedText(m));
        }
        if let Some(m) = &self.image_message {
            out.push(PayloadVariant::Image(m));
        }
        if let Some(m) = &self.video_message {
            out.push(PayloadVariant::Video(m));
        }
        if let Some(m) = &self.buttons_response_message {
            out.push(PayloadVariant::ButtonReply(m));
        }
        if let Some(m) = &self.list_response_message {
            out.push(PayloadVariant::ListReply(m));
        }
        if let Some(m) = &self.interactive_response_message {
            out.push(PayloadVariant::InteractiveReply(m));
        }
        out
    }

    /// First non-absent text across variants, in priority order.
    pub fn plain_text(&self) -> Option<String> {
        self.variants()
            .iter()
            .find_map(|v| v.plain_text().filter(|s| !s.is_empty()))
            .map(|s| s.to_string())
    }
}
