//! Telegram updates → transport-neutral `InboundEvent`s.

use serde_json::{json, Value};

use teloxide::types::{CallbackQuery, InlineKeyboardButtonKind, Message, User, UserId};

use showcase_core::{
    domain::{MessageKey, SenderId},
    event::{
        ButtonsResponseMessage, ExtendedTextMessage, InboundEvent, InteractiveBody,
        InteractiveResponseMessage, ListResponseMessage, MediaMessage, MessageContent,
        NativeFlowResponse, SingleSelectReply,
    },
};

use crate::callback_data::CallbackAction;

/// WhatsApp's numeric `SINGLE_SELECT` list type.
const LIST_TYPE_SINGLE_SELECT: i64 = 1;

pub fn event_from_message(msg: &Message, bot_id: UserId) -> InboundEvent {
    let from_me = msg.from().map(|u| u.id == bot_id).unwrap_or(false);

    InboundEvent {
        key: MessageKey {
            remote_id: SenderId(msg.chat.id.0.to_string()),
            from_me,
            id: Some(msg.id.0.to_string()),
        },
        push_name: msg.from().map(display_name),
        message: message_payload(msg),
        timestamp: Some(msg.date.timestamp()),
    }
}

/// `None` when the query is not attached to a chat message.
pub fn event_from_callback(q: &CallbackQuery, bot_id: UserId) -> Option<InboundEvent> {
    let message = q.message.as_ref()?;
    let data = q.data.as_deref()?;

    let action = CallbackAction::parse(data);
    let label = button_label(message, data);
    let content = content_from_callback(&action, label.as_deref());

    Some(InboundEvent {
        key: MessageKey {
            remote_id: SenderId(message.chat.id.0.to_string()),
            from_me: q.from.id == bot_id,
            id: Some(q.id.clone()),
        },
        push_name: Some(display_name(&q.from)),
        message: serde_json::to_value(content).ok(),
        timestamp: None,
    })
}

fn display_name(user: &User) -> String {
    user.full_name()
}

/// Label of the inline button that produced `data`, from the keyboard of the
/// message it was attached to.
fn button_label(message: &Message, data: &str) -> Option<String> {
    message
        .reply_markup()?
        .inline_keyboard
        .iter()
        .flatten()
        .find(|b| matches!(&b.kind, InlineKeyboardButtonKind::CallbackData(d) if d == data))
        .map(|b| b.text.clone())
}

fn message_payload(msg: &Message) -> Option<Value> {
    let caption = msg.caption().map(|s| s.to_string());

    let content = if let Some(text) = msg.text() {
        // Telegram has a single text kind; entity-formatted text maps to the
        // formatted-text variant.
        if msg.entities().map(|e| !e.is_empty()).unwrap_or(false) {
            MessageContent {
                extended_text_message: Some(ExtendedTextMessage {
                    text: Some(text.to_string()),
                }),
                ..MessageContent::default()
            }
        } else {
            MessageContent {
                conversation: Some(text.to_string()),
                ..MessageContent::default()
            }
        }
    } else if msg.photo().is_some() {
        MessageContent {
            image_message: Some(MediaMessage {
                caption,
                url: None,
                mimetype: Some("image/jpeg".to_string()),
            }),
            ..MessageContent::default()
        }
    } else if let Some(video) = msg.video() {
        MessageContent {
            video_message: Some(MediaMessage {
                caption,
                url: None,
                mimetype: video.mime_type.as_ref().map(|m| m.to_string()),
            }),
            ..MessageContent::default()
        }
    } else if let Some(doc) = msg.document() {
        return Some(json!({
            "documentMessage": { "caption": caption, "fileName": doc.file_name }
        }));
    } else if let Some(sticker) = msg.sticker() {
        return Some(json!({ "stickerMessage": { "emoji": sticker.emoji } }));
    } else if msg.voice().is_some() {
        return Some(json!({ "audioMessage": { "ptt": true } }));
    } else {
        return None;
    };

    serde_json::to_value(content).ok()
}

pub fn content_from_callback(action: &CallbackAction, label: Option<&str>) -> MessageContent {
    let label = label.map(|s| s.to_string());
    match action {
        CallbackAction::QuickReply(id) => MessageContent {
            buttons_response_message: Some(ButtonsResponseMessage {
                selected_button_id: Some(id.clone()),
                selected_display_text: label,
            }),
            ..MessageContent::default()
        },
        CallbackAction::ListRow(id) => MessageContent {
            list_response_message: Some(ListResponseMessage {
                title: label,
                list_type: Some(json!(LIST_TYPE_SINGLE_SELECT)),
                single_select_reply: Some(SingleSelectReply {
                    selected_row_id: Some(id.clone()),
                }),
            }),
            ..MessageContent::default()
        },
        other => MessageContent {
            interactive_response_message: Some(InteractiveResponseMessage {
                body: Some(InteractiveBody { text: label }),
                native_flow_response_message: Some(NativeFlowResponse {
                    name: other.kind().map(|k| k.wire_name().to_string()),
                    params_json: Some(json!({ "id": other.id() }).to_string()),
                    version: Some(1),
                }),
            }),
            ..MessageContent::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOT: UserId = UserId(7);

    /// A private-chat message from user 42 with `extra` merged in.
    fn message(extra: Value) -> Message {
        let mut raw = json!({
            "message_id": 10,
            "date": 1_735_000_000,
            "chat": {"id": 42, "type": "private", "first_name": "Ana"},
            "from": {"id": 42, "is_bot": false, "first_name": "Ana", "last_name": "Souza"}
        });
        if let (Some(base), Value::Object(extra)) = (raw.as_object_mut(), extra) {
            base.extend(extra);
        }
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn plain_text_is_a_conversation() {
        let ev = event_from_message(&message(json!({"text": "oi"})), BOT);

        assert_eq!(ev.key.remote_id, SenderId::new("42"));
        assert_eq!(ev.key.id.as_deref(), Some("10"));
        assert!(!ev.key.from_me);
        assert_eq!(ev.push_name.as_deref(), Some("Ana Souza"));
        assert_eq!(ev.timestamp, Some(1_735_000_000));
        assert_eq!(ev.message, Some(json!({"conversation": "oi"})));
        assert_eq!(ev.message_type(), "conversation");
    }

    #[test]
    fn text_with_entities_is_extended_text() {
        let ev = event_from_message(
            &message(json!({
                "text": "bold move",
                "entities": [{"type": "bold", "offset": 0, "length": 4}]
            })),
            BOT,
        );
        assert_eq!(ev.message_type(), "extendedTextMessage");
        assert_eq!(ev.content().plain_text().as_deref(), Some("bold move"));
    }

    #[test]
    fn media_captions_map_to_media_variants() {
        let ev = event_from_message(
            &message(json!({
                "photo": [{"file_id": "p1", "file_unique_id": "u1", "width": 90, "height": 90, "file_size": 100}],
                "caption": "look"
            })),
            BOT,
        );
        assert_eq!(ev.message_type(), "imageMessage");
        assert_eq!(ev.content().plain_text().as_deref(), Some("look"));

        let ev = event_from_message(
            &message(json!({
                "video": {
                    "file_id": "v1", "file_unique_id": "u2", "file_size": 2048,
                    "width": 640, "height": 360, "duration": 3, "mime_type": "video/mp4"
                },
                "caption": "clip"
            })),
            BOT,
        );
        assert_eq!(ev.message_type(), "videoMessage");
        let video = ev.content().video_message.unwrap();
        assert_eq!(video.caption.as_deref(), Some("clip"));
        assert_eq!(video.mimetype.as_deref(), Some("video/mp4"));
    }

    #[test]
    fn from_me_only_when_the_author_is_the_bot() {
        let msg = message(json!({"text": "echo"}));
        assert!(!event_from_message(&msg, BOT).key.from_me);
        assert!(event_from_message(&msg, UserId(42)).key.from_me);
    }

    #[test]
    fn unsupported_messages_have_no_payload() {
        let ev = event_from_message(
            &message(json!({"location": {"latitude": -23.5, "longitude": -46.6}})),
            BOT,
        );
        assert_eq!(ev.message, None);
        assert!(!ev.has_payload());
    }

    #[test]
    fn quick_reply_callback_is_a_button_response() {
        let c = content_from_callback(&CallbackAction::parse("qr:like"), Some("👍 Curtir"));
        let b = c.buttons_response_message.clone().unwrap();
        assert_eq!(b.selected_button_id.as_deref(), Some("like"));
        assert_eq!(c.plain_text().as_deref(), Some("👍 Curtir"));

        let raw = serde_json::to_value(&c).unwrap();
        assert_eq!(
            raw,
            json!({"buttonsResponseMessage": {"selectedButtonId": "like", "selectedDisplayText": "👍 Curtir"}})
        );
    }

    #[test]
    fn list_callback_is_a_single_select_reply() {
        let c = content_from_callback(&CallbackAction::parse("list:taco"), Some("🌮 Taco"));
        let l = c.list_response_message.unwrap();
        assert_eq!(l.title.as_deref(), Some("🌮 Taco"));
        assert_eq!(l.list_type, Some(json!(1)));
        assert_eq!(
            l.single_select_reply.and_then(|r| r.selected_row_id).as_deref(),
            Some("taco")
        );
    }

    #[test]
    fn other_callbacks_are_native_flow_responses() {
        let c = content_from_callback(&CallbackAction::parse("pay:FLOWCHAT1"), Some("💳 Pagar"));
        let i = c.interactive_response_message.clone().unwrap();
        let flow = i.native_flow_response_message.unwrap();
        assert_eq!(flow.name.as_deref(), Some("payment_info"));
        assert_eq!(flow.params_json.as_deref(), Some(r#"{"id":"FLOWCHAT1"}"#));
        assert_eq!(c.plain_text().as_deref(), Some("💳 Pagar"));

        let c = content_from_callback(&CallbackAction::parse("legacy"), None);
        let flow = c
            .interactive_response_message
            .and_then(|i| i.native_flow_response_message)
            .unwrap();
        assert_eq!(flow.name, None);
    }
}
