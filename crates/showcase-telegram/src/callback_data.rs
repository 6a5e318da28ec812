//! Callback-data codec for rendered interactive buttons.
//!
//! Telegram only has callback and URL buttons, so every non-URL button kind is
//! a callback whose data is `<prefix>:<id>`. Telegram caps the data at 64 bytes.

use showcase_core::messaging::types::ButtonKind;

pub const MAX_CALLBACK_DATA_BYTES: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    QuickReply(String),
    ListRow(String),
    Copy(String),
    Call(String),
    Pay(String),
    Other(String),
}

impl CallbackAction {
    pub fn encode(&self) -> String {
        let raw = match self {
            CallbackAction::QuickReply(id) => format!("qr:{id}"),
            CallbackAction::ListRow(id) => format!("list:{id}"),
            CallbackAction::Copy(id) => format!("copy:{id}"),
            CallbackAction::Call(id) => format!("call:{id}"),
            CallbackAction::Pay(id) => format!("pay:{id}"),
            CallbackAction::Other(data) => data.clone(),
        };
        clip_to_bytes(&raw, MAX_CALLBACK_DATA_BYTES)
    }

    pub fn parse(data: &str) -> Self {
        let Some((prefix, id)) = data.split_once(':') else {
            return CallbackAction::Other(data.to_string());
        };
        let id = id.to_string();
        match prefix {
            "qr" => CallbackAction::QuickReply(id),
            "list" => CallbackAction::ListRow(id),
            "copy" => CallbackAction::Copy(id),
            "call" => CallbackAction::Call(id),
            "pay" => CallbackAction::Pay(id),
            _ => CallbackAction::Other(data.to_string()),
        }
    }

    pub fn kind(&self) -> Option<ButtonKind> {
        match self {
            CallbackAction::QuickReply(_) => Some(ButtonKind::QuickReply),
            CallbackAction::ListRow(_) => Some(ButtonKind::SingleSelect),
            CallbackAction::Copy(_) => Some(ButtonKind::CtaCopy),
            CallbackAction::Call(_) => Some(ButtonKind::CtaCall),
            CallbackAction::Pay(_) => Some(ButtonKind::PaymentInfo),
            CallbackAction::Other(_) => None,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            CallbackAction::QuickReply(id)
            | CallbackAction::ListRow(id)
            | CallbackAction::Copy(id)
            | CallbackAction::Call(id)
            | CallbackAction::Pay(id)
            | CallbackAction::Other(id) => id,
        }
    }
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a char.
fn clip_to_bytes(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_prefixes() {
        assert_eq!(
            CallbackAction::parse("qr:like"),
            CallbackAction::QuickReply("like".to_string())
        );
        assert_eq!(
            CallbackAction::parse("list:pizza"),
            CallbackAction::ListRow("pizza".to_string())
        );
        assert_eq!(
            CallbackAction::parse("pay:FLOWCHAT1"),
            CallbackAction::Pay("FLOWCHAT1".to_string())
        );
        assert_eq!(
            CallbackAction::parse("askuser:1:2"),
            CallbackAction::Other("askuser:1:2".to_string())
        );
        assert_eq!(
            CallbackAction::parse("plain"),
            CallbackAction::Other("plain".to_string())
        );
    }

    #[test]
    fn encode_clips_to_telegram_limit_on_char_boundary() {
        let long = "é".repeat(40); // 80 bytes
        let data = CallbackAction::Copy(long).encode();
        assert!(data.len() <= MAX_CALLBACK_DATA_BYTES);
        assert!(data.starts_with("copy:"));
        assert!(std::str::from_utf8(data.as_bytes()).is_ok());
    }

    #[test]
    fn kinds_map_back_to_button_kinds() {
        assert_eq!(
            CallbackAction::parse("call:+5511").kind(),
            Some(ButtonKind::CtaCall)
        );
        assert_eq!(CallbackAction::parse("x").kind(), None);
    }
}
