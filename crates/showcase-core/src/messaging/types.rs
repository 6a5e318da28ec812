use serde::{Deserialize, Serialize};

/// Interactive button kinds understood by the outbound model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonKind {
    QuickReply,
    CtaUrl,
    CtaCopy,
    CtaCall,
    SingleSelect,
    PaymentInfo,
}

impl ButtonKind {
    pub fn wire_name(self) -> &'static str {
        match self {
            ButtonKind::QuickReply => "quick_reply",
            ButtonKind::CtaUrl => "cta_url",
            ButtonKind::CtaCopy => "cta_copy",
            ButtonKind::CtaCall => "cta_call",
            ButtonKind::SingleSelect => "single_select",
            ButtonKind::PaymentInfo => "payment_info",
        }
    }

    pub fn from_wire_name(name: &str) -> Option<Self> {
        Some(match name {
            "quick_reply" => ButtonKind::QuickReply,
            "cta_url" => ButtonKind::CtaUrl,
            "cta_copy" => ButtonKind::CtaCopy,
            "cta_call" => ButtonKind::CtaCall,
            "single_select" => ButtonKind::SingleSelect,
            "payment_info" => ButtonKind::PaymentInfo,
            _ => return None,
        })
    }
}

/// A `(kind, parameters)` pair; parameters are opaque and kind-specific.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InteractiveButton {
    pub kind: ButtonKind,
    pub params: serde_json::Value,
}

impl InteractiveButton {
    pub fn new(kind: ButtonKind, params: serde_json::Value) -> Self {
        Self { kind, params }
    }

    pub fn quick_reply(display_text: &str, id: &str) -> Self {
        Self::new(
            ButtonKind::QuickReply,
            serde_json::json!({ "display_text": display_text, "id": id }),
        )
    }

    /// String parameter lookup.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(|v| v.as_str())
    }

    /// Label shown to the user: `display_text`, falling back to `title`.
    pub fn display_text(&self) -> Option<&str> {
        self.param("display_text").or_else(|| self.param("title"))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub title: String,
    pub image_url: Option<String>,
    pub caption: Option<String>,
    pub footer: Option<String>,
    pub buttons: Vec<InteractiveButton>,
}

/// Transport-neutral outbound payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundPayload {
    Text {
        text: String,
        footer: Option<String>,
    },
    Buttons {
        text: String,
        footer: Option<String>,
        buttons: Vec<InteractiveButton>,
    },
    Carousel {
        text: String,
        footer: Option<String>,
        cards: Vec<Card>,
    },
}

impl OutboundPayload {
    pub fn text(&self) -> &str {
        match self {
            OutboundPayload::Text { text, .. }
            | OutboundPayload::Buttons { text, .. }
            | OutboundPayload::Carousel { text, .. } => text,
        }
    }

    pub fn footer(&self) -> Option<&str> {
        match self {
            OutboundPayload::Text { footer, .. }
            | OutboundPayload::Buttons { footer, .. }
            | OutboundPayload::Carousel { footer, .. } => footer.as_deref(),
        }
    }

    /// Button kinds used anywhere in the payload (cards included), in order.
    pub fn button_kinds(&self) -> Vec<ButtonKind> {
        match self {
            OutboundPayload::Text { .. } => Vec::new(),
            OutboundPayload::Buttons { buttons, .. } => buttons.iter().map(|b| b.kind).collect(),
            OutboundPayload::Carousel { cards, .. } => cards
                .iter()
                .flat_map(|c| c.buttons.iter().map(|b| b.kind))
                .collect(),
        }
    }
}

/// Capabilities / feature flags of a transport implementation.
#[derive(Clone, Copy, Debug)]
pub struct SessionCapabilities {
    pub supports_native_buttons: bool,
    pub supports_carousel: bool,
    pub max_buttons_per_message: usize,
    pub max_message_len: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        for kind in [
            ButtonKind::QuickReply,
            ButtonKind::CtaUrl,
            ButtonKind::CtaCopy,
            ButtonKind::CtaCall,
            ButtonKind::SingleSelect,
            ButtonKind::PaymentInfo,
        ] {
            assert_eq!(ButtonKind::from_wire_name(kind.wire_name()), Some(kind));
            let serialized = serde_json::to_value(kind).unwrap();
            assert_eq!(serialized, serde_json::json!(kind.wire_name()));
        }
        assert_eq!(ButtonKind::from_wire_name("review_and_pay"), None);
    }

    #[test]
    fn display_text_falls_back_to_title() {
        let b = InteractiveButton::new(
            ButtonKind::SingleSelect,
            serde_json::json!({ "title": "Ver Menu", "sections": [] }),
        );
        assert_eq!(b.display_text(), Some("Ver Menu"));
        assert_eq!(
            InteractiveButton::quick_reply("Like", "like").display_text(),
            Some("Like")
        );
    }
}
