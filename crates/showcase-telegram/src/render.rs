//! Outbound payload → Telegram HTML + inline keyboard layout.
//!
//! Kept free of teloxide types so the layout rules are testable on their own.

use serde_json::Value;

use showcase_core::messaging::types::{ButtonKind, Card, InteractiveButton};

use crate::callback_data::CallbackAction;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderedButton {
    Callback { label: String, data: String },
    Url { label: String, url: String },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderedMessage {
    pub html: String,
    /// One button per row.
    pub rows: Vec<Vec<RenderedButton>>,
}

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// WhatsApp-style markup (`*bold*`, triple-backtick blocks) to Telegram HTML.
pub fn whatsapp_to_html(input: &str) -> String {
    let mut out = String::new();
    for (i, segment) in input.split("```").enumerate() {
        // Odd segments sit between fences; an unclosed fence stays literal.
        let closed = i % 2 == 1 && input.matches("```").count() >= i + 1;
        if closed {
            out.push_str("<pre>");
            out.push_str(&escape_html(segment));
            out.push_str("</pre>");
            continue;
        }
        if i > 0 && i % 2 == 1 {
            out.push_str("```");
        }
        let lines: Vec<String> = escape_html(segment)
            .split('\n')
            .map(|l| replace_pairs(l, '*', "<b>", "</b>"))
            .collect();
        out.push_str(&lines.join("\n"));
    }
    out
}

fn replace_pairs(line: &str, delim: char, open: &str, close: &str) -> String {
    let parts: Vec<&str> = line.split(delim).collect();
    if parts.len() < 3 {
        return line.to_string();
    }
    // An odd trailing delimiter stays literal.
    let paired = (parts.len() - 1) / 2 * 2;
    let mut out = String::with_capacity(line.len() + 8);
    for (i, part) in parts.iter().enumerate() {
        out.push_str(part);
        if i + 1 == parts.len() {
            break;
        }
        if i < paired {
            out.push_str(if i % 2 == 0 { open } else { close });
        } else {
            out.push(delim);
        }
    }
    out
}

fn with_footer(mut html: String, footer: Option<&str>) -> String {
    if let Some(f) = footer.filter(|f| !f.trim().is_empty()) {
        html.push_str("\n\n<i>");
        html.push_str(&escape_html(f));
        html.push_str("</i>");
    }
    html
}

pub fn render_text(text: &str, footer: Option<&str>) -> RenderedMessage {
    RenderedMessage {
        html: with_footer(whatsapp_to_html(text), footer),
        rows: Vec::new(),
    }
}

pub fn render_buttons(
    text: &str,
    footer: Option<&str>,
    buttons: &[InteractiveButton],
) -> RenderedMessage {
    let mut html = whatsapp_to_html(text);
    let mut rows = Vec::new();
    for b in buttons {
        render_button(b, &mut html, &mut rows);
    }
    RenderedMessage {
        html: with_footer(html, footer),
        rows,
    }
}

/// Caption + keyboard for one carousel card.
pub fn render_card(card: &Card) -> RenderedMessage {
    let mut html = format!("<b>{}</b>", escape_html(&card.title));
    if let Some(c) = card.caption.as_deref() {
        html.push('\n');
        html.push_str(&whatsapp_to_html(c));
    }
    let mut rows = Vec::new();
    for b in &card.buttons {
        render_button(b, &mut html, &mut rows);
    }
    RenderedMessage {
        html: with_footer(html, card.footer.as_deref()),
        rows,
    }
}

fn render_button(b: &InteractiveButton, html: &mut String, rows: &mut Vec<Vec<RenderedButton>>) {
    let label = b.display_text().unwrap_or(b.kind.wire_name()).to_string();
    let id = b.param("id").unwrap_or_default().to_string();

    match b.kind {
        ButtonKind::QuickReply => rows.push(vec![RenderedButton::Callback {
            label,
            data: CallbackAction::QuickReply(id).encode(),
        }]),
        ButtonKind::CtaUrl => {
            let url = b.param("url").unwrap_or_default().to_string();
            rows.push(vec![RenderedButton::Url { label, url }]);
        }
        ButtonKind::CtaCopy => {
            if let Some(code) = b.param("copy_code") {
                html.push_str(&format!(
                    "\n\n{}: <code>{}</code>",
                    escape_html(&label),
                    escape_html(code)
                ));
            }
            rows.push(vec![RenderedButton::Callback {
                label,
                data: CallbackAction::Copy(id).encode(),
            }]);
        }
        ButtonKind::CtaCall => {
            html.push_str(&format!(
                "\n\n{}: <code>{}</code>",
                escape_html(&label),
                escape_html(&id)
            ));
            rows.push(vec![RenderedButton::Callback {
                label,
                data: CallbackAction::Call(id).encode(),
            }]);
        }
        ButtonKind::SingleSelect => render_list(&b.params, html, rows),
        ButtonKind::PaymentInfo => {
            let reference = b.param("reference_id").unwrap_or_default().to_string();
            html.push_str(&payment_summary(&b.params));
            let label = b.display_text().unwrap_or("💳 Pagar").to_string();
            rows.push(vec![RenderedButton::Callback {
                label,
                data: CallbackAction::Pay(reference).encode(),
            }]);
        }
    }
}

fn render_list(params: &Value, html: &mut String, rows: &mut Vec<Vec<RenderedButton>>) {
    let sections = params
        .get("sections")
        .and_then(|s| s.as_array())
        .cloned()
        .unwrap_or_default();

    for section in &sections {
        let title = section.get("title").and_then(|t| t.as_str()).unwrap_or("");
        html.push_str("\n\n<b>");
        html.push_str(&escape_html(title));
        html.push_str("</b>");
        if let Some(label) = section.get("highlight_label").and_then(|t| t.as_str()) {
            html.push_str(&format!(" ({})", escape_html(label)));
        }

        let section_rows = section
            .get("rows")
            .and_then(|r| r.as_array())
            .cloned()
            .unwrap_or_default();
        for row in &section_rows {
            let str_field = |k: &str| row.get(k).and_then(|v| v.as_str()).unwrap_or("");
            let row_title = str_field("title");
            let header = str_field("header");
            if !str_field("description").is_empty() {
                html.push_str(&format!(
                    "\n• {}: {}",
                    escape_html(row_title),
                    escape_html(str_field("description"))
                ));
            }
            let label = format!("{header} {row_title}").trim().to_string();
            rows.push(vec![RenderedButton::Callback {
                label,
                data: CallbackAction::ListRow(str_field("id").to_string()).encode(),
            }]);
        }
    }
}

fn payment_summary(params: &Value) -> String {
    let currency = params.get("currency").and_then(|v| v.as_str()).unwrap_or("");
    let amount = params
        .get("total_amount")
        .map(format_amount)
        .unwrap_or_else(|| "0.00".to_string());

    let mut out = format!("\n\n💳 {} {}", escape_html(currency), amount);

    let pix = params
        .get("payment_settings")
        .and_then(|v| v.as_array())
        .into_iter()
        .flatten()
        .find_map(|s| s.get("pix_static_code"));
    if let Some(pix) = pix {
        let merchant = pix.get("merchant_name").and_then(|v| v.as_str()).unwrap_or("");
        let key = pix.get("key").and_then(|v| v.as_str()).unwrap_or("");
        out.push_str(&format!(
            "\nPIX ({}): <code>{}</code>",
            escape_html(merchant),
            escape_html(key)
        ));
    }
    out
}

/// `{ value, offset }` money amount, e.g. `{9990, 100}` → `99.90`.
fn format_amount(v: &Value) -> String {
    let value = v.get("value").and_then(|x| x.as_i64()).unwrap_or(0);
    let offset = v.get("offset").and_then(|x| x.as_i64()).filter(|o| *o > 0).unwrap_or(100);
    format!("{:.2}", value as f64 / offset as f64)
}
