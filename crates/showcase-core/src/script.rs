//! The scripted ten-step demonstration sequence.
//!
//! Content is illustrative; each step is a self-contained outbound payload and
//! the order only matters for the narrative.

use serde_json::json;

use crate::messaging::types::{ButtonKind, Card, InteractiveButton, OutboundPayload};

pub const DEFAULT_FOOTER: &str = "Powered By FlowChatv2";
pub const PAYMENT_REFERENCE_PREFIX: &str = "FLOWCHAT";

const SITE_URL: &str = "https://flowchat.com";
const PIX_KEY: &str = "pagamentos@flowchat.com";
const PIX_COPY_PASTE_CODE: &str = "00020126580014br.gov.bcb.pix0136pagamentos@flowchat.com5204000053039865802BR5913FlowChat Ltda6008Sao Paulo62140510PGTO00001";

#[derive(Clone, Debug)]
pub struct ScriptOptions {
    pub footer: String,
    /// Millisecond clock reading used to build the payment reference id.
    pub reference_millis: u64,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            footer: DEFAULT_FOOTER.to_string(),
            reference_millis: crate::utils::now_ms(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScriptStep {
    pub name: &'static str,
    pub payload: OutboundPayload,
}

/// Builds a fresh script each time the sequence fires.
pub type ScriptFactory = Box<dyn Fn() -> Vec<ScriptStep> + Send + Sync>;

/// The ten demonstration payloads, in narrative order.
pub fn demo_script(opts: &ScriptOptions) -> Vec<ScriptStep> {
    let footer = Some(opts.footer.clone());
    let buttons = |text: &str, buttons: Vec<InteractiveButton>| OutboundPayload::Buttons {
        text: text.to_string(),
        footer: footer.clone(),
        buttons,
    };

    vec![
        ScriptStep {
            name: "quick reply",
            payload: buttons(
                "🔘 *1. QUICK REPLY*\n\nBotoes de resposta rapida:",
                vec![
                    InteractiveButton::quick_reply("👍 Curtir", "like"),
                    InteractiveButton::quick_reply("👎 Nao Curtir", "dislike"),
                    InteractiveButton::quick_reply("💬 Comentar", "comment"),
                ],
            ),
        },
        ScriptStep {
            name: "cta url",
            payload: buttons(
                "🌐 *2. CTA URL*\n\nBotao que abre link:",
                vec![InteractiveButton::new(
                    ButtonKind::CtaUrl,
                    json!({ "display_text": "🔗 Abrir Site", "url": SITE_URL, "merchant_url": SITE_URL }),
                )],
            ),
        },
        ScriptStep {
            name: "cta copy",
            payload: buttons(
                "📋 *3. CTA COPY*\n\nBotao que copia texto:",
                vec![copy_button("📋 Copiar Codigo", "123456789", "FLOWCHAT2024")],
            ),
        },
        ScriptStep {
            name: "cta call",
            payload: buttons(
                "📞 *4. CTA CALL*\n\nBotao de ligacao:",
                vec![InteractiveButton::new(
                    ButtonKind::CtaCall,
                    json!({ "display_text": "📞 Ligar Agora", "id": "+5511999999999" }),
                )],
            ),
        },
        ScriptStep {
            name: "single select",
            payload: buttons(
                "📋 *5. SINGLE SELECT*\n\nLista de opcoes:",
                vec![menu_list()],
            ),
        },
        ScriptStep {
            name: "mixed buttons",
            payload: buttons(
                "🎯 *6. MIX DE BOTOES*\n\nVarios tipos juntos:",
                vec![
                    InteractiveButton::quick_reply("💬 Responder", "reply"),
                    url_button("🔗 Site", SITE_URL),
                    copy_button("📋 Copiar", "copy1", "CODIGO123"),
                ],
            ),
        },
        ScriptStep {
            name: "carousel",
            payload: OutboundPayload::Carousel {
                text: "🎠 *7. CAROUSEL*\n\nCards com imagens:".to_string(),
                footer: footer.clone(),
                cards: vec![
                    card(
                        1,
                        "Produto destaque do mes",
                        InteractiveButton::quick_reply("Selecionar Card 1", "card1"),
                        &opts.footer,
                    ),
                    card(
                        2,
                        "Oferta especial da semana",
                        InteractiveButton::quick_reply("Selecionar Card 2", "card2"),
                        &opts.footer,
                    ),
                    card(3, "Lancamento exclusivo", url_button("Ver Mais", SITE_URL), &opts.footer),
                ],
            },
        },
        ScriptStep {
            name: "pix payment",
            payload: buttons(
                &format!(
                    "💰 *8. PAGAMENTO PIX*\n\n\
                     Faca seu pagamento via PIX:\n\n\
                     👤 *Nome:* FlowChat Ltda\n\
                     🏦 *Banco:* Nubank\n\
                     🔑 *Chave PIX:* {PIX_KEY}\n\
                     💵 *Valor:* R$ 99,90\n\n\
                     Clique no botao abaixo para copiar a chave PIX:"
                ),
                vec![
                    copy_button("📋 Copiar Chave PIX", "pix_key", PIX_KEY),
                    InteractiveButton::quick_reply("✅ Ja fiz o pagamento", "pix_done"),
                    InteractiveButton::quick_reply("❓ Preciso de ajuda", "pix_help"),
                ],
            ),
        },
        ScriptStep {
            name: "pix copy and paste",
            payload: buttons(
                &format!(
                    "📱 *9. PIX COPIA E COLA*\n\n\
                     Use o codigo abaixo para pagar:\n\n\
                     ```{PIX_COPY_PASTE_CODE}```\n\n\
                     Ou copie clicando no botao:"
                ),
                vec![copy_button("📋 Copiar Codigo PIX", "pix_code", PIX_COPY_PASTE_CODE)],
            ),
        },
        ScriptStep {
            name: "native pix",
            payload: buttons(
                "💳 *10. PIX NATIVO*\n\nBotao de pagamento PIX:",
                vec![payment_request(opts.reference_millis)],
            ),
        },
    ]
}

fn url_button(display_text: &str, url: &str) -> InteractiveButton {
    InteractiveButton::new(
        ButtonKind::CtaUrl,
        json!({ "display_text": display_text, "url": url }),
    )
}

fn copy_button(display_text: &str, id: &str, copy_code: &str) -> InteractiveButton {
    InteractiveButton::new(
        ButtonKind::CtaCopy,
        json!({ "display_text": display_text, "id": id, "copy_code": copy_code }),
    )
}

fn card(n: u32, caption: &str, button: InteractiveButton, footer: &str) -> Card {
    Card {
        title: format!("Card {n}"),
        image_url: Some(format!("https://picsum.photos/400/300?random={n}")),
        caption: Some(caption.to_string()),
        footer: Some(footer.to_string()),
        buttons: vec![button],
    }
}

fn menu_list() -> InteractiveButton {
    InteractiveButton::new(
        ButtonKind::SingleSelect,
        json!({
            "title": "Ver Menu",
            "sections": [
                {
                    "title": "🍔 Comidas",
                    "highlight_label": "Popular",
                    "rows": [
                        { "header": "🍕", "title": "Pizza", "description": "Pizza deliciosa", "id": "pizza" },
                        { "header": "🍔", "title": "Hamburguer", "description": "Hamburguer suculento", "id": "hamburguer" },
                        { "header": "🌮", "title": "Taco", "description": "Taco mexicano", "id": "taco" }
                    ]
                },
                {
                    "title": "🍹 Bebidas",
                    "rows": [
                        { "header": "🥤", "title": "Refrigerante", "description": "Coca, Pepsi, etc", "id": "refri" },
                        { "header": "🧃", "title": "Suco", "description": "Suco natural", "id": "suco" }
                    ]
                }
            ]
        }),
    )
}

fn payment_request(reference_millis: u64) -> InteractiveButton {
    let zero = json!({ "value": 0, "offset": 100 });
    InteractiveButton::new(
        ButtonKind::PaymentInfo,
        json!({
            "currency": "BRL",
            "total_amount": zero,
            "reference_id": format!("{PAYMENT_REFERENCE_PREFIX}{reference_millis}"),
            "type": "physical-goods",
            "order": {
                "status": "pending",
                "subtotal": zero,
                "order_type": "ORDER",
                "items": [{
                    "name": "",
                    "amount": zero,
                    "quantity": 0,
                    "sale_amount": zero
                }]
            },
            "payment_settings": [{
                "type": "pix_static_code",
                "pix_static_code": {
                    "merchant_name": "FlowChat",
                    "key": PIX_KEY,
                    "key_type": "EMAIL"
                }
            }],
            "share_payment_status": false,
            "referral": "chat_attachment"
        }),
    )
}
