//! Notification card payloads: the generic device card and the Teams
//! Adaptive Card.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::branding::{button_style, Branding, ButtonKind, LogoPlacement};
use super::node::InlineBlock;

pub const ADAPTIVE_CARD_SCHEMA: &str = "http://adaptivecards.io/schemas/adaptive-card.json";
pub const ADAPTIVE_CARD_VERSION: &str = "1.4";
pub const DEVICE_CARD_VERSION: u32 = 1;

/// A call-to-action attached to a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardButton {
    pub kind: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl CardButton {
    /// Convert a button block; other block kinds yield `None`.
    pub fn from_block(block: &InlineBlock) -> Option<Self> {
        match block {
            InlineBlock::Button { kind, label, url } => Some(Self {
                kind: kind.clone(),
                label: label.clone(),
                url: url.clone(),
            }),
            _ => None,
        }
    }
}

/// Inputs shared by both card builders.
#[derive(Debug, Clone, Copy)]
pub struct CardContent<'a> {
    pub title: &'a str,
    pub text: &'a str,
    pub buttons: &'a [CardButton],
    pub branding: Option<&'a Branding>,
}

/// Build the generic device card.
pub fn device_card(content: CardContent<'_>) -> Value {
    let empty = Branding::default();
    let branding = content.branding.unwrap_or(&empty);

    let actions: Vec<Value> = content
        .buttons
        .iter()
        .map(|button| {
            let style = button_style(&button.kind, content.branding);
            let mut action = json!({
                "kind": button.kind,
                "label": button.label,
                "style": {
                    "background": style.background,
                    "text": style.text,
                }
            });
            if let Some(url) = &button.url {
                action["url"] = json!(url);
            }
            action
        })
        .collect();

    let mut theme = Map::new();
    theme.insert("primaryColor".into(), json!(branding.primary()));
    theme.insert("backgroundColor".into(), json!(branding.background()));
    theme.insert("textColor".into(), json!(branding.text()));
    theme.insert("fontFamily".into(), json!(branding.font()));
    if let Some(size) = branding.font_size {
        theme.insert("fontSize".into(), json!(size));
    }
    if let Some(spacing) = branding.spacing {
        theme.insert("spacing".into(), json!(spacing));
    }
    if let Some(secondary) = branding.secondary_color.as_deref() {
        theme.insert("secondaryColor".into(), json!(secondary));
    }

    let logo = branding.visible_logo().map(|url| {
        json!({
            "url": url,
            "placement": branding.logo_placement(),
        })
    });

    json!({
        "type": "device-card",
        "version": DEVICE_CARD_VERSION,
        "title": content.title,
        "body": content.text.trim_end(),
        "theme": Value::Object(theme),
        "logo": logo,
        "signature": branding.signature(),
        "actions": actions,
    })
}

/// Build a Teams Adaptive Card.
pub fn teams_card(content: CardContent<'_>) -> Value {
    let empty = Branding::default();
    let branding = content.branding.unwrap_or(&empty);
    let logo = branding.visible_logo();

    let mut body: Vec<Value> = Vec::new();

    if let (Some(url), LogoPlacement::Top) = (logo, branding.logo_placement()) {
        body.push(logo_image(url));
    }

    if !content.title.trim().is_empty() {
        body.push(json!({
            "type": "TextBlock",
            "text": content.title,
            "size": "Large",
            "weight": "Bolder",
            "wrap": true,
        }));
    }

    for paragraph in content
        .text
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
    {
        body.push(json!({
            "type": "TextBlock",
            "text": paragraph,
            "wrap": true,
        }));
    }

    if let Some(signature) = branding.signature() {
        body.push(json!({
            "type": "TextBlock",
            "text": signature,
            "isSubtle": true,
            "spacing": "Medium",
            "wrap": true,
        }));
    }

    if let (Some(url), LogoPlacement::Bottom) = (logo, branding.logo_placement()) {
        body.push(logo_image(url));
    }

    let actions: Vec<Value> = content.buttons.iter().map(teams_action).collect();

    json!({
        "type": "AdaptiveCard",
        "$schema": ADAPTIVE_CARD_SCHEMA,
        "version": ADAPTIVE_CARD_VERSION,
        "body": body,
        "actions": actions,
    })
}

fn logo_image(url: &str) -> Value {
    json!({
        "type": "Image",
        "url": url,
        "size": "Medium",
        "altText": "logo",
    })
}

fn teams_action(button: &CardButton) -> Value {
    let mut action = match &button.url {
        Some(url) => json!({
            "type": "Action.OpenUrl",
            "title": button.label,
            "url": url,
        }),
        None => json!({
            "type": "Action.Submit",
            "title": button.label,
            "data": { "action": button.kind },
        }),
    };

    match ButtonKind::from_kind(&button.kind) {
        ButtonKind::Approve => action["style"] = json!("positive"),
        ButtonKind::Dismiss => action["style"] = json!("destructive"),
        ButtonKind::Other => {}
    }

    action
}
