//! Preview pipeline: one rich document in, every output format out.

use serde::Serialize;
use serde_json::Value;

use super::branding::Branding;
use super::cards::{device_card, teams_card, CardButton, CardContent};
use super::html::extract_html;
use super::node::Content;
use super::placeholder::substitute_str;
use super::plain_text::extract_plain_text;
use super::variables::Variables;

/// Everything needed to render one preview.
#[derive(Debug, Clone, Copy)]
pub struct PreviewInput<'a> {
    /// Title, may contain `{{placeholders}}`
    pub title: &'a str,
    pub body: &'a Content,
    /// Buttons declared outside the document body
    pub buttons: &'a [CardButton],
    pub variables: &'a Variables,
    pub branding: Option<&'a Branding>,
}

/// Rendered preview in all supported shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preview {
    pub title: String,
    pub text: String,
    pub html: String,
    pub device: Value,
    pub teams: Value,
}

/// Render a preview. Pure: inputs are only read.
///
/// Every template-sourced string is substituted exactly once, so `title` and
/// `text` agree with the copies embedded in both cards even when a variable
/// value itself contains `{{placeholder}}` text.
pub fn render_preview(input: PreviewInput<'_>) -> Preview {
    let vars = input.variables;
    let title = substitute_str(input.title, vars);
    let text = extract_plain_text(input.body, vars);
    let html = extract_html(input.body, vars, input.branding);
    let buttons = resolve_buttons(&collect_buttons(input.body, input.buttons), vars);
    let branding = input.branding.map(|branding| resolve_branding(branding, vars));

    let cards = CardContent {
        title: &title,
        text: &text,
        buttons: &buttons,
        branding: branding.as_ref(),
    };
    let device = device_card(cards);
    let teams = teams_card(cards);

    Preview {
        title,
        text,
        html,
        device,
        teams,
    }
}

fn resolve_buttons(buttons: &[CardButton], vars: &Variables) -> Vec<CardButton> {
    buttons
        .iter()
        .map(|button| CardButton {
            kind: button.kind.clone(),
            label: substitute_str(&button.label, vars),
            url: button.url.as_deref().map(|url| substitute_str(url, vars)),
        })
        .collect()
}

// Only free-text tokens carry placeholders; colors and fonts pass through.
fn resolve_branding(branding: &Branding, vars: &Variables) -> Branding {
    Branding {
        signature: branding
            .signature
            .as_deref()
            .map(|signature| substitute_str(signature, vars)),
        logo_url: branding
            .logo_url
            .as_deref()
            .map(|url| substitute_str(url, vars)),
        ..branding.clone()
    }
}

/// Buttons embedded in the document first, then declared ones.
pub fn collect_buttons(body: &Content, declared: &[CardButton]) -> Vec<CardButton> {
    let mut buttons: Vec<CardButton> = body
        .document()
        .map(|root| {
            root.buttons()
                .into_iter()
                .filter_map(CardButton::from_block)
                .collect()
        })
        .unwrap_or_default();
    buttons.extend(declared.iter().cloned());
    buttons
}
