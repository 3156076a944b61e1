//! Branding tokens and button style resolution.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PRIMARY_COLOR: &str = "#0F62FE";
pub const DEFAULT_BUTTON_TEXT_COLOR: &str = "#FFFFFF";
pub const DEFAULT_APPROVE_BACKGROUND: &str = "#2E7D32";
pub const DEFAULT_APPROVE_TEXT: &str = "#FFFFFF";
pub const DEFAULT_DISMISS_BACKGROUND: &str = "#E0E0E0";
pub const DEFAULT_DISMISS_TEXT: &str = "#212121";
pub const DEFAULT_BACKGROUND_COLOR: &str = "#FFFFFF";
pub const DEFAULT_TEXT_COLOR: &str = "#1F2937";
pub const DEFAULT_FONT_FAMILY: &str = "Segoe UI, Helvetica, Arial, sans-serif";

/// Where the logo is drawn on a card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogoPlacement {
    #[default]
    Top,
    Bottom,
    Hidden,
}

/// Flat bundle of optional style tokens.
///
/// Every token is optional; consumers fall back to the defaults above.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Branding {
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub font_family: Option<String>,
    pub font_size: Option<u32>,
    pub spacing: Option<u32>,
    pub logo_url: Option<String>,
    pub logo_placement: Option<LogoPlacement>,
    pub signature: Option<String>,
    pub approve_button_color: Option<String>,
    pub approve_button_text_color: Option<String>,
    pub dismiss_button_color: Option<String>,
    pub dismiss_button_text_color: Option<String>,
}

/// Resolved colors for a button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonStyle {
    pub background: String,
    pub text: String,
}

/// Well-known button kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    Approve,
    Dismiss,
    Other,
}

impl ButtonKind {
    pub fn from_kind(kind: &str) -> Self {
        match kind.to_ascii_lowercase().as_str() {
            "approve" | "accept" | "confirm" => ButtonKind::Approve,
            "dismiss" | "decline" | "reject" | "cancel" => ButtonKind::Dismiss,
            _ => ButtonKind::Other,
        }
    }
}

fn token_or(token: Option<&String>, default: &str) -> String {
    token
        .map(String::as_str)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default)
        .to_string()
}

impl Branding {
    pub fn primary(&self) -> String {
        token_or(self.primary_color.as_ref(), DEFAULT_PRIMARY_COLOR)
    }

    pub fn background(&self) -> String {
        token_or(self.background_color.as_ref(), DEFAULT_BACKGROUND_COLOR)
    }

    pub fn text(&self) -> String {
        token_or(self.text_color.as_ref(), DEFAULT_TEXT_COLOR)
    }

    pub fn font(&self) -> String {
        token_or(self.font_family.as_ref(), DEFAULT_FONT_FAMILY)
    }

    pub fn logo_placement(&self) -> LogoPlacement {
        self.logo_placement.unwrap_or_default()
    }

    /// Logo URL when one is set and placement is not hidden.
    pub fn visible_logo(&self) -> Option<&str> {
        if self.logo_placement() == LogoPlacement::Hidden {
            return None;
        }
        self.logo_url.as_deref().filter(|url| !url.trim().is_empty())
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Resolve the style for a button `kind`, with hardcoded defaults when
/// no branding is supplied or the token is unset.
pub fn button_style(kind: &str, branding: Option<&Branding>) -> ButtonStyle {
    let empty = Branding::default();
    let branding = branding.unwrap_or(&empty);

    match ButtonKind::from_kind(kind) {
        ButtonKind::Approve => ButtonStyle {
            background: token_or(
                branding.approve_button_color.as_ref(),
                DEFAULT_APPROVE_BACKGROUND,
            ),
            text: token_or(
                branding.approve_button_text_color.as_ref(),
                DEFAULT_APPROVE_TEXT,
            ),
        },
        ButtonKind::Dismiss => ButtonStyle {
            background: token_or(
                branding.dismiss_button_color.as_ref(),
                DEFAULT_DISMISS_BACKGROUND,
            ),
            text: token_or(
                branding.dismiss_button_text_color.as_ref(),
                DEFAULT_DISMISS_TEXT,
            ),
        },
        ButtonKind::Other => ButtonStyle {
            background: branding.primary(),
            text: DEFAULT_BUTTON_TEXT_COLOR.to_string(),
        },
    }
}
