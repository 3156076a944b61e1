//! Rich content rendering.
//!
//! This module provides:
//! - A lenient typed model of the rich document tree
//! - Plain-text and HTML extraction with variable block resolution
//! - Deep `{{placeholder}}` substitution over JSON payloads
//! - Branding-aware device and Teams Adaptive Card builders
//!
//! Everything here is synchronous and pure. Malformed documents degrade to
//! empty output instead of failing.
//!
//! # Example
//!
//! ```ignore
//! let body = Content::from_json(&template.body);
//! let vars = Variables::from_json(&json!({"name": "Ana"}))?;
//!
//! let preview = render_preview(PreviewInput {
//!     title: "Hello {{name}}",
//!     body: &body,
//!     buttons: &[],
//!     variables: &vars,
//!     branding: None,
//! });
//! ```

mod branding;
mod cards;
mod error;
mod html;
mod node;
mod pipeline;
mod placeholder;
mod plain_text;
mod variables;

pub use branding::{button_style, Branding, ButtonKind, ButtonStyle, LogoPlacement};
pub use cards::{device_card, teams_card, CardButton, CardContent};
pub use error::{RenderError, RenderResult};
pub use html::{apply_format, extract_html};
pub use node::{Content, InlineBlock, Node, TextFormat};
pub use pipeline::{collect_buttons, render_preview, Preview, PreviewInput};
pub use placeholder::{placeholder_keys, substitute_placeholders, substitute_str};
pub use plain_text::{collapse_newlines, extract_plain_text};
pub use variables::Variables;
