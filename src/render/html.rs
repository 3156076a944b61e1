//! HTML extraction from rich content.

use htmlescape::encode_minimal;

use super::branding::{button_style, Branding};
use super::node::{Content, InlineBlock, Node, TextFormat};
use super::variables::Variables;

/// Render content to an HTML fragment.
///
/// Variable blocks resolve like in plain text and are inlined without a
/// wrapper element. `branding` only affects button styling.
pub fn extract_html(content: &Content, vars: &Variables, branding: Option<&Branding>) -> String {
    match content {
        Content::Null => String::new(),
        Content::Plain(text) => encode_minimal(text),
        Content::Document(root) => {
            let mut out = String::new();
            HtmlWriter { vars, branding }.write_node(root, &mut out);
            out
        }
    }
}

/// Wrap escaped text in format tags, bold innermost and underline outermost.
pub fn apply_format(text: &str, format: TextFormat) -> String {
    let mut html = encode_minimal(text);
    if format.is_bold() {
        html = format!("<strong>{}</strong>", html);
    }
    if format.is_italic() {
        html = format!("<em>{}</em>", html);
    }
    if format.is_strikethrough() {
        html = format!("<strike>{}</strike>", html);
    }
    if format.is_underline() {
        html = format!("<u>{}</u>", html);
    }
    html
}

struct HtmlWriter<'a> {
    vars: &'a Variables,
    branding: Option<&'a Branding>,
}

impl HtmlWriter<'_> {
    fn write_children(&self, children: &[Node], out: &mut String) {
        for child in children {
            self.write_node(child, out);
        }
    }

    fn wrap(&self, tag: &str, children: &[Node], out: &mut String) {
        out.push('<');
        out.push_str(tag);
        out.push('>');
        self.write_children(children, out);
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }

    fn write_node(&self, node: &Node, out: &mut String) {
        match node {
            Node::Text { text, format } => out.push_str(&apply_format(text, *format)),
            Node::LineBreak => out.push_str("<br>"),
            Node::Tab => out.push('\t'),
            Node::Paragraph { children } => self.wrap("p", children, out),
            Node::Heading { tag, children } => self.wrap(tag, children, out),
            Node::Quote { children } => self.wrap("blockquote", children, out),
            Node::List { ordered, children } => {
                self.wrap(if *ordered { "ol" } else { "ul" }, children, out)
            }
            Node::ListItem { children } => self.wrap("li", children, out),
            Node::Link {
                url: Some(url),
                children,
            } => {
                out.push_str(&format!("<a href=\"{}\">", encode_minimal(url)));
                self.write_children(children, out);
                out.push_str("</a>");
            }
            Node::Block(block) => self.write_block(block, out),
            Node::Root { children }
            | Node::Link { children, .. }
            | Node::Unknown { children } => self.write_children(children, out),
        }
    }

    fn write_block(&self, block: &InlineBlock, out: &mut String) {
        match block {
            InlineBlock::Variable { key: Some(key) } => {
                out.push_str(&encode_minimal(&self.vars.resolve_or_placeholder(key)));
            }
            InlineBlock::Button { kind, label, url } => {
                let style = button_style(kind, self.branding);
                let href = url
                    .as_deref()
                    .map(|u| format!(" href=\"{}\"", encode_minimal(u)))
                    .unwrap_or_default();
                out.push_str(&format!(
                    "<a{} data-kind=\"{}\" style=\"display:inline-block;padding:8px 16px;border-radius:4px;text-decoration:none;background:{};color:{}\">{}</a>",
                    href,
                    encode_minimal(kind),
                    encode_minimal(&style.background),
                    encode_minimal(&style.text),
                    encode_minimal(label),
                ));
            }
            InlineBlock::Image { url, alt } if !url.is_empty() => {
                out.push_str(&format!(
                    "<img src=\"{}\" alt=\"{}\">",
                    encode_minimal(url),
                    encode_minimal(alt.as_deref().unwrap_or_default()),
                ));
            }
            _ => {}
        }
    }
}
