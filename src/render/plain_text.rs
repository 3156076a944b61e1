//! Plain-text extraction from rich content.

use lazy_static::lazy_static;
use regex::Regex;

use super::node::{Content, InlineBlock, Node};
use super::variables::Variables;

lazy_static! {
    static ref EXCESS_NEWLINES: Regex = Regex::new(r"\n{3,}").unwrap();
}

/// Extract plain text from content, resolving variable blocks against `vars`.
///
/// Literal `{{key}}` sequences inside text nodes are emitted verbatim; only
/// variable blocks are substituted.
pub fn extract_plain_text(content: &Content, vars: &Variables) -> String {
    match content {
        Content::Null => String::new(),
        Content::Plain(text) => text.clone(),
        Content::Document(root) => {
            let mut out = String::new();
            write_node(root, vars, &mut out);
            collapse_newlines(&out)
        }
    }
}

/// Collapse runs of three or more newlines to exactly two.
pub fn collapse_newlines(text: &str) -> String {
    EXCESS_NEWLINES.replace_all(text, "\n\n").into_owned()
}

fn write_children(children: &[Node], vars: &Variables, out: &mut String) {
    for child in children {
        write_node(child, vars, out);
    }
}

fn write_node(node: &Node, vars: &Variables, out: &mut String) {
    match node {
        Node::Text { text, .. } => out.push_str(text),
        Node::LineBreak => out.push('\n'),
        Node::Tab => out.push('\t'),
        Node::Paragraph { children }
        | Node::Heading { children, .. }
        | Node::Quote { children } => {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            write_children(children, vars, out);
            out.push('\n');
        }
        Node::List { children, .. } => {
            write_children(children, vars, out);
            out.push('\n');
        }
        Node::ListItem { children } => {
            out.push_str("- ");
            write_children(children, vars, out);
            out.push('\n');
        }
        Node::Block(InlineBlock::Variable { key: Some(key) }) => {
            out.push_str(&vars.resolve_or_placeholder(key));
        }
        Node::Block(_) => {}
        Node::Root { children } | Node::Link { children, .. } | Node::Unknown { children } => {
            write_children(children, vars, out)
        }
    }
}
