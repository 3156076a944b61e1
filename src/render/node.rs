//! Lenient typed model of the rich document tree.
//!
//! Documents arrive as arbitrary JSON. Parsing never fails: unknown node kinds
//! become [`Node::Unknown`] carrying whatever children could be recovered, and
//! missing fields fall back to defaults.

use serde_json::Value;

/// Text format bit flags as stored on `text` nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextFormat(pub u32);

impl TextFormat {
    pub const BOLD: u32 = 1;
    pub const ITALIC: u32 = 2;
    pub const STRIKETHROUGH: u32 = 4;
    pub const UNDERLINE: u32 = 8;
    /// Older documents store underline on this bit.
    pub const UNDERLINE_ALT: u32 = 16;

    pub fn is_bold(self) -> bool {
        self.0 & Self::BOLD != 0
    }

    pub fn is_italic(self) -> bool {
        self.0 & Self::ITALIC != 0
    }

    pub fn is_strikethrough(self) -> bool {
        self.0 & Self::STRIKETHROUGH != 0
    }

    pub fn is_underline(self) -> bool {
        self.0 & (Self::UNDERLINE | Self::UNDERLINE_ALT) != 0
    }
}

/// Inline block embedded in the text flow.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineBlock {
    /// Reference to a named value resolved at render time.
    /// `key` is `None` when the block carries no usable identifier.
    Variable { key: Option<String> },
    /// Call-to-action button.
    Button {
        kind: String,
        label: String,
        url: Option<String>,
    },
    Image { url: String, alt: Option<String> },
    Other { block_type: String },
}

/// A node of the rich document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Root { children: Vec<Node> },
    Paragraph { children: Vec<Node> },
    Heading { tag: String, children: Vec<Node> },
    Quote { children: Vec<Node> },
    List { ordered: bool, children: Vec<Node> },
    ListItem { children: Vec<Node> },
    Link { url: Option<String>, children: Vec<Node> },
    Text { text: String, format: TextFormat },
    LineBreak,
    Tab,
    Block(InlineBlock),
    Unknown { children: Vec<Node> },
}

/// Renderable content: nothing, a bare string, or a document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Null,
    Plain(String),
    Document(Node),
}

impl Content {
    /// Build content from any JSON value.
    ///
    /// `null` yields [`Content::Null`], a string yields [`Content::Plain`],
    /// anything else is parsed as a document. An object with a `root`
    /// property is unwrapped to that root.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Content::Null,
            Value::String(s) => Content::Plain(s.clone()),
            Value::Object(map) => match map.get("root") {
                Some(root) if root.is_object() => Content::Document(Node::parse(root)),
                _ => Content::Document(Node::parse(value)),
            },
            Value::Array(items) => Content::Document(Node::Root {
                children: items.iter().map(Node::parse).collect(),
            }),
            _ => Content::Null,
        }
    }

    /// The document root, if any.
    pub fn document(&self) -> Option<&Node> {
        match self {
            Content::Document(node) => Some(node),
            _ => None,
        }
    }
}

impl Node {
    /// Parse a node from JSON without ever failing.
    pub fn parse(value: &Value) -> Node {
        let Some(obj) = value.as_object() else {
            return match value {
                Value::Array(items) => Node::Unknown {
                    children: items.iter().map(Node::parse).collect(),
                },
                _ => Node::Unknown { children: Vec::new() },
            };
        };

        let node_type = obj.get("type").and_then(Value::as_str).unwrap_or_default();
        let has_block_type = obj
            .get("fields")
            .and_then(|f| f.get("blockType"))
            .is_some();

        match node_type {
            "root" => Node::Root {
                children: parse_children(value),
            },
            "paragraph" => Node::Paragraph {
                children: parse_children(value),
            },
            "heading" => Node::Heading {
                tag: heading_tag(obj.get("tag").and_then(Value::as_str)),
                children: parse_children(value),
            },
            "quote" => Node::Quote {
                children: parse_children(value),
            },
            "list" => Node::List {
                ordered: obj.get("listType").and_then(Value::as_str) == Some("number")
                    || obj.get("tag").and_then(Value::as_str) == Some("ol"),
                children: parse_children(value),
            },
            "listitem" => Node::ListItem {
                children: parse_children(value),
            },
            "link" | "autolink" => Node::Link {
                url: link_url(value),
                children: parse_children(value),
            },
            "text" => Node::Text {
                text: obj
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                format: TextFormat(text_format(obj.get("format"))),
            },
            "linebreak" => Node::LineBreak,
            "tab" => Node::Tab,
            "block" | "inlineBlock" | "upload" => Node::Block(parse_block(value)),
            _ if has_block_type => Node::Block(parse_block(value)),
            _ => Node::Unknown {
                children: fallback_children(value),
            },
        }
    }

    /// Direct children of this node.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Root { children }
            | Node::Paragraph { children }
            | Node::Heading { children, .. }
            | Node::Quote { children }
            | Node::List { children, .. }
            | Node::ListItem { children }
            | Node::Link { children, .. }
            | Node::Unknown { children } => children,
            Node::Text { .. } | Node::LineBreak | Node::Tab | Node::Block(_) => &[],
        }
    }

    /// Pre-order walk over every node.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// All button blocks in document order.
    pub fn buttons(&self) -> Vec<&InlineBlock> {
        let mut found = Vec::new();
        self.walk(&mut |node| {
            if let Node::Block(block @ InlineBlock::Button { .. }) = node {
                found.push(block);
            }
        });
        found
    }

    /// All variable keys referenced in the document, in order, deduplicated.
    pub fn variable_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        self.walk(&mut |node| {
            if let Node::Block(InlineBlock::Variable { key: Some(key) }) = node {
                if !keys.contains(key) {
                    keys.push(key.clone());
                }
            }
        });
        keys
    }
}

fn parse_children(value: &Value) -> Vec<Node> {
    value
        .get("children")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(Node::parse).collect())
        .unwrap_or_default()
}

// Trees produced by different editors nest content under different keys.
fn fallback_children(value: &Value) -> Vec<Node> {
    if let Some(items) = value.get("children").and_then(Value::as_array) {
        return items.iter().map(Node::parse).collect();
    }
    for key in ["root", "body", "fields"] {
        if let Some(nested) = value.get(key) {
            if nested.is_object() || nested.is_array() {
                return vec![Node::parse(nested)];
            }
        }
    }
    Vec::new()
}

fn heading_tag(tag: Option<&str>) -> String {
    match tag {
        Some(t @ ("h1" | "h2" | "h3" | "h4" | "h5" | "h6")) => t.to_string(),
        _ => "h2".to_string(),
    }
}

fn text_format(format: Option<&Value>) -> u32 {
    match format {
        Some(Value::Number(n)) => n.as_u64().map(|v| v as u32).unwrap_or(0),
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

fn link_url(value: &Value) -> Option<String> {
    value
        .get("fields")
        .and_then(|f| f.get("url"))
        .or_else(|| value.get("url"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn non_empty_str<'a>(value: Option<&'a Value>) -> Option<&'a str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn parse_block(value: &Value) -> InlineBlock {
    let fields = value.get("fields").unwrap_or(value);
    let block_type = fields
        .get("blockType")
        .or_else(|| value.get("blockType"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    match block_type {
        "var" | "variable" => InlineBlock::Variable {
            key: variable_key(fields),
        },
        "button" | "cta" | "action" => {
            let kind = non_empty_str(fields.get("kind"))
                .or_else(|| non_empty_str(fields.get("action")))
                .unwrap_or("default")
                .to_string();
            let label = non_empty_str(fields.get("label"))
                .or_else(|| non_empty_str(fields.get("text")))
                .map(str::to_string)
                .unwrap_or_else(|| kind.clone());
            InlineBlock::Button {
                kind,
                label,
                url: non_empty_str(fields.get("url")).map(str::to_string),
            }
        }
        "image" | "media" => image_block(fields),
        _ if value.get("type").and_then(Value::as_str) == Some("upload") => image_block(value),
        other => InlineBlock::Other {
            block_type: other.to_string(),
        },
    }
}

fn image_block(fields: &Value) -> InlineBlock {
    let media = fields
        .get("image")
        .or_else(|| fields.get("value"))
        .unwrap_or(fields);
    let url = non_empty_str(media.get("url"))
        .or_else(|| non_empty_str(fields.get("url")))
        .unwrap_or_default()
        .to_string();
    let alt = non_empty_str(media.get("alt"))
        .or_else(|| non_empty_str(fields.get("alt")))
        .map(str::to_string);
    InlineBlock::Image { url, alt }
}

fn variable_key(fields: &Value) -> Option<String> {
    let variable = fields.get("variable");
    let from_variable = match variable {
        Some(Value::Object(_)) => non_empty_str(variable.and_then(|v| v.get("key")))
            .or_else(|| non_empty_str(variable.and_then(|v| v.get("name")))),
        Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
        _ => None,
    };

    from_variable
        .or_else(|| non_empty_str(fields.get("key")))
        .or_else(|| non_empty_str(fields.get("name")))
        .map(str::to_string)
}
