//! Document tree consumed by the chunking engine.
//!
//! Trees are produced by an external markup parser (see
//! `application::render::parse_markdown` for the bundled adapter) and are
//! only ever read by the engine. Splitting builds new trees out of cloned
//! sub-trees; nothing is mutated in place.

use std::collections::HashMap;

/// Closed set of node kinds, with the attributes each kind carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Text,
    Emphasis,
    Strong,
    Strikethrough,
    CodeSpan,
    /// Raw inline markup, rendered verbatim as inline code.
    InlineHtml,
    HardBreak,
    SoftBreak,
    /// `reference` holds the label of a reference-style link. An empty `url`
    /// is resolved through the [`Environment`] by that label.
    Link {
        url: String,
        reference: Option<String>,
    },
    Image {
        url: String,
    },
    Paragraph,
    Heading {
        level: u8,
        setext: bool,
    },
    ThematicBreak,
    BlockText,
    CodeBlock {
        language: Option<String>,
    },
    HtmlBlock,
    BlockQuote,
    /// `depth` is the 0-based nesting level; `start` the first ordinal.
    List {
        ordered: bool,
        depth: usize,
        start: usize,
    },
    ListItem,
    TaskListItem {
        checked: bool,
    },
    BlankLine,
    Table,
    TableHead,
    TableBody,
    TableRow,
    TableCell,
    /// Anything the engine has no dedicated handling for.
    Other {
        name: String,
    },
}

impl NodeKind {
    pub fn is_list_item(&self) -> bool {
        matches!(self, NodeKind::ListItem | NodeKind::TaskListItem { .. })
    }

    /// Short stable name used in diagnostics.
    pub fn name(&self) -> &str {
        match self {
            NodeKind::Text => "text",
            NodeKind::Emphasis => "emphasis",
            NodeKind::Strong => "strong",
            NodeKind::Strikethrough => "strikethrough",
            NodeKind::CodeSpan => "code_span",
            NodeKind::InlineHtml => "inline_html",
            NodeKind::HardBreak => "hard_break",
            NodeKind::SoftBreak => "soft_break",
            NodeKind::Link { .. } => "link",
            NodeKind::Image { .. } => "image",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Heading { .. } => "heading",
            NodeKind::ThematicBreak => "thematic_break",
            NodeKind::BlockText => "block_text",
            NodeKind::CodeBlock { .. } => "code_block",
            NodeKind::HtmlBlock => "html_block",
            NodeKind::BlockQuote => "block_quote",
            NodeKind::List { .. } => "list",
            NodeKind::ListItem => "list_item",
            NodeKind::TaskListItem { .. } => "task_list_item",
            NodeKind::BlankLine => "blank_line",
            NodeKind::Table => "table",
            NodeKind::TableHead => "table_head",
            NodeKind::TableBody => "table_body",
            NodeKind::TableRow => "table_row",
            NodeKind::TableCell => "table_cell",
            NodeKind::Other { name } => name.as_str(),
        }
    }
}

/// One element of the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    /// Literal text for text, code span, code block and raw markup nodes.
    pub raw: Option<String>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            raw: None,
            children: Vec::new(),
        }
    }

    pub fn with_raw(kind: NodeKind, raw: impl Into<String>) -> Self {
        Self {
            kind,
            raw: Some(raw.into()),
            children: Vec::new(),
        }
    }

    pub fn with_children(kind: NodeKind, children: Vec<Node>) -> Self {
        Self {
            kind,
            raw: None,
            children,
        }
    }

    pub fn text(raw: impl Into<String>) -> Self {
        Self::with_raw(NodeKind::Text, raw)
    }

    pub fn paragraph(children: Vec<Node>) -> Self {
        Self::with_children(NodeKind::Paragraph, children)
    }

    pub fn strong(children: Vec<Node>) -> Self {
        Self::with_children(NodeKind::Strong, children)
    }

    pub fn emphasis(children: Vec<Node>) -> Self {
        Self::with_children(NodeKind::Emphasis, children)
    }

    pub fn code_span(raw: impl Into<String>) -> Self {
        Self::with_raw(NodeKind::CodeSpan, raw)
    }

    pub fn link(url: impl Into<String>, children: Vec<Node>) -> Self {
        Self::with_children(
            NodeKind::Link {
                url: url.into(),
                reference: None,
            },
            children,
        )
    }

    pub fn heading(level: u8, children: Vec<Node>) -> Self {
        Self::with_children(
            NodeKind::Heading {
                level,
                setext: false,
            },
            children,
        )
    }

    pub fn code_block(language: Option<&str>, raw: impl Into<String>) -> Self {
        Self::with_raw(
            NodeKind::CodeBlock {
                language: language.map(str::to_string),
            },
            raw,
        )
    }

    pub fn block_quote(children: Vec<Node>) -> Self {
        Self::with_children(NodeKind::BlockQuote, children)
    }

    pub fn list(ordered: bool, depth: usize, items: Vec<Node>) -> Self {
        Self::with_children(
            NodeKind::List {
                ordered,
                depth,
                start: 1,
            },
            items,
        )
    }

    pub fn list_item(children: Vec<Node>) -> Self {
        Self::with_children(NodeKind::ListItem, children)
    }

    /// Builds a table out of plain-text cells; the first row is the header.
    pub fn table<S: AsRef<str>>(head: &[S], rows: &[Vec<S>]) -> Self {
        let cell = |text: &S| {
            Node::with_children(NodeKind::TableCell, vec![Node::text(text.as_ref())])
        };
        let head = Node::with_children(NodeKind::TableHead, head.iter().map(cell).collect());
        let body = Node::with_children(
            NodeKind::TableBody,
            rows.iter()
                .map(|row| Node::with_children(NodeKind::TableRow, row.iter().map(cell).collect()))
                .collect(),
        );
        Node::with_children(NodeKind::Table, vec![head, body])
    }

    /// Copy of this node with a different set of children.
    pub fn rewrap(&self, children: Vec<Node>) -> Self {
        Self {
            kind: self.kind.clone(),
            raw: self.raw.clone(),
            children,
        }
    }

    /// Copy of this node with a different literal.
    pub fn with_replaced_raw(&self, raw: impl Into<String>) -> Self {
        Self {
            kind: self.kind.clone(),
            raw: Some(raw.into()),
            children: self.children.clone(),
        }
    }

    pub fn raw_str(&self) -> &str {
        self.raw.as_deref().unwrap_or_default()
    }
}

/// Reference-link definitions collected while parsing.
///
/// Every isolated render receives the same environment so a reference link
/// resolves identically whichever chunk it ends up in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    references: HashMap<String, String>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, label: &str, url: impl Into<String>) {
        self.references
            .entry(normalize_label(label))
            .or_insert_with(|| url.into());
    }

    pub fn resolve(&self, label: &str) -> Option<&str> {
        self.references
            .get(&normalize_label(label))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}

/// Labels match case-insensitively with internal whitespace collapsed.
fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
