use comrak::{
    Arena,
    nodes::{AstNode, ListType, NodeValue, Sourcepos},
    options::Options,
    parse_document,
};
use tracing::debug;

use crate::domain::{Environment, Node, NodeKind};

use super::config::default_options;

/// Parsed markdown: top-level blocks plus the reference-link table they use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub blocks: Vec<Node>,
    pub environment: Environment,
}

/// Parse markdown with the chunker's default extension set.
pub fn parse_markdown(markdown: &str) -> Document {
    parse_with(markdown, &default_options())
}

pub(crate) fn parse_with(markdown: &str, options: &Options<'static>) -> Document {
    let source = normalize_line_endings(markdown);
    let arena = Arena::new();
    let root = parse_document(&arena, &source, options);

    let mut builder = TreeBuilder::new(&source);
    let blocks = builder.children(root, 0);
    debug!(
        target = "application::render::parse",
        blocks = blocks.len(),
        references = builder.environment.len(),
        "parsed markdown"
    );

    Document {
        blocks,
        environment: builder.environment,
    }
}

fn normalize_line_endings(markdown: &str) -> String {
    let mut text = markdown.replace("\r\n", "\n").replace('\r', "\n");
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

struct TreeBuilder<'s> {
    lines: Vec<&'s str>,
    environment: Environment,
}

impl<'s> TreeBuilder<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            lines: source.split('\n').collect(),
            environment: Environment::new(),
        }
    }

    fn children<'a>(&mut self, node: &'a AstNode<'a>, depth: usize) -> Vec<Node> {
        node.children()
            .map(|child| self.convert(child, depth))
            .collect()
    }

    fn convert<'a>(&mut self, node: &'a AstNode<'a>, depth: usize) -> Node {
        let (kind, raw) = {
            let data = node.data.borrow();
            let sourcepos = data.sourcepos;
            match &data.value {
                NodeValue::Paragraph => (NodeKind::Paragraph, None),
                NodeValue::Heading(heading) => (
                    NodeKind::Heading {
                        level: heading.level,
                        setext: heading.setext,
                    },
                    None,
                ),
                NodeValue::ThematicBreak => (NodeKind::ThematicBreak, None),
                NodeValue::CodeBlock(block) => (
                    NodeKind::CodeBlock {
                        language: block.info.split_whitespace().next().map(str::to_string),
                    },
                    Some(block.literal.clone()),
                ),
                NodeValue::HtmlBlock(block) => (NodeKind::HtmlBlock, Some(block.literal.clone())),
                NodeValue::BlockQuote => (NodeKind::BlockQuote, None),
                NodeValue::List(list) => (
                    NodeKind::List {
                        ordered: list.list_type == ListType::Ordered,
                        depth,
                        start: list.start,
                    },
                    None,
                ),
                NodeValue::Item(_) => (NodeKind::ListItem, None),
                NodeValue::TaskItem(item) => (
                    NodeKind::TaskListItem {
                        checked: item.symbol.is_some(),
                    },
                    None,
                ),
                NodeValue::Table(..) => (NodeKind::Table, None),
                NodeValue::TableRow(_) => (NodeKind::TableRow, None),
                NodeValue::TableCell => (NodeKind::TableCell, None),
                NodeValue::Text(text) => (NodeKind::Text, Some(text.to_string())),
                NodeValue::Code(code) => (NodeKind::CodeSpan, Some(code.literal.clone())),
                NodeValue::HtmlInline(html) => (NodeKind::InlineHtml, Some(html.clone())),
                NodeValue::SoftBreak => (NodeKind::SoftBreak, None),
                NodeValue::LineBreak => (NodeKind::HardBreak, None),
                NodeValue::Emph => (NodeKind::Emphasis, None),
                NodeValue::Strong => (NodeKind::Strong, None),
                NodeValue::Strikethrough => (NodeKind::Strikethrough, None),
                NodeValue::Link(link) => {
                    let reference = self.reference_label(sourcepos);
                    if let Some(label) = reference.as_deref() {
                        if !link.url.is_empty() {
                            self.environment.define(label, link.url.clone());
                        }
                    }
                    (
                        NodeKind::Link {
                            url: link.url.clone(),
                            reference,
                        },
                        None,
                    )
                }
                NodeValue::Image(link) => (
                    NodeKind::Image {
                        url: link.url.clone(),
                    },
                    None,
                ),
                _ => (
                    NodeKind::Other {
                        name: "unsupported".to_string(),
                    },
                    node.first_child()
                        .is_none()
                        .then(|| self.source(sourcepos))
                        .flatten(),
                ),
            }
        };

        match kind {
            NodeKind::Table => self.table(node, depth),
            NodeKind::List { .. } => {
                let children = self.children(node, depth + 1);
                Node { kind, raw, children }
            }
            _ => {
                let children = self.children(node, depth);
                Node { kind, raw, children }
            }
        }
    }

    fn table<'a>(&mut self, node: &'a AstNode<'a>, depth: usize) -> Node {
        let mut head = None;
        let mut rows = Vec::new();
        for row in node.children() {
            let is_header = matches!(row.data.borrow().value, NodeValue::TableRow(true));
            let cells = self.children(row, depth);
            if is_header && head.is_none() {
                head = Some(Node::with_children(NodeKind::TableHead, cells));
            } else {
                rows.push(Node::with_children(NodeKind::TableRow, cells));
            }
        }

        let mut children = Vec::with_capacity(2);
        children.extend(head);
        children.push(Node::with_children(NodeKind::TableBody, rows));
        Node::with_children(NodeKind::Table, children)
    }

    /// Source text covered by `pos`; columns are 1-based, end inclusive.
    fn source(&self, pos: Sourcepos) -> Option<String> {
        let (start, end) = (pos.start, pos.end);
        if start.line == 0 || end.line < start.line {
            return None;
        }
        let first = self.lines.get(start.line - 1)?;
        let from = start.column.checked_sub(1)?;
        if start.line == end.line {
            return first
                .get(from..end.column.min(first.len()))
                .map(str::to_string);
        }

        let mut text = first.get(from..)?.to_string();
        for line in self.lines.get(start.line..end.line - 1)? {
            text.push('\n');
            text.push_str(line);
        }
        let last = self.lines.get(end.line - 1)?;
        text.push('\n');
        text.push_str(last.get(..end.column.min(last.len()))?);
        Some(text)
    }

    /// Label of a reference-style link (`[text][label]`, `[text][]` or
    /// `[label]`), judged from its source. Inline links end with `)` and
    /// autolinks with `>` or the URL itself.
    fn reference_label(&self, pos: Sourcepos) -> Option<String> {
        let source = self.source(pos)?;
        let source = source.trim_end();
        let inner = source.strip_prefix('[')?.strip_suffix(']')?;
        let label = match inner.rfind("][") {
            Some(split) if !inner[split + 2..].trim().is_empty() => &inner[split + 2..],
            Some(split) => &inner[..split],
            None => inner,
        };
        Some(label.to_string())
    }
}
