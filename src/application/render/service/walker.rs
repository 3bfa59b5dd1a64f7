use tracing::warn;

use crate::config::RenderConfig;
use crate::domain::{Annotation, Chunk, EntityKind, Environment, Node, NodeKind};

use super::links::is_linkable;
use super::measure::utf16_len;
use super::table::{cells_of, layout, table_parts};

const INDENT_PER_LEVEL: usize = 2;
const BULLET: &str = "•";

/// Render a sequence of block nodes into one finalized chunk.
pub fn render(nodes: &[Node], environment: &Environment, config: &RenderConfig) -> Chunk {
    let mut walker = EntityWalker::new(config, environment);
    walker.visit_all(nodes);
    walker.finish()
}

#[derive(Debug, Clone, Copy)]
struct Mark {
    byte: usize,
    unit: usize,
}

#[derive(Debug, Clone, Copy)]
struct ListFrame {
    ordered: bool,
    depth: usize,
    next_number: usize,
}

pub(crate) fn item_prefix(
    config: &RenderConfig,
    item: &NodeKind,
    ordered: bool,
    depth: usize,
    number: usize,
) -> String {
    let indent = " ".repeat(depth * INDENT_PER_LEVEL);
    match item {
        NodeKind::TaskListItem { checked } => format!("{indent}{} ", config.checkbox(*checked)),
        _ if ordered => format!("{indent}{number}. "),
        _ => format!("{indent}{BULLET} "),
    }
}

pub(crate) struct EntityWalker<'a> {
    config: &'a RenderConfig,
    environment: &'a Environment,
    text: String,
    offset: usize,
    annotations: Vec<Annotation>,
    lists: Vec<ListFrame>,
    in_list_item: bool,
}

impl<'a> EntityWalker<'a> {
    pub(crate) fn new(config: &'a RenderConfig, environment: &'a Environment) -> Self {
        Self {
            config,
            environment,
            text: String::new(),
            offset: 0,
            annotations: Vec::new(),
            lists: Vec::new(),
            in_list_item: false,
        }
    }

    pub(crate) fn raw_text(&self) -> &str {
        &self.text
    }

    pub(crate) fn units(&self) -> usize {
        self.offset
    }

    pub(crate) fn finish(self) -> Chunk {
        debug_assert_eq!(self.offset, utf16_len(&self.text));
        let text = self.text.trim_end().to_string();
        let limit = utf16_len(&text);
        let annotations = self
            .annotations
            .into_iter()
            .filter(|annotation| {
                let fits = annotation.end() <= limit;
                if !fits {
                    warn!(
                        target = "application::render::walker",
                        kind = annotation.kind.as_str(),
                        offset = annotation.offset,
                        length = annotation.length,
                        text_units = limit,
                        "dropping annotation past end of trimmed text"
                    );
                }
                fits
            })
            .collect();
        Chunk { text, annotations }
    }

    pub(crate) fn visit_all(&mut self, nodes: &[Node]) {
        for node in nodes {
            self.visit(node);
        }
    }

    pub(crate) fn visit(&mut self, node: &Node) {
        match &node.kind {
            NodeKind::Text => self.push(node.raw_str()),
            NodeKind::Emphasis => self.visit_styled(node, EntityKind::Italic),
            NodeKind::Strong => self.visit_styled(node, EntityKind::Bold),
            NodeKind::Strikethrough => self.visit_styled(node, EntityKind::Strikethrough),
            NodeKind::CodeSpan | NodeKind::InlineHtml => self.visit_code_span(node),
            NodeKind::HardBreak | NodeKind::SoftBreak => self.push("\n"),
            NodeKind::Link { url, reference } => self.visit_link(node, url, reference.as_deref()),
            NodeKind::Image { url } => self.visit_image(node, url),
            NodeKind::Paragraph => {
                self.visit_all(&node.children);
                self.push(if self.in_list_item { "\n" } else { "\n\n" });
            }
            NodeKind::BlockText => {
                self.visit_all(&node.children);
                if self.in_list_item {
                    self.push("\n");
                }
            }
            NodeKind::Heading { level, setext } => self.visit_heading(node, *level, *setext),
            NodeKind::ThematicBreak => {
                let rule = self.config.thematic_break();
                self.push(&rule);
                self.push("\n\n");
            }
            NodeKind::CodeBlock { language } => self.visit_preformatted(node, language.clone()),
            NodeKind::HtmlBlock => self.visit_preformatted(node, Some("html".to_string())),
            NodeKind::BlockQuote => self.visit_block_quote(node),
            NodeKind::List {
                ordered,
                depth,
                start,
            } => self.visit_list(node, *ordered, *depth, *start),
            NodeKind::ListItem | NodeKind::TaskListItem { .. } => self.visit_item(node),
            NodeKind::BlankLine => {}
            NodeKind::Table => self.visit_table(node),
            NodeKind::TableHead
            | NodeKind::TableBody
            | NodeKind::TableRow
            | NodeKind::TableCell
            | NodeKind::Other { .. } => {
                if node.children.is_empty() {
                    self.push(node.raw_str());
                } else {
                    self.visit_all(&node.children);
                }
            }
        }
    }

    fn push(&mut self, text: &str) {
        self.text.push_str(text);
        self.offset += utf16_len(text);
    }

    fn mark(&self) -> Mark {
        Mark {
            byte: self.text.len(),
            unit: self.offset,
        }
    }

    /// Closes the span opened at `mark` without its trailing whitespace and
    /// returns that whitespace's length in units. Empty spans are not recorded.
    fn close(&mut self, mark: Mark, annotation: impl FnOnce(usize, usize) -> Annotation) -> usize {
        let span = &self.text[mark.byte..];
        let trailing = utf16_len(&span[span.trim_end().len()..]);
        let length = self.offset - mark.unit - trailing;
        if length > 0 {
            self.annotations.push(annotation(mark.unit, length));
        }
        trailing
    }

    fn visit_styled(&mut self, node: &Node, kind: EntityKind) {
        let mark = self.mark();
        self.visit_all(&node.children);
        self.close(mark, |offset, length| Annotation::new(kind, offset, length));
    }

    fn visit_code_span(&mut self, node: &Node) {
        let raw = node.raw_str();
        if raw.is_empty() {
            return;
        }
        let mark = self.mark();
        self.push(raw);
        self.close(mark, |offset, length| {
            Annotation::new(EntityKind::Code, offset, length)
        });
    }

    fn visit_link(&mut self, node: &Node, url: &str, reference: Option<&str>) {
        let resolved = match (url.trim().is_empty(), reference) {
            (true, Some(label)) => self.environment.resolve(label).unwrap_or_default(),
            _ => url,
        }
        .to_string();

        if resolved.is_empty() {
            self.visit_all(&node.children);
            return;
        }

        if reference.is_some() && !self.config.link_reference.is_empty() {
            let marker = format!("{} ", self.config.link_reference);
            self.push(&marker);
        }

        let mark = self.mark();
        if node.children.is_empty() {
            self.push(&resolved);
        } else {
            self.visit_all(&node.children);
        }

        if is_linkable(&resolved) {
            self.close(mark, |offset, length| {
                Annotation::new(EntityKind::TextLink, offset, length).with_url(resolved)
            });
        }
    }

    fn visit_image(&mut self, node: &Node, url: &str) {
        let alt: String = node
            .children
            .iter()
            .filter(|child| child.kind == NodeKind::Text)
            .map(Node::raw_str)
            .collect();

        if !self.config.image_marker.is_empty() {
            let marker = format!("{} ", self.config.image_marker);
            self.push(&marker);
        }
        if !alt.is_empty() {
            self.push(&alt);
            self.push(" ");
        }
        self.push(&format!("({url})"));
    }

    fn visit_heading(&mut self, node: &Node, level: u8, setext: bool) {
        if setext {
            self.visit_all(&node.children);
            let underline = self.config.setext_underline();
            self.push("\n");
            self.push(&underline);
            self.push("\n\n");
            return;
        }

        let mark = self.mark();
        let marker = self.config.heading_marker(level);
        if !marker.is_empty() {
            let prefix = format!("{marker} ");
            self.push(&prefix);
        }
        self.visit_all(&node.children);
        self.close(mark, |offset, length| {
            Annotation::new(EntityKind::Bold, offset, length)
        });
        self.push("\n\n");
    }

    fn visit_preformatted(&mut self, node: &Node, language: Option<String>) {
        let content = node.raw_str().trim_end();
        if content.is_empty() {
            return;
        }
        let mark = self.mark();
        self.push(content);
        self.close(mark, |offset, length| {
            Annotation::new(EntityKind::Pre, offset, length).with_language(language)
        });
        self.push("\n\n");
    }

    fn visit_block_quote(&mut self, node: &Node) {
        let mark = self.mark();
        self.visit_all(&node.children);
        let trailing = self.close(mark, |offset, length| {
            Annotation::new(EntityKind::Blockquote, offset, length)
        });
        if trailing == 0 {
            self.push("\n\n");
        }
    }

    fn visit_list(&mut self, node: &Node, ordered: bool, depth: usize, start: usize) {
        self.lists.push(ListFrame {
            ordered,
            depth,
            next_number: start,
        });
        self.visit_all(&node.children);
        self.lists.pop();
        self.push("\n");
    }

    fn visit_item(&mut self, node: &Node) {
        let (ordered, depth, number) = match self.lists.last_mut() {
            Some(frame) => {
                let number = frame.next_number;
                frame.next_number += 1;
                (frame.ordered, frame.depth, number)
            }
            None => (false, 0, 1),
        };
        let prefix = item_prefix(self.config, &node.kind, ordered, depth, number);
        self.push(&prefix);

        let outer = std::mem::replace(&mut self.in_list_item, true);
        self.visit_all(&node.children);
        self.in_list_item = outer;

        self.trim_trailing_newlines();
        self.push("\n");
    }

    fn trim_trailing_newlines(&mut self) {
        let kept = self.text.trim_end_matches('\n').len();
        let removed = self.text.len() - kept;
        self.text.truncate(kept);
        self.offset -= removed;
    }

    fn visit_table(&mut self, node: &Node) {
        let parts = table_parts(node);
        let head: Vec<String> = parts
            .head
            .map(|head| {
                cells_of(head)
                    .into_iter()
                    .map(|cell| self.render_cell(cell))
                    .collect()
            })
            .unwrap_or_default();
        let rows: Vec<Vec<String>> = parts
            .rows
            .iter()
            .map(|row| {
                cells_of(row)
                    .into_iter()
                    .map(|cell| self.render_cell(cell))
                    .collect()
            })
            .collect();

        let grid = layout(&head, &rows);
        if grid.is_empty() {
            return;
        }
        let mark = self.mark();
        self.push(&grid);
        self.close(mark, |offset, length| {
            Annotation::new(EntityKind::Pre, offset, length)
        });
        self.push("\n\n");
    }

    fn render_cell(&self, cell: &Node) -> String {
        render_cell(self.config, self.environment, cell)
    }
}

pub(crate) fn render_cell(config: &RenderConfig, environment: &Environment, cell: &Node) -> String {
    let mut walker = EntityWalker::new(config, environment);
    walker.visit_all(&cell.children);
    walker.raw_text().trim().to_string()
}
