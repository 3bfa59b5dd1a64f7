use std::mem;

use tracing::debug;

use crate::domain::{Node, NodeKind};

use super::estimate::{Estimator, with_start};
use super::measure::{split_units, utf16_len};
use super::table::{cells_of, layout, table_parts};
use super::walker::{item_prefix, render_cell};

pub(crate) struct Splitter<'a> {
    estimator: Estimator<'a>,
}

impl<'a> Splitter<'a> {
    pub(crate) fn new(estimator: Estimator<'a>) -> Self {
        Self { estimator }
    }

    /// Pieces of `node` in document order. Each piece renders within
    /// `budget` unless it is a kind with no finer decomposition.
    pub(crate) fn split_block(&self, node: &Node, budget: usize) -> Vec<Node> {
        let size = self.estimator.node(node);
        if size <= budget {
            return vec![node.clone()];
        }

        let pieces = match &node.kind {
            NodeKind::CodeBlock { .. } | NodeKind::HtmlBlock => self.split_code(node, budget),
            NodeKind::Paragraph | NodeKind::BlockText | NodeKind::Heading { .. } => {
                self.split_inline_container(node, budget)
            }
            NodeKind::List { .. } => self.split_list(node, budget),
            NodeKind::BlockQuote => self.split_quote(node, budget),
            NodeKind::Table => self.split_table(node, budget),
            _ => vec![node.clone()],
        };

        debug!(
            target = "application::render::split",
            kind = node.kind.name(),
            size,
            budget,
            pieces = pieces.len(),
            "decomposed oversized block"
        );
        pieces
    }

    fn split_code(&self, node: &Node, budget: usize) -> Vec<Node> {
        let limit = shrink(budget, 2);
        let content = node.raw_str().trim_end_matches('\n');

        let mut pieces = Vec::new();
        let mut lines: Vec<&str> = Vec::new();
        let mut size = 0;

        for line in content.split('\n') {
            let width = utf16_len(line);
            if width > limit {
                flush_code(node, &mut lines, &mut pieces);
                size = 0;
                pieces.extend(
                    split_units(line, limit)
                        .into_iter()
                        .map(|part| node.with_replaced_raw(format!("{part}\n"))),
                );
                continue;
            }

            if !lines.is_empty() && size + 1 + width > limit {
                flush_code(node, &mut lines, &mut pieces);
                size = 0;
            }
            size += width + usize::from(!lines.is_empty());
            lines.push(line);
        }
        flush_code(node, &mut lines, &mut pieces);
        pieces
    }

    fn split_inline_container(&self, node: &Node, budget: usize) -> Vec<Node> {
        let overhead = self.estimator.node(&node.rewrap(Vec::new()));
        let limit = shrink(budget, overhead);
        self.group(&node.children, limit, |child, limit| {
            self.split_inline(child, limit)
        })
        .into_iter()
        .map(|group| node.rewrap(group))
        .collect()
    }

    fn split_inline(&self, node: &Node, limit: usize) -> Vec<Node> {
        if self.estimator.node(node) <= limit {
            return vec![node.clone()];
        }

        match &node.kind {
            NodeKind::Image { .. } | NodeKind::HardBreak | NodeKind::SoftBreak => {
                vec![node.clone()]
            }
            _ if node.children.is_empty() => match node.raw.as_deref() {
                Some(raw) => split_units(raw, limit)
                    .into_iter()
                    .map(|part| node.with_replaced_raw(part))
                    .collect(),
                None => vec![node.clone()],
            },
            _ => {
                let overhead = self.estimator.node(&node.rewrap(vec![Node::text("")]));
                let inner = shrink(limit, overhead);
                self.group(&node.children, inner, |child, limit| {
                    self.split_inline(child, limit)
                })
                .into_iter()
                .map(|group| node.rewrap(group))
                .collect()
            }
        }
    }

    fn split_list(&self, node: &Node, budget: usize) -> Vec<Node> {
        let NodeKind::List { start, .. } = node.kind else {
            return vec![node.clone()];
        };
        let limit = shrink(budget, 1);

        let mut fragments = Vec::new();
        let mut current = Vec::new();
        let mut first = start;
        let mut size = 0;

        for (index, item) in node.children.iter().enumerate() {
            let number = start + index;
            let width = self.estimator.list_item(node, item, number);

            if width > limit {
                if !current.is_empty() {
                    fragments.push(with_start(node, mem::take(&mut current), first));
                    size = 0;
                }
                fragments.extend(
                    self.split_item(node, item, number, limit)
                        .into_iter()
                        .map(|piece| with_start(node, vec![piece], number)),
                );
                continue;
            }

            if !current.is_empty() && size + width > limit {
                fragments.push(with_start(node, mem::take(&mut current), first));
                size = 0;
            }
            if current.is_empty() {
                first = number;
            }
            current.push(item.clone());
            size += width;
        }

        if !current.is_empty() {
            fragments.push(with_start(node, current, first));
        }
        fragments
    }

    fn split_item(&self, list: &Node, item: &Node, number: usize, limit: usize) -> Vec<Node> {
        debug_assert!(item.kind.is_list_item(), "list children must be items");
        if item.children.is_empty() {
            return vec![item.clone()];
        }
        let (ordered, depth) = match list.kind {
            NodeKind::List { ordered, depth, .. } => (ordered, depth),
            _ => (false, 0),
        };
        let prefix = item_prefix(self.estimator.config, &item.kind, ordered, depth, number);
        let inner = shrink(limit, utf16_len(&prefix) + 1);

        self.group(&item.children, inner, |child, limit| {
            self.split_block(child, limit)
        })
        .into_iter()
        .map(|group| item.rewrap(group))
        .collect()
    }

    fn split_quote(&self, node: &Node, budget: usize) -> Vec<Node> {
        if node.children.is_empty() {
            return vec![node.clone()];
        }
        let overhead = self.estimator.node(&node.rewrap(Vec::new()));
        let limit = shrink(budget, overhead);
        self.group(&node.children, limit, |child, limit| {
            self.split_block(child, limit)
        })
        .into_iter()
        .map(|group| node.rewrap(group))
        .collect()
    }

    // Column widths depend on every row, so each tentative row re-measures
    // the whole table.
    fn split_table(&self, node: &Node, budget: usize) -> Vec<Node> {
        let parts = table_parts(node);
        let Some(head) = parts.head else {
            return vec![node.clone()];
        };
        if parts.rows.is_empty() {
            return vec![node.clone()];
        }

        let config = self.estimator.config;
        let environment = self.estimator.environment;
        let head_cells: Vec<String> = cells_of(head)
            .into_iter()
            .map(|cell| render_cell(config, environment, cell))
            .collect();
        let row_cells: Vec<Vec<String>> = parts
            .rows
            .iter()
            .map(|row| {
                cells_of(row)
                    .into_iter()
                    .map(|cell| render_cell(config, environment, cell))
                    .collect()
            })
            .collect();

        let fits = |rows: &[Vec<String>]| utf16_len(&layout(&head_cells, rows)) + 2 <= budget;
        let fragment = |rows: &[&Node]| {
            let body = Node::with_children(
                NodeKind::TableBody,
                rows.iter().map(|row| (*row).clone()).collect(),
            );
            node.rewrap(vec![head.clone(), body])
        };

        let mut fragments = Vec::new();
        let mut start = 0;
        for index in 0..row_cells.len() {
            if fits(&row_cells[start..=index]) {
                continue;
            }
            if start < index {
                fragments.push(fragment(&parts.rows[start..index]));
                start = index;
            }
            if !fits(&row_cells[index..=index]) {
                fragments.push(fragment(&parts.rows[index..=index]));
                start = index + 1;
            }
        }
        if start < parts.rows.len() {
            fragments.push(fragment(&parts.rows[start..]));
        }
        fragments
    }

    fn group(
        &self,
        children: &[Node],
        limit: usize,
        split: impl Fn(&Node, usize) -> Vec<Node>,
    ) -> Vec<Vec<Node>> {
        let mut groups = Vec::new();
        let mut current = Vec::new();
        let mut size = 0;

        for child in children {
            let width = self.estimator.node(child);
            if width > limit {
                if !current.is_empty() {
                    groups.push(mem::take(&mut current));
                    size = 0;
                }
                groups.extend(split(child, limit).into_iter().map(|piece| vec![piece]));
                continue;
            }

            if !current.is_empty() && size + width > limit {
                groups.push(mem::take(&mut current));
                size = 0;
            }
            current.push(child.clone());
            size += width;
        }

        if !current.is_empty() {
            groups.push(current);
        }
        groups
    }
}

fn flush_code(node: &Node, lines: &mut Vec<&str>, pieces: &mut Vec<Node>) {
    if lines.is_empty() {
        return;
    }
    pieces.push(node.with_replaced_raw(format!("{}\n", lines.join("\n"))));
    lines.clear();
}

fn shrink(budget: usize, overhead: usize) -> usize {
    budget.saturating_sub(overhead).max(1)
}
