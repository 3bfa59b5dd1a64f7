use crate::domain::{Node, NodeKind};

pub(crate) struct TableParts<'a> {
    pub(crate) head: Option<&'a Node>,
    pub(crate) rows: Vec<&'a Node>,
}

pub(crate) fn table_parts(table: &Node) -> TableParts<'_> {
    let mut head = None;
    let mut rows = Vec::new();
    for child in &table.children {
        match child.kind {
            NodeKind::TableHead if head.is_none() => head = Some(child),
            NodeKind::TableBody => rows.extend(
                child
                    .children
                    .iter()
                    .filter(|row| row.kind == NodeKind::TableRow),
            ),
            NodeKind::TableRow => rows.push(child),
            _ => {}
        }
    }
    TableParts { head, rows }
}

pub(crate) fn cells_of(node: &Node) -> Vec<&Node> {
    node.children
        .iter()
        .flat_map(|child| match child.kind {
            NodeKind::TableRow => child.children.iter().collect::<Vec<_>>(),
            _ => vec![child],
        })
        .filter(|cell| cell.kind == NodeKind::TableCell)
        .collect()
}

// Columns pad to the widest cell in characters; rows follow the header's
// column count. A table without header cells lays out to nothing.
pub(crate) fn layout<S: AsRef<str>>(head: &[S], rows: &[Vec<S>]) -> String {
    if head.is_empty() {
        return String::new();
    }

    let mut widths: Vec<usize> = head.iter().map(|cell| width(cell.as_ref())).collect();
    for row in rows {
        for (column, cell) in row.iter().take(widths.len()).enumerate() {
            widths[column] = widths[column].max(width(cell.as_ref()));
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_row(head.iter().map(AsRef::as_ref), &widths));

    let separator = widths
        .iter()
        .map(|w| "-".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("|");
    lines.push(format!("|{separator}|"));

    for row in rows {
        lines.push(format_row(row.iter().map(AsRef::as_ref), &widths));
    }

    lines.join("\n")
}

fn format_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let mut cells = cells;
    let padded = widths
        .iter()
        .map(|&w| {
            let cell = cells.next().unwrap_or("");
            let padding = w.saturating_sub(width(cell));
            format!("{cell}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>()
        .join(" | ");
    format!("| {padded} |")
}

fn width(cell: &str) -> usize {
    cell.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lays_out_padded_columns() {
        let text = layout(&["Name", "Age"], &[vec!["Bob", "25"], vec!["Alexandra", "7"]]);
        assert_eq!(
            text,
            "| Name      | Age |\n\
             |-----------|-----|\n\
             | Bob       | 25  |\n\
             | Alexandra | 7   |"
        );
    }

    #[test]
    fn short_rows_are_padded_and_long_rows_truncated() {
        let text = layout(&["a", "b"], &[vec!["1"], vec!["1", "2", "3"]]);
        assert_eq!(
            text,
            "| a | b |\n\
             |---|---|\n\
             | 1 |   |\n\
             | 1 | 2 |"
        );
    }

    #[test]
    fn headerless_table_is_empty() {
        let rows: Vec<Vec<&str>> = vec![vec!["x"]];
        assert_eq!(layout::<&str>(&[], &rows), "");
    }

    #[test]
    fn parts_accept_rows_without_body_wrapper() {
        let table = Node::with_children(
            NodeKind::Table,
            vec![
                Node::with_children(NodeKind::TableHead, vec![]),
                Node::with_children(NodeKind::TableRow, vec![]),
            ],
        );
        let parts = table_parts(&table);
        assert!(parts.head.is_some());
        assert_eq!(parts.rows.len(), 1);
    }
}
