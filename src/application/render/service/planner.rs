use tracing::{debug, warn};

use crate::config::RenderConfig;
use crate::domain::{Annotation, Chunk, Environment, Node, NodeKind};

use super::estimate::Estimator;
use super::measure::{byte_at_unit, fit_prefix, utf16_len};
use super::split::Splitter;
use super::walker::render;

/// Convert a sequence of block nodes into chunks that each fit
/// `config.max_chunk_length` UTF-16 units.
///
/// Chunks come back in document order. An empty document still yields one
/// empty chunk so callers never special-case "nothing to send".
pub fn plan(nodes: &[Node], environment: &Environment, config: &RenderConfig) -> Vec<Chunk> {
    let max = config.max_chunk_length.max(1);
    let estimator = Estimator::new(config, environment);

    let sized: Vec<(&Node, usize)> = nodes
        .iter()
        .filter(|node| node.kind != NodeKind::BlankLine)
        .map(|node| (node, estimator.node(node)))
        .collect();
    let total: usize = sized.iter().map(|(_, size)| size).sum();

    if total <= max {
        return vec![render(nodes, environment, config)];
    }

    debug!(
        target = "application::render::planner",
        total,
        max,
        blocks = sized.len(),
        "document exceeds budget, grouping blocks"
    );

    let splitter = Splitter::new(estimator);
    let mut chunks: Vec<Chunk> = group_blocks(&sized, max, &splitter)
        .iter()
        .map(|group| render(group, environment, config))
        .flat_map(|chunk| enforce_limit(chunk, max))
        .filter(|chunk| !chunk.is_empty())
        .collect();

    if chunks.is_empty() {
        chunks.push(Chunk::default());
    }
    chunks
}

fn group_blocks(sized: &[(&Node, usize)], max: usize, splitter: &Splitter<'_>) -> Vec<Vec<Node>> {
    let mut groups = Vec::new();
    let mut current: Vec<Node> = Vec::new();
    let mut size = 0;

    for &(node, width) in sized {
        if width > max {
            if !current.is_empty() {
                groups.push(std::mem::take(&mut current));
                size = 0;
            }
            groups.extend(
                splitter
                    .split_block(node, max)
                    .into_iter()
                    .map(|piece| vec![piece]),
            );
            continue;
        }

        if !current.is_empty() && size + width > max {
            groups.push(std::mem::take(&mut current));
            size = 0;
        }
        current.push(node.clone());
        size += width;
    }

    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

// Cuts prefer the last newline in the window, then the last whitespace.
fn enforce_limit(chunk: Chunk, max: usize) -> Vec<Chunk> {
    let units = utf16_len(&chunk.text);
    if units <= max {
        return vec![chunk];
    }

    warn!(
        target = "application::render::planner",
        units,
        max,
        "chunk still exceeds budget after decomposition, cutting text"
    );

    let text = chunk.text.as_str();
    let mut pieces = Vec::new();
    let mut byte = 0;
    let mut unit = 0;

    while byte < text.len() {
        let rest = &text[byte..];
        let skipped = rest.len() - rest.trim_start_matches('\n').len();
        byte += skipped;
        unit += skipped;
        let rest = &text[byte..];
        if rest.is_empty() {
            break;
        }

        let cut = if utf16_len(rest) <= max {
            rest.len()
        } else {
            cut_point(rest, max)
        };
        let piece = &rest[..cut];
        let kept = piece.trim_end();
        let kept_units = utf16_len(kept);

        if !kept.is_empty() {
            let annotations = chunk
                .annotations
                .iter()
                .filter_map(|annotation| clip(annotation, kept, unit, kept_units))
                .collect();
            pieces.push(Chunk::new(kept, annotations));
        }

        byte += cut;
        unit += utf16_len(piece);
    }
    pieces
}

fn cut_point(rest: &str, max: usize) -> usize {
    let limit = fit_prefix(rest, max);
    if limit == 0 {
        return rest.chars().next().map_or(rest.len(), char::len_utf8);
    }
    let window = &rest[..limit];

    if let Some(newline) = window.rfind('\n').filter(|&index| index > 0) {
        return newline + 1;
    }
    window
        .char_indices()
        .rev()
        .find(|&(index, ch)| index > 0 && ch.is_whitespace())
        .map_or(limit, |(index, ch)| index + ch.len_utf8())
}

fn clip(annotation: &Annotation, piece: &str, base: usize, piece_units: usize) -> Option<Annotation> {
    let start = annotation.offset.max(base);
    let end = annotation.end().min(base + piece_units);
    if end <= start {
        return None;
    }
    let offset = start - base;
    let from = byte_at_unit(piece, offset)?;
    let to = byte_at_unit(piece, end - base)?;
    let length = utf16_len(piece[from..to].trim_end());
    (length > 0).then(|| Annotation {
        offset,
        length,
        ..annotation.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntityKind;

    fn config(max: usize) -> RenderConfig {
        RenderConfig::default().with_max_chunk_length(max)
    }

    #[test]
    fn empty_document_yields_one_empty_chunk() {
        let chunks = plan(&[], &Environment::new(), &RenderConfig::default());
        assert_eq!(chunks, vec![Chunk::default()]);
    }

    #[test]
    fn blank_lines_only_yield_one_empty_chunk() {
        let nodes = vec![Node::new(NodeKind::BlankLine), Node::new(NodeKind::BlankLine)];
        let chunks = plan(&nodes, &Environment::new(), &RenderConfig::default());
        assert_eq!(chunks, vec![Chunk::default()]);
    }

    #[test]
    fn small_documents_take_the_fast_path() {
        let nodes = vec![
            Node::paragraph(vec![Node::text("one")]),
            Node::new(NodeKind::BlankLine),
            Node::paragraph(vec![Node::text("two")]),
        ];
        let chunks = plan(&nodes, &Environment::new(), &RenderConfig::default());
        assert_eq!(chunks, vec![Chunk::new("one\n\ntwo", vec![])]);
    }

    #[test]
    fn blocks_are_grouped_greedily() {
        let nodes: Vec<Node> = (0..6)
            .map(|i| Node::paragraph(vec![Node::text(format!("{i}").repeat(18))]))
            .collect();
        // Each paragraph estimates to 20 units.
        let chunks = plan(&nodes, &Environment::new(), &config(45));
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, format!("{}\n\n{}", "0".repeat(18), "1".repeat(18)));
        assert!(chunks.iter().all(|chunk| utf16_len(&chunk.text) <= 45));
    }

    #[test]
    fn oversized_unsplittable_content_is_cut() {
        let table = Node::table(&["h".to_string()], &[vec!["x".repeat(80)]]);
        let chunks = plan(&[table], &Environment::new(), &config(32));
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(utf16_len(&chunk.text) <= 32);
            for annotation in &chunk.annotations {
                assert!(annotation.end() <= utf16_len(&chunk.text));
                assert_eq!(annotation.kind, EntityKind::Pre);
            }
        }
    }

    #[test]
    fn cut_prefers_newlines_then_spaces() {
        assert_eq!(cut_point("ab\ncd ef gh", 9), 3);
        assert_eq!(cut_point("abcd ef gh", 9), 8);
        assert_eq!(cut_point("abcdefghij", 4), 4);
    }

    #[test]
    fn clipped_annotation_drops_trailing_whitespace() {
        let annotation = Annotation::new(EntityKind::Bold, 2, 10);
        let clipped = clip(&annotation, "ab cd ", 0, 6).expect("overlaps");
        assert_eq!((clipped.offset, clipped.length), (2, 3));
        assert!(clip(&annotation, "zz", 20, 2).is_none());
    }

    #[test]
    fn enforce_limit_rebases_annotations() {
        let chunk = Chunk::new(
            "aaaa bbbb cccc",
            vec![Annotation::new(EntityKind::Italic, 5, 9)],
        );
        let pieces = enforce_limit(chunk, 6);
        let texts: Vec<&str> = pieces.iter().map(|piece| piece.text.as_str()).collect();
        assert_eq!(texts, vec!["aaaa", "bbbb", "cccc"]);
        assert!(pieces[0].annotations.is_empty());
        assert_eq!(pieces[1].annotations, vec![Annotation::new(EntityKind::Italic, 0, 4)]);
        assert_eq!(pieces[2].annotations, vec![Annotation::new(EntityKind::Italic, 0, 4)]);
    }
}

#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::*;

    fn inline() -> impl Strategy<Value = Node> {
        let text = "[a-z ]{0,40}|[a-z📌é ]{1,12}";
        prop_oneof![
            4 => text.prop_map(Node::text),
            1 => text.prop_map(|raw| Node::strong(vec![Node::text(raw)])),
            1 => text.prop_map(|raw| Node::emphasis(vec![Node::text(raw)])),
            1 => "[a-z]{1,10}".prop_map(Node::code_span),
            1 => "[a-z]{1,10}".prop_map(|raw| {
                Node::link("https://example.com/page", vec![Node::text(raw)])
            }),
        ]
    }

    fn paragraph() -> impl Strategy<Value = Node> {
        prop::collection::vec(inline(), 1..6).prop_map(Node::paragraph)
    }

    fn block() -> impl Strategy<Value = Node> {
        prop_oneof![
            4 => paragraph(),
            1 => (1u8..=6, prop::collection::vec(inline(), 1..4))
                .prop_map(|(level, children)| Node::heading(level, children)),
            1 => prop::collection::vec("[a-z =;]{0,60}", 1..12)
                .prop_map(|lines| Node::code_block(Some("txt"), format!("{}\n", lines.join("\n")))),
            1 => (any::<bool>(), prop::collection::vec(prop::collection::vec(paragraph(), 1..3), 1..6))
                .prop_map(|(ordered, items)| {
                    Node::list(ordered, 0, items.into_iter().map(Node::list_item).collect())
                }),
            1 => prop::collection::vec(paragraph(), 1..4).prop_map(Node::block_quote),
            1 => prop::collection::vec(prop::collection::vec("[a-z0-9]{0,20}", 2), 1..12)
                .prop_map(|rows| Node::table(&["key".to_string(), "value".to_string()], &rows)),
            1 => Just(Node::new(NodeKind::ThematicBreak)),
        ]
    }

    fn document() -> impl Strategy<Value = Vec<Node>> {
        prop::collection::vec(block(), 0..12)
    }

    proptest! {
        #[test]
        fn chunks_respect_length_and_annotation_bounds(nodes in document(), max in 16usize..400) {
            let config = RenderConfig::default().with_max_chunk_length(max);
            let chunks = plan(&nodes, &Environment::new(), &config);
            prop_assert!(!chunks.is_empty());
            for chunk in &chunks {
                let code_units: Vec<u16> = chunk.text.encode_utf16().collect();
                prop_assert!(code_units.len() <= max);
                prop_assert_eq!(chunk.text.trim_end(), chunk.text.as_str());
                for annotation in &chunk.annotations {
                    prop_assert!(annotation.length > 0);
                    prop_assert!(annotation.end() <= code_units.len());
                    let covered =
                        String::from_utf16_lossy(&code_units[annotation.offset..annotation.end()]);
                    prop_assert!(!covered.ends_with(char::is_whitespace));
                }
            }
        }

        #[test]
        fn planning_is_deterministic(nodes in document(), max in 16usize..400) {
            let config = RenderConfig::default().with_max_chunk_length(max);
            let env = Environment::new();
            prop_assert_eq!(plan(&nodes, &env, &config), plan(&nodes, &env, &config));
        }

        #[test]
        fn documents_within_budget_render_as_one_chunk(nodes in document()) {
            let config = RenderConfig::default().with_max_chunk_length(usize::MAX);
            let env = Environment::new();
            prop_assert_eq!(plan(&nodes, &env, &config), vec![render(&nodes, &env, &config)]);
        }
    }
}
