/// Length of `text` in UTF-16 code units.
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// Byte index of the character boundary at `unit` code units into `text`.
///
/// Returns `None` when `unit` is past the end or falls inside a surrogate pair.
pub(crate) fn byte_at_unit(text: &str, unit: usize) -> Option<usize> {
    let mut units = 0;
    for (index, ch) in text.char_indices() {
        if units == unit {
            return Some(index);
        }
        if units > unit {
            return None;
        }
        units += ch.len_utf16();
    }
    (units == unit).then_some(text.len())
}

pub(crate) fn fit_prefix(text: &str, limit: usize) -> usize {
    let mut units = 0;
    for (index, ch) in text.char_indices() {
        let width = ch.len_utf16();
        if units + width > limit {
            return index;
        }
        units += width;
    }
    text.len()
}

/// Splits `text` into consecutive pieces of at most `limit` units each,
/// never separating a surrogate pair.
///
/// A single character wider than `limit` still forms its own piece, so the
/// split always makes progress.
pub(crate) fn split_units(text: &str, limit: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let mut cut = fit_prefix(rest, limit);
        if cut == 0 {
            cut = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }
        let (head, tail) = rest.split_at(cut);
        pieces.push(head.to_string());
        rest = tail;
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn astral_characters_count_twice() {
        assert_eq!(utf16_len("abc"), 3);
        assert_eq!(utf16_len("é"), 1);
        assert_eq!(utf16_len("📌"), 2);
        assert_eq!(utf16_len("✏️"), 2);
        assert_eq!(utf16_len(""), 0);
    }

    #[test]
    fn byte_at_unit_respects_surrogates() {
        let text = "a📌b";
        assert_eq!(byte_at_unit(text, 0), Some(0));
        assert_eq!(byte_at_unit(text, 1), Some(1));
        assert_eq!(byte_at_unit(text, 2), None);
        assert_eq!(byte_at_unit(text, 3), Some(5));
        assert_eq!(byte_at_unit(text, 4), Some(6));
        assert_eq!(byte_at_unit(text, 5), None);
    }

    #[test]
    fn split_units_never_breaks_pairs() {
        let pieces = split_units("📌📌📌", 3);
        assert_eq!(pieces, vec!["📌", "📌", "📌"]);
        assert_eq!(pieces.concat(), "📌📌📌");
    }

    #[test]
    fn split_units_forces_progress_on_tiny_limits() {
        let pieces = split_units("a📌", 1);
        assert_eq!(pieces, vec!["a", "📌"]);
    }

    #[test]
    fn split_units_fills_each_piece() {
        let pieces = split_units("abcdefg", 3);
        assert_eq!(pieces, vec!["abc", "def", "g"]);
    }
}
