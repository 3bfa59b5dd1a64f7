//! Formatting of produced chunks for the command-line surface.

use crate::{config::OutputFormat, domain::Chunk};

use super::{error::AppError, render::utf16_len};

/// Format `chunks` for stdout.
pub fn format_chunks(chunks: &[Chunk], format: OutputFormat) -> Result<String, AppError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(chunks)?),
        OutputFormat::Text => Ok(text_dump(chunks)),
    }
}

fn text_dump(chunks: &[Chunk]) -> String {
    let total = chunks.len();
    let mut out = String::new();
    for (index, chunk) in chunks.iter().enumerate() {
        out.push_str(&format!(
            "--- chunk {}/{total} ({} units) ---\n",
            index + 1,
            utf16_len(&chunk.text)
        ));
        out.push_str(&chunk.text);
        out.push('\n');
        for annotation in &chunk.annotations {
            let mut line = format!(
                "  {} @{}+{}",
                annotation.kind.as_str(),
                annotation.offset,
                annotation.length
            );
            if let Some(url) = annotation.url.as_deref() {
                line.push_str(&format!(" url={url}"));
            }
            if let Some(language) = annotation.language.as_deref() {
                line.push_str(&format!(" language={language}"));
            }
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Annotation, EntityKind};

    fn sample() -> Vec<Chunk> {
        vec![Chunk::new(
            "hello world",
            vec![
                Annotation::new(EntityKind::Bold, 0, 5),
                Annotation::new(EntityKind::TextLink, 6, 5).with_url("https://example.com"),
            ],
        )]
    }

    #[test]
    fn json_output_uses_wire_names() {
        let json = format_chunks(&sample(), OutputFormat::Json).expect("serializes");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value[0]["text"], "hello world");
        assert_eq!(value[0]["entities"][0]["type"], "bold");
        assert_eq!(value[0]["entities"][1]["url"], "https://example.com");
    }

    #[test]
    fn text_output_lists_annotations() {
        let text = format_chunks(&sample(), OutputFormat::Text).expect("formats");
        assert_eq!(
            text,
            "--- chunk 1/1 (11 units) ---\nhello world\n  bold @0+5\n  text_link @6+5 url=https://example.com\n"
        );
    }

    #[test]
    fn text_output_counts_utf16_units() {
        let chunks = vec![Chunk::new(
            "📌 x",
            vec![Annotation::new(EntityKind::Pre, 3, 1).with_language(Some("rust".to_string()))],
        )];
        let text = format_chunks(&chunks, OutputFormat::Text).expect("formats");
        assert_eq!(
            text,
            "--- chunk 1/1 (4 units) ---\n📌 x\n  pre @3+1 language=rust\n"
        );
    }
}
