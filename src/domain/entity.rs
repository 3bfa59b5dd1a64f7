use serde::{Deserialize, Serialize};

/// Formatting kinds understood by the chat wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Bold,
    Italic,
    Strikethrough,
    Code,
    /// Preformatted block, optionally tagged with a language.
    Pre,
    TextLink,
    Blockquote,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Bold => "bold",
            EntityKind::Italic => "italic",
            EntityKind::Strikethrough => "strikethrough",
            EntityKind::Code => "code",
            EntityKind::Pre => "pre",
            EntityKind::TextLink => "text_link",
            EntityKind::Blockquote => "blockquote",
        }
    }
}

/// Formatting marker over a chunk's text. `offset` and `length` count UTF-16
/// code units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub offset: usize,
    pub length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Annotation {
    pub fn new(kind: EntityKind, offset: usize, length: usize) -> Self {
        Self {
            kind,
            offset,
            length,
            url: None,
            language: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// One message-sized unit of output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    #[serde(rename = "entities")]
    pub annotations: Vec<Annotation>,
}

impl Chunk {
    pub fn new(text: impl Into<String>, annotations: Vec<Annotation>) -> Self {
        Self {
            text: text.into(),
            annotations,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn annotation_serializes_to_wire_shape() {
        let link = Annotation::new(EntityKind::TextLink, 4, 5).with_url("https://example.com");
        let value = serde_json::to_value(&link).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "type": "text_link",
                "offset": 4,
                "length": 5,
                "url": "https://example.com"
            })
        );
    }

    #[test]
    fn pre_without_language_omits_field() {
        let pre = Annotation::new(EntityKind::Pre, 0, 3).with_language(None);
        let json = serde_json::to_string(&pre).expect("serialize");
        assert_eq!(json, r#"{"type":"pre","offset":0,"length":3}"#);
    }

    #[test]
    fn kind_names_match_serde() {
        for kind in [
            EntityKind::Bold,
            EntityKind::Italic,
            EntityKind::Strikethrough,
            EntityKind::Code,
            EntityKind::Pre,
            EntityKind::TextLink,
            EntityKind::Blockquote,
        ] {
            let json = serde_json::to_string(&kind).expect("serialize");
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
