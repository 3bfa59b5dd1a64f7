use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum message length accepted by the chat API, in UTF-16 code units.
pub const DEFAULT_MAX_CHUNK_LENGTH: usize = 4096;
/// Smallest budget that still leaves room for markers and separators.
pub const MIN_CHUNK_LENGTH: usize = 16;

const DEFAULT_HEADING_MARKERS: [&str; 6] = ["📌", "✏️", "📚", "🔖", "📎", "📝"];
const DEFAULT_TASK_COMPLETED: &str = "✅";
const DEFAULT_TASK_UNCOMPLETED: &str = "☑️";
const DEFAULT_LINK_REFERENCE: &str = "🔗";
const DEFAULT_IMAGE_MARKER: &str = "🖼️";
const DEFAULT_THEMATIC_BREAK_CHAR: char = '—';
const DEFAULT_THEMATIC_BREAK_LENGTH: usize = 8;
const DEFAULT_SETEXT_UNDERLINE_CHAR: char = '─';
const DEFAULT_SETEXT_UNDERLINE_LENGTH: usize = 19;

static DEFAULT_RENDER_CONFIG: Lazy<RenderConfig> = Lazy::new(RenderConfig::default);

/// Process-wide default configuration, initialised on first use.
pub fn default_render_config() -> &'static RenderConfig {
    &DEFAULT_RENDER_CONFIG
}

/// Immutable symbol substitutions and the length budget used while rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Markers for heading levels 1 through 6.
    pub heading_markers: [String; 6],
    pub task_completed: String,
    pub task_uncompleted: String,
    /// Prefix for reference-style links; empty disables it.
    pub link_reference: String,
    pub image_marker: String,
    pub thematic_break_char: char,
    pub thematic_break_length: usize,
    pub setext_underline_char: char,
    pub setext_underline_length: usize,
    pub max_chunk_length: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            heading_markers: DEFAULT_HEADING_MARKERS.map(str::to_string),
            task_completed: DEFAULT_TASK_COMPLETED.to_string(),
            task_uncompleted: DEFAULT_TASK_UNCOMPLETED.to_string(),
            link_reference: DEFAULT_LINK_REFERENCE.to_string(),
            image_marker: DEFAULT_IMAGE_MARKER.to_string(),
            thematic_break_char: DEFAULT_THEMATIC_BREAK_CHAR,
            thematic_break_length: DEFAULT_THEMATIC_BREAK_LENGTH,
            setext_underline_char: DEFAULT_SETEXT_UNDERLINE_CHAR,
            setext_underline_length: DEFAULT_SETEXT_UNDERLINE_LENGTH,
            max_chunk_length: DEFAULT_MAX_CHUNK_LENGTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderConfigError {
    #[error("max_chunk_length must be at least {MIN_CHUNK_LENGTH}, got {0}")]
    ChunkLengthTooSmall(usize),
    #[error("rule `{field}` repeat count {length} exceeds max_chunk_length {max}")]
    RuleTooLong {
        field: &'static str,
        length: usize,
        max: usize,
    },
}

impl RenderConfig {
    pub fn with_max_chunk_length(mut self, max_chunk_length: usize) -> Self {
        self.max_chunk_length = max_chunk_length;
        self
    }

    pub fn validate(&self) -> Result<(), RenderConfigError> {
        if self.max_chunk_length < MIN_CHUNK_LENGTH {
            return Err(RenderConfigError::ChunkLengthTooSmall(self.max_chunk_length));
        }
        for (field, length) in [
            ("thematic_break_length", self.thematic_break_length),
            ("setext_underline_length", self.setext_underline_length),
        ] {
            if length > self.max_chunk_length {
                return Err(RenderConfigError::RuleTooLong {
                    field,
                    length,
                    max: self.max_chunk_length,
                });
            }
        }
        Ok(())
    }

    /// Marker for a heading level; levels outside 1..=6 use the level-1 marker.
    pub fn heading_marker(&self, level: u8) -> &str {
        let index = match level {
            1..=6 => usize::from(level) - 1,
            _ => 0,
        };
        &self.heading_markers[index]
    }

    pub fn checkbox(&self, checked: bool) -> &str {
        if checked {
            &self.task_completed
        } else {
            &self.task_uncompleted
        }
    }

    pub fn thematic_break(&self) -> String {
        repeat_char(self.thematic_break_char, self.thematic_break_length)
    }

    pub fn setext_underline(&self) -> String {
        repeat_char(self.setext_underline_char, self.setext_underline_length)
    }
}

fn repeat_char(ch: char, count: usize) -> String {
    std::iter::repeat_n(ch, count).collect()
}
