use serde::{Deserialize, Serialize};

use crate::domain::Chunk;

/// Chunking request passed into the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRequest {
    /// Source markdown as received from the caller.
    pub markdown: String,
    /// Per-request limit, overriding the service's configured maximum.
    #[serde(default)]
    pub max_chunk_length: Option<usize>,
}

impl ChunkRequest {
    pub fn new(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            max_chunk_length: None,
        }
    }

    pub fn with_max_chunk_length(mut self, max_chunk_length: usize) -> Self {
        self.max_chunk_length = Some(max_chunk_length);
        self
    }
}

/// Trait exposed by the chunking pipeline. Implementations must be pure and
/// deterministic: the same request always yields the same chunks.
pub trait ChunkService: Send + Sync {
    fn chunk(&self, request: &ChunkRequest) -> Vec<Chunk>;
}
