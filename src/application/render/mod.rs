//! Chunking pipeline.
//!
//! The pipeline is pure: it accepts a block tree (or markdown parsed into
//! one) and returns chunks whose text never exceeds the configured number of
//! UTF-16 units, each carrying the annotations that fall inside it.

mod service;
mod types;

pub use service::{
    ComrakChunkService, Document, chunk_service, estimate, markdown_to_chunks, parse_markdown,
    plan, render, utf16_len,
};
pub use types::{ChunkRequest, ChunkService};
