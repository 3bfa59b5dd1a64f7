mod config;
mod estimate;
mod links;
mod measure;
mod parse;
mod planner;
mod split;
mod table;
mod walker;

use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::application::render::types::{ChunkRequest, ChunkService};
use crate::config::{RenderConfig, default_render_config};
use crate::domain::Chunk;

pub use estimate::estimate;
pub use measure::utf16_len;
pub use parse::{Document, parse_markdown};
pub use planner::plan;
pub use walker::render;

use config::default_options;
use parse::parse_with;

/// Markdown chunker backed by comrak's GFM parser.
pub struct ComrakChunkService {
    options: comrak::Options<'static>,
    config: RenderConfig,
}

impl ComrakChunkService {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            options: default_options(),
            config,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }
}

static CHUNK_SERVICE: Lazy<Arc<ComrakChunkService>> =
    Lazy::new(|| Arc::new(ComrakChunkService::default()));

/// Access the shared chunk service instance, initialised on first use with
/// the default render configuration.
pub fn chunk_service() -> Arc<ComrakChunkService> {
    Arc::clone(&CHUNK_SERVICE)
}

impl Default for ComrakChunkService {
    fn default() -> Self {
        Self::new(default_render_config().clone())
    }
}

impl ChunkService for ComrakChunkService {
    fn chunk(&self, request: &ChunkRequest) -> Vec<Chunk> {
        let document = parse_with(&request.markdown, &self.options);
        let chunks = match request.max_chunk_length {
            Some(max) => {
                let config = self.config.clone().with_max_chunk_length(max);
                plan(&document.blocks, &document.environment, &config)
            }
            None => plan(&document.blocks, &document.environment, &self.config),
        };
        debug!(
            target = "application::render::service",
            chunks = chunks.len(),
            "chunked markdown"
        );
        chunks
    }
}

/// Parse `markdown` and chunk it under `config`.
pub fn markdown_to_chunks(markdown: &str, config: &RenderConfig) -> Vec<Chunk> {
    let document = parse_markdown(markdown);
    plan(&document.blocks, &document.environment, config)
}
