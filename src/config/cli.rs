use std::path::PathBuf;

use clap::{Parser, ValueEnum, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the richchunk binary.
#[derive(Debug, Default, Parser)]
#[command(
    name = "richchunk",
    version,
    about = "Split markdown into size-bounded rich-text chunks"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "RICHCHUNK_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Override the chunk budget, in UTF-16 code units.
    #[arg(long = "max-chunk-length", value_name = "UNITS")]
    pub max_chunk_length: Option<usize>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Output format for the produced chunks.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Markdown file to chunk; reads stdin when omitted.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub input: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Chunks as a JSON array of `{text, entities}` objects.
    #[default]
    Json,
    /// Human-readable dump of each chunk and its annotations.
    Text,
}
