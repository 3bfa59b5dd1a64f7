//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;
mod render;

use std::str::FromStr;

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

pub use cli::{CliArgs, OutputFormat};
pub use render::{
    DEFAULT_MAX_CHUNK_LENGTH, MIN_CHUNK_LENGTH, RenderConfig, RenderConfigError,
    default_render_config,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "richchunk";

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub render: RenderConfig,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error(transparent)]
    Render(#[from] RenderConfigError),
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings from the layered sources, then apply CLI overrides.
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("RICHCHUNK").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_cli_overrides(cli);

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    render: RawRenderSettings,
}

impl RawSettings {
    fn apply_cli_overrides(&mut self, cli: &CliArgs) {
        if let Some(level) = cli.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = cli.log_json {
            self.logging.json = Some(json);
        }
        if let Some(max) = cli.max_chunk_length {
            self.render.max_chunk_length = Some(max);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings { logging, render } = raw;

        let logging = build_logging_settings(logging)?;
        let render = build_render_config(render)?;

        Ok(Self { logging, render })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_render_config(render: RawRenderSettings) -> Result<RenderConfig, LoadError> {
    let mut config = RenderConfig::default();

    if let Some(markers) = render.heading_markers {
        let count = markers.len();
        config.heading_markers = markers.try_into().map_err(|_| {
            LoadError::invalid(
                "render.heading_markers",
                format!("expected 6 markers, got {count}"),
            )
        })?;
    }
    if let Some(marker) = render.task_completed {
        config.task_completed = marker;
    }
    if let Some(marker) = render.task_uncompleted {
        config.task_uncompleted = marker;
    }
    if let Some(marker) = render.link_reference {
        config.link_reference = marker;
    }
    if let Some(marker) = render.image_marker {
        config.image_marker = marker;
    }
    if let Some(ch) = render.thematic_break_char {
        config.thematic_break_char = ch;
    }
    if let Some(length) = render.thematic_break_length {
        config.thematic_break_length = length;
    }
    if let Some(ch) = render.setext_underline_char {
        config.setext_underline_char = ch;
    }
    if let Some(length) = render.setext_underline_length {
        config.setext_underline_length = length;
    }
    if let Some(max) = render.max_chunk_length {
        config.max_chunk_length = max;
    }

    config.validate()?;
    Ok(config)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRenderSettings {
    heading_markers: Option<Vec<String>>,
    task_completed: Option<String>,
    task_uncompleted: Option<String>,
    link_reference: Option<String>,
    image_marker: Option<String>,
    thematic_break_char: Option<char>,
    thematic_break_length: Option<usize>,
    setext_underline_char: Option<char>,
    setext_underline_length: Option<usize>,
    max_chunk_length: Option<usize>,
}

/// Parse CLI arguments and load settings with them applied.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
