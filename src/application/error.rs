use thiserror::Error;

use crate::{config::LoadError, infra::error::InfraError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("failed to load configuration: {0}")]
    Load(#[from] LoadError),
    #[error("failed to serialize chunks: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfigError;

    #[test]
    fn render_config_errors_surface_through_load() {
        let err = AppError::from(LoadError::from(RenderConfigError::ChunkLengthTooSmall(8)));
        assert!(matches!(
            err,
            AppError::Load(LoadError::Render(RenderConfigError::ChunkLengthTooSmall(8)))
        ));
        assert!(err.to_string().starts_with("failed to load configuration: "));
    }
}
