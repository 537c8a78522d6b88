use crate::extract::ExtractError;
use crate::generation::GenerationError;
use crate::semantic::{EmbeddingError, SemanticSearchError};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0} cannot be empty")]
    EmptyInput(&'static str),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error("io error: {0:?}")]
    IO(#[from] std::io::Error),

    #[error("unexpected error: {0:?}")]
    Other(#[from] anyhow::Error),
}

impl From<GenerationError> for AppError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::EmptyInput => AppError::EmptyInput("content"),
        }
    }
}

impl From<SemanticSearchError> for AppError {
    fn from(err: SemanticSearchError) -> Self {
        match err {
            SemanticSearchError::Embedding(e) => AppError::Embedding(e),
            SemanticSearchError::Storage(e) => AppError::Other(e),
            e @ SemanticSearchError::Index(_) => AppError::Other(e.into()),
        }
    }
}
