//! Text embeddings through a remote feature extraction backend.
//!
//! There is no local fallback: if the backend cannot produce a vector of the
//! configured dimension, the caller gets `EmbeddingError::Unavailable`.

/// Inputs are cut to this many characters before being sent.
pub const MAX_EMBED_CHARS: usize = 512;

/// A remote embedding model.
pub trait EmbeddingBackend: Send + Sync {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    /// Get the name of this backend for logging
    fn name(&self) -> &str;
}

/// Error type for embedding operations
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("Embedding unavailable: {0}")]
    Unavailable(String),
}

pub struct EmbeddingProvider {
    backend: Box<dyn EmbeddingBackend>,
    dimensions: usize,
}

impl EmbeddingProvider {
    pub fn new(backend: Box<dyn EmbeddingBackend>, dimensions: usize) -> Self {
        Self {
            backend,
            dimensions,
        }
    }

    /// Get the embedding dimensions every vector must have
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Embed the first `MAX_EMBED_CHARS` characters of `text` with a single
    /// backend call.
    pub fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let input = truncate_chars(text, MAX_EMBED_CHARS);
        let name = self.backend.name();

        let embedding = self.backend.embed(input).map_err(|e| {
            log::warn!("embedding backend={name} outcome=error err={e}");
            EmbeddingError::Unavailable(e.to_string())
        })?;

        if embedding.is_empty() {
            return Err(EmbeddingError::Unavailable(format!(
                "{name} returned an empty vector"
            )));
        }

        if embedding.len() != self.dimensions {
            return Err(EmbeddingError::Unavailable(format!(
                "{name} returned {} dimensions, expected {}",
                embedding.len(),
                self.dimensions
            )));
        }

        log::debug!("embedding backend={name} outcome=success chars={}", input.chars().count());
        Ok(embedding)
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
