//! Note retrieval by relevance.
//!
//! # Architecture
//!
//! - `embeddings`: Remote embedding provider with input truncation
//! - `index`: In-memory vector index with cosine similarity search
//! - `lexical`: Four-tier keyword scoring
//! - `service`: Capability-aware ranker choosing between the two

pub mod embeddings;
mod index;
pub mod lexical;
pub mod service;

pub use embeddings::{EmbeddingBackend, EmbeddingError, EmbeddingProvider};
pub use index::{IndexError, VectorIndex};
pub use service::{SemanticSearchError, SimilarityRanker};
