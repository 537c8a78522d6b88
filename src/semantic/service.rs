//! Note ranking by relevance to a query.
//!
//! The strategy is picked on every call from the store's vector capability:
//! vector similarity over stored embeddings when available, the lexical tier
//! table otherwise.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::notes::NoteStore;
use crate::semantic::lexical::score_lexical;
use crate::semantic::{EmbeddingError, EmbeddingProvider, IndexError, VectorIndex};

/// Maximum number of notes a search returns
pub const MAX_RESULTS: usize = 10;

/// Errors that can occur during search operations.
#[derive(Debug, thiserror::Error)]
pub enum SemanticSearchError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    Vector,
    Lexical,
}

impl SearchStrategy {
    pub fn from_capability(vector_available: bool) -> Self {
        if vector_available {
            Self::Vector
        } else {
            Self::Lexical
        }
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vector => write!(f, "vector"),
            Self::Lexical => write!(f, "lexical"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedNote {
    pub note_id: u64,
    pub score: f32,
}

pub struct SimilarityRanker {
    store: Arc<dyn NoteStore>,
    embeddings: Arc<EmbeddingProvider>,
}

impl SimilarityRanker {
    pub fn new(store: Arc<dyn NoteStore>, embeddings: Arc<EmbeddingProvider>) -> Self {
        Self { store, embeddings }
    }

    /// Rank `owner`'s notes using the store's current capability.
    pub fn search(&self, query: &str, owner: &str) -> Result<Vec<RankedNote>, SemanticSearchError> {
        let capability = self.store.vector_capability();
        self.rank(query, owner, capability)
    }

    /// Rank `owner`'s notes against `query`, at most `MAX_RESULTS`, best
    /// first.
    pub fn rank(
        &self,
        query: &str,
        owner: &str,
        vector_available: bool,
    ) -> Result<Vec<RankedNote>, SemanticSearchError> {
        let strategy = SearchStrategy::from_capability(vector_available);
        log::debug!("search strategy={strategy} owner={owner}");

        let ranked = match strategy {
            SearchStrategy::Vector => self.rank_vector(query, owner)?,
            SearchStrategy::Lexical => self.rank_lexical(query, owner)?,
        };

        log::info!("search strategy={strategy} results={}", ranked.len());
        Ok(ranked)
    }

    fn rank_vector(&self, query: &str, owner: &str) -> Result<Vec<RankedNote>, SemanticSearchError> {
        let query_embedding = self.embeddings.embed(query)?;

        let mut index = VectorIndex::new(self.embeddings.dimensions());
        for note in self.store.list_notes(owner)? {
            let Some(embedding) = note.embedding else {
                continue;
            };
            if let Err(e) = index.insert(note.id, embedding) {
                log::debug!("skipping embedding of note {}: {e}", note.id);
            }
        }

        if index.is_empty() {
            return Ok(vec![]);
        }

        Ok(index
            .search(&query_embedding, MAX_RESULTS)?
            .into_iter()
            .map(|r| RankedNote {
                note_id: r.id,
                score: r.score,
            })
            .collect())
    }

    fn rank_lexical(&self, query: &str, owner: &str) -> Result<Vec<RankedNote>, SemanticSearchError> {
        let notes = self.store.list_notes(owner)?;
        let fields: Vec<(u64, &str, &str)> = notes
            .iter()
            .map(|n| (n.id, n.title.as_str(), n.content.as_str()))
            .collect();

        Ok(score_lexical(query, &fields, MAX_RESULTS)
            .into_iter()
            .map(|r| RankedNote {
                note_id: r.id,
                score: r.score,
            })
            .collect())
    }
}
