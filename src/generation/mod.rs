//! Study artifact generation.
//!
//! Artifacts (a summary, a flashcard set, a quiz set) are produced by trying
//! an ordered list of remote backends and falling back to deterministic local
//! heuristics when none of them returns something usable.
//!
//! - `artifact`: prompts, parsing and validation per artifact kind
//! - `sanitize`: fenced-block stripping for raw backend output
//! - `heuristic`: network-free generators
//! - `provider`: the fallback chain

mod artifact;
pub mod heuristic;
mod provider;
pub mod sanitize;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use artifact::Artifact;
pub use provider::{GenerationBackend, GenerationProvider};

/// Summaries shorter than this (in characters, after trimming) are rejected.
pub const MIN_SUMMARY_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

/// A multiple-choice question with exactly four options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: [String; 4],
    /// Index of the correct option, always below 4
    #[serde(rename = "answer")]
    pub correct_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SummaryText(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlashcardSet(pub Vec<Flashcard>);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuizSet(pub Vec<QuizQuestion>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Summary,
    Flashcards,
    Quiz,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Summary => write!(f, "summary"),
            Self::Flashcards => write!(f, "flashcards"),
            Self::Quiz => write!(f, "quiz"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("content cannot be empty")]
    EmptyInput,
}

/// Why a single backend attempt was discarded. Never leaves the chain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttemptError {
    #[error("backend failure: {0}")]
    Backend(String),

    #[error("unparsable response: {0}")]
    Parse(String),

    #[error("response rejected: {0}")]
    Rejected(String),
}
