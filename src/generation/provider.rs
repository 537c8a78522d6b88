use super::sanitize::sanitize;
use super::{Artifact, ArtifactKind, AttemptError, FlashcardSet, GenerationError, QuizSet, SummaryText};
use crate::config::GenerationConfig;
use crate::huggingface::{HuggingFaceClient, HuggingFaceModel};
use std::sync::Arc;

/// A remote text generator, tried as one link of a fallback chain.
pub trait GenerationBackend: Send + Sync {
    /// Send `prompt` and return the raw generated text.
    fn generate(&self, prompt: &str) -> Result<String, AttemptError>;

    /// Get the name of this backend for logging
    fn name(&self) -> &str;
}

/// Ordered backend chains per artifact kind, ending in the local heuristics.
#[derive(Default)]
pub struct GenerationProvider {
    summary: Vec<Box<dyn GenerationBackend>>,
    flashcards: Vec<Box<dyn GenerationBackend>>,
    quiz: Vec<Box<dyn GenerationBackend>>,
}

impl GenerationProvider {
    /// Provider with no backends; every call goes straight to the heuristics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the chain for `kind`. Backends are tried in the given order.
    pub fn with_backends(
        mut self,
        kind: ArtifactKind,
        backends: Vec<Box<dyn GenerationBackend>>,
    ) -> Self {
        *self.chain_mut(kind) = backends;
        self
    }

    /// One HuggingFace model backend per configured model name.
    pub fn from_config(config: &GenerationConfig, client: Arc<HuggingFaceClient>) -> Self {
        let models = |names: &[String]| -> Vec<Box<dyn GenerationBackend>> {
            names
                .iter()
                .map(|name| {
                    Box::new(HuggingFaceModel::new(client.clone(), name))
                        as Box<dyn GenerationBackend>
                })
                .collect()
        };

        Self::new()
            .with_backends(ArtifactKind::Summary, models(&config.summary_models))
            .with_backends(ArtifactKind::Flashcards, models(&config.flashcard_models))
            .with_backends(ArtifactKind::Quiz, models(&config.quiz_models))
    }

    fn chain(&self, kind: ArtifactKind) -> &[Box<dyn GenerationBackend>] {
        match kind {
            ArtifactKind::Summary => &self.summary,
            ArtifactKind::Flashcards => &self.flashcards,
            ArtifactKind::Quiz => &self.quiz,
        }
    }

    fn chain_mut(&mut self, kind: ArtifactKind) -> &mut Vec<Box<dyn GenerationBackend>> {
        match kind {
            ArtifactKind::Summary => &mut self.summary,
            ArtifactKind::Flashcards => &mut self.flashcards,
            ArtifactKind::Quiz => &mut self.quiz,
        }
    }

    /// Produce an artifact from `text`.
    ///
    /// Backends are called one at a time in order; the first response that
    /// sanitizes, parses and validates wins and later backends are not
    /// called. If every attempt is discarded the heuristic result is
    /// returned, so blank input is the only error.
    pub fn generate<A: Artifact>(&self, text: &str) -> Result<A, GenerationError> {
        if text.trim().is_empty() {
            return Err(GenerationError::EmptyInput);
        }

        let kind = A::KIND;
        let _span = tracing::info_span!("generate", %kind).entered();

        let prompt = A::prompt(text);
        for backend in self.chain(kind) {
            let name = backend.name();
            match attempt::<A>(backend.as_ref(), &prompt) {
                Ok(artifact) => {
                    log::info!("backend={name} kind={kind} outcome=accepted");
                    return Ok(artifact);
                }
                Err(e) => {
                    log::warn!("backend={name} kind={kind} outcome=error err={e}");
                }
            }
        }

        log::info!("kind={kind} all backends failed, using heuristic");
        Ok(A::heuristic(text))
    }

    pub fn summary(&self, text: &str) -> Result<SummaryText, GenerationError> {
        self.generate(text)
    }

    pub fn flashcards(&self, text: &str) -> Result<FlashcardSet, GenerationError> {
        self.generate(text)
    }

    pub fn quiz(&self, text: &str) -> Result<QuizSet, GenerationError> {
        self.generate(text)
    }
}

fn attempt<A: Artifact>(backend: &dyn GenerationBackend, prompt: &str) -> Result<A, AttemptError> {
    let raw = backend.generate(prompt)?;
    A::parse(&sanitize(&raw))
}
