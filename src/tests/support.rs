use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::app::StudyApp;
use crate::generation::{AttemptError, GenerationBackend, GenerationProvider};
use crate::notes::BackendJson;
use crate::semantic::{EmbeddingBackend, EmbeddingProvider};
use crate::storage::BackendLocal;

pub const DIMENSIONS: usize = 3;

/// Generation backend that always gives the same answer and counts calls.
pub struct ScriptedBackend {
    name: String,
    response: Result<String, AttemptError>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedBackend {
    pub fn ok(name: &str, response: &str) -> (Box<dyn GenerationBackend>, Arc<AtomicUsize>) {
        Self::boxed(name, Ok(response.to_string()))
    }

    pub fn failing(name: &str) -> (Box<dyn GenerationBackend>, Arc<AtomicUsize>) {
        Self::boxed(name, Err(AttemptError::Backend("status 503".to_string())))
    }

    fn boxed(
        name: &str,
        response: Result<String, AttemptError>,
    ) -> (Box<dyn GenerationBackend>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let backend = Self {
            name: name.to_string(),
            response,
            calls: calls.clone(),
        };
        (Box::new(backend), calls)
    }
}

impl GenerationBackend for ScriptedBackend {
    fn generate(&self, _prompt: &str) -> Result<String, AttemptError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

pub fn calls(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

/// Embeds text as [mentions "cat", mentions "dog", 0.1].
pub struct KeywordEmbedding;

impl EmbeddingBackend for KeywordEmbedding {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let text = text.to_lowercase();
        let flag = |word: &str| if text.contains(word) { 1.0 } else { 0.0 };
        Ok(vec![flag("cat"), flag("dog"), 0.1])
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

pub struct FailingEmbedding;

impl EmbeddingBackend for FailingEmbedding {
    fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        anyhow::bail!("connection refused")
    }

    fn name(&self) -> &str {
        "failing"
    }
}

pub fn keyword_embeddings() -> Arc<EmbeddingProvider> {
    Arc::new(EmbeddingProvider::new(Box::new(KeywordEmbedding), DIMENSIONS))
}

pub fn create_store(tmp: &tempfile::TempDir) -> Arc<BackendJson> {
    let storage = BackendLocal::new(tmp.path().join("data")).expect("failed to create storage");
    Arc::new(BackendJson::load(Box::new(storage)).expect("failed to load store"))
}

/// Creates an isolated app in a unique temp directory.
/// The store is returned as well so tests can flip its vector capability.
pub fn create_app_with(
    generator: GenerationProvider,
    embeddings: Arc<EmbeddingProvider>,
) -> (StudyApp, Arc<BackendJson>, tempfile::TempDir) {
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let store = create_store(&tmp);
    let app = StudyApp::new(store.clone(), generator, embeddings);
    (app, store, tmp)
}

/// App with no generation backends, so every artifact is heuristic.
pub fn create_app() -> (StudyApp, Arc<BackendJson>, tempfile::TempDir) {
    create_app_with(GenerationProvider::new(), keyword_embeddings())
}
