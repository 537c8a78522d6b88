use crate::{
    extract::{self, DocumentKind},
    generation::{Flashcard, GenerationProvider, QuizQuestion},
    notes::{
        FlashcardRecord, Note, NoteCreate, NoteStore, QuizRecord, SessionKind, StudySession,
        Summary,
    },
    semantic::{EmbeddingProvider, SimilarityRanker},
};
use serde::Serialize;
use std::{path::Path, sync::Arc};

use super::errors::AppError;

/// A note returned by search, with its relevance.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub note: Note,
    pub similarity: f32,
}

/// The study workflows over a note store: upload, artifact generation,
/// search and study sessions. Every operation is scoped to `owner`.
pub struct StudyApp {
    store: Arc<dyn NoteStore>,
    generator: GenerationProvider,
    embeddings: Arc<EmbeddingProvider>,
    ranker: SimilarityRanker,
}

/// Read a document from disk, returning its kind, bytes and file name.
pub fn read_document(path: &Path) -> Result<(DocumentKind, Vec<u8>, String), AppError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();

    // reject unsupported kinds before touching the file
    let kind = DocumentKind::from_file_name(&file_name)?;
    let data = std::fs::read(path)?;

    Ok((kind, data, file_name))
}

impl StudyApp {
    pub fn new(
        store: Arc<dyn NoteStore>,
        generator: GenerationProvider,
        embeddings: Arc<EmbeddingProvider>,
    ) -> Self {
        let ranker = SimilarityRanker::new(store.clone(), embeddings.clone());
        Self {
            store,
            generator,
            embeddings,
            ranker,
        }
    }

    /// Extract text from a file without storing anything.
    pub fn extract_file(&self, path: &Path) -> Result<String, AppError> {
        let (kind, data, _) = read_document(path)?;
        Ok(extract::extract(&data, kind)?)
    }

    /// Extract, optionally embed, and store an uploaded document.
    ///
    /// The embedding is only computed while the store reports vector
    /// capability, and a failed embedding fails the whole upload.
    pub fn upload(
        &self,
        owner: &str,
        file_name: &str,
        data: &[u8],
        title: Option<&str>,
    ) -> Result<Note, AppError> {
        let kind = DocumentKind::from_file_name(file_name)?;
        let content = extract::extract(data, kind)?;

        let embedding = if self.store.vector_capability() {
            Some(self.embeddings.embed(&content)?)
        } else {
            None
        };

        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(file_name);

        let note = self.store.create_note(NoteCreate {
            owner: owner.to_string(),
            title: title.to_string(),
            content,
            file_type: kind,
            file_name: file_name.to_string(),
            file_size: data.len() as u64,
            embedding,
        })?;

        log::info!(
            "uploaded note {} ({kind}, {} bytes, embedded={})",
            note.id,
            note.file_size,
            note.embedding.is_some()
        );

        Ok(note)
    }

    pub fn upload_file(&self, owner: &str, path: &Path, title: Option<&str>) -> Result<Note, AppError> {
        let (_, data, file_name) = read_document(path)?;
        self.upload(owner, &file_name, &data, title)
    }

    pub fn list(&self, owner: &str) -> Result<Vec<Note>, AppError> {
        Ok(self.store.list_notes(owner)?)
    }

    pub fn show(&self, owner: &str, id: u64) -> Result<Note, AppError> {
        self.store
            .get_note(owner, id)?
            .ok_or(AppError::NotFound("note"))
    }

    pub fn delete(&self, owner: &str, id: u64) -> Result<(), AppError> {
        if !self.store.delete_note(owner, id)? {
            return Err(AppError::NotFound("note"));
        }
        Ok(())
    }

    /// Generate the note's summary and store it, replacing any previous one.
    pub fn generate_summary(&self, owner: &str, id: u64) -> Result<Summary, AppError> {
        let note = self.show(owner, id)?;
        let summary = self.generator.summary(&note.content)?;
        Ok(self.store.upsert_summary(note.id, &summary.0)?)
    }

    pub fn summary(&self, owner: &str, id: u64) -> Result<Summary, AppError> {
        let note = self.show(owner, id)?;
        self.store
            .get_summary(note.id)?
            .ok_or(AppError::NotFound("summary"))
    }

    /// Generate a fresh flashcard set, replacing the stored one.
    pub fn generate_flashcards(&self, owner: &str, id: u64) -> Result<Vec<FlashcardRecord>, AppError> {
        let note = self.show(owner, id)?;
        let cards: Vec<Flashcard> = self.generator.flashcards(&note.content)?.0;
        Ok(self.store.replace_flashcards(note.id, &cards)?)
    }

    pub fn flashcards(&self, owner: &str, id: u64) -> Result<Vec<FlashcardRecord>, AppError> {
        let note = self.show(owner, id)?;
        Ok(self.store.get_flashcards(note.id)?)
    }

    /// Generate a fresh quiz, replacing the stored one.
    pub fn generate_quiz(&self, owner: &str, id: u64) -> Result<Vec<QuizRecord>, AppError> {
        let note = self.show(owner, id)?;
        let questions: Vec<QuizQuestion> = self.generator.quiz(&note.content)?.0;
        Ok(self.store.replace_quiz(note.id, &questions)?)
    }

    pub fn quiz(&self, owner: &str, id: u64) -> Result<Vec<QuizRecord>, AppError> {
        let note = self.show(owner, id)?;
        Ok(self.store.get_quiz(note.id)?)
    }

    /// Rank the owner's notes against `query`.
    pub fn search(&self, owner: &str, query: &str) -> Result<Vec<SearchHit>, AppError> {
        if query.trim().is_empty() {
            return Err(AppError::EmptyInput("query"));
        }

        let ranked = self.ranker.search(query, owner)?;

        let mut hits = Vec::with_capacity(ranked.len());
        for r in ranked {
            if let Some(note) = self.store.get_note(owner, r.note_id)? {
                hits.push(SearchHit {
                    note,
                    similarity: r.score,
                });
            }
        }

        Ok(hits)
    }

    pub fn start_session(&self, owner: &str, note_id: u64, kind: SessionKind) -> Result<StudySession, AppError> {
        let note = self.show(owner, note_id)?;
        Ok(self.store.create_session(owner, note.id, kind)?)
    }

    pub fn finish_session(
        &self,
        owner: &str,
        session_id: u64,
        score: Option<i64>,
        completed: bool,
    ) -> Result<StudySession, AppError> {
        self.store
            .update_session(owner, session_id, score, completed)?
            .ok_or(AppError::NotFound("study session"))
    }
}
