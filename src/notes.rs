use crate::extract::DocumentKind;
use crate::generation::{Flashcard, QuizQuestion};
use crate::storage::StorageManager;
use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        RwLock, RwLockReadGuard, RwLockWriteGuard,
    },
    time::Instant,
};

const DATABASE_FILE: &str = "notes.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: u64,
    pub owner: String,

    pub title: String,
    pub content: String,
    pub file_type: DocumentKind,
    pub file_name: String,
    pub file_size: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NoteCreate {
    pub owner: String,
    pub title: String,
    pub content: String,
    pub file_type: DocumentKind,
    pub file_name: String,
    pub file_size: u64,
    pub embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub id: u64,
    pub note_id: u64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashcardRecord {
    pub id: u64,
    pub note_id: u64,
    #[serde(flatten)]
    pub card: Flashcard,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizRecord {
    pub id: u64,
    pub note_id: u64,
    #[serde(flatten)]
    pub question: QuizQuestion,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Summary,
    Flashcard,
    Quiz,
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Summary => write!(f, "summary"),
            Self::Flashcard => write!(f, "flashcard"),
            Self::Quiz => write!(f, "quiz"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySession {
    pub id: u64,
    pub owner: String,
    pub note_id: u64,
    #[serde(rename = "type")]
    pub kind: SessionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<i64>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Persistence for notes, their study artifacts and study sessions.
///
/// Note and session operations are scoped to an owner; a note belonging to
/// someone else behaves as if it did not exist. Artifact operations take a
/// note id the caller has already resolved through `get_note`.
pub trait NoteStore: Send + Sync {
    /// Whether stored embeddings can be searched. Read on every call.
    fn vector_capability(&self) -> bool;

    fn create_note(&self, note: NoteCreate) -> anyhow::Result<Note>;
    fn list_notes(&self, owner: &str) -> anyhow::Result<Vec<Note>>;
    fn get_note(&self, owner: &str, id: u64) -> anyhow::Result<Option<Note>>;
    /// Deletes the note with everything derived from it. Returns false if
    /// there was no such note.
    fn delete_note(&self, owner: &str, id: u64) -> anyhow::Result<bool>;

    /// Insert, or replace the content of, the note's summary.
    fn upsert_summary(&self, note_id: u64, content: &str) -> anyhow::Result<Summary>;
    fn get_summary(&self, note_id: u64) -> anyhow::Result<Option<Summary>>;

    /// Replace the note's whole flashcard set.
    fn replace_flashcards(&self, note_id: u64, cards: &[Flashcard]) -> anyhow::Result<Vec<FlashcardRecord>>;
    fn get_flashcards(&self, note_id: u64) -> anyhow::Result<Vec<FlashcardRecord>>;

    /// Replace the note's whole quiz set.
    fn replace_quiz(&self, note_id: u64, questions: &[QuizQuestion]) -> anyhow::Result<Vec<QuizRecord>>;
    fn get_quiz(&self, note_id: u64) -> anyhow::Result<Vec<QuizRecord>>;

    fn create_session(&self, owner: &str, note_id: u64, kind: SessionKind) -> anyhow::Result<StudySession>;
    /// Overwrites score and completion. None if the session is not the owner's.
    fn update_session(
        &self,
        owner: &str,
        session_id: u64,
        score: Option<i64>,
        completed: bool,
    ) -> anyhow::Result<Option<StudySession>>;
}

/// Everything the JSON backend persists, in one document.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Database {
    #[serde(default)]
    notes: Vec<Note>,
    #[serde(default)]
    summaries: Vec<Summary>,
    #[serde(default)]
    flashcards: Vec<FlashcardRecord>,
    #[serde(default)]
    quizzes: Vec<QuizRecord>,
    #[serde(default)]
    sessions: Vec<StudySession>,
    #[serde(default)]
    last_id: u64,
}

impl Database {
    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }
}

/// File-backed store: the whole database is kept in memory and rewritten to
/// `notes.json` after every change.
pub struct BackendJson {
    db: RwLock<Database>,
    storage: Box<dyn StorageManager>,
    vector_capability: AtomicBool,
}

impl BackendJson {
    pub fn load(storage: Box<dyn StorageManager>) -> anyhow::Result<Self> {
        let now = Instant::now();

        let db = if storage.exists(DATABASE_FILE) {
            let data = storage.read(DATABASE_FILE)?;
            serde_json::from_slice(&data)
                .map_err(|e| anyhow!("failed to parse {DATABASE_FILE}: {e}"))?
        } else {
            log::info!("Creating new database {DATABASE_FILE}");
            let db = Database::default();
            storage.write(DATABASE_FILE, &serde_json::to_vec_pretty(&db)?)?;
            db
        };

        log::debug!(
            "took {}ms to read database",
            now.elapsed().as_micros() as f64 / 1000.0
        );

        Ok(Self {
            db: RwLock::new(db),
            storage,
            vector_capability: AtomicBool::new(false),
        })
    }

    pub fn with_vector_capability(self, available: bool) -> Self {
        self.set_vector_capability(available);
        self
    }

    pub fn set_vector_capability(&self, available: bool) {
        self.vector_capability.store(available, Ordering::SeqCst);
    }

    fn read(&self) -> anyhow::Result<RwLockReadGuard<'_, Database>> {
        self.db.read().map_err(|_| anyhow!("database lock poisoned"))
    }

    fn write(&self) -> anyhow::Result<RwLockWriteGuard<'_, Database>> {
        self.db.write().map_err(|_| anyhow!("database lock poisoned"))
    }

    /// Persist while still holding the write guard so saves never interleave.
    fn save(&self, db: &Database) -> anyhow::Result<()> {
        let data = serde_json::to_vec_pretty(db)?;
        self.storage.write(DATABASE_FILE, &data)?;
        Ok(())
    }
}

impl NoteStore for BackendJson {
    fn vector_capability(&self) -> bool {
        self.vector_capability.load(Ordering::SeqCst)
    }

    fn create_note(&self, create: NoteCreate) -> anyhow::Result<Note> {
        let mut db = self.write()?;
        let now = Utc::now();

        let note = Note {
            id: db.next_id(),
            owner: create.owner,
            title: create.title,
            content: create.content,
            file_type: create.file_type,
            file_name: create.file_name,
            file_size: create.file_size,
            embedding: create.embedding,
            created_at: now,
            updated_at: now,
        };

        db.notes.push(note.clone());
        self.save(&db)?;

        Ok(note)
    }

    fn list_notes(&self, owner: &str) -> anyhow::Result<Vec<Note>> {
        let db = self.read()?;
        let mut notes: Vec<Note> = db.notes.iter().filter(|n| n.owner == owner).cloned().collect();
        // newest first
        notes.reverse();
        Ok(notes)
    }

    fn get_note(&self, owner: &str, id: u64) -> anyhow::Result<Option<Note>> {
        let db = self.read()?;
        Ok(db
            .notes
            .iter()
            .find(|n| n.id == id && n.owner == owner)
            .cloned())
    }

    fn delete_note(&self, owner: &str, id: u64) -> anyhow::Result<bool> {
        let mut db = self.write()?;

        let Some(idx) = db.notes.iter().position(|n| n.id == id && n.owner == owner) else {
            return Ok(false);
        };

        db.notes.remove(idx);
        db.summaries.retain(|s| s.note_id != id);
        db.flashcards.retain(|f| f.note_id != id);
        db.quizzes.retain(|q| q.note_id != id);
        db.sessions.retain(|s| s.note_id != id);

        self.save(&db)?;
        Ok(true)
    }

    fn upsert_summary(&self, note_id: u64, content: &str) -> anyhow::Result<Summary> {
        let mut db = self.write()?;
        let now = Utc::now();

        let summary = match db.summaries.iter().position(|s| s.note_id == note_id) {
            Some(idx) => {
                let summary = &mut db.summaries[idx];
                summary.content = content.to_string();
                summary.updated_at = now;
                summary.clone()
            }
            None => {
                let summary = Summary {
                    id: db.next_id(),
                    note_id,
                    content: content.to_string(),
                    created_at: now,
                    updated_at: now,
                };
                db.summaries.push(summary.clone());
                summary
            }
        };

        self.save(&db)?;
        Ok(summary)
    }

    fn get_summary(&self, note_id: u64) -> anyhow::Result<Option<Summary>> {
        let db = self.read()?;
        Ok(db.summaries.iter().find(|s| s.note_id == note_id).cloned())
    }

    fn replace_flashcards(&self, note_id: u64, cards: &[Flashcard]) -> anyhow::Result<Vec<FlashcardRecord>> {
        let mut db = self.write()?;
        let now = Utc::now();

        db.flashcards.retain(|f| f.note_id != note_id);
        let mut records = Vec::with_capacity(cards.len());
        for card in cards {
            records.push(FlashcardRecord {
                id: db.next_id(),
                note_id,
                card: card.clone(),
                created_at: now,
            });
        }
        db.flashcards.extend(records.iter().cloned());

        self.save(&db)?;
        Ok(records)
    }

    fn get_flashcards(&self, note_id: u64) -> anyhow::Result<Vec<FlashcardRecord>> {
        let db = self.read()?;
        Ok(db
            .flashcards
            .iter()
            .filter(|f| f.note_id == note_id)
            .cloned()
            .collect())
    }

    fn replace_quiz(&self, note_id: u64, questions: &[QuizQuestion]) -> anyhow::Result<Vec<QuizRecord>> {
        let mut db = self.write()?;
        let now = Utc::now();

        db.quizzes.retain(|q| q.note_id != note_id);
        let mut records = Vec::with_capacity(questions.len());
        for question in questions {
            records.push(QuizRecord {
                id: db.next_id(),
                note_id,
                question: question.clone(),
                created_at: now,
            });
        }
        db.quizzes.extend(records.iter().cloned());

        self.save(&db)?;
        Ok(records)
    }

    fn get_quiz(&self, note_id: u64) -> anyhow::Result<Vec<QuizRecord>> {
        let db = self.read()?;
        Ok(db
            .quizzes
            .iter()
            .filter(|q| q.note_id == note_id)
            .cloned()
            .collect())
    }

    fn create_session(&self, owner: &str, note_id: u64, kind: SessionKind) -> anyhow::Result<StudySession> {
        let mut db = self.write()?;

        let session = StudySession {
            id: db.next_id(),
            owner: owner.to_string(),
            note_id,
            kind,
            score: None,
            completed: false,
            created_at: Utc::now(),
        };

        db.sessions.push(session.clone());
        self.save(&db)?;
        Ok(session)
    }

    fn update_session(
        &self,
        owner: &str,
        session_id: u64,
        score: Option<i64>,
        completed: bool,
    ) -> anyhow::Result<Option<StudySession>> {
        let mut db = self.write()?;

        let Some(session) = db
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id && s.owner == owner)
        else {
            return Ok(None);
        };

        session.score = score;
        session.completed = completed;
        let session = session.clone();

        self.save(&db)?;
        Ok(Some(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::BackendLocal;

    fn store(dir: &std::path::Path) -> BackendJson {
        BackendJson::load(Box::new(BackendLocal::new(dir).unwrap())).unwrap()
    }

    fn new_note(owner: &str, title: &str) -> NoteCreate {
        NoteCreate {
            owner: owner.to_string(),
            title: title.to_string(),
            content: format!("{title} content"),
            file_type: DocumentKind::Txt,
            file_name: format!("{title}.txt"),
            file_size: 10,
            embedding: None,
        }
    }

    fn card(q: &str) -> Flashcard {
        Flashcard {
            question: q.to_string(),
            answer: "a".to_string(),
        }
    }

    #[test]
    fn test_notes_are_owner_scoped() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());

        let mine = store.create_note(new_note("alice", "mine")).unwrap();
        store.create_note(new_note("bob", "theirs")).unwrap();

        assert_eq!(store.list_notes("alice").unwrap().len(), 1);
        assert!(store.get_note("alice", mine.id).unwrap().is_some());
        assert!(store.get_note("bob", mine.id).unwrap().is_none());
        assert!(!store.delete_note("bob", mine.id).unwrap());
        assert!(store.delete_note("alice", mine.id).unwrap());
        assert!(store.list_notes("alice").unwrap().is_empty());
    }

    #[test]
    fn test_list_is_newest_first() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());

        store.create_note(new_note("u", "first")).unwrap();
        store.create_note(new_note("u", "second")).unwrap();

        let titles: Vec<String> = store.list_notes("u").unwrap().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[test]
    fn test_database_survives_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let id = {
            let store = store(tmp.path());
            let note = store.create_note(new_note("u", "kept")).unwrap();
            store.upsert_summary(note.id, "a summary").unwrap();
            note.id
        };

        let store = store(tmp.path());
        assert_eq!(store.get_note("u", id).unwrap().unwrap().title, "kept");
        assert_eq!(store.get_summary(id).unwrap().unwrap().content, "a summary");

        // ids keep increasing after a reload
        let next = store.create_note(new_note("u", "next")).unwrap();
        assert!(next.id > id);
    }

    #[test]
    fn test_summary_upsert_keeps_created_at() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let note = store.create_note(new_note("u", "n")).unwrap();

        let first = store.upsert_summary(note.id, "one").unwrap();
        let second = store.upsert_summary(note.id, "two").unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.created_at, second.created_at);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(store.get_summary(note.id).unwrap().unwrap().content, "two");
    }

    #[test]
    fn test_flashcards_replaced_as_a_set() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let note = store.create_note(new_note("u", "n")).unwrap();

        store.replace_flashcards(note.id, &[card("q1"), card("q2"), card("q3")]).unwrap();
        store.replace_flashcards(note.id, &[card("only")]).unwrap();

        let cards = store.get_flashcards(note.id).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].card.question, "only");
    }

    #[test]
    fn test_delete_cascades() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let note = store.create_note(new_note("u", "n")).unwrap();

        store.upsert_summary(note.id, "s").unwrap();
        store.replace_flashcards(note.id, &[card("q")]).unwrap();
        store.create_session("u", note.id, SessionKind::Quiz).unwrap();

        store.delete_note("u", note.id).unwrap();
        assert!(store.get_summary(note.id).unwrap().is_none());
        assert!(store.get_flashcards(note.id).unwrap().is_empty());
    }

    #[test]
    fn test_session_update_is_owner_scoped() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        let note = store.create_note(new_note("u", "n")).unwrap();

        let session = store.create_session("u", note.id, SessionKind::Flashcard).unwrap();
        assert!(!session.completed);
        assert_eq!(session.score, None);

        assert!(store.update_session("other", session.id, Some(3), true).unwrap().is_none());

        let updated = store.update_session("u", session.id, Some(8), true).unwrap().unwrap();
        assert_eq!(updated.score, Some(8));
        assert!(updated.completed);
    }

    #[test]
    fn test_vector_capability_is_read_live() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());

        assert!(!store.vector_capability());
        store.set_vector_capability(true);
        assert!(store.vector_capability());
    }

    #[test]
    fn test_quiz_record_wire_format() {
        let record = QuizRecord {
            id: 1,
            note_id: 2,
            question: QuizQuestion {
                question: "Q".to_string(),
                options: ["a", "b", "c", "d"].map(String::from),
                correct_index: 3,
            },
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["answer"], 3);
        assert_eq!(json["options"][0], "a");
        assert_eq!(json["note_id"], 2);
    }
}
