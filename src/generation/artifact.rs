//! Per-kind prompts, response parsing and validation.

use super::{
    heuristic, ArtifactKind, AttemptError, Flashcard, FlashcardSet, QuizQuestion, QuizSet,
    SummaryText, MIN_SUMMARY_CHARS,
};
use serde::Deserialize;

/// A study artifact the provider chain can produce.
pub trait Artifact: Sized {
    const KIND: ArtifactKind;

    /// Prompt sent to generation backends for `text`.
    fn prompt(text: &str) -> String;

    /// Parse and validate an already-sanitized backend payload.
    fn parse(payload: &str) -> Result<Self, AttemptError>;

    /// Local fallback, used when every backend attempt was discarded.
    fn heuristic(text: &str) -> Self;
}

impl Artifact for SummaryText {
    const KIND: ArtifactKind = ArtifactKind::Summary;

    fn prompt(text: &str) -> String {
        format!(
            "Please provide a comprehensive summary of the following text. \
             The summary should be clear, well-structured, and capture the main points and key concepts:\n\n\
             {text}\n\n\
             Summary:"
        )
    }

    fn parse(payload: &str) -> Result<Self, AttemptError> {
        let summary = payload.trim();
        let len = summary.chars().count();
        if len < MIN_SUMMARY_CHARS {
            return Err(AttemptError::Rejected(format!(
                "summary has {len} chars, need at least {MIN_SUMMARY_CHARS}"
            )));
        }
        Ok(SummaryText(summary.to_string()))
    }

    fn heuristic(text: &str) -> Self {
        heuristic::summary(text)
    }
}

impl Artifact for FlashcardSet {
    const KIND: ArtifactKind = ArtifactKind::Flashcards;

    fn prompt(text: &str) -> String {
        format!(
            r#"Create 6-8 comprehensive educational flashcards from the following text. Each flashcard should have a clear, specific question and a detailed, accurate answer. Make questions diverse and cover different aspects of the content. Format the response as valid JSON with this exact structure:
[
  {{"question": "What is the main topic discussed?", "answer": "The main topic is..."}},
  {{"question": "What are the key concepts?", "answer": "The key concepts include..."}},
  {{"question": "How does this work?", "answer": "This works by..."}},
  {{"question": "What are the implications?", "answer": "The implications are..."}}
]

Text to create flashcards from:
{text}

Return only the JSON array, no additional text:"#
        )
    }

    fn parse(payload: &str) -> Result<Self, AttemptError> {
        let cards: Vec<Flashcard> =
            serde_json::from_str(payload).map_err(|e| AttemptError::Parse(e.to_string()))?;

        if cards.is_empty() {
            return Err(AttemptError::Rejected("no flashcards".to_string()));
        }

        if let Some(i) = cards
            .iter()
            .position(|c| c.question.trim().is_empty() || c.answer.trim().is_empty())
        {
            return Err(AttemptError::Rejected(format!("flashcard {i} has a blank field")));
        }

        Ok(FlashcardSet(cards))
    }

    fn heuristic(text: &str) -> Self {
        heuristic::flashcards(text)
    }
}

/// Wire shape of a quiz item before the option count is checked.
#[derive(Deserialize)]
struct RawQuizQuestion {
    question: String,
    options: Vec<String>,
    answer: i64,
}

impl TryFrom<RawQuizQuestion> for QuizQuestion {
    type Error = String;

    fn try_from(raw: RawQuizQuestion) -> Result<Self, Self::Error> {
        if raw.question.trim().is_empty() {
            return Err("blank question".to_string());
        }

        let count = raw.options.len();
        let options: [String; 4] = raw
            .options
            .try_into()
            .map_err(|_| format!("expected 4 options, got {count}"))?;

        let correct_index = usize::try_from(raw.answer)
            .ok()
            .filter(|i| *i < options.len())
            .ok_or_else(|| format!("answer index {} out of range", raw.answer))?;

        Ok(QuizQuestion {
            question: raw.question,
            options,
            correct_index,
        })
    }
}

impl Artifact for QuizSet {
    const KIND: ArtifactKind = ArtifactKind::Quiz;

    fn prompt(text: &str) -> String {
        format!(
            r#"Create 6-8 comprehensive multiple choice quiz questions from the following text. Each question should have 4 unique, plausible options with one correct answer. Make questions diverse and cover different aspects of the content. Ensure all options are different and meaningful. Format the response as valid JSON with this exact structure:
[
  {{
    "question": "What is the main topic discussed?",
    "options": ["The correct answer", "A plausible but wrong answer", "Another wrong option", "A third wrong option"],
    "answer": 0
  }}
]

Text to create quiz from:
{text}

Return only the JSON array, no additional text:"#
        )
    }

    fn parse(payload: &str) -> Result<Self, AttemptError> {
        let raw: Vec<RawQuizQuestion> =
            serde_json::from_str(payload).map_err(|e| AttemptError::Parse(e.to_string()))?;

        if raw.is_empty() {
            return Err(AttemptError::Rejected("no quiz questions".to_string()));
        }

        let questions = raw
            .into_iter()
            .enumerate()
            .map(|(i, q)| {
                QuizQuestion::try_from(q)
                    .map_err(|e| AttemptError::Rejected(format!("question {i}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QuizSet(questions))
    }

    fn heuristic(text: &str) -> Self {
        heuristic::quiz(text)
    }
}
