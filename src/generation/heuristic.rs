//! Deterministic, network-free artifact generators.
//!
//! These are the last stage of every generation chain and never fail: any
//! non-blank text yields a non-empty summary, at least one flashcard and at
//! least one quiz question.

use super::{Flashcard, FlashcardSet, QuizQuestion, QuizSet, SummaryText};

const NO_CONTENT_SUMMARY: &str = "No content available for summary.";

// minimum sentence length (chars, exclusive) per artifact kind
const SUMMARY_MIN_SENTENCE: usize = 15;
const CARD_MIN_SENTENCE: usize = 20;
const QUIZ_MIN_SENTENCE: usize = 25;

const SUMMARY_SENTENCES: usize = 7;
const SUMMARY_EXTRA_SENTENCES: usize = 3;
const SUMMARY_MIN_CHARS: usize = 100;
const SUMMARY_FALLBACK_WORDS: usize = 20;

const MAX_CARDS: usize = 8;
const MAX_QUESTIONS: usize = 6;
const MAX_CHUNKS: usize = 5;

// stand-ins for a distractor that repeats an earlier option
const SPARE_OPTIONS: [&str; 3] = [
    "None of the above",
    "All of the above",
    "The text does not say",
];

const QUESTION_PREFIX_CHARS: usize = 40;
const CHUNK_PREFIX_CHARS: usize = 30;

const CARD_TEMPLATES: [&str; 8] = [
    "What is the main concept discussed in:",
    "Explain the key idea:",
    "What does this statement mean:",
    "How does this relate to the topic:",
    "What is the significance of:",
    "What are the implications of:",
    "What can we learn from:",
    "What is the purpose of:",
];

const CHUNK_TEMPLATES: [&str; 5] = [
    "What is the main topic in this section:",
    "What concept is explained here:",
    "What information is provided about:",
    "What does this part discuss:",
    "What is the focus of this section:",
];

struct QuizTemplate {
    lead: &'static str,
    options: [&'static str; 4],
}

const QUIZ_TEMPLATES: [QuizTemplate; 6] = [
    QuizTemplate {
        lead: "What is the main concept discussed in:",
        options: [
            "The correct concept",
            "A related but different concept",
            "An unrelated concept",
            "A completely opposite concept",
        ],
    },
    QuizTemplate {
        lead: "Which statement best describes:",
        options: [
            "The accurate description",
            "A partially correct description",
            "An incorrect description",
            "An irrelevant description",
        ],
    },
    QuizTemplate {
        lead: "What does this statement mean:",
        options: [
            "The intended meaning",
            "A different interpretation",
            "A misunderstanding",
            "An unrelated meaning",
        ],
    },
    QuizTemplate {
        lead: "How does this relate to the topic:",
        options: [
            "Directly related",
            "Indirectly related",
            "Not related",
            "Opposite to the topic",
        ],
    },
    QuizTemplate {
        lead: "What is the significance of:",
        options: [
            "High significance",
            "Moderate significance",
            "Low significance",
            "No significance",
        ],
    },
    QuizTemplate {
        lead: "What are the implications of:",
        options: [
            "Positive implications",
            "Negative implications",
            "Mixed implications",
            "No implications",
        ],
    },
];

/// Leading sentences of the text, padded out when the result is short.
pub fn summary(text: &str) -> SummaryText {
    let text = text.trim();
    if text.is_empty() {
        return SummaryText(NO_CONTENT_SUMMARY.to_string());
    }

    let sentences = sentences(text, SUMMARY_MIN_SENTENCE);
    if sentences.is_empty() {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.len() > SUMMARY_FALLBACK_WORDS {
            return SummaryText(format!("{}...", words[..SUMMARY_FALLBACK_WORDS].join(" ")));
        }
        return SummaryText(text.to_string());
    }

    let mut taken = sentences.len().min(SUMMARY_SENTENCES);
    let mut summary = join_sentences(&sentences[..taken]);

    if summary.chars().count() < SUMMARY_MIN_CHARS && sentences.len() > taken {
        taken += (sentences.len() - taken).min(SUMMARY_EXTRA_SENTENCES);
        summary = join_sentences(&sentences[..taken]);
    }

    SummaryText(summary)
}

/// One card per qualifying sentence, else one per word chunk, else a single
/// card holding the whole text.
pub fn flashcards(text: &str) -> FlashcardSet {
    let cards: Vec<Flashcard> = sentences(text, CARD_MIN_SENTENCE)
        .into_iter()
        .take(MAX_CARDS)
        .enumerate()
        .map(|(i, sentence)| Flashcard {
            question: question(
                CARD_TEMPLATES[i % CARD_TEMPLATES.len()],
                sentence,
                QUESTION_PREFIX_CHARS,
            ),
            answer: sentence.to_string(),
        })
        .collect();

    if !cards.is_empty() {
        return FlashcardSet(cards);
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > 10 {
        let size = (words.len() / 5).max(5);
        let cards = words
            .chunks(size)
            .take(MAX_CHUNKS)
            .enumerate()
            .map(|(i, chunk)| {
                let chunk = chunk.join(" ");
                Flashcard {
                    question: question(
                        CHUNK_TEMPLATES[i % CHUNK_TEMPLATES.len()],
                        &chunk,
                        CHUNK_PREFIX_CHARS,
                    ),
                    answer: chunk,
                }
            })
            .collect();
        return FlashcardSet(cards);
    }

    FlashcardSet(vec![Flashcard {
        question: "What is the main content of this note?".to_string(),
        answer: text.trim().to_string(),
    }])
}

/// Multiple-choice questions whose correct answer is always option 0.
pub fn quiz(text: &str) -> QuizSet {
    let questions: Vec<QuizQuestion> = sentences(text, QUIZ_MIN_SENTENCE)
        .into_iter()
        .take(MAX_QUESTIONS)
        .enumerate()
        .map(|(i, sentence)| {
            let template = &QUIZ_TEMPLATES[i % QUIZ_TEMPLATES.len()];
            QuizQuestion {
                question: question(template.lead, sentence, QUESTION_PREFIX_CHARS),
                options: sentence_options(sentence, template),
                correct_index: 0,
            }
        })
        .collect();

    if !questions.is_empty() {
        return QuizSet(questions);
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > 15 {
        let size = (words.len() / 5).max(8);
        let questions = words
            .chunks(size)
            .take(MAX_CHUNKS)
            .enumerate()
            .map(|(i, chunk)| {
                let chunk = chunk.join(" ");
                let topic = words[(i * 2).min(words.len() - 1)];
                QuizQuestion {
                    question: question(
                        CHUNK_TEMPLATES[i % CHUNK_TEMPLATES.len()],
                        &chunk,
                        CHUNK_PREFIX_CHARS,
                    ),
                    options: distinct([
                        chunk,
                        format!("This section discusses {topic}"),
                        "This information is not present in the text".to_string(),
                        "This section covers a completely different topic".to_string(),
                    ]),
                    correct_index: 0,
                }
            })
            .collect();
        return QuizSet(questions);
    }

    QuizSet(vec![QuizQuestion {
        question: "What is the main topic of this note?".to_string(),
        options: distinct([
            text.trim().to_string(),
            "This is about a different topic".to_string(),
            "This is not relevant".to_string(),
            "This is incorrect information".to_string(),
        ]),
        correct_index: 0,
    }])
}

fn sentence_options(sentence: &str, template: &QuizTemplate) -> [String; 4] {
    let words: Vec<&str> = sentence.split_whitespace().collect();
    if words.len() > 3 {
        return distinct([
            sentence.to_string(),
            format!("{} with different context", words[..words.len() / 2].join(" ")),
            "This statement is partially accurate but incomplete".to_string(),
            "This statement is not mentioned in the original text".to_string(),
        ]);
    }

    let mut options = template.options.map(str::to_string);
    options[0] = sentence.to_string();
    distinct(options)
}

/// Replaces any distractor that repeats an earlier option (ignoring case and
/// surrounding whitespace) with an unused spare. Option 0 is never touched.
fn distinct(mut options: [String; 4]) -> [String; 4] {
    let same = |a: &str, b: &str| a.trim().eq_ignore_ascii_case(b.trim());

    for i in 1..options.len() {
        if !options[..i].iter().any(|o| same(o, &options[i])) {
            continue;
        }
        let spare = SPARE_OPTIONS
            .iter()
            .find(|spare| !options.iter().any(|o| same(o, spare)));
        if let Some(spare) = spare {
            options[i] = spare.to_string();
        }
    }

    options
}

/// Trimmed pieces between `.`, `!` and `?` that are longer than `min_chars`.
fn sentences(text: &str, min_chars: usize) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| s.chars().count() > min_chars)
        .collect()
}

fn join_sentences(sentences: &[&str]) -> String {
    format!("{}.", sentences.join(". "))
}

fn question(lead: &str, subject: &str, max_chars: usize) -> String {
    format!("{lead} {}?", prefix(subject, max_chars))
}

fn prefix(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
