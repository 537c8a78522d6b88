//! Lexical (keyword) scoring, used when vector search is unavailable.
//!
//! Each note gets the score of the first tier it matches, all comparisons
//! case-insensitive:
//!
//! | tier | match                                          | score |
//! |------|------------------------------------------------|-------|
//! | 1    | title contains the query                       | 1.0   |
//! | 2    | content contains the query                     | 0.8   |
//! | 3    | title contains the query's words, in order     | 0.6   |
//! | 4    | content contains the query's words, in order   | 0.4   |
//!
//! Notes matching no tier are left out.

pub const TITLE_EXACT: f32 = 1.0;
pub const CONTENT_EXACT: f32 = 0.8;
pub const TITLE_WORDS: f32 = 0.6;
pub const CONTENT_WORDS: f32 = 0.4;

/// Result of lexical scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalResult {
    /// Note ID
    pub id: u64,
    pub score: f32,
}

/// Score a single note. Returns 0.0 when no tier matches.
pub fn score(query: &str, title: &str, content: &str) -> f32 {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return 0.0;
    }

    let title = title.to_lowercase();
    let content = content.to_lowercase();
    let words: Vec<&str> = query.split_whitespace().collect();

    if title.contains(&query) {
        TITLE_EXACT
    } else if content.contains(&query) {
        CONTENT_EXACT
    } else if contains_in_order(&title, &words) {
        TITLE_WORDS
    } else if contains_in_order(&content, &words) {
        CONTENT_WORDS
    } else {
        0.0
    }
}

/// Score notes given as (id, title, content) tuples.
///
/// Only notes with a positive score are returned, highest first; ties keep
/// the input order.
pub fn score_lexical(query: &str, notes: &[(u64, &str, &str)], limit: usize) -> Vec<LexicalResult> {
    let mut results: Vec<LexicalResult> = notes
        .iter()
        .filter_map(|(id, title, content)| {
            let score = score(query, title, content);
            (score > 0.0).then_some(LexicalResult { id: *id, score })
        })
        .collect();

    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(limit);
    results
}

/// True if every word occurs in `haystack`, each after the previous one.
fn contains_in_order(haystack: &str, words: &[&str]) -> bool {
    let mut rest = haystack;
    for word in words {
        match rest.find(word) {
            Some(idx) => rest = &rest[idx + word.len()..],
            None => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_table() {
        assert_eq!(score("cat", "Cats are great", "dogs are loyal"), TITLE_EXACT);
        assert_eq!(score("cat", "pets", "I love my cat"), CONTENT_EXACT);
        assert_eq!(score("cat", "pets", "dogs are loyal"), 0.0);
    }

    #[test]
    fn test_word_tiers() {
        assert_eq!(score("cell energy", "Cell biology and energy", "x"), TITLE_WORDS);
        assert_eq!(score("cell energy", "Notes", "The cell makes energy"), CONTENT_WORDS);
        // wrong order
        assert_eq!(score("energy cell", "Notes", "The cell makes energy"), 0.0);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(score("PHOTOSYNTHESIS", "photosynthesis basics", ""), TITLE_EXACT);
    }

    #[test]
    fn test_blank_query_matches_nothing() {
        assert_eq!(score("   ", "anything", "anything"), 0.0);
    }

    #[test]
    fn test_wildcard_characters_are_literal() {
        assert_eq!(score("100%", "100 percent", "grade: 100 out of 100"), 0.0);
        assert_eq!(score("a_b", "axb", ""), 0.0);
    }

    #[test]
    fn test_score_lexical_orders_and_filters() {
        let notes = [
            (1, "pets", "I love my cat"),
            (2, "unrelated", "nothing here"),
            (3, "Cats are great", "dogs are loyal"),
            (4, "more pets", "a cat again"),
        ];

        let results = score_lexical("cat", &notes, 10);
        let ids: Vec<u64> = results.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1, 4]);
        assert_eq!(results[0].score, TITLE_EXACT);
    }

    #[test]
    fn test_score_lexical_limit() {
        let notes: Vec<(u64, &str, &str)> = (0..20).map(|i| (i, "cat", "")).collect();
        assert_eq!(score_lexical("cat", &notes, 10).len(), 10);
    }
}
