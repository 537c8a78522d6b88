use std::sync::Arc;

use crate::extract::DocumentKind;
use crate::notes::{BackendJson, NoteCreate, NoteStore};
use crate::semantic::service::{RankedNote, MAX_RESULTS};
use crate::semantic::{EmbeddingError, EmbeddingProvider, SemanticSearchError, SimilarityRanker};

use super::support::{create_store, keyword_embeddings, FailingEmbedding, DIMENSIONS};

fn add_note(store: &BackendJson, owner: &str, title: &str, content: &str, embedding: Option<Vec<f32>>) -> u64 {
    store
        .create_note(NoteCreate {
            owner: owner.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            file_type: DocumentKind::Txt,
            file_name: format!("{title}.txt"),
            file_size: content.len() as u64,
            embedding,
        })
        .unwrap()
        .id
}

fn ids(ranked: &[RankedNote]) -> Vec<u64> {
    ranked.iter().map(|r| r.note_id).collect()
}

#[test]
fn test_lexical_tiers() {
    let tmp = tempfile::tempdir().unwrap();
    let store = create_store(&tmp);

    let content_hit = add_note(&store, "u", "Pets", "I love my cat", None);
    let title_hit = add_note(&store, "u", "Cats", "Dogs", None);
    add_note(&store, "u", "Misc", "nothing here", None);
    let words_hit = add_note(&store, "u", "Misc", "the black and white cat", None);

    let ranker = SimilarityRanker::new(store.clone(), keyword_embeddings());

    let ranked = ranker.rank("cat", "u", false).unwrap();
    assert_eq!(ids(&ranked), vec![title_hit, words_hit, content_hit]);
    assert_eq!(ranked[0].score, 1.0);
    assert_eq!(ranked[1].score, 0.8);

    let ranked = ranker.rank("black cat", "u", false).unwrap();
    assert_eq!(ids(&ranked), vec![words_hit]);

    let ranked = ranker.rank("white cat", "u", false).unwrap();
    assert_eq!(ids(&ranked), vec![words_hit]);
    assert_eq!(ranked[0].score, 0.8);

    let ranked = ranker.rank("black white", "u", false).unwrap();
    assert_eq!(ranked[0].score, 0.4);
}

#[test]
fn test_vector_ranking_by_cosine() {
    let tmp = tempfile::tempdir().unwrap();
    let store = create_store(&tmp);

    let dog = add_note(&store, "u", "d", "", Some(vec![0.0, 1.0, 0.1]));
    let cat = add_note(&store, "u", "c", "", Some(vec![1.0, 0.0, 0.1]));
    let both = add_note(&store, "u", "b", "", Some(vec![1.0, 1.0, 0.1]));
    let unembedded = add_note(&store, "u", "cat", "cat", None);

    let ranker = SimilarityRanker::new(store.clone(), keyword_embeddings());
    let ranked = ranker.rank("my cat", "u", true).unwrap();

    assert_eq!(ids(&ranked), vec![cat, both, dog]);
    assert!(!ids(&ranked).contains(&unembedded));
    assert!((ranked[0].score - 1.0).abs() < 1e-5);
    assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn test_vector_skips_other_owners_and_bad_dimensions() {
    let tmp = tempfile::tempdir().unwrap();
    let store = create_store(&tmp);

    let mine = add_note(&store, "u", "mine", "", Some(vec![1.0, 0.0, 0.0]));
    add_note(&store, "other", "theirs", "", Some(vec![1.0, 0.0, 0.1]));
    add_note(&store, "u", "old", "", Some(vec![1.0, 0.0]));
    add_note(&store, "u", "zero", "", Some(vec![0.0, 0.0, 0.0]));

    let ranker = SimilarityRanker::new(store.clone(), keyword_embeddings());
    let ranked = ranker.rank("cat", "u", true).unwrap();

    assert_eq!(ids(&ranked), vec![mine]);
}

#[test]
fn test_vector_without_candidates_is_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let store = create_store(&tmp);
    add_note(&store, "u", "cat", "cat", None);

    let ranker = SimilarityRanker::new(store.clone(), keyword_embeddings());
    assert!(ranker.rank("cat", "u", true).unwrap().is_empty());
}

#[test]
fn test_results_are_capped() {
    let tmp = tempfile::tempdir().unwrap();
    let store = create_store(&tmp);
    for i in 0..15 {
        add_note(&store, "u", &format!("cat {i}"), "cat", Some(vec![1.0, 0.0, 0.1]));
    }

    let ranker = SimilarityRanker::new(store.clone(), keyword_embeddings());
    assert_eq!(ranker.rank("cat", "u", false).unwrap().len(), MAX_RESULTS);
    assert_eq!(ranker.rank("cat", "u", true).unwrap().len(), MAX_RESULTS);
}

#[test]
fn test_embedding_failure_surfaces_in_vector_mode() {
    let tmp = tempfile::tempdir().unwrap();
    let store = create_store(&tmp);
    add_note(&store, "u", "cat", "cat", Some(vec![1.0, 0.0, 0.1]));

    let embeddings = Arc::new(EmbeddingProvider::new(Box::new(FailingEmbedding), DIMENSIONS));
    let ranker = SimilarityRanker::new(store.clone(), embeddings);

    assert!(matches!(
        ranker.rank("cat", "u", true),
        Err(SemanticSearchError::Embedding(EmbeddingError::Unavailable(_)))
    ));

    // lexical mode never touches the embedding service
    assert_eq!(ranker.rank("cat", "u", false).unwrap().len(), 1);
}

#[test]
fn test_search_reads_capability_per_call() {
    let tmp = tempfile::tempdir().unwrap();
    let store = create_store(&tmp);
    let embedded = add_note(&store, "u", "dog", "dog", Some(vec![1.0, 0.0, 0.1]));
    let plain = add_note(&store, "u", "cat", "cat", None);

    let ranker = SimilarityRanker::new(store.clone(), keyword_embeddings());

    assert_eq!(ids(&ranker.search("cat", "u").unwrap()), vec![plain]);

    store.set_vector_capability(true);
    assert_eq!(ids(&ranker.search("cat", "u").unwrap()), vec![embedded]);
}
