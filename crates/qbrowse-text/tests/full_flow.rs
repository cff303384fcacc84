use std::path::PathBuf;

use qbrowse_core::corpus::CorpusIndexer;
use qbrowse_core::hash::stable_id;
use qbrowse_core::traits::SearchIndex;
use qbrowse_core::types::{Conjunction, FieldBoost, QueryConfig, RawRecord, SearchField};
use qbrowse_text::TantivyIndex;

fn fixture_corpus() -> PathBuf {
    // crates/qbrowse-text -> crates -> repo root
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).ancestors().nth(2).unwrap().join("test_data/data.json")
}

fn fixture_index() -> TantivyIndex {
    let build = CorpusIndexer::new().build_from_file(&fixture_corpus()).expect("corpus");
    TantivyIndex::from_documents(&build.documents).expect("index")
}

#[test]
fn tantivy_full_flow() {
    let index = fixture_index();
    assert_eq!(index.num_docs(), 5);

    let hits = index.query("dog", &QueryConfig::default()).expect("query");
    let mut ids: Vec<u32> = hits.iter().map(|h| h.id).collect();
    ids.sort_unstable();
    let mut expected = vec![stable_id("IMG_0001.JPG"), stable_id("IMG_0003.JPG"), stable_id("IMG_0006.PNG")];
    expected.sort_unstable();
    assert_eq!(ids, expected);
    assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn and_requires_every_token() {
    let index = fixture_index();
    let hits = index.query("dog beach", &QueryConfig::default()).expect("query");
    let ids: Vec<u32> = hits.iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![stable_id("IMG_0001.JPG")]);

    let or = QueryConfig { conjunction: Conjunction::Or, ..QueryConfig::default() };
    let hits = index.query("dog beach", &or).expect("query");
    assert_eq!(hits.len(), 4);
    assert_eq!(hits[0].id, stable_id("IMG_0001.JPG"));
}

#[test]
fn search_terms_outrank_titles() {
    let docs = CorpusIndexer::new().build(&[
        RawRecord::new("sunset.jpg", "sunset.THUMB.JPG", [("DOG", "")]),
        RawRecord::new("dog.jpg", "dog.THUMB.JPG", [("SUNSET", "")]),
    ]).documents;
    let index = TantivyIndex::from_documents(&docs).expect("index");

    let hits = index.query("sunset", &QueryConfig::default()).expect("query");
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, stable_id("dog.jpg"), "tag match is boosted above title match");

    let title_first = QueryConfig {
        boosts: vec![
            FieldBoost { field: SearchField::Title, boost: 4.0 },
            FieldBoost { field: SearchField::SearchTerms, boost: 1.0 },
        ],
        conjunction: Conjunction::And,
    };
    let hits = index.query("sunset", &title_first).expect("query");
    assert_eq!(hits[0].id, stable_id("sunset.jpg"));
}

#[test]
fn odd_input_does_not_fail() {
    let index = fixture_index();
    assert!(index.query("", &QueryConfig::default()).expect("empty").is_empty());
    assert!(index.query("nothing-here-at-all", &QueryConfig::default()).expect("miss").is_empty());
    index.query("dog AND (", &QueryConfig::default()).expect("lenient parse");
}

#[test]
fn empty_index_answers_queries() {
    let mut index = TantivyIndex::new_in_ram().expect("index");
    index.commit().expect("commit");
    assert!(index.query("dog", &QueryConfig::default()).expect("query").is_empty());
}
