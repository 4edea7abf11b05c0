use engine::store::MemoryStore;
use engine::{Indexer, Ranker, SearchResult, StopWords};

fn new_indexer() -> Indexer {
    Indexer::new(Box::new(MemoryStore::new()), StopWords::empty())
}

/// `count` distinct filler words, each occurring once.
fn filler(prefix: &str, count: usize) -> String {
    (0..count)
        .map(|i| format!("{prefix}{i}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn blocks(text: String) -> Vec<String> {
    vec![text]
}

#[test]
fn scores_only_the_matching_document() {
    let mut index = new_indexer();
    // "language" 5 times out of 50 total terms
    let doc_a = format!("{} {}", "language ".repeat(5), filler("alpha", 45));
    index.index_page("https://example.com/wiki/A", &blocks(doc_a)).unwrap();
    // 100 terms, none of them "language"
    index
        .index_page("https://example.com/wiki/B", &blocks(filler("beta", 100)))
        .unwrap();

    let result = index.relevance("language", None).unwrap().expect("term is indexed");
    assert_eq!(result.len(), 1);
    assert!(result.contains("https://example.com/wiki/A"));
    assert!(!result.contains("https://example.com/wiki/B"));

    // tf = 5/50 = 0.1, idf = ln(2/1), tf*idf rounds to 0.1
    assert_eq!(result.relevance("https://example.com/wiki/A"), 0.1);
}

#[test]
fn idf_is_zero_when_term_is_everywhere() {
    let mut index = new_indexer();
    index
        .index_page("https://example.com/wiki/A", &blocks("shared alpha".into()))
        .unwrap();
    index
        .index_page("https://example.com/wiki/B", &blocks("shared beta".into()))
        .unwrap();

    let result = index.relevance("shared", None).unwrap().expect("term is indexed");
    assert_eq!(result.relevance("https://example.com/wiki/A"), 0.0);
    assert_eq!(result.relevance("https://example.com/wiki/B"), 0.0);
}

#[test]
fn unknown_term_is_no_results_not_empty() {
    let mut index = new_indexer();
    index
        .index_page("https://example.com/wiki/A", &blocks("alpha beta".into()))
        .unwrap();

    assert!(index.relevance("gamma", None).unwrap().is_none());
}

#[test]
fn empty_index_yields_no_results() {
    let index = new_indexer();
    assert!(index.relevance("anything", None).unwrap().is_none());
}

#[test]
fn popularity_boost_is_added_after_rounding() {
    let mut index = new_indexer();
    let doc_a = format!("{} {}", "language ".repeat(5), filler("alpha", 45));
    index.index_page("https://example.com/wiki/A", &blocks(doc_a)).unwrap();
    index
        .index_page("https://example.com/wiki/B", &blocks(filler("beta", 100)))
        .unwrap();

    let mut ranker = Ranker::new();
    ranker.increment("https://example.com/wiki/A");
    ranker.increment("https://example.com/wiki/A");

    let result = index
        .relevance("language", Some(&ranker))
        .unwrap()
        .expect("term is indexed");
    // rounded tf*idf (0.1) plus two visits
    assert_eq!(result.relevance("https://example.com/wiki/A"), 2.1);
}

#[test]
fn unvisited_url_gets_no_boost() {
    let mut index = new_indexer();
    index
        .index_page("https://example.com/wiki/A", &blocks("language alpha".into()))
        .unwrap();
    index
        .index_page("https://example.com/wiki/B", &blocks("beta gamma".into()))
        .unwrap();

    let ranker = Ranker::new();
    let result = index
        .relevance("language", Some(&ranker))
        .unwrap()
        .expect("term is indexed");
    // tf = 1/2, idf = ln(2) ~= 0.69, rounded to 0.3; no visits, no boost
    assert_eq!(result.relevance("https://example.com/wiki/A"), 0.3);
}

#[test]
fn multi_term_query_short_circuits_on_unknown_term() {
    let mut index = new_indexer();
    index
        .index_page("https://example.com/wiki/A", &blocks("alpha beta".into()))
        .unwrap();

    let terms = vec!["alpha".to_string(), "nosuchterm".to_string()];
    let combined = engine::search::search_all(&terms, &index, None).unwrap();
    assert!(combined.is_none());
}

#[test]
fn multi_term_query_accumulates_scores() {
    let mut index = new_indexer();
    index
        .index_page(
            "https://example.com/wiki/A",
            &blocks("alpha beta gamma delta".into()),
        )
        .unwrap();
    index
        .index_page("https://example.com/wiki/B", &blocks("alpha epsilon".into()))
        .unwrap();

    let terms = vec!["alpha".to_string(), "beta".to_string()];
    let combined: SearchResult = engine::search::search_all(&terms, &index, None)
        .unwrap()
        .expect("both terms indexed");

    // only A contains both terms
    assert_eq!(combined.len(), 1);
    assert!(combined.contains("https://example.com/wiki/A"));

    // alpha occurs everywhere (idf 0), beta only in A:
    // tf = 1/4, idf = ln(2), rounded to 0.2; AND sums both components
    assert_eq!(combined.relevance("https://example.com/wiki/A"), 0.2);
}
