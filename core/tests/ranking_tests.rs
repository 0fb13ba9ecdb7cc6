use searchcore::store::{read_token_dir, TokenStoreConfig};
use searchcore::table::{compute_tables, load_tfidf_table_with, write_tables};
use searchcore::{load_tfidf_table, rank, DocId, Ranker, StemLemmatizer};
use std::fs;
use std::path::Path;

fn write_tokens(dir: &Path) {
    fs::write(dir.join("lemmas_1.txt"), "rust\nborrow\nchecker\nrust\n").unwrap();
    fs::write(dir.join("lemmas_2.txt"), "python\ngarbage\ncollector\n").unwrap();
    fs::write(dir.join("lemmas_3.txt"), "rust\npython\nbinding\n").unwrap();
    fs::write(dir.join("lemmas_4.txt"), "compiler\nchecker\n").unwrap();
}

fn table_dir() -> tempfile::TempDir {
    let tokens = tempfile::tempdir().unwrap();
    write_tokens(tokens.path());
    let docs = read_token_dir(tokens.path(), &TokenStoreConfig::default()).unwrap();
    let tables = tempfile::tempdir().unwrap();
    write_tables(tables.path(), &compute_tables(&docs)).unwrap();
    tables
}

#[test]
fn written_tables_load_back() {
    let dir = table_dir();
    let table = load_tfidf_table(dir.path()).unwrap();
    assert_eq!(table.num_docs(), 4);
    // rust is in 2 of 4 documents
    let idf = table.idf("rust").unwrap();
    assert!((idf - 2f64.ln()).abs() < 1e-6);
    let d1 = table.document(&DocId::from(1)).unwrap();
    assert!((d1["rust"].tfidf - 0.5 * 2f64.ln()).abs() < 1e-6);
}

#[test]
fn tables_from_lemma_files_load_back() {
    let tokens = tempfile::tempdir().unwrap();
    fs::write(tokens.path().join("lemmas_1.txt"), "кот кота\nсобака собаки\n").unwrap();
    fs::write(tokens.path().join("lemmas_2.txt"), "собака собакой\n").unwrap();
    let config = TokenStoreConfig { prefix: Some("lemmas_".into()), ..Default::default() };
    let docs = read_token_dir(tokens.path(), &config).unwrap();
    let tables = tempfile::tempdir().unwrap();
    write_tables(tables.path(), &compute_tables(&docs)).unwrap();

    let table = load_tfidf_table(tables.path()).unwrap();
    assert_eq!(table.num_lemmas(), 2);
    let hits = rank("кот", &table);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].0, DocId::from(1));
}

#[test]
fn equal_scores_order_by_doc_id() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("article_10_lemmas.txt"), "cat 0.693147 0.346574\n").unwrap();
    fs::write(dir.path().join("article_2_lemmas.txt"), "cat 0.693147 0.346574\n").unwrap();
    fs::write(dir.path().join("article_3_lemmas.txt"), "dog 0.693147 0.693147\n").unwrap();
    let table = load_tfidf_table(dir.path()).unwrap();
    let hits = rank("cat", &table);
    let order: Vec<&str> = hits.iter().map(|(d, _)| d.as_str()).collect();
    assert_eq!(order, vec!["2", "10"]);
    assert_eq!(hits[0].1, hits[1].1);
}

#[test]
fn malformed_lines_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("article_1_lemmas.txt"), "cat 1.0 0.5\nbroken line\ndog 0.5\n\nowl 2.0 0.25\n").unwrap();
    let table = load_tfidf_table(dir.path()).unwrap();
    let d1 = table.document(&DocId::from(1)).unwrap();
    assert_eq!(d1.len(), 2);
    assert!(d1.contains_key("owl"));
}

#[test]
fn prefix_selects_table_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("article_1_lemmas.txt"), "cat 1.0 0.5\n").unwrap();
    fs::write(dir.path().join("notes.txt"), "cat 1.0 0.5\n").unwrap();
    let config = TokenStoreConfig { prefix: Some("article_".into()), ..Default::default() };
    let table = load_tfidf_table_with(dir.path(), &config).unwrap();
    assert_eq!(table.num_docs(), 1);
}

#[test]
fn unknown_query_terms_rank_nothing() {
    let table = load_tfidf_table(table_dir().path()).unwrap();
    assert!(rank("haskell monad", &table).is_empty());
    assert!(rank("", &table).is_empty());
    assert!(rank("42 !!", &table).is_empty());
}

#[test]
fn ranking_is_deterministic_and_bounded() {
    let table = load_tfidf_table(table_dir().path()).unwrap();
    let first = rank("rust checker", &table);
    let second = rank("rust checker", &table);
    assert_eq!(first, second);
    assert!(!first.is_empty());
    for (_, score) in &first {
        assert!(*score > 0.0 && *score <= 1.0, "score {score} out of range");
    }
    for pair in first.windows(2) {
        assert!(pair[0].1 >= pair[1].1);
    }
    // document 1 holds both lemmas
    assert_eq!(first[0].0, DocId::from(1));
    // document 2 shares nothing with the query
    assert!(first.iter().all(|(d, _)| *d != DocId::from(2)));
}

#[test]
fn stemming_ranker_matches_inflected_query() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("1.tfidf.txt"), "run 0.693147 0.346574\n").unwrap();
    fs::write(dir.path().join("2.tfidf.txt"), "walk 0.693147 0.346574\n").unwrap();
    let table = load_tfidf_table(dir.path()).unwrap();

    assert!(rank("running", &table).is_empty());
    let ranker = Ranker::new(StemLemmatizer::new(searchcore::rank::Algorithm::English));
    let hits = ranker.rank("running", &table);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].0, DocId::from(1));
    assert!((hits[0].1 - 1.0).abs() < 1e-9);
}

#[test]
fn empty_table_ranks_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let table = load_tfidf_table(dir.path()).unwrap();
    assert!(table.is_empty());
    assert!(rank("rust", &table).is_empty());
}
