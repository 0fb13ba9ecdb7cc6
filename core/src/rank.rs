//! Ranked retrieval: TF-IDF query vectors scored by cosine similarity.

use crate::table::TfidfTable;
use crate::DocId;
use lazy_static::lazy_static;
use regex::Regex;
pub use rust_stemmers::Algorithm;
use rust_stemmers::Stemmer;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use unicode_normalization::UnicodeNormalization;

/// idf for query lemmas no document contains.
pub const EPSILON_IDF: f64 = 1e-6;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"^\p{L}+$").expect("valid regex");
}

/// Maps a normalized query word to the canonical form used in the tables.
pub trait Lemmatizer {
    fn lemmatize(&self, word: &str) -> String;
}

/// For tables keyed by the words themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityLemmatizer;

impl Lemmatizer for IdentityLemmatizer {
    fn lemmatize(&self, word: &str) -> String {
        word.to_string()
    }
}

/// Snowball stemming, for tables built from stemmed tokens.
pub struct StemLemmatizer {
    stemmer: Stemmer,
}

impl StemLemmatizer {
    pub fn new(algorithm: Algorithm) -> Self {
        Self { stemmer: Stemmer::create(algorithm) }
    }
}

impl Default for StemLemmatizer {
    fn default() -> Self {
        Self::new(Algorithm::Russian)
    }
}

impl Lemmatizer for StemLemmatizer {
    fn lemmatize(&self, word: &str) -> String {
        self.stemmer.stem(word).into_owned()
    }
}

/// Whitespace-separated words made only of letters, NFKC-normalized,
/// lowercased and lemmatized. Anything else in the query is dropped.
pub fn query_terms(query: &str, lemmatizer: &dyn Lemmatizer) -> Vec<String> {
    query
        .split_whitespace()
        .map(|w| w.nfkc().collect::<String>().to_lowercase())
        .filter(|w| WORD.is_match(w))
        .map(|w| lemmatizer.lemmatize(&w))
        .filter(|l| !l.is_empty())
        .collect()
}

/// `(count / max_tf) * idf` per distinct term.
pub fn build_query_vector(terms: &[String], table: &TfidfTable) -> BTreeMap<String, f64> {
    let mut tf: BTreeMap<&str, u32> = BTreeMap::new();
    for t in terms {
        *tf.entry(t.as_str()).or_insert(0) += 1;
    }
    let max_tf = tf.values().copied().max().unwrap_or(1) as f64;
    tf.into_iter()
        .map(|(term, count)| {
            let idf = table.idf(term).unwrap_or(EPSILON_IDF);
            (term.to_string(), (count as f64 / max_tf) * idf)
        })
        .collect()
}

/// One fixed term order shared by every vector of a ranking call.
struct Vocabulary<'a> {
    slots: HashMap<&'a str, usize>,
}

impl<'a> Vocabulary<'a> {
    fn new(terms: impl Iterator<Item = &'a str>) -> Self {
        let sorted: BTreeSet<&str> = terms.collect();
        let slots = sorted.into_iter().enumerate().map(|(i, t)| (t, i)).collect();
        Self { slots }
    }

    fn dense<'b>(&self, weights: impl Iterator<Item = (&'b str, f64)>) -> Vec<f64> {
        let mut v = vec![0.0; self.slots.len()];
        for (term, w) in weights {
            if let Some(&i) = self.slots.get(term) {
                v[i] = w;
            }
        }
        v
    }
}

/// `dot(a, b) / (|a| |b|)`, 0 when either norm is 0.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let mut dot = 0.0;
    let mut na = 0.0;
    let mut nb = 0.0;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    (dot / (na.sqrt() * nb.sqrt())).min(1.0)
}

pub struct Ranker {
    lemmatizer: Box<dyn Lemmatizer>,
    limit: Option<usize>,
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(IdentityLemmatizer)
    }
}

impl Ranker {
    pub fn new<L: Lemmatizer + 'static>(lemmatizer: L) -> Self {
        Self { lemmatizer: Box::new(lemmatizer), limit: None }
    }

    /// Keep at most `k` results.
    pub fn with_limit(mut self, k: usize) -> Self {
        self.limit = Some(k);
        self
    }

    pub fn query_vector(&self, query: &str, table: &TfidfTable) -> BTreeMap<String, f64> {
        build_query_vector(&query_terms(query, self.lemmatizer.as_ref()), table)
    }

    /// Documents with a positive cosine score, best first. Equal scores are
    /// ordered by document id.
    pub fn rank(&self, query: &str, table: &TfidfTable) -> Vec<(DocId, f64)> {
        let qv = self.query_vector(query, table);
        if qv.is_empty() || table.is_empty() {
            return Vec::new();
        }

        let vocab = Vocabulary::new(qv.keys().map(String::as_str).chain(table.lemmas()));
        let q = vocab.dense(qv.iter().map(|(t, w)| (t.as_str(), *w)));

        let mut scored: Vec<(DocId, f64)> = table
            .documents()
            .filter_map(|(doc_id, entries)| {
                let d = vocab.dense(entries.iter().map(|(t, e)| (t.as_str(), e.tfidf)));
                let score = cosine_similarity(&q, &d);
                (score > 0.0).then(|| (doc_id.clone(), score))
            })
            .collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        if let Some(k) = self.limit {
            scored.truncate(k);
        }
        tracing::debug!(terms = qv.len(), hits = scored.len(), "ranked query");
        scored
    }
}

/// Rank with an [`IdentityLemmatizer`] and no result limit.
pub fn rank(query: &str, table: &TfidfTable) -> Vec<(DocId, f64)> {
    Ranker::default().rank(query, table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TfidfEntry;

    fn table() -> TfidfTable {
        let mut t = TfidfTable::new();
        let e = |idf: f64, tfidf: f64| TfidfEntry { idf, tfidf };
        t.insert_document(DocId::from(1), vec![("cat".to_string(), e(1.0, 0.5)), ("dog".to_string(), e(0.5, 0.1))]);
        t.insert_document(DocId::from(2), vec![("dog".to_string(), e(0.5, 0.2))]);
        t
    }

    #[test]
    fn query_terms_keep_alphabetic_words_only() {
        let terms = query_terms("Cat   dog2 , ДОМ ﬁsh", &IdentityLemmatizer);
        assert_eq!(terms, vec!["cat", "дом", "fish"]);
    }

    #[test]
    fn stemmer_canonicalizes_words() {
        let stem = StemLemmatizer::new(Algorithm::English);
        assert_eq!(query_terms("running", &stem), vec!["run"]);
    }

    #[test]
    fn query_vector_normalizes_by_max_tf() {
        let terms: Vec<String> = ["cat", "cat", "dog", "owl"].iter().map(|s| s.to_string()).collect();
        let qv = build_query_vector(&terms, &table());
        assert_eq!(qv["cat"], 1.0);
        assert_eq!(qv["dog"], 0.25);
        assert_eq!(qv["owl"], 0.5 * EPSILON_IDF);
    }

    #[test]
    fn cosine_handles_zero_vectors() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 1.0], &[2.0, 2.0]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ranks_best_match_first() {
        let hits = rank("cat", &table());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, DocId::from(1));

        let hits = rank("dog", &table());
        let order: Vec<&str> = hits.iter().map(|(d, _)| d.as_str()).collect();
        assert_eq!(order, vec!["2", "1"]);
    }

    #[test]
    fn limit_truncates() {
        let hits = Ranker::default().with_limit(1).rank("dog", &table());
        assert_eq!(hits.len(), 1);
    }
}
