use crate::store::{read_token_dir, TokenStoreConfig};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

/// Stable document identifier derived from a token or table file name.
///
/// Ids that parse as unsigned integers order numerically (`2 < 10`) and sort
/// before non-numeric ids, which order lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(String);

impl DocId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric(&self) -> Option<u64> {
        if self.0.is_empty() || !self.0.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.0.parse().ok()
    }
}

impl Ord for DocId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for DocId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for DocId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u32> for DocId {
    fn from(n: u32) -> Self {
        Self(n.to_string())
    }
}

pub type PostingSet = BTreeSet<DocId>;

/// Term → posting set, plus every document id of the corpus.
///
/// Postings record presence only. Every id found in a posting set is also a
/// member of `documents`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvertedIndex {
    pub documents: BTreeSet<DocId>,
    pub index: BTreeMap<String, PostingSet>,
}

impl InvertedIndex {
    pub fn new() -> Self { Self::default() }

    /// Build from in-memory token lists. Duplicate tokens inside one document
    /// collapse into a single posting; documents without tokens still count.
    pub fn from_documents<I, T, S>(docs: I) -> Self
    where
        I: IntoIterator<Item = (DocId, T)>,
        T: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut idx = Self::new();
        for (doc_id, tokens) in docs {
            for token in tokens {
                let term = token.as_ref().trim().to_lowercase();
                if term.is_empty() { continue; }
                idx.index.entry(term).or_default().insert(doc_id.clone());
            }
            idx.documents.insert(doc_id);
        }
        idx
    }

    /// Posting set for `term`; `None` when the term is unknown.
    pub fn postings(&self, term: &str) -> Option<&PostingSet> {
        self.index.get(term)
    }

    pub fn num_docs(&self) -> usize { self.documents.len() }

    pub fn num_terms(&self) -> usize { self.index.len() }

    /// Add any posting ids missing from `documents`; returns how many were added.
    pub(crate) fn repair_documents(&mut self) -> usize {
        let missing: Vec<DocId> = self
            .index
            .values()
            .flatten()
            .filter(|d| !self.documents.contains(*d))
            .cloned()
            .collect();
        let before = self.documents.len();
        self.documents.extend(missing);
        self.documents.len() - before
    }
}

/// Build an inverted index from a directory of per-document token files.
///
/// Unreadable files are skipped; only an inaccessible directory fails.
pub fn build_index<P: AsRef<Path>>(token_dir: P, config: &TokenStoreConfig) -> Result<InvertedIndex> {
    let docs = read_token_dir(token_dir.as_ref(), config)?;
    let idx = InvertedIndex::from_documents(docs);
    tracing::info!(num_docs = idx.num_docs(), num_terms = idx.num_terms(), "built inverted index");
    Ok(idx)
}
