//! Per-document lemma tables: `lemma idf tfidf`, one line per lemma.

use crate::store::{list_artifacts, TokenStoreConfig};
use crate::DocId;
use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Relative difference above which two documents are said to disagree on a term's idf.
const IDF_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TfidfEntry {
    pub idf: f64,
    pub tfidf: f64,
}

/// Lemma tables of the whole corpus plus one canonical idf per lemma.
///
/// The canonical idf is the value of the first document (in id order) that
/// lists the lemma.
#[derive(Debug, Clone, Default)]
pub struct TfidfTable {
    docs: BTreeMap<DocId, BTreeMap<String, TfidfEntry>>,
    idf: HashMap<String, f64>,
}

impl TfidfTable {
    pub fn new() -> Self { Self::default() }

    /// Add (or extend) a document's table.
    pub fn insert_document(&mut self, doc_id: DocId, entries: impl IntoIterator<Item = (String, TfidfEntry)>) {
        let table = self.docs.entry(doc_id.clone()).or_default();
        for (lemma, entry) in entries {
            match self.idf.get(&lemma) {
                Some(&canonical) if (canonical - entry.idf).abs() > IDF_TOLERANCE * canonical.max(1.0) => {
                    tracing::warn!(%lemma, %doc_id, canonical, idf = entry.idf, "idf disagrees across documents");
                }
                Some(_) => {}
                None => {
                    self.idf.insert(lemma.clone(), entry.idf);
                }
            }
            table.insert(lemma, entry);
        }
    }

    pub fn idf(&self, lemma: &str) -> Option<f64> {
        self.idf.get(lemma).copied()
    }

    pub fn document(&self, doc_id: &DocId) -> Option<&BTreeMap<String, TfidfEntry>> {
        self.docs.get(doc_id)
    }

    /// Documents in id order.
    pub fn documents(&self) -> impl Iterator<Item = (&DocId, &BTreeMap<String, TfidfEntry>)> {
        self.docs.iter()
    }

    /// Every lemma of every document; may repeat.
    pub fn lemmas(&self) -> impl Iterator<Item = &str> {
        self.docs.values().flat_map(|t| t.keys().map(String::as_str))
    }

    pub fn num_docs(&self) -> usize { self.docs.len() }

    pub fn num_lemmas(&self) -> usize { self.idf.len() }

    pub fn is_empty(&self) -> bool { self.docs.is_empty() }
}

/// Parse `lemma idf tfidf`. `None` for lines with the wrong field count or
/// numbers that are not finite and non-negative.
pub fn parse_table_line(line: &str) -> Option<(String, TfidfEntry)> {
    let mut fields = line.split_whitespace();
    let (lemma, idf, tfidf) = (fields.next()?, fields.next()?, fields.next()?);
    if fields.next().is_some() {
        return None;
    }
    let idf: f64 = idf.parse().ok()?;
    let tfidf: f64 = tfidf.parse().ok()?;
    if !idf.is_finite() || !tfidf.is_finite() || idf < 0.0 || tfidf < 0.0 {
        return None;
    }
    Some((lemma.to_lowercase(), TfidfEntry { idf, tfidf }))
}

fn read_table_file(path: &Path) -> Result<Vec<(String, TfidfEntry)>> {
    let reader = BufReader::new(File::open(path)?);
    let mut entries = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        match parse_table_line(&line) {
            Some(entry) => entries.push(entry),
            None => tracing::debug!(path = %path.display(), line = lineno + 1, "skipping malformed table line"),
        }
    }
    Ok(entries)
}

pub fn load_tfidf_table<P: AsRef<Path>>(table_dir: P) -> Result<TfidfTable> {
    load_tfidf_table_with(table_dir, &TokenStoreConfig::default())
}

/// Load every table file under `table_dir` that matches `config`.
///
/// Unreadable files are skipped; only an inaccessible directory fails.
pub fn load_tfidf_table_with<P: AsRef<Path>>(table_dir: P, config: &TokenStoreConfig) -> Result<TfidfTable> {
    let dir = table_dir.as_ref();
    let mut table = TfidfTable::new();
    for (doc_id, path) in list_artifacts(dir, config)? {
        match read_table_file(&path) {
            Ok(entries) => table.insert_document(doc_id, entries),
            Err(err) => tracing::warn!(path = %path.display(), %err, "skipping unreadable table file"),
        }
    }
    tracing::info!(num_docs = table.num_docs(), num_lemmas = table.num_lemmas(), "loaded tf-idf table");
    Ok(table)
}

/// Compute lemma tables from token lists.
///
/// `tf = count / total tokens of the document`, `idf = ln(N / df)` where `N`
/// is the number of documents.
pub fn compute_tables(docs: &[(DocId, Vec<String>)]) -> TfidfTable {
    let n = docs.len() as f64;
    let mut counts: Vec<BTreeMap<&str, u32>> = Vec::with_capacity(docs.len());
    let mut df: HashMap<&str, u32> = HashMap::new();
    for (_, tokens) in docs {
        let mut tf: BTreeMap<&str, u32> = BTreeMap::new();
        for t in tokens {
            *tf.entry(t.as_str()).or_insert(0) += 1;
        }
        for &term in tf.keys() {
            *df.entry(term).or_insert(0) += 1;
        }
        counts.push(tf);
    }

    let mut table = TfidfTable::new();
    for ((doc_id, tokens), tf) in docs.iter().zip(counts) {
        let total = tokens.len() as f64;
        let entries = tf.into_iter().map(|(term, count)| {
            let idf = (n / df[term] as f64).ln();
            let tf = if total > 0.0 { count as f64 / total } else { 0.0 };
            (term.to_string(), TfidfEntry { idf, tfidf: tf * idf })
        });
        table.insert_document(doc_id.clone(), entries);
    }
    table
}

/// Write one `{doc_id}.tfidf.txt` per document, lemmas sorted, 6 decimals.
pub fn write_tables<P: AsRef<Path>>(out_dir: P, table: &TfidfTable) -> Result<()> {
    let dir = out_dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    for (doc_id, entries) in table.documents() {
        let path = dir.join(format!("{doc_id}.tfidf.txt"));
        let mut w = BufWriter::new(File::create(&path)?);
        for (lemma, e) in entries {
            writeln!(w, "{} {:.6} {:.6}", lemma, e.idf, e.tfidf)?;
        }
        w.flush()?;
    }
    tracing::info!(num_docs = table.num_docs(), dir = %dir.display(), "wrote tf-idf tables");
    Ok(())
}
