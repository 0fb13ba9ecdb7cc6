use crate::DocId;
use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

lazy_static! {
    static ref NUMERIC_SEGMENT: Regex = Regex::new(r"^[0-9]+$").expect("valid regex");
}

/// Which files of an artifact directory belong to the corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenStoreConfig {
    /// File extension without the dot.
    pub extension: String,
    /// Only files whose name starts with this prefix, e.g. `lemmas_`.
    pub prefix: Option<String>,
}

impl Default for TokenStoreConfig {
    fn default() -> Self {
        Self { extension: "txt".into(), prefix: None }
    }
}

/// Derive a document id from an artifact file name.
///
/// `tokens_7.txt` → `7`, `article_12_lemmas.txt` → `12`, `doc3.txt` → `doc3`.
pub fn doc_id_from_file_name(file_name: &str) -> DocId {
    let stem = file_name.split('.').next().unwrap_or(file_name);
    match stem.split('_').find(|seg| NUMERIC_SEGMENT.is_match(seg)) {
        Some(seg) => DocId::new(seg),
        None => DocId::new(stem),
    }
}

/// Read one token file: one term per line, case-folded.
///
/// Only the first whitespace-separated field of a line is the term, so
/// lemma files written as `lemma word` lines index their lemmas.
pub fn read_token_file(path: &Path) -> Result<Vec<String>> {
    let f = File::open(path)?;
    let reader = BufReader::new(f);
    let mut tokens = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let Some(token) = line.split_whitespace().next() else { continue };
        tokens.push(token.to_lowercase());
    }
    Ok(tokens)
}

/// List the artifact files directly under `dir` that match `config`, sorted by document id.
pub(crate) fn list_artifacts(dir: &Path, config: &TokenStoreConfig) -> Result<Vec<(DocId, PathBuf)>> {
    // read_dir up front so an inaccessible directory is a hard error
    fs::read_dir(dir).with_context(|| format!("cannot read directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).into_iter() {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!(%err, "skipping unreadable directory entry");
                continue;
            }
        };
        let p = entry.path();
        if !p.is_file() { continue; }
        if p.extension().and_then(|s| s.to_str()) != Some(config.extension.as_str()) { continue; }
        let Some(name) = p.file_name().and_then(|s| s.to_str()) else { continue };
        if let Some(prefix) = &config.prefix {
            if !name.starts_with(prefix.as_str()) { continue; }
        }
        files.push((doc_id_from_file_name(name), p.to_path_buf()));
    }
    files.sort();
    Ok(files)
}

/// Read every token file under `dir`.
///
/// A file that cannot be read is skipped with a warning; the build carries on
/// with the rest of the corpus.
pub fn read_token_dir(dir: &Path, config: &TokenStoreConfig) -> Result<Vec<(DocId, Vec<String>)>> {
    let mut docs: Vec<(DocId, Vec<String>)> = Vec::new();
    for (doc_id, path) in list_artifacts(dir, config)? {
        match read_token_file(&path) {
            Ok(tokens) => match docs.last_mut() {
                // several files may map onto one id, e.g. tokens_1 and lemmas_1
                Some((last, acc)) if *last == doc_id => acc.extend(tokens),
                _ => docs.push((doc_id, tokens)),
            },
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "skipping unreadable token file");
            }
        }
    }
    tracing::debug!(num_docs = docs.len(), dir = %dir.display(), "read token store");
    Ok(docs)
}
