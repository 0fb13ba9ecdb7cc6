use crate::InvertedIndex;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub const INDEX_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexFormat {
    Json,
    Bincode,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_terms: u32,
    pub created_at: String,
    pub version: u32,
    pub format: IndexFormat,
}

impl MetaFile {
    pub fn for_index(index: &InvertedIndex, format: IndexFormat, created_at: String) -> Self {
        Self {
            num_docs: index.num_docs() as u32,
            num_terms: index.num_terms() as u32,
            created_at,
            version: INDEX_VERSION,
            format,
        }
    }
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn record(&self, format: IndexFormat) -> PathBuf {
        match format {
            IndexFormat::Json => self.root.join("inverted_index.json"),
            IndexFormat::Bincode => self.root.join("inverted_index.bin"),
        }
    }
    fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

fn format_for_path(path: &Path) -> IndexFormat {
    match path.extension().and_then(|s| s.to_str()) {
        Some("bin") => IndexFormat::Bincode,
        _ => IndexFormat::Json,
    }
}

/// Write a bare `{documents, index}` record.
pub fn save_index_file(path: &Path, index: &InvertedIndex, format: IndexFormat) -> Result<()> {
    if let Some(dir) = path.parent() {
        create_dir_all(dir)?;
    }
    let f = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    match format {
        IndexFormat::Json => serde_json::to_writer_pretty(&mut w, index)?,
        IndexFormat::Bincode => bincode::serialize_into(&mut w, index)?,
    }
    w.flush()?;
    Ok(())
}

/// Load a bare record; `.bin` files are bincode, anything else JSON.
pub fn load_index_file(path: &Path) -> Result<InvertedIndex> {
    let f = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let mut reader = BufReader::new(f);
    let mut index: InvertedIndex = match format_for_path(path) {
        IndexFormat::Json => serde_json::from_reader(reader)?,
        IndexFormat::Bincode => {
            let mut buf = Vec::new();
            reader.read_to_end(&mut buf)?;
            bincode::deserialize(&buf)?
        }
    };
    let repaired = index.repair_documents();
    if repaired > 0 {
        tracing::warn!(repaired, path = %path.display(), "postings referenced unknown documents");
    }
    Ok(index)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta()).with_context(|| format!("no meta.json under {}", paths.root.display()))?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

/// Persist the index record and its `meta.json` under `paths.root`.
pub fn save_index(paths: &IndexPaths, index: &InvertedIndex, meta: &MetaFile) -> Result<()> {
    save_index_file(&paths.record(meta.format), index, meta.format)?;
    save_meta(paths, meta)?;
    tracing::info!(root = %paths.root.display(), num_docs = meta.num_docs, num_terms = meta.num_terms, "saved index");
    Ok(())
}

/// Load an index directory written by [`save_index`].
pub fn load_index(paths: &IndexPaths) -> Result<InvertedIndex> {
    let meta = load_meta(paths)?;
    if meta.version != INDEX_VERSION {
        bail!("unsupported index version {} (expected {})", meta.version, INDEX_VERSION);
    }
    let index = load_index_file(&paths.record(meta.format))?;
    tracing::info!(num_docs = index.num_docs(), num_terms = index.num_terms(), created_at = %meta.created_at, "loaded index");
    Ok(index)
}
