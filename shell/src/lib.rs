use anyhow::{bail, Result};
use searchcore::persist::{load_index, IndexPaths};
use searchcore::rank::Algorithm;
use searchcore::table::load_tfidf_table_with;
use searchcore::{
    build_index, BooleanEngine, IdentityLemmatizer, InvertedIndex, QueryConfig, Ranker, Snapshot, StemLemmatizer,
    TfidfTable, TokenStoreConfig,
};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Boolean,
    Ranked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StemmerKind {
    #[default]
    None,
    Russian,
    English,
}

/// Settings that may come from a JSON file and be overridden on the command line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    #[serde(flatten)]
    pub query: QueryConfig,
    pub mode: Mode,
    pub top_k: Option<usize>,
    pub url_base: Option<String>,
    pub stemmer: StemmerKind,
}

impl ShellConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[derive(Debug, Clone)]
pub enum IndexSource {
    /// Directory written by `indexer build`.
    Persisted(PathBuf),
    /// Token files, indexed at startup.
    Tokens(PathBuf, TokenStoreConfig),
}

#[derive(Debug, Clone, Default)]
pub struct Sources {
    pub index: Option<IndexSource>,
    pub tables: Option<(PathBuf, TokenStoreConfig)>,
}

impl Sources {
    fn load_index(&self) -> Result<Option<InvertedIndex>> {
        let index = match &self.index {
            Some(IndexSource::Persisted(dir)) => Some(load_index(&IndexPaths::new(dir))?),
            Some(IndexSource::Tokens(dir, config)) => Some(build_index(dir, config)?),
            None => None,
        };
        Ok(index)
    }

    fn load_table(&self) -> Result<Option<TfidfTable>> {
        match &self.tables {
            Some((dir, config)) => Ok(Some(load_tfidf_table_with(dir, config)?)),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Exit,
}

const HELP: &str = "\
boolean queries: terms combined with and, or, not and parentheses
  cat and dog | cat or dog | not cat | (cat and dog) or bird
commands: :bool  :rank  :reload  :help  exit";

/// Loaded corpus plus the query engines for one interactive session.
pub struct Session {
    sources: Sources,
    index: Option<Snapshot<InvertedIndex>>,
    table: Option<Snapshot<TfidfTable>>,
    engine: BooleanEngine,
    ranker: Ranker,
    mode: Mode,
    url_base: Option<String>,
}

impl Session {
    pub fn open(sources: Sources, config: ShellConfig) -> Result<Self> {
        if sources.index.is_none() && sources.tables.is_none() {
            bail!("nothing to search: give an index, a token directory or a table directory");
        }
        let index = sources.load_index()?.map(Snapshot::new);
        let table = sources.load_table()?.map(Snapshot::new);

        let mut ranker = match config.stemmer {
            StemmerKind::None => Ranker::new(IdentityLemmatizer),
            StemmerKind::Russian => Ranker::new(StemLemmatizer::new(Algorithm::Russian)),
            StemmerKind::English => Ranker::new(StemLemmatizer::new(Algorithm::English)),
        };
        if let Some(k) = config.top_k {
            ranker = ranker.with_limit(k);
        }

        // fall back to whatever was loaded
        let mode = match (config.mode, index.is_some(), table.is_some()) {
            (Mode::Boolean, false, _) => Mode::Ranked,
            (Mode::Ranked, _, false) => Mode::Boolean,
            (m, _, _) => m,
        };

        Ok(Self {
            sources,
            index,
            table,
            engine: BooleanEngine::new(config.query),
            ranker,
            mode,
            url_base: config.url_base,
        })
    }

    pub fn mode(&self) -> Mode { self.mode }

    /// Rebuild everything from the configured sources and swap it in. On
    /// failure the current snapshots stay in place.
    pub fn reload(&self) -> Result<()> {
        let index = self.sources.load_index()?;
        let table = self.sources.load_table()?;
        if let (Some(snap), Some(new)) = (&self.index, index) {
            snap.replace(new);
        }
        if let (Some(snap), Some(new)) = (&self.table, table) {
            snap.replace(new);
        }
        tracing::info!("reloaded corpus");
        Ok(())
    }

    pub fn prompt(&self) -> &'static str {
        match self.mode {
            Mode::Boolean => "bool> ",
            Mode::Ranked => "rank> ",
        }
    }

    /// Handle one input line. Query errors are printed, never returned.
    pub fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Control> {
        let line = line.trim();
        match line.to_lowercase().as_str() {
            "" => {}
            "exit" | "stop" => return Ok(Control::Exit),
            ":help" => writeln!(out, "{HELP}")?,
            ":bool" => self.switch(Mode::Boolean, out)?,
            ":rank" => self.switch(Mode::Ranked, out)?,
            ":reload" => match self.reload() {
                Ok(()) => writeln!(out, "reloaded")?,
                Err(err) => writeln!(out, "reload failed: {err:#}")?,
            },
            _ => match self.mode {
                Mode::Boolean => self.boolean(line, out)?,
                Mode::Ranked => self.ranked(line, out)?,
            },
        }
        Ok(Control::Continue)
    }

    fn switch<W: Write>(&mut self, mode: Mode, out: &mut W) -> Result<()> {
        let available = match mode {
            Mode::Boolean => self.index.is_some(),
            Mode::Ranked => self.table.is_some(),
        };
        if available {
            self.mode = mode;
            writeln!(out, "mode: {mode:?}")?;
        } else {
            writeln!(out, "no data loaded for {mode:?} queries")?;
        }
        Ok(())
    }

    fn boolean<W: Write>(&self, query: &str, out: &mut W) -> Result<()> {
        let Some(snap) = &self.index else { return Ok(()) };
        let index = snap.current();
        match self.engine.evaluate(query, &index) {
            Ok(docs) => {
                writeln!(out, "found {} documents", docs.len())?;
                if !docs.is_empty() {
                    let ids: Vec<String> = docs.iter().map(ToString::to_string).collect();
                    writeln!(out, "{}", ids.join(", "))?;
                }
            }
            Err(err) => {
                tracing::debug!(%err, query, "rejected boolean query");
                writeln!(out, "error: {err}")?;
            }
        }
        Ok(())
    }

    fn ranked<W: Write>(&self, query: &str, out: &mut W) -> Result<()> {
        let Some(snap) = &self.table else { return Ok(()) };
        let table = snap.current();
        let hits = self.ranker.rank(query, &table);
        if hits.is_empty() {
            writeln!(out, "no relevant documents")?;
        }
        for (doc_id, score) in hits {
            match &self.url_base {
                Some(base) => writeln!(out, "{}/{} - {:.4}", base.trim_end_matches('/'), doc_id, score)?,
                None => writeln!(out, "{doc_id} - {score:.4}")?,
            }
        }
        Ok(())
    }
}

/// Read queries from `input` until EOF or an exit command.
pub fn run<R: BufRead, W: Write>(session: &mut Session, input: R, out: &mut W) -> Result<()> {
    write!(out, "{}", session.prompt())?;
    out.flush()?;
    for line in input.lines() {
        let line = line?;
        if session.handle_line(&line, out)? == Control::Exit {
            break;
        }
        write!(out, "{}", session.prompt())?;
        out.flush()?;
    }
    Ok(())
}
