use anyhow::Result;
use clap::Parser;
use searchcore::TokenStoreConfig;
use shell::{run, IndexSource, Mode, Session, ShellConfig, Sources, StemmerKind};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "shell", about = "Interactive boolean and ranked search")]
struct Args {
    /// Index directory written by `indexer build`
    #[arg(long, conflicts_with = "tokens")]
    index: Option<PathBuf>,
    /// Token directory to index at startup
    #[arg(long)]
    tokens: Option<PathBuf>,
    /// Only read token files with this name prefix
    #[arg(long)]
    prefix: Option<String>,
    /// Directory of lemma tables (lemma idf tfidf)
    #[arg(long)]
    tables: Option<PathBuf>,
    /// Only read table files with this name prefix
    #[arg(long)]
    table_prefix: Option<String>,
    /// JSON settings file, e.g. {"max_nesting_depth": 32, "top_k": 10}
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum)]
    mode: Option<Mode>,
    #[arg(long)]
    max_nesting_depth: Option<usize>,
    /// Show at most this many ranked results
    #[arg(long)]
    top_k: Option<usize>,
    /// Print ranked results as {url_base}/{doc_id}
    #[arg(long)]
    url_base: Option<String>,
    #[arg(long, value_enum)]
    stemmer: Option<StemmerKind>,
}

impl Args {
    fn shell_config(&self) -> Result<ShellConfig> {
        let mut config = match &self.config {
            Some(path) => ShellConfig::from_file(path)?,
            None => ShellConfig::default(),
        };
        if let Some(depth) = self.max_nesting_depth { config.query.max_nesting_depth = depth; }
        if let Some(mode) = self.mode { config.mode = mode; }
        if let Some(stemmer) = self.stemmer { config.stemmer = stemmer; }
        if self.top_k.is_some() { config.top_k = self.top_k; }
        if self.url_base.is_some() { config.url_base = self.url_base.clone(); }
        Ok(config)
    }

    fn sources(&self) -> Sources {
        let index = match (&self.index, &self.tokens) {
            (Some(dir), _) => Some(IndexSource::Persisted(dir.clone())),
            (None, Some(dir)) => Some(IndexSource::Tokens(dir.clone(), store(&self.prefix))),
            (None, None) => None,
        };
        let tables = self.tables.clone().map(|dir| (dir, store(&self.table_prefix)));
        Sources { index, tables }
    }
}

fn store(prefix: &Option<String>) -> TokenStoreConfig {
    TokenStoreConfig { prefix: prefix.clone(), ..Default::default() }
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let args = Args::parse();
    let mut session = Session::open(args.sources(), args.shell_config()?)?;
    tracing::info!(mode = ?session.mode(), "session ready");

    println!("type :help for syntax, exit to quit");
    let stdin = io::stdin();
    run(&mut session, stdin.lock(), &mut io::stdout())
}
