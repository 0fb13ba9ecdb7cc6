use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use searchcore::persist::{save_index, IndexFormat, IndexPaths, MetaFile};
use searchcore::store::read_token_dir;
use searchcore::table::{compute_tables, write_tables};
use searchcore::{build_index, TokenStoreConfig};
use std::path::Path;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build the inverted index and tf-idf tables from token files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Bincode,
}

impl From<Format> for IndexFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Json => IndexFormat::Json,
            Format::Bincode => IndexFormat::Bincode,
        }
    }
}

#[derive(clap::Args)]
struct StoreArgs {
    /// Directory of per-document token files (one token per line)
    #[arg(long)]
    tokens: String,
    /// Only read files whose name starts with this prefix, e.g. lemmas_
    #[arg(long)]
    prefix: Option<String>,
    /// Token file extension
    #[arg(long, default_value = "txt")]
    extension: String,
}

impl StoreArgs {
    fn config(&self) -> TokenStoreConfig {
        TokenStoreConfig { extension: self.extension.clone(), prefix: self.prefix.clone() }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build and persist the inverted index
    Build {
        #[command(flatten)]
        store: StoreArgs,
        /// Output index directory
        #[arg(long)]
        output: String,
        /// Record format
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },
    /// Compute per-document lemma tables (lemma idf tfidf)
    Tables {
        #[command(flatten)]
        store: StoreArgs,
        /// Output table directory
        #[arg(long)]
        output: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { store, output, format } => build(&store, &output, format.into()),
        Commands::Tables { store, output } => tables(&store, &output),
    }
}

fn build(store: &StoreArgs, output: &str, format: IndexFormat) -> Result<()> {
    let index = build_index(&store.tokens, &store.config())?;
    let created_at = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "".into());
    let meta = MetaFile::for_index(&index, format, created_at);
    save_index(&IndexPaths::new(output), &index, &meta)?;
    tracing::info!(output, "index build complete");
    Ok(())
}

fn tables(store: &StoreArgs, output: &str) -> Result<()> {
    let docs = read_token_dir(Path::new(&store.tokens), &store.config())?;
    let table = compute_tables(&docs);
    write_tables(output, &table)?;
    tracing::info!(output, num_lemmas = table.num_lemmas(), "tables complete");
    Ok(())
}
