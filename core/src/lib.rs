//! Query engine for a small static corpus: boolean retrieval over an
//! inverted index and TF-IDF ranking by cosine similarity.

pub mod error;
pub mod index;
pub mod persist;
pub mod query;
pub mod rank;
pub mod snapshot;
pub mod store;
pub mod table;

pub use error::QueryError;
pub use index::{build_index, DocId, InvertedIndex, PostingSet};
pub use query::{evaluate_boolean, BooleanEngine, QueryConfig};
pub use rank::{rank, IdentityLemmatizer, Lemmatizer, Ranker, StemLemmatizer};
pub use snapshot::Snapshot;
pub use store::TokenStoreConfig;
pub use table::{load_tfidf_table, TfidfEntry, TfidfTable};
