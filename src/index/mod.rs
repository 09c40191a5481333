//! Index module - exact vector index, passage store, building and querying

mod builder;
mod corpus;
mod embeddings;
mod locate;
mod meta;
mod passages;
mod query;
mod vector;

pub use builder::{Document, IndexBuilder};
pub use corpus::{Corpus, CorpusPaths, CORPUS_BASENAME};
pub use embeddings::{read_vectors, write_vectors, EmbeddingsWriter};
pub use locate::{find_index, global_indexes_dir, local_indexes_dir};
pub use meta::{IndexMeta, FORMAT_VERSION};
pub use passages::{Passage, PassageStore};
pub use query::{QueryEngine, QueryResult};
pub use vector::{squared_euclidean, Neighbor, VectorIndex};
