//! # bionel vector store
//!
//! Embedding storage and exhaustive similarity search for a knowledge-base
//! dictionary.
//!
//! [`DictionaryIndex::build_or_load`] turns a [`bionel_dictionary::Dictionary`]
//! into a dense [`FlatIpIndex`] and, for hybrid search, a [`SparseIndex`].
//! The underlying [`EmbeddingBundle`] is persisted under
//! `<cache_root>/datasets/` and reused on later runs as long as its header
//! still matches the model, the dictionary contents and the metric.
//!
//! ## Example
//!
//! ```no_run
//! use bionel_dictionary::{Dictionary, DictionaryFile};
//! use bionel_embeddings::{EmbeddingConfig, EmbeddingService};
//! use bionel_preprocess::{BasicPreprocessor, Preprocessor};
//! use bionel_vector_store::{DictionaryIndex, IndexRequest};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dictionary = Dictionary::load(&DictionaryFile::new(Path::new("ctd_diseases.txt")))?;
//!     let encoder = EmbeddingService::with_config(EmbeddingConfig::hugging_face(
//!         "cambridgeltl/SapBERT-from-PubMedBERT-fulltext",
//!     ))?;
//!     let preprocessor = Preprocessor::Basic(BasicPreprocessor::default());
//!
//!     let request = IndexRequest::new("/tmp/bionel");
//!     let index = DictionaryIndex::build_or_load(&request, dictionary, &preprocessor, &encoder, None)?;
//!     println!("Indexed {} names", index.len());
//!     Ok(())
//! }
//! ```

mod bundle;
mod error;
mod flat;
mod index;
mod matrix;
mod sparse_index;

pub use bundle::BUNDLE_FORMAT_VERSION;
pub use bundle::BundleHeader;
pub use bundle::EmbeddingBundle;
pub use error::Result;
pub use error::VectorStoreError;
pub use flat::FlatIpIndex;
pub use index::DATASETS_DIR;
pub use index::DictionaryIndex;
pub use index::IndexRequest;
pub use index::bundle_path;
pub use matrix::DenseMatrix;
pub use matrix::SimilarityMetric;
pub use matrix::top_k;
pub use sparse_index::SparseIndex;
