//! # bionel embeddings
//!
//! Dense and sparse representations of concept names and mentions.
//!
//! - [`DenseEncoder`] is the seam for any inference-only text encoder;
//!   [`EmbeddingService`] implements it with fastembed (ONNX Runtime),
//!   loading either a bundled model or a Hugging Face export such as
//!   SapBERT.
//! - [`CharNgramVectorizer`] is the lexical side: a character
//!   unigram+bigram TF-IDF encoder producing [`SparseMatrix`] rows.
//!
//! ## Example
//!
//! ```no_run
//! use bionel_embeddings::{DenseEncoder, EmbeddingConfig, EmbeddingService};
//!
//! fn main() -> Result<(), bionel_embeddings::EmbeddingError> {
//!     let config = EmbeddingConfig::hugging_face("cambridgeltl/SapBERT-from-PubMedBERT-fulltext");
//!     let service = EmbeddingService::with_config(config)?;
//!     let embeddings = service.embed(&["influenza".to_string()], 32, None)?;
//!     println!("Generated {} embeddings", embeddings.len());
//!     Ok(())
//! }
//! ```

mod encoder;
mod error;
mod service;
mod sparse;

pub use encoder::DenseEncoder;
pub use encoder::EmbeddingProgress;
pub use encoder::ProgressCallback;
pub use error::EmbeddingError;
pub use service::DEFAULT_MAX_LENGTH;
pub use service::EmbeddingConfig;
pub use service::EmbeddingModelSource;
pub use service::EmbeddingModelType;
pub use service::EmbeddingService;
pub use sparse::CharNgramVectorizer;
pub use sparse::SparseMatrix;

/// Default number of texts per encoder call
pub const DEFAULT_BATCH_SIZE: usize = 1024;
