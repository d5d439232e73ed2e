/*!
# bionel retrieval

Candidate generation for biomedical entity mentions.

- **Dense search**: mentions and dictionary names embedded by a
  [`bionel_embeddings::DenseEncoder`], compared exhaustively
- **Sparse search**: character n-gram TF-IDF vectors scored through an
  inverted index, with linear-time top-k selection
- **Fusion**: sparse scores, scaled by `sparse_weight`, are added to the
  dense candidates (see [`fuse_candidates`])
- **Exact match**: verbatim lookup of the preprocessed mention

## Architecture

```text
mentions
  ├─> Dense search ──> top-k (row, score)
  ├─> Sparse search ─> top-k (row, score)
  └─> Fusion (accumulate sparse_weight * score)
        └─> rows mapped back to dictionary entries
```

## Example

```rust,no_run
use bionel_dictionary::{Dictionary, DictionaryFile};
use bionel_embeddings::{CharNgramVectorizer, EmbeddingConfig, EmbeddingService};
use bionel_preprocess::{BasicPreprocessor, Preprocessor};
use bionel_retrieval::{HybridRetriever, RetrievalConfig};
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dictionary = Dictionary::load(&DictionaryFile::new(Path::new("ctd_diseases.txt")))?;
    let preprocessor = Preprocessor::Basic(BasicPreprocessor::default());
    let names: Vec<String> = dictionary.names().map(|n| preprocessor.process_entry(n)).collect();
    let sparse = CharNgramVectorizer::fit(&names);
    let dense = EmbeddingService::with_config(EmbeddingConfig::hugging_face(
        "dmis-lab/biosyn-sapbert-bc5cdr-disease",
    ))?;

    let retriever = HybridRetriever::build(
        RetrievalConfig::default(),
        dictionary,
        &preprocessor,
        Box::new(dense),
        Some(sparse),
        Path::new("/tmp/bionel"),
    )?;
    for candidate in &retriever.search(&["lung cancer".to_string()], 5)?[0] {
        println!("{:?} {} ({:.3})", candidate.concept_id, candidate.canonical_name, candidate.score);
    }
    Ok(())
}
```
*/

mod config;
mod error;
mod exact;
mod fusion;
mod hybrid;
mod retriever;

pub use config::DEFAULT_SPARSE_WEIGHT;
pub use config::RetrievalConfig;
pub use error::Result;
pub use error::RetrievalError;
pub use exact::ExactStringMatchRetriever;
pub use fusion::fuse_candidates;
pub use hybrid::HybridRetriever;
pub use retriever::EntityRetriever;

// Re-export commonly used types
pub use bionel_document::{Candidate, PredictionSet};
pub use bionel_vector_store::SimilarityMetric;
