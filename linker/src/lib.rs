/*!
# Bionel Linker

Links biomedical entity mentions to knowledge-base concepts.

An [`EntityLinker`] preprocesses every annotated mention of a batch of
[`bionel_document::Sentence`]s, retrieves candidate concepts from a
dictionary and attaches them as [`bionel_document::LinkingLabel`]s under the
`<entity_type>_nen` label category.

Models and dictionaries are selected by name through [`LinkerConfig`]:

- an entity type (`disease`, `chemical`, `gene`, `species`) picks the
  pretrained model and packaged dictionary for that type;
- a pretrained model name (see [`registry`]) or a local model directory;
- `exact-string-match` together with a dictionary.

Packaged dictionaries are read from `<cache_root>/datasets/<name>/dictionary.txt`.
Dictionary embeddings are cached next to them.

## Example

```rust,no_run
use bionel_document::Sentence;
use bionel_linker::{EntityLinker, LinkerConfig};

fn main() -> bionel_linker::Result<()> {
    let mut linker = EntityLinker::load(LinkerConfig::for_entity_type("disease"))?;

    let mut sentences = vec![Sentence::new("The patient developed lung cancer .")];
    sentences[0].annotate("disease", 3..5).unwrap();
    linker.predict(&mut sentences, Some("disease"), 1)?;

    for label in sentences[0].labels("disease_nen") {
        println!("{} -> {:?}:{}", label.span.text, label.database, label.concept_id);
    }
    Ok(())
}
```
*/

mod artifacts;
mod config;
mod error;
mod identifier;
mod linker;
pub mod registry;
mod resolve;

pub use artifacts::SPARSE_ENCODER_FILE;
pub use artifacts::SPARSE_WEIGHT_FILE;
pub use artifacts::SparseArtifacts;
pub use artifacts::fitted_encoder_dir;
pub use artifacts::model_cache_dir;
pub use artifacts::resolve_sparse_artifacts;
pub use config::CACHE_ROOT_ENV_VAR;
pub use config::LinkerConfig;
pub use error::LinkerError;
pub use error::Result;
pub use identifier::ConceptIdentifier;
pub use identifier::parse_concept_identifier;
pub use linker::EntityLinker;
pub use resolve::DICTIONARY_FILE_NAME;
pub use resolve::DictionaryLocation;
pub use resolve::ModelSource;
pub use resolve::packaged_dictionary_path;
pub use resolve::resolve_dictionary;
pub use resolve::resolve_model;
