/*!
# Bionel Dictionary

Knowledge-base dictionaries for biomedical entity normalization.

A dictionary is an ordered stream of `(concept_id, canonical_name)` pairs.
Synonyms share a concept id and appear as separate entries. The order in
which a source streams its entries is fixed: row `i` of every embedding
matrix built from the dictionary corresponds to entry `i`.

## Sources

- [`DictionaryFile`]: UTF-8 text, one `concept_id||name` pair per line
- [`InMemoryDictionary`]: entries held in a `Vec`, mostly for tests

## Example

```rust,no_run
use bionel_dictionary::{Dictionary, DictionaryFile};
use std::path::Path;

fn main() -> bionel_dictionary::Result<()> {
    let source = DictionaryFile::new(Path::new("ctd_diseases.txt"));
    let dictionary = Dictionary::load(&source)?;
    println!(
        "{} entries from {:?}, fingerprint {}",
        dictionary.len(),
        dictionary.database_names(),
        dictionary.fingerprint()
    );
    Ok(())
}
```
*/

mod dictionary;
mod error;
mod file;
mod source;

pub use dictionary::{Dictionary, database_of};
pub use error::{DictionaryError, Result};
pub use file::DictionaryFile;
pub use source::{DictionaryEntry, DictionarySource, EntryStream, InMemoryDictionary};
