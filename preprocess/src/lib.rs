//! # Bionel Preprocess
//!
//! Mention and dictionary-name normalization applied before retrieval.
//!
//! Two preprocessors are available:
//!
//! - [`BasicPreprocessor`]: lowercasing and punctuation/whitespace collapsing
//!   (the BioSyn normalization)
//! - [`AbbreviationPreprocessor`]: expands abbreviations defined in the same
//!   sentence, e.g. `RSV` in "Respiratory syncytial virus ( RSV ) ...",
//!   using an [`AbbreviationResolver`] such as the Ab3P tool
//!
//! Both are variants of [`Preprocessor`], which is what the linker holds.
//!
//! ## Example
//!
//! ```
//! use bionel_preprocess::{BasicPreprocessor, Preprocessor};
//!
//! let preprocessor = Preprocessor::Basic(BasicPreprocessor::default());
//! assert_eq!(preprocessor.process_entry("Influenza,  Human"), "influenza human");
//! ```

mod abbreviation;
mod basic;
mod error;
mod preprocessor;

pub use abbreviation::{
    AB3P_BINARY_NAME, AbbreviationMap, AbbreviationResolver, Ab3pResolver, NoopResolver,
    parse_ab3p_output,
};
pub use basic::{BasicPreprocessor, DEFAULT_PUNCTUATION};
pub use error::AbbreviationError;
pub use preprocessor::{AbbreviationPreprocessor, Preprocessor};
