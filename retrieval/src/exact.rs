use bionel_dictionary::Dictionary;
use bionel_document::{Candidate, PredictionSet};
use bionel_preprocess::Preprocessor;
use log::debug;
use std::collections::HashMap;

/// Looks mentions up verbatim among the (preprocessed) dictionary names
#[derive(Debug, Clone, Default)]
pub struct ExactStringMatchRetriever {
    name_to_id: HashMap<String, String>,
}

impl ExactStringMatchRetriever {
    /// Index every name of `dictionary`. When several entries share a
    /// name, the last one wins.
    pub fn new(dictionary: &Dictionary, preprocessor: Option<&Preprocessor>) -> Self {
        let name_to_id: HashMap<String, String> = dictionary
            .entries()
            .iter()
            .map(|entry| {
                let name = match preprocessor {
                    Some(preprocessor) => preprocessor.process_entry(&entry.canonical_name),
                    None => entry.canonical_name.clone(),
                };
                (name, entry.concept_id.clone())
            })
            .collect();

        debug!(
            "Exact match index over {} distinct names of {}",
            name_to_id.len(),
            dictionary.id()
        );
        Self { name_to_id }
    }

    pub fn len(&self) -> usize {
        self.name_to_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.name_to_id.is_empty()
    }

    /// One candidate per mention: score 1.0 on a hit, an unmatched
    /// candidate otherwise. `top_k == 0` yields empty sets.
    pub fn search(&self, mentions: &[String], top_k: usize) -> Vec<PredictionSet> {
        mentions
            .iter()
            .map(|mention| {
                if top_k == 0 {
                    return PredictionSet::new();
                }
                let candidate = match self.name_to_id.get(mention) {
                    Some(concept_id) => Candidate::new(mention.clone(), concept_id.clone(), 1.0),
                    None => Candidate::unmatched(mention.clone()),
                };
                vec![candidate]
            })
            .collect()
    }
}
