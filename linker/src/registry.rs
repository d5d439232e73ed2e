//! Names of the packaged dictionaries and pretrained models.

/// Packaged knowledge-base dictionaries
pub const DICTIONARIES: [&str; 4] = ["ctd-disease", "ctd-chemical", "ncbi-gene", "ncbi-taxonomy"];

/// Entity types that can stand in for a model or dictionary name
pub const ENTITY_TYPES: [&str; 4] = ["disease", "chemical", "gene", "species"];

/// Organisation hosting the pretrained hybrid models
pub const HYBRID_MODEL_ORGANISATION: &str = "dmis-lab";

/// Models trained for dense + sparse retrieval
pub const HYBRID_MODELS: [&str; 8] = [
    "biosyn-sapbert-bc5cdr-disease",
    "biosyn-sapbert-ncbi-disease",
    "biosyn-sapbert-bc5cdr-chemical",
    "biosyn-biobert-bc5cdr-disease",
    "biosyn-biobert-ncbi-disease",
    "biosyn-biobert-bc5cdr-chemical",
    "biosyn-biobert-bc2gn",
    "biosyn-sapbert-bc2gn",
];

/// Dense-only model every entity type falls back to
pub const DENSE_MODEL: &str = "cambridgeltl/SapBERT-from-PubMedBERT-fulltext";

pub const DENSE_MODELS: [&str; 1] = [DENSE_MODEL];

pub const EXACT_STRING_MATCH: &str = "exact-string-match";

pub const STRING_MATCHING_MODELS: [&str; 1] = [EXACT_STRING_MATCH];

const ENTITY_TYPE_TO_HYBRID_MODEL: [(&str, &str); 3] = [
    ("disease", "dmis-lab/biosyn-sapbert-bc5cdr-disease"),
    ("chemical", "dmis-lab/biosyn-sapbert-bc5cdr-chemical"),
    ("gene", "dmis-lab/biosyn-sapbert-bc2gn"),
];

const ENTITY_TYPE_TO_DICTIONARY: [(&str, &str); 4] = [
    ("gene", "ncbi-gene"),
    ("species", "ncbi-taxonomy"),
    ("disease", "ctd-disease"),
    ("chemical", "ctd-chemical"),
];

const MODEL_TO_DICTIONARY: [(&str, &str); 8] = [
    ("biosyn-sapbert-bc5cdr-disease", "ctd-disease"),
    ("biosyn-sapbert-ncbi-disease", "ctd-disease"),
    ("biosyn-sapbert-bc5cdr-chemical", "ctd-chemical"),
    ("biosyn-biobert-bc5cdr-disease", "ctd-disease"),
    ("biosyn-biobert-ncbi-disease", "ctd-disease"),
    ("biosyn-biobert-bc5cdr-chemical", "ctd-chemical"),
    ("biosyn-biobert-bc2gn", "ncbi-gene"),
    ("biosyn-sapbert-bc2gn", "ncbi-gene"),
];

fn lookup(table: &[(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, value)| *value)
}

pub fn is_entity_type(name: &str) -> bool {
    ENTITY_TYPES.contains(&name)
}

pub fn is_hybrid_model(name: &str) -> bool {
    HYBRID_MODELS.contains(&hybrid_model_basename(name))
}

/// Every name accepted as a model
pub fn model_names() -> impl Iterator<Item = &'static str> {
    HYBRID_MODELS
        .into_iter()
        .chain(DENSE_MODELS)
        .chain(STRING_MATCHING_MODELS)
}

/// Hybrid model trained for `entity_type`, as a Hugging Face repository id
pub fn hybrid_model_for(entity_type: &str) -> Option<&'static str> {
    lookup(&ENTITY_TYPE_TO_HYBRID_MODEL, entity_type)
}

/// Dense model used for `entity_type`
pub fn dense_model_for(entity_type: &str) -> Option<&'static str> {
    is_entity_type(entity_type).then_some(DENSE_MODEL)
}

/// Registry spelling of a packaged dictionary name
pub fn packaged_dictionary(name: &str) -> Option<&'static str> {
    DICTIONARIES.into_iter().find(|dictionary| *dictionary == name)
}

pub fn dictionary_for_entity_type(entity_type: &str) -> Option<&'static str> {
    lookup(&ENTITY_TYPE_TO_DICTIONARY, entity_type)
}

/// Dictionary a pretrained hybrid model was trained against
pub fn dictionary_for_model(model: &str) -> Option<&'static str> {
    lookup(&MODEL_TO_DICTIONARY, hybrid_model_basename(model))
}

/// Hugging Face repository of a hybrid model given by its short name
pub fn hybrid_model_repo(model: &str) -> String {
    if model.contains('/') {
        model.to_string()
    } else {
        format!("{HYBRID_MODEL_ORGANISATION}/{model}")
    }
}

fn hybrid_model_basename(model: &str) -> &str {
    model
        .strip_prefix(HYBRID_MODEL_ORGANISATION)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_entity_types_have_dictionaries() {
        for entity_type in ENTITY_TYPES {
            let dictionary = dictionary_for_entity_type(entity_type).unwrap();
            assert!(DICTIONARIES.contains(&dictionary));
            assert_eq!(dense_model_for(entity_type), Some(DENSE_MODEL));
        }
    }

    #[test]
    fn test_hybrid_models_have_dictionaries() {
        for model in HYBRID_MODELS {
            assert!(DICTIONARIES.contains(&dictionary_for_model(model).unwrap()));
            assert!(is_hybrid_model(&hybrid_model_repo(model)));
        }
    }

    #[test]
    fn test_entity_type_hybrid_models() {
        assert_eq!(
            hybrid_model_for("disease"),
            Some("dmis-lab/biosyn-sapbert-bc5cdr-disease")
        );
        assert_eq!(hybrid_model_for("species"), None);
        assert!(is_hybrid_model("dmis-lab/biosyn-sapbert-bc2gn"));
        assert_eq!(
            dictionary_for_model("dmis-lab/biosyn-sapbert-bc2gn"),
            Some("ncbi-gene")
        );
    }

    #[test]
    fn test_model_names() {
        let names: Vec<&str> = model_names().collect();
        assert_eq!(names.len(), HYBRID_MODELS.len() + 2);
        assert!(names.contains(&DENSE_MODEL));
        assert!(names.contains(&EXACT_STRING_MATCH));
        assert_eq!(packaged_dictionary("ncbi-gene"), Some("ncbi-gene"));
        assert_eq!(packaged_dictionary("NCBI-gene"), None);
    }
}
