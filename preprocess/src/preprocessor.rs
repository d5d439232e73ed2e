use crate::abbreviation::{AbbreviationMap, AbbreviationResolver};
use crate::basic::BasicPreprocessor;
use bionel_document::{MentionSpan, Sentence};
use log::{debug, error};

/// Mention/name normalization strategy
pub enum Preprocessor {
    Basic(BasicPreprocessor),
    Abbreviation(AbbreviationPreprocessor),
}

impl Preprocessor {
    /// Normalize a dictionary name. Dictionary names carry no sentence
    /// context, so abbreviation expansion never applies here.
    pub fn process_entry(&self, entity_name: &str) -> String {
        match self {
            Preprocessor::Basic(basic) => basic.process_entry(entity_name),
            Preprocessor::Abbreviation(abbreviation) => abbreviation.process_entry(entity_name),
        }
    }

    /// Normalize a mention found in `sentence`
    pub fn process_mention(&self, mention: &MentionSpan, sentence: &Sentence) -> String {
        match self {
            Preprocessor::Basic(basic) => basic.process_entry(&mention.text),
            Preprocessor::Abbreviation(abbreviation) => {
                abbreviation.process_mention(mention, sentence)
            }
        }
    }

    /// Prepare for a batch of sentences
    pub fn initialize(&mut self, sentences: &[Sentence]) {
        match self {
            Preprocessor::Basic(_) => {}
            Preprocessor::Abbreviation(abbreviation) => abbreviation.initialize(sentences),
        }
    }
}

/// Expands abbreviations that are defined in the mention's own sentence.
///
/// Wraps an optional inner preprocessor that is applied token by token
/// before the abbreviation lookup.
pub struct AbbreviationPreprocessor {
    resolver: Box<dyn AbbreviationResolver>,
    inner: Option<Box<Preprocessor>>,
    abbreviations: AbbreviationMap,
}

impl AbbreviationPreprocessor {
    pub fn new(resolver: Box<dyn AbbreviationResolver>, inner: Option<Preprocessor>) -> Self {
        Self {
            resolver,
            inner: inner.map(Box::new),
            abbreviations: AbbreviationMap::new(),
        }
    }

    /// Run abbreviation detection over the whole batch. Detector failures
    /// leave the map empty; mentions then only get token preprocessing.
    pub fn initialize(&mut self, sentences: &[Sentence]) {
        let texts: Vec<String> = sentences.iter().map(Sentence::tokenized_text).collect();

        self.abbreviations = match self.resolver.resolve(&texts) {
            Ok(abbreviations) => abbreviations,
            Err(err) => {
                error!(
                    "Abbreviation resolution unavailable, continuing without it: {err}. \
                     Install Ab3P (https://github.com/ncbi-nlp/Ab3P) for best accuracy."
                );
                AbbreviationMap::new()
            }
        };
        debug!(
            "Abbreviations found in {} of {} sentences",
            self.abbreviations.len(),
            sentences.len()
        );
    }

    pub fn process_mention(&self, mention: &MentionSpan, sentence: &Sentence) -> String {
        let sentence_text = sentence.tokenized_text();

        let mut parsed_tokens = Vec::new();
        for token in sentence.span_tokens(mention) {
            let token = self.process_entry(&token.text);

            if let Some(long_form) = self
                .abbreviations
                .long_form(&sentence_text, &token.to_lowercase())
            {
                parsed_tokens.push(long_form.to_string());
                continue;
            }

            if !token.is_empty() {
                parsed_tokens.push(token);
            }
        }

        parsed_tokens.join(" ")
    }

    pub fn process_entry(&self, entity_name: &str) -> String {
        match &self.inner {
            Some(inner) => inner.process_entry(entity_name),
            None => entity_name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AbbreviationError;
    use crate::parse_ab3p_output;
    use pretty_assertions::assert_eq;

    /// Replays canned Ab3P output
    struct CannedResolver(&'static str);

    impl AbbreviationResolver for CannedResolver {
        fn resolve(&self, _sentences: &[String]) -> Result<AbbreviationMap, AbbreviationError> {
            Ok(parse_ab3p_output(self.0))
        }
    }

    struct FailingResolver;

    impl AbbreviationResolver for FailingResolver {
        fn resolve(&self, _sentences: &[String]) -> Result<AbbreviationMap, AbbreviationError> {
            Err(AbbreviationError::ExitStatus {
                status: Some(1),
                stderr: "boom".to_string(),
            })
        }
    }

    const RSV_OUTPUT: &str = "\
Respiratory syncytial virus ( RSV ) is common .
  RSV|Respiratory syncytial virus|0.999613
";

    fn rsv_sentence() -> (Sentence, MentionSpan) {
        let mut sentence = Sentence::new("Respiratory syncytial virus (RSV) is common.");
        let span = sentence.annotate("disease", 4..5).unwrap().clone();
        (sentence, span)
    }

    fn abbreviation_preprocessor(resolver: Box<dyn AbbreviationResolver>) -> Preprocessor {
        Preprocessor::Abbreviation(AbbreviationPreprocessor::new(
            resolver,
            Some(Preprocessor::Basic(BasicPreprocessor::default())),
        ))
    }

    #[test]
    fn test_abbreviation_expansion() {
        let (sentence, span) = rsv_sentence();
        let mut preprocessor = abbreviation_preprocessor(Box::new(CannedResolver(RSV_OUTPUT)));

        preprocessor.initialize(std::slice::from_ref(&sentence));

        assert_eq!(
            preprocessor.process_mention(&span, &sentence),
            "respiratory syncytial virus"
        );
    }

    #[test]
    fn test_failing_resolver_falls_back_to_token_preprocessing() {
        let (sentence, span) = rsv_sentence();
        let mut preprocessor = abbreviation_preprocessor(Box::new(FailingResolver));

        preprocessor.initialize(std::slice::from_ref(&sentence));

        assert_eq!(preprocessor.process_mention(&span, &sentence), "rsv");
    }

    #[test]
    fn test_abbreviation_only_applies_to_its_sentence() {
        let (sentence, _) = rsv_sentence();
        let mut other = Sentence::new("RSV infection was confirmed.");
        let other_span = other.annotate("disease", 0..2).unwrap().clone();

        let mut preprocessor = abbreviation_preprocessor(Box::new(CannedResolver(RSV_OUTPUT)));
        preprocessor.initialize(&[sentence, other.clone()]);

        assert_eq!(
            preprocessor.process_mention(&other_span, &other),
            "rsv infection"
        );
    }

    #[test]
    fn test_entry_delegates_to_inner() {
        let preprocessor = abbreviation_preprocessor(Box::new(CannedResolver(RSV_OUTPUT)));
        assert_eq!(preprocessor.process_entry("Influenza, Human"), "influenza human");

        let bare = AbbreviationPreprocessor::new(Box::new(CannedResolver(RSV_OUTPUT)), None);
        assert_eq!(bare.process_entry("Influenza, Human"), "Influenza, Human");
    }

    #[test]
    fn test_tokens_emptied_by_preprocessing_are_dropped() {
        let mut sentence = Sentence::new("Cancer ( of the lung )");
        let span = sentence.annotate("disease", 0..6).unwrap().clone();

        let preprocessor = abbreviation_preprocessor(Box::new(CannedResolver("")));
        assert_eq!(
            preprocessor.process_mention(&span, &sentence),
            "cancer of the lung"
        );
    }

    #[test]
    fn test_basic_mention_uses_span_text() {
        let (sentence, span) = rsv_sentence();
        let preprocessor = Preprocessor::Basic(BasicPreprocessor::default());
        assert_eq!(preprocessor.process_mention(&span, &sentence), "rsv");
    }
}
