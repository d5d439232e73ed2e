use crate::error::DocumentError;
use crate::label::LinkingLabel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;

/// A single token with its character offset in the source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,

    /// Offset of the first character (in chars, not bytes)
    pub start: usize,
}

impl Token {
    /// Character offset one past the last character
    pub fn end(&self) -> usize {
        self.start + self.text.chars().count()
    }
}

/// A contiguous run of tokens naming an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionSpan {
    /// First token index
    pub start_token: usize,

    /// One past the last token index
    pub end_token: usize,

    /// Surface text of the span
    pub text: String,
}

impl MentionSpan {
    pub fn token_range(&self) -> Range<usize> {
        self.start_token..self.end_token
    }
}

/// A mention span tagged with the entity type it was recognized as
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityAnnotation {
    pub entity_type: String,
    pub span: MentionSpan,
}

/// A tokenized sentence carrying entity annotations and linking labels
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sentence {
    tokens: Vec<Token>,

    #[serde(default)]
    annotations: Vec<EntityAnnotation>,

    #[serde(default)]
    labels: BTreeMap<String, Vec<LinkingLabel>>,
}

impl Sentence {
    /// Tokenize `text` on whitespace, splitting ASCII punctuation into
    /// tokens of their own.
    pub fn new(text: &str) -> Self {
        let mut tokens = Vec::new();
        let mut current = String::new();
        let mut current_start = 0;

        for (offset, ch) in text.chars().enumerate() {
            if ch.is_whitespace() || ch.is_ascii_punctuation() {
                if !current.is_empty() {
                    tokens.push(Token {
                        text: std::mem::take(&mut current),
                        start: current_start,
                    });
                }
                if ch.is_ascii_punctuation() {
                    tokens.push(Token {
                        text: ch.to_string(),
                        start: offset,
                    });
                }
                continue;
            }

            if current.is_empty() {
                current_start = offset;
            }
            current.push(ch);
        }

        if !current.is_empty() {
            tokens.push(Token {
                text: current,
                start: current_start,
            });
        }

        Self {
            tokens,
            ..Default::default()
        }
    }

    /// Build a sentence from pre-tokenized text. Tokens are assumed to be
    /// separated by a single space.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut offset = 0;
        let tokens = tokens
            .into_iter()
            .map(|text| {
                let token = Token {
                    text: text.into(),
                    start: offset,
                };
                offset = token.end() + 1;
                token
            })
            .collect();

        Self {
            tokens,
            ..Default::default()
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens joined by single spaces. This is the sentence text handed to
    /// the abbreviation detector and used as its lookup key.
    pub fn tokenized_text(&self) -> String {
        self.tokens
            .iter()
            .map(|token| token.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Annotate tokens `range` as a mention of `entity_type`
    pub fn annotate(
        &mut self,
        entity_type: &str,
        range: Range<usize>,
    ) -> Result<&MentionSpan, DocumentError> {
        if range.start >= range.end || range.end > self.tokens.len() {
            return Err(DocumentError::InvalidTokenRange {
                start: range.start,
                end: range.end,
                len: self.tokens.len(),
            });
        }

        let span = MentionSpan {
            start_token: range.start,
            end_token: range.end,
            text: self.span_text(range),
        };
        self.annotations.push(EntityAnnotation {
            entity_type: entity_type.to_string(),
            span,
        });

        let index = self.annotations.len() - 1;
        Ok(&self.annotations[index].span)
    }

    /// Annotate every token overlapping the character range `start..end`
    pub fn annotate_chars(
        &mut self,
        entity_type: &str,
        start: usize,
        end: usize,
    ) -> Result<&MentionSpan, DocumentError> {
        let covered: Vec<usize> = self
            .tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| token.start < end && token.end() > start)
            .map(|(idx, _)| idx)
            .collect();

        match (covered.first(), covered.last()) {
            (Some(&first), Some(&last)) => self.annotate(entity_type, first..last + 1),
            _ => Err(DocumentError::EmptyCharRange { start, end }),
        }
    }

    /// Mention spans annotated as `entity_type`, or every span for `None`
    pub fn mentions<'a>(
        &'a self,
        entity_type: Option<&'a str>,
    ) -> impl Iterator<Item = &'a MentionSpan> + 'a {
        self.annotations
            .iter()
            .filter(move |annotation| {
                entity_type.is_none_or(|wanted| annotation.entity_type == wanted)
            })
            .map(|annotation| &annotation.span)
    }

    pub fn annotations(&self) -> &[EntityAnnotation] {
        &self.annotations
    }

    /// Tokens covered by `span`
    pub fn span_tokens(&self, span: &MentionSpan) -> &[Token] {
        let end = span.end_token.min(self.tokens.len());
        let start = span.start_token.min(end);
        &self.tokens[start..end]
    }

    pub fn add_label(&mut self, category: &str, label: LinkingLabel) {
        self.labels
            .entry(category.to_string())
            .or_default()
            .push(label);
    }

    /// Labels stored under `category`
    pub fn labels(&self, category: &str) -> &[LinkingLabel] {
        self.labels
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn label_categories(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(String::as_str)
    }

    /// Rebuild surface text, keeping a space only where the source had one
    fn span_text(&self, range: Range<usize>) -> String {
        let mut text = String::new();
        let mut previous_end: Option<usize> = None;
        for token in &self.tokens[range] {
            if previous_end.is_some_and(|end| end < token.start) {
                text.push(' ');
            }
            text.push_str(&token.text);
            previous_end = Some(token.end());
        }
        text
    }
}
