//! JSON-lines document records read and written by `bionel link`.

use anyhow::{Context, Result};
use bionel_document::{LinkingLabel, Sentence};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::BufRead;

/// A mention given as a character range of the record text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionRecord {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub entity_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    pub text: String,
    #[serde(default)]
    pub mentions: Vec<MentionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub text: String,
    /// Linking labels per label category, e.g. `disease_nen`
    pub labels: BTreeMap<String, Vec<LinkingLabel>>,
}

/// Parse one record per non-blank line
pub fn read_records(reader: impl BufRead) -> Result<Vec<InputRecord>> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", index + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: InputRecord = serde_json::from_str(&line)
            .with_context(|| format!("Invalid record on line {}", index + 1))?;
        records.push(record);
    }
    Ok(records)
}

impl InputRecord {
    /// Tokenize the text and annotate every mention
    pub fn to_sentence(&self) -> Result<Sentence> {
        let mut sentence = Sentence::new(&self.text);
        for mention in &self.mentions {
            sentence
                .annotate_chars(&mention.entity_type, mention.start, mention.end)
                .with_context(|| {
                    format!(
                        "Mention {}..{} does not cover a token of {:?}",
                        mention.start, mention.end, self.text
                    )
                })?;
        }
        Ok(sentence)
    }
}

impl OutputRecord {
    pub fn from_sentence(text: String, sentence: &Sentence) -> Self {
        let labels = sentence
            .label_categories()
            .map(|category| (category.to_string(), sentence.labels(category).to_vec()))
            .collect();
        Self { text, labels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_records_skips_blank_lines() {
        let input = concat!(
            r#"{"text": "Flu season", "mentions": [{"start": 0, "end": 3, "type": "disease"}]}"#,
            "\n\n",
            r#"{"text": "No mentions here"}"#,
            "\n"
        );
        let records = read_records(input.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].mentions,
            vec![MentionRecord {
                start: 0,
                end: 3,
                entity_type: "disease".to_string()
            }]
        );
        assert!(records[1].mentions.is_empty());
    }

    #[test]
    fn test_invalid_record_reports_line() {
        let err = read_records("{}\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_to_sentence_annotates_character_ranges() {
        let record = InputRecord {
            text: "Lung cancer (LC) is common.".to_string(),
            mentions: vec![MentionRecord {
                start: 13,
                end: 15,
                entity_type: "disease".to_string(),
            }],
        };
        let sentence = record.to_sentence().unwrap();
        let mentions: Vec<&str> = sentence
            .mentions(Some("disease"))
            .map(|span| span.text.as_str())
            .collect();
        assert_eq!(mentions, vec!["LC"]);
    }

    #[test]
    fn test_mention_outside_text_is_error() {
        let record = InputRecord {
            text: "short".to_string(),
            mentions: vec![MentionRecord {
                start: 10,
                end: 12,
                entity_type: "disease".to_string(),
            }],
        };
        assert!(record.to_sentence().is_err());
    }
}
