use crate::records::{InputRecord, OutputRecord, read_records};
use anyhow::{Context, Result};
use bionel_linker::{EntityLinker, LinkerConfig};
use clap::Parser;
use log::info;
use owo_colors::OwoColorize;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

/// Options shared by the commands that load a linker
#[derive(Debug, Clone, Parser)]
pub struct LinkerArgs {
    /// Model name, local model directory or `exact-string-match`
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Entity type to link (disease, chemical, gene, species). Also selects
    /// the model and dictionary when those are not given.
    #[arg(short = 't', long, value_name = "TYPE")]
    pub entity_type: Option<String>,

    /// Packaged dictionary name, entity type or dictionary file
    #[arg(short, long, value_name = "DICTIONARY")]
    pub dictionary: Option<String>,

    /// TOML linker configuration; command line options take precedence
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory for datasets, embedding caches and model artifacts
    #[arg(long, value_name = "PATH")]
    pub cache_root: Option<PathBuf>,

    /// Rank by dense similarity only
    #[arg(long)]
    pub dense_only: bool,

    /// Fit a sparse encoder on the dictionary when the model ships none
    #[arg(long)]
    pub default_sparse_encoder: bool,

    /// Skip Ab3P abbreviation resolution
    #[arg(long)]
    pub no_abbreviations: bool,
}

impl LinkerArgs {
    pub fn to_config(&self) -> Result<LinkerConfig> {
        let mut config = match &self.config {
            Some(path) => LinkerConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => {
                let model = self
                    .model
                    .clone()
                    .or_else(|| self.entity_type.clone())
                    .context("Either --model, --entity-type or --config is required")?;
                LinkerConfig::new(model)
            }
        };

        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if self.dictionary.is_some() {
            config.dictionary = self.dictionary.clone();
        }
        if self.cache_root.is_some() {
            config.cache_root = self.cache_root.clone();
        }
        if self.dense_only {
            config.hybrid_search = false;
        }
        if self.default_sparse_encoder {
            config.default_sparse_encoder = true;
        }
        if self.no_abbreviations {
            config.abbreviation_resolution = false;
        }

        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }
}

#[derive(Debug, Parser)]
pub struct LinkArgs {
    #[command(flatten)]
    pub linker: LinkerArgs,

    /// JSON-lines input (reads stdin if not provided)
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// JSON-lines output (writes stdout if not provided)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Candidates attached per mention
    #[arg(short = 'k', long, default_value_t = 1)]
    pub top_k: usize,
}

impl LinkArgs {
    pub fn run(self) -> Result<()> {
        let config = self.linker.to_config()?;

        let reader: Box<dyn BufRead> = match &self.input {
            Some(path) => Box::new(BufReader::new(
                File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
            )),
            None => Box::new(BufReader::new(io::stdin())),
        };
        let records = read_records(reader)?;
        let mut sentences = records
            .iter()
            .map(InputRecord::to_sentence)
            .collect::<Result<Vec<_>>>()?;

        let mut linker = EntityLinker::load(config).context("Failed to load entity linker")?;
        linker
            .predict(&mut sentences, self.linker.entity_type.as_deref(), self.top_k)
            .context("Linking failed")?;

        let mut writer: Box<dyn Write> = match &self.output {
            Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
                format!("Failed to create {}", path.display())
            })?)),
            None => Box::new(BufWriter::new(io::stdout().lock())),
        };
        let mut labels = 0;
        for (record, sentence) in records.into_iter().zip(&sentences) {
            let output = OutputRecord::from_sentence(record.text, sentence);
            labels += output.labels.values().map(Vec::len).sum::<usize>();
            serde_json::to_writer(&mut writer, &output)?;
            writeln!(writer)?;
        }
        writer.flush()?;

        info!("Linked {} sentences", sentences.len());
        eprintln!(
            "{} {} labels across {} sentences",
            "✓".bright_green(),
            labels.bright_cyan(),
            sentences.len().bright_cyan()
        );
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct IndexArgs {
    #[command(flatten)]
    pub linker: LinkerArgs,
}

impl IndexArgs {
    /// Build (or verify) the cached dictionary embeddings
    pub fn run(self) -> Result<()> {
        let config = self.linker.to_config()?;
        let cache_root = config.cache_root();
        EntityLinker::load(config).context("Failed to build dictionary index")?;
        eprintln!(
            "{} Dictionary index ready under {}",
            "✓".bright_green(),
            cache_root.display().bright_cyan()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(argv: &[&str]) -> LinkerArgs {
        let mut full = vec!["link"];
        full.extend_from_slice(argv);
        LinkArgs::parse_from(full).linker
    }

    #[test]
    fn test_entity_type_selects_model() {
        let config = args(&["--entity-type", "gene"]).to_config().unwrap();
        assert_eq!(config.model, "gene");
        assert!(config.hybrid_search);
    }

    #[test]
    fn test_flags_override_config_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("linker.toml");
        std::fs::write(&path, "model = \"disease\"\nsparse_weight = 0.2\n").unwrap();

        let config = args(&[
            "--config",
            path.to_str().unwrap(),
            "--model",
            "exact-string-match",
            "--dictionary",
            "ctd-disease",
            "--dense-only",
            "--no-abbreviations",
        ])
        .to_config()
        .unwrap();

        assert_eq!(config.model, "exact-string-match");
        assert_eq!(config.dictionary.as_deref(), Some("ctd-disease"));
        assert_eq!(config.sparse_weight, Some(0.2));
        assert!(!config.hybrid_search);
        assert!(!config.abbreviation_resolution);
    }

    #[test]
    fn test_model_required() {
        assert!(args(&[]).to_config().is_err());
    }
}
