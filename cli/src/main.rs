//! `bionel`: link biomedical entity mentions to knowledge-base concepts.
//!
//! ```bash
//! echo '{"text": "Flu season", "mentions": [{"start": 0, "end": 3, "type": "disease"}]}' \
//!     | bionel link --entity-type disease
//! ```

use anyhow::Result;
use bionel_cli::link_cmd::{IndexArgs, LinkArgs};
use bionel_cli::models_cmd::run_models;
use clap::{Parser, Subcommand};

const LONG_ABOUT: &str = "\
Biomedical entity normalization

Dense encoders run as ONNX models. The registered pretrained repositories \
(dmis-lab/biosyn-*, cambridgeltl/SapBERT-*) publish no onnx/model.onnx, so \
export the model to ONNX yourself and pass the export directory to --model. \
The directory needs onnx/model.onnx next to the tokenizer files.";

#[derive(Debug, Parser)]
#[command(
    name = "bionel",
    version,
    about = "Biomedical entity normalization",
    long_about = LONG_ABOUT
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Link the mentions of JSON-lines records
    Link(LinkArgs),

    /// Build the cached dictionary embeddings without linking
    Index(IndexArgs),

    /// List known models, entity types and dictionaries
    Models,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match Cli::parse().command {
        Command::Link(args) => args.run(),
        Command::Index(args) => args.run(),
        Command::Models => {
            run_models();
            Ok(())
        }
    }
}
