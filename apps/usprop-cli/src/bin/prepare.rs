use std::path::PathBuf;

use clap::Parser;
use usprop_cli::{init_logging, pick_path};
use usprop_core::config::Config;
use usprop_core::dataset::{serialize, write_artifact};
use usprop_core::{load_qa_table, DatasetBuilder, TextNormalizer};

/// Clean the Q/A pairs and write the training-ready dataset artifact.
#[derive(Parser, Debug)]
#[command(name = "usprop-prepare", version, about)]
struct Args {
    /// JSON object of question -> answer (default: data.qa_file)
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Artifact path (default: data.output_file)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn run(args: Args) -> anyhow::Result<()> {
    let settings = Config::load()?.settings()?;
    let input = pick_path(args.input, &settings.data.qa_file)?;
    let output = pick_path(args.output, &settings.data.output_file)?;

    tracing::info!("Loading dataset from {}...", input.display());
    let table = load_qa_table(&input)?;
    tracing::info!("Loaded {} question-answer pairs", table.len());

    let builder = DatasetBuilder::with_normalizer(TextNormalizer::with_keep_chars(&settings.normalize.keep_chars));
    let dataset = builder.prepare_dataset(&table)?;
    let artifact = serialize(&dataset)?;
    write_artifact(&output, &artifact)?;
    tracing::info!("Data preprocessing completed successfully");

    tracing::info!("Sample of preprocessed data:");
    for record in dataset.sample(2) {
        tracing::info!("{}", serde_json::to_string_pretty(record)?);
    }
    Ok(())
}

fn main() {
    init_logging();
    if let Err(e) = run(Args::parse()) {
        tracing::error!("An error occurred during data preprocessing: {:#}", e);
        std::process::exit(1);
    }
}
