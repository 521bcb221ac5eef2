use std::io;
use std::path::PathBuf;

use clap::Parser;
use usprop_cli::{init_logging, pick_path, ChatSession};
use usprop_core::config::Config;
use usprop_core::{load_qa_table, AnswerResolver};
use usprop_model::get_default_model;

/// Interactive US property-market chatbot.
#[derive(Parser, Debug)]
#[command(name = "usprop-chat", version, about)]
struct Args {
    /// JSON object of curated question -> answer (default: data.qa_file)
    #[arg(long)]
    qa_file: Option<PathBuf>,
    /// Use the deterministic fake model instead of loading DistilBERT
    #[arg(long)]
    fake_model: bool,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();
    let mut settings = Config::load()?.settings()?;
    settings.model.use_fake |= args.fake_model;

    let qa_file = pick_path(args.qa_file, &settings.data.qa_file)?;
    let known = load_qa_table(&qa_file)?;
    tracing::info!("Loaded {} curated answers from {}", known.len(), qa_file.display());

    let model = get_default_model(&settings.model)?;
    let resolver = AnswerResolver::with_context(known, model, settings.chat.context);

    let stdin = io::stdin();
    ChatSession::new(&resolver).run(stdin.lock(), io::stdout().lock())?;
    Ok(())
}
