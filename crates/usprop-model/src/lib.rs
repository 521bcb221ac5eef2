//! usprop-model
//!
//! Extractive question-answering models behind `usprop_core::QaModel`:
//! a DistilBERT encoder with a `qa_outputs` head on candle, and a hash-based
//! fake for tests and offline development.

use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::distilbert::{Config as DistilBertConfig, DistilBertModel};
use serde::Deserialize;
use tokenizers::Tokenizer;
use twox_hash::XxHash64;

use usprop_core::config::{ModelSettings, expand_path};
use usprop_core::types::{SpanScores, TokenId};
use usprop_core::QaModel;

pub mod device;
pub mod tokenize;

pub use device::select_device;
pub use tokenize::encode_pair_on_device;

const DEFAULT_MODEL_NAME: &str = "distilbert-base-uncased-distilled-squad";

#[derive(Deserialize)]
struct HeadConfig { dim: usize }

/// DistilBERT encoder plus a linear span head producing start/end logits.
pub struct DistilBertQa { model: DistilBertModel, qa_outputs: Linear, tokenizer: Tokenizer, device: Device, max_len: usize }

impl DistilBertQa {
    pub fn new(model_dir: &Path, max_len: usize, device: &str) -> Result<Self> {
        let device = select_device(device)?;
        tracing::info!("Loading DistilBERT QA model from {}", model_dir.display());
        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;
        let config_path = model_dir.join("config.json");
        let raw_config = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow!("Failed to read {}: {}", config_path.display(), e))?;
        let config: DistilBertConfig = serde_json::from_str(&raw_config)?;
        let head: HeadConfig = serde_json::from_str(&raw_config)?;
        let weights = load_weights(model_dir, &device)?;
        let vb = VarBuilder::from_tensors(weights, DType::F32, &device);
        let model = DistilBertModel::load(vb.clone(), &config)?;
        let qa_outputs = candle_nn::linear(head.dim, 2, vb.pp("qa_outputs"))?;
        tracing::info!("DistilBERT QA model loaded (dim={}, max_len={})", head.dim, max_len);
        Ok(Self { model, qa_outputs, tokenizer, device, max_len })
    }

    pub fn score(&self, question: &str, context: &str) -> Result<SpanScores> {
        let start = Instant::now();
        let (ids, input_ids) = encode_pair_on_device(&self.tokenizer, question, context, self.max_len, &self.device)?;
        let seq_len = ids.len();
        // Single unpadded sequence: nothing to mask.
        let attention_mask = Tensor::zeros((seq_len, seq_len), DType::U8, &self.device)?;
        let hidden = self.model.forward(&input_ids, &attention_mask)?;
        let logits = self.qa_outputs.forward(&hidden)?.squeeze(0)?.to_dtype(DType::F32)?;
        let logits = logits.to_device(&Device::Cpu)?.t()?.contiguous()?.to_vec2::<f32>()?;
        let [start_scores, end_scores]: [Vec<f32>; 2] = logits.try_into().map_err(|_| anyhow!("qa_outputs must produce two logit rows"))?;
        tracing::debug!("scored {} tokens in {:?}", seq_len, start.elapsed());
        Ok(SpanScores { tokens: ids, start_scores, end_scores })
    }

    pub fn detokenize(&self, tokens: &[TokenId]) -> Result<String> {
        // Special tokens are kept so a span covering [SEP] reads as it scores.
        self.tokenizer.decode(tokens, false).map_err(|e| anyhow!("Detokenization failed: {}", e))
    }
}

impl QaModel for DistilBertQa {
    fn score(&self, question: &str, context: &str) -> Result<SpanScores> { self.score(question, context) }
    fn detokenize(&self, tokens: &[TokenId]) -> Result<String> { self.detokenize(tokens) }
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<HashMap<String, Tensor>> {
    let safetensors_path = model_dir.join("model.safetensors");
    if safetensors_path.exists() {
        tracing::info!("Loading weights from {}", safetensors_path.display());
        return Ok(candle_core::safetensors::load(&safetensors_path, device)?);
    }
    let pickle_path = model_dir.join("pytorch_model.bin");
    tracing::info!("Loading weights from {}", pickle_path.display());
    let weights = candle_core::pickle::read_all(&pickle_path)
        .map_err(|e| anyhow!("Failed to read weights from {}: {}", pickle_path.display(), e))?;
    Ok(weights.into_iter().collect())
}

#[derive(Default)]
struct FakeVocab { words: Vec<String>, ids: HashMap<String, TokenId> }

impl FakeVocab {
    fn id(&mut self, word: &str) -> TokenId {
        if let Some(&id) = self.ids.get(word) { return id; }
        let id = self.words.len() as TokenId;
        self.words.push(word.to_string());
        self.ids.insert(word.to_string(), id);
        id
    }
}

/// Deterministic stand-in: whitespace tokens, scores from `XxHash64`.
///
/// Token ids index a vocabulary shared across calls and never cleared, so
/// ids from any earlier `score` still detokenize. The vocabulary grows with
/// every distinct word seen; keep instances short-lived.
#[derive(Default)]
pub struct FakeQaModel { vocab: Mutex<FakeVocab> }

impl FakeQaModel {
    pub fn new() -> Self { Self::default() }

    fn hash_score(word: &str, seed: u64) -> f32 {
        let mut hasher = XxHash64::with_seed(seed);
        word.hash(&mut hasher);
        ((hasher.finish() >> 32) as u32) as f32 / u32::MAX as f32
    }
}

impl QaModel for FakeQaModel {
    fn score(&self, question: &str, context: &str) -> Result<SpanScores> {
        let words: Vec<String> = std::iter::once("[CLS]")
            .chain(question.split_whitespace())
            .chain(std::iter::once("[SEP]"))
            .chain(context.split_whitespace())
            .chain(std::iter::once("[SEP]"))
            .map(str::to_lowercase)
            .collect();
        let mut vocab = self.vocab.lock().map_err(|_| anyhow!("fake vocabulary lock poisoned"))?;
        let tokens: Vec<TokenId> = words.iter().map(|w| vocab.id(w)).collect();
        let start_scores = words.iter().map(|w| Self::hash_score(w, 0)).collect();
        let end_scores = words.iter().map(|w| Self::hash_score(w, 1)).collect();
        Ok(SpanScores { tokens, start_scores, end_scores })
    }

    fn detokenize(&self, tokens: &[TokenId]) -> Result<String> {
        let vocab = self.vocab.lock().map_err(|_| anyhow!("fake vocabulary lock poisoned"))?;
        let words = tokens
            .iter()
            .map(|&t| vocab.words.get(t as usize).map(String::as_str).ok_or_else(|| anyhow!("unknown token id {}", t)))
            .collect::<Result<Vec<_>>>()?;
        Ok(words.join(" "))
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).ok().map(|v| v == "1" || v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

/// Build the configured model. `APP_USE_FAKE_MODEL=1` or `model.use_fake`
/// selects the fake.
pub fn get_default_model(settings: &ModelSettings) -> Result<Box<dyn QaModel>> {
    if settings.use_fake || env_flag("APP_USE_FAKE_MODEL") { tracing::info!("Using FakeQaModel"); return Ok(Box::new(FakeQaModel::new())); }
    let dir = resolve_model_dir(&settings.dir)?;
    Ok(Box::new(DistilBertQa::new(&dir, settings.max_len, &settings.device)?))
}

/// Model directory lookup: configured dir, `APP_MODEL_DIR`, `MODEL_DIR`,
/// then `models/<name>` and `../models/<name>`.
pub fn resolve_model_dir(configured: &str) -> Result<PathBuf> {
    if !configured.is_empty() {
        let p = expand_path(configured);
        if p.exists() { tracing::info!("Using configured model dir: {}", p.display()); return Ok(p); }
        tracing::warn!("Configured model dir {} does not exist", p.display());
    }
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) { let p = expand_path(&dir); if p.exists() { tracing::info!("Using {}: {}", var, p.display()); return Ok(p); } }
    }
    for candidate in [Path::new("models").join(DEFAULT_MODEL_NAME), Path::new("../models").join(DEFAULT_MODEL_NAME)] {
        if candidate.exists() { tracing::info!("Using model dir: {}", candidate.display()); return Ok(candidate); }
    }
    Err(anyhow!("Could not locate {} model directory", DEFAULT_MODEL_NAME))
}
