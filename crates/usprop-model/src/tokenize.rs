use anyhow::{Result, anyhow};
use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

/// Encode `[CLS] question [SEP] context [SEP]` and cut it to `max_len` ids.
/// Returns the ids alongside a `(1, T)` input tensor.
pub fn encode_pair_on_device(tokenizer: &Tokenizer, question: &str, context: &str, max_len: usize, device: &Device) -> Result<(Vec<u32>, Tensor)> {
    let enc = tokenizer.encode((question, context), true).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
    let mut ids = enc.get_ids().to_vec();
    if ids.len() > max_len { tracing::warn!("input of {} tokens truncated to {}", ids.len(), max_len); ids.truncate(max_len); }
    if ids.is_empty() { return Err(anyhow!("Tokenizer produced no tokens")); }
    let input_ids = Tensor::new(ids.as_slice(), device)?.unsqueeze(0)?;
    Ok((ids, input_ids))
}
