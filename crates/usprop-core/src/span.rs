//! Extractive answer spans from per-token start/end scores.
//!
//! Start and end are picked independently (argmax each), so the end can
//! land before the start. Such a span is kept as-is and renders to an empty
//! answer.

use crate::error::{Error, Result};
use crate::types::{AnswerSpan, TokenId};

/// `start_index` = argmax of `start_scores`, `end_index_exclusive` =
/// argmax of `end_scores` + 1. Ties resolve to the first index.
pub fn select_span(start_scores: &[f32], end_scores: &[f32]) -> Result<AnswerSpan> {
    if start_scores.is_empty() || end_scores.is_empty() || start_scores.len() != end_scores.len() {
        return Err(Error::InvalidScoreVector { start_len: start_scores.len(), end_len: end_scores.len() });
    }
    let start = argmax(start_scores);
    let end = argmax(end_scores) + 1;
    Ok(AnswerSpan::new(start, end))
}

/// Detokenize the tokens covered by `span` and trim the result.
///
/// A degenerate span, or one that starts past the end of `tokens`, gives
/// `""` without calling `detokenize`.
pub fn render<F>(tokens: &[TokenId], span: AnswerSpan, detokenize: F) -> Result<String>
where
    F: FnOnce(&[TokenId]) -> anyhow::Result<String>,
{
    let end = span.end_index_exclusive.min(tokens.len());
    if span.is_degenerate() || span.start_index >= end {
        return Ok(String::new());
    }
    let text = detokenize(&tokens[span.start_index..end])?;
    Ok(text.trim().to_string())
}

// First maximum; NaN never compares greater, so it only survives at index 0
// until a real number shows up.
fn argmax(scores: &[f32]) -> usize {
    let mut best = 0;
    for (i, &s) in scores.iter().enumerate().skip(1) {
        if s > scores[best] || (scores[best].is_nan() && !s.is_nan()) {
            best = i;
        }
    }
    best
}
