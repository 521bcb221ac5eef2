use crate::types::{SpanScores, TokenId};

/// Extractive question-answering capability.
///
/// Implementations own their tokenizer and weights; they are built once and
/// handed to the resolver, which only borrows them per call.
pub trait QaModel: Send + Sync {
    /// Tokenize `(question, context)` and return per-token start/end scores.
    fn score(&self, question: &str, context: &str) -> anyhow::Result<SpanScores>;
    /// Convert a token sub-sequence back into text.
    fn detokenize(&self, tokens: &[TokenId]) -> anyhow::Result<String>;
}

impl<M: QaModel + ?Sized> QaModel for Box<M> {
    fn score(&self, question: &str, context: &str) -> anyhow::Result<SpanScores> {
        (**self).score(question, context)
    }

    fn detokenize(&self, tokens: &[TokenId]) -> anyhow::Result<String> {
        (**self).detokenize(tokens)
    }
}
