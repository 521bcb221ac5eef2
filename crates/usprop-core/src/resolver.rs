use crate::error::Result;
use crate::qa_table::QaTable;
use crate::span::{render, select_span};
use crate::traits::QaModel;
use crate::types::{Answer, AnswerSource};

/// Context handed to the model when a question has no curated answer.
/// There is no passage retrieval, so this is fixed text.
pub const PLACEHOLDER_CONTEXT: &str =
    "This is a placeholder context as the model requires some context to generate an answer.";

/// Two-tier answer lookup: verbatim match against the known table first,
/// then span extraction over the model's scores.
pub struct AnswerResolver<M: QaModel> {
    known: QaTable,
    model: M,
    context: String,
}

impl<M: QaModel> AnswerResolver<M> {
    pub fn new(known: QaTable, model: M) -> Self {
        Self::with_context(known, model, PLACEHOLDER_CONTEXT)
    }

    pub fn with_context(known: QaTable, model: M, context: impl Into<String>) -> Self {
        Self { known, model, context: context.into() }
    }

    pub fn model(&self) -> &M { &self.model }

    pub fn resolve(&self, question: &str) -> Result<String> {
        self.resolve_with_source(question).map(|a| a.text)
    }

    pub fn resolve_with_source(&self, question: &str) -> Result<Answer> {
        // Verbatim: no normalization at this tier.
        if let Some(answer) = self.known.get(question) {
            tracing::debug!("exact match for {:?}", question);
            return Ok(Answer { text: answer.to_string(), source: AnswerSource::Known });
        }
        let scores = self.model.score(question, &self.context)?;
        let span = select_span(&scores.start_scores, &scores.end_scores)?;
        tracing::debug!(
            start = span.start_index,
            end = span.end_index_exclusive,
            tokens = scores.tokens.len(),
            degenerate = span.is_degenerate(),
            "model span selected"
        );
        let text = render(&scores.tokens, span, |ids| self.model.detokenize(ids))?;
        Ok(Answer { text, source: AnswerSource::Model })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::{SpanScores, TokenId};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Scripted {
        scores: SpanScores,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(start: Vec<f32>, end: Vec<f32>) -> Self {
            let tokens = (0..start.len().max(end.len()) as TokenId).collect();
            Self { scores: SpanScores { tokens, start_scores: start, end_scores: end }, calls: AtomicUsize::new(0) }
        }
    }

    impl QaModel for Scripted {
        fn score(&self, _question: &str, context: &str) -> anyhow::Result<SpanScores> {
            assert_eq!(context, PLACEHOLDER_CONTEXT);
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.scores.clone())
        }

        fn detokenize(&self, tokens: &[TokenId]) -> anyhow::Result<String> {
            Ok(tokens.iter().map(|t| format!("w{t}")).collect::<Vec<_>>().join(" "))
        }
    }

    fn known() -> QaTable {
        QaTable::from_pairs([("What is AUTOVAL?", "AUTOVAL is an automated valuation model.")])
    }

    #[test]
    fn exact_match_skips_model() {
        let r = AnswerResolver::new(known(), Scripted::new(vec![1.0], vec![1.0]));
        let a = r.resolve_with_source("What is AUTOVAL?").unwrap();
        assert_eq!(a.text, "AUTOVAL is an automated valuation model.");
        assert_eq!(a.source, AnswerSource::Known);
        assert_eq!(r.model().calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn near_miss_goes_to_model() {
        let r = AnswerResolver::new(known(), Scripted::new(vec![0.1, 0.9, 0.2], vec![0.05, 0.1, 0.8]));
        let a = r.resolve_with_source("what is autoval?").unwrap();
        assert_eq!(a.text, "w1 w2");
        assert_eq!(a.source, AnswerSource::Model);
        assert_eq!(r.model().calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn degenerate_model_span_is_empty_answer() {
        let r = AnswerResolver::new(known(), Scripted::new(vec![0.1, 0.2, 0.9], vec![0.8, 0.1, 0.3]));
        assert_eq!(r.resolve("anything").unwrap(), "");
    }

    #[test]
    fn malformed_scores_propagate() {
        let r = AnswerResolver::new(known(), Scripted::new(vec![0.1, 0.2], vec![0.3]));
        assert!(matches!(r.resolve("anything"), Err(Error::InvalidScoreVector { start_len: 2, end_len: 1 })));
    }
}
