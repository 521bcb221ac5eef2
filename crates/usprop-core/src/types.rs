//! Domain types shared by the data-preparation pipeline and the chatbot.

use serde::{Deserialize, Serialize};

/// Token identifier as produced by the model's tokenizer.
pub type TokenId = u32;

/// Task label written at the top of every dataset artifact.
pub const TASK_NAME: &str = "us_property_market_qa";

/// Keys every record must carry in the exchange format, in output order.
pub const REQUIRED_KEYS: [&str; 4] = ["question", "answer", "original_question", "original_answer"];

/// One cleaned question/answer pair.
///
/// - `question`/`answer`: normalized text
/// - `original_question`/`original_answer`: the text exactly as supplied
///
/// Field order here is the field order of the serialized artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaRecord {
    pub question: String,
    pub answer: String,
    pub original_question: String,
    pub original_answer: String,
}

/// The prepared dataset: a task label and its examples in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub task: String,
    pub examples: Vec<QaRecord>,
}

/// Output of the model capability for one (question, context) pair.
///
/// `start_scores` and `end_scores` are expected to be aligned 1:1 with
/// `tokens`; the span selector rejects them otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct SpanScores {
    pub tokens: Vec<TokenId>,
    pub start_scores: Vec<f32>,
    pub end_scores: Vec<f32>,
}

/// Half-open token range `[start_index, end_index_exclusive)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerSpan {
    pub start_index: usize,
    pub end_index_exclusive: usize,
}

impl AnswerSpan {
    pub fn new(start_index: usize, end_index_exclusive: usize) -> Self {
        Self { start_index, end_index_exclusive }
    }

    /// True when the span covers no tokens (end at or before start).
    pub fn is_degenerate(&self) -> bool {
        self.end_index_exclusive <= self.start_index
    }
}

/// Which tier produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerSource {
    Known,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub source: AnswerSource,
}

/// Outcome of structural validation. `reason()` is empty when valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid(String),
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validity::Valid)
    }

    pub fn reason(&self) -> &str {
        match self {
            Validity::Valid => "",
            Validity::Invalid(reason) => reason,
        }
    }
}
