use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};

use usprop_cli::session::SessionStats;
use usprop_cli::ChatSession;
use usprop_core::types::{SpanScores, TokenId};
use usprop_core::{AnswerResolver, QaModel, QaTable};
use usprop_model::FakeQaModel;

/// Fails on questions containing "broken", otherwise answers "hello world".
struct Flaky;

impl QaModel for Flaky {
    fn score(&self, question: &str, _context: &str) -> anyhow::Result<SpanScores> {
        if question.contains("broken") {
            return Ok(SpanScores { tokens: vec![1, 2], start_scores: vec![0.1, 0.2], end_scores: vec![0.3] });
        }
        Ok(SpanScores { tokens: vec![1, 2, 3], start_scores: vec![0.0, 0.9, 0.1], end_scores: vec![0.0, 0.1, 0.9] })
    }

    fn detokenize(&self, tokens: &[TokenId]) -> anyhow::Result<String> {
        Ok(tokens.iter().map(|t| if *t == 2 { "hello" } else { "world" }).collect::<Vec<_>>().join(" "))
    }
}

fn known() -> QaTable {
    QaTable::from_pairs([("What is AUTOVAL?", "AUTOVAL is an automated valuation model.")])
}

fn run<M: QaModel>(resolver: &AnswerResolver<M>, input: &str) -> (SessionStats, String) {
    let mut out = Vec::new();
    let stats = ChatSession::new(resolver).run(Cursor::new(input), &mut out).expect("session");
    (stats, String::from_utf8(out).expect("utf8"))
}

#[test]
fn quit_is_case_insensitive() {
    let resolver = AnswerResolver::new(known(), Flaky);
    let (stats, out) = run(&resolver, "QuIt\nWhat is AUTOVAL?\n");
    assert_eq!(stats, SessionStats::default());
    assert!(out.contains("Goodbye!"));
    assert!(!out.contains("Chatbot:"));
}

#[test]
fn known_question_is_answered_verbatim() {
    let resolver = AnswerResolver::new(known(), Flaky);
    let (stats, out) = run(&resolver, "What is AUTOVAL?\nquit\n");
    assert_eq!(stats.answered, 1);
    assert!(out.contains("Chatbot: AUTOVAL is an automated valuation model.\n"));
    assert!(out.contains("What else would you like to know"));
}

#[test]
fn failed_turn_does_not_end_session() {
    let resolver = AnswerResolver::new(known(), Flaky);
    let (stats, out) = run(&resolver, "this is broken\nanything else\nquit\n");
    assert_eq!(stats, SessionStats { answered: 1, failed: 1 });
    assert!(out.contains("Chatbot: Sorry"));
    assert!(out.contains("Chatbot: hello world\n"));
    assert!(out.ends_with("Goodbye!\n"));
}

#[test]
fn end_of_input_ends_session_and_blank_lines_are_resolved() {
    let resolver = AnswerResolver::new(known(), FakeQaModel::new());
    let (stats, out) = run(&resolver, "\n   \nWhat is AUTOVAL?");
    assert_eq!(stats.answered, 3);
    assert_eq!(out.matches("User: ").count(), 4);
    assert!(out.ends_with("Goodbye!\n"));
}

/// Counts every question that reaches the model.
#[derive(Default)]
struct Counting {
    calls: AtomicUsize,
}

impl QaModel for Counting {
    fn score(&self, _question: &str, _context: &str) -> anyhow::Result<SpanScores> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(SpanScores { tokens: vec![1], start_scores: vec![0.5], end_scores: vec![0.5] })
    }

    fn detokenize(&self, _tokens: &[TokenId]) -> anyhow::Result<String> {
        Ok("answer".to_string())
    }
}

#[test]
fn only_the_exact_sentinel_ends_the_session() {
    let resolver = AnswerResolver::new(known(), Counting::default());
    let (stats, out) = run(&resolver, "\n   \n  quit \nafter\nquit\nnever\n");
    assert_eq!(resolver.model().calls.load(Ordering::SeqCst), 4);
    assert_eq!(stats, SessionStats { answered: 4, failed: 0 });
    assert!(out.ends_with("Goodbye!\n"));
}
