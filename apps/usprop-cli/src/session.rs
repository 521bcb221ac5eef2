use std::io::{self, BufRead, Write};

use usprop_core::{AnswerResolver, QaModel};

const SEPARATOR_WIDTH: usize = 40;
const GREETING: &str = " **** Hello! Welcome to the Waivit Chatbot! Ready to explore the US property market? Let's get started! ****";
const SUBTITLE: &str = " -> -> -> -> -> Have AUTOVAL questions? I've got the answers you need. Let's get started! :) ";
const FAREWELL: &str = "Thank you for using the US property market Chatbot. Goodbye!";
const FOLLOW_UP: &str = "What else would you like to know about the US property market? I'm here to help!";
const TURN_FAILED: &str = "Sorry, I couldn't work out an answer to that one. Please try asking another way.";

/// Counts reported when a session ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    pub answered: usize,
    pub failed: usize,
}

/// Read-eval-print loop over any line source and sink.
pub struct ChatSession<'a, M: QaModel> {
    resolver: &'a AnswerResolver<M>,
}

impl<'a, M: QaModel> ChatSession<'a, M> {
    pub fn new(resolver: &'a AnswerResolver<M>) -> Self { Self { resolver } }

    /// Runs until `quit` (any case) or end of input.
    pub fn run<R: BufRead, W: Write>(&self, mut input: R, mut output: W) -> io::Result<SessionStats> {
        let separator = "-".repeat(SEPARATOR_WIDTH);
        let mut stats = SessionStats::default();
        writeln!(output, "{GREETING}")?;
        writeln!(output, "{SUBTITLE}")?;

        loop {
            writeln!(output, "{separator}")?;
            write!(output, "User: ")?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(output)?;
                writeln!(output, "{FAREWELL}")?;
                break;
            }
            writeln!(output)?;
            let question = line.trim_end_matches(['\r', '\n']);

            // Only the exact sentinel ends the session; every other line,
            // blank ones included, goes to the resolver.
            if question.eq_ignore_ascii_case("quit") {
                writeln!(output, "{FAREWELL}")?;
                break;
            }

            match self.resolver.resolve(question) {
                Ok(answer) => {
                    stats.answered += 1;
                    writeln!(output, "Chatbot: {answer}")?;
                }
                Err(e) => {
                    stats.failed += 1;
                    tracing::error!("Failed to answer {:?}: {}", question, e);
                    writeln!(output, "Chatbot: {TURN_FAILED}")?;
                }
            }
            writeln!(output)?;
            writeln!(output, "{separator}")?;
            writeln!(output, "{FOLLOW_UP}")?;
        }
        tracing::info!(answered = stats.answered, failed = stats.failed, "chat session ended");
        Ok(stats)
    }
}
