//! Interactive clarification over stdin.
//!
//! The Root Coordinator suspends after asking its questions; this responder
//! prints them and reads one answer per question:
//!
//! ```text
//! Clarification Questions
//! ----------------------------------------
//!   1. How many employees are affected?
//!   2. What is the timeline?
//!
//! Answer each question (empty line to skip, /skip to skip the rest).
//!
//! [1/2] How many employees are affected?
//! answer> about 40
//! ```

use crate::output::console::ConsoleFormatter;
use async_trait::async_trait;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use think_tank_application::{ClarificationError, ClarificationResponder};

/// Terminal-based [`ClarificationResponder`]
///
/// The read runs on a blocking thread. When the run is cancelled the
/// coordinator stops waiting and the thread is abandoned.
pub struct InteractiveClarification;

impl InteractiveClarification {
    pub fn new() -> Self {
        Self
    }

    /// Collect answers from `input`, echoing prompts to `output`
    fn collect<R: BufRead, W: Write>(
        questions: &[String],
        mut input: R,
        mut output: W,
    ) -> Result<Vec<String>, ClarificationError> {
        let io_error = |e: io::Error| ClarificationError::IoError(e.to_string());

        write!(output, "{}", ConsoleFormatter::format_questions(questions)).map_err(io_error)?;
        writeln!(
            output,
            "\nAnswer each question (empty line to skip, /skip to skip the rest, /quit to abort).\n"
        )
        .map_err(io_error)?;

        let mut answers = Vec::with_capacity(questions.len());
        for (i, question) in questions.iter().enumerate() {
            writeln!(
                output,
                "{} {}",
                format!("[{}/{}]", i + 1, questions.len()).dimmed(),
                question.bold()
            )
            .map_err(io_error)?;
            write!(output, "{} ", "answer>".magenta().bold()).map_err(io_error)?;
            output.flush().map_err(io_error)?;

            let mut line = String::new();
            if input.read_line(&mut line).map_err(io_error)? == 0 {
                // EOF leaves the remaining questions unanswered
                break;
            }
            match line.trim() {
                "/skip" => break,
                "/quit" | "/q" => return Err(ClarificationError::Cancelled),
                answer => answers.push(answer.to_string()),
            }
        }
        writeln!(output).map_err(io_error)?;
        Ok(answers)
    }
}

impl Default for InteractiveClarification {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClarificationResponder for InteractiveClarification {
    async fn answer(&self, questions: &[String]) -> Result<Vec<String>, ClarificationError> {
        let questions = questions.to_vec();
        tokio::task::spawn_blocking(move || {
            Self::collect(&questions, io::stdin().lock(), io::stdout())
        })
        .await
        .map_err(|e| ClarificationError::IoError(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions() -> Vec<String> {
        vec!["How many?".to_string(), "When?".to_string(), "Why?".to_string()]
    }

    #[test]
    fn test_answers_in_order_with_blank_skip() {
        let answers =
            InteractiveClarification::collect(&questions(), "40\n\nGrowth\n".as_bytes(), Vec::new())
                .unwrap();
        assert_eq!(answers, vec!["40", "", "Growth"]);
    }

    #[test]
    fn test_skip_and_eof_stop_early() {
        let answers =
            InteractiveClarification::collect(&questions(), "40\n/skip\n".as_bytes(), Vec::new())
                .unwrap();
        assert_eq!(answers, vec!["40"]);

        let answers =
            InteractiveClarification::collect(&questions(), "only one\n".as_bytes(), Vec::new())
                .unwrap();
        assert_eq!(answers, vec!["only one"]);
    }

    #[test]
    fn test_quit_cancels() {
        let result = InteractiveClarification::collect(&questions(), "/quit\n".as_bytes(), Vec::new());
        assert_eq!(result, Err(ClarificationError::Cancelled));
    }

    #[test]
    fn test_prompt_lists_questions() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        InteractiveClarification::collect(&questions(), "".as_bytes(), &mut out).unwrap();
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("1. How many?"));
        assert!(printed.contains("3. Why?"));
    }
}
