//! Clarification responder port.
//!
//! The Root Coordinator suspends after the clarification stage and asks a
//! [`ClarificationResponder`] to answer the questions. The suspension holds
//! no lock on Shared State and may last arbitrarily long.
//!
//! # Built-in Implementations
//!
//! - [`CannedAnswers`] - Answers from a fixed list (answer files, tests)
//! - [`SkipClarification`] - Answers nothing
//!
//! For interactive use, see `InteractiveClarification` in the presentation layer.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClarificationError {
    #[error("Clarification cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    IoError(String),
}

#[async_trait]
pub trait ClarificationResponder: Send + Sync {
    /// Answer `questions` by position; an empty string leaves a question unanswered.
    async fn answer(&self, questions: &[String]) -> Result<Vec<String>, ClarificationError>;
}

/// Answers from a fixed list, in order
pub struct CannedAnswers {
    answers: Vec<String>,
}

impl CannedAnswers {
    pub fn new(answers: Vec<String>) -> Self {
        Self { answers }
    }
}

#[async_trait]
impl ClarificationResponder for CannedAnswers {
    async fn answer(&self, questions: &[String]) -> Result<Vec<String>, ClarificationError> {
        Ok(self.answers.iter().take(questions.len()).cloned().collect())
    }
}

/// Leaves every question unanswered
pub struct SkipClarification;

#[async_trait]
impl ClarificationResponder for SkipClarification {
    async fn answer(&self, _questions: &[String]) -> Result<Vec<String>, ClarificationError> {
        Ok(Vec::new())
    }
}
