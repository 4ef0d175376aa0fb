//! Clarification questions and the refined problem statement.
//!
//! The clarification persona answers with a numbered (or bulleted) list of
//! questions. [`parse_questions`] extracts them; once the user has answered,
//! [`compose_refined_request`] folds request, questions and answers into the
//! problem statement handed to the facilitator.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\d+[.)]|[-*•])\s+(.+)$").expect("list item pattern is valid")
});

/// One question with the user's answer, if any
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClarificationExchange {
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

impl ClarificationExchange {
    pub fn is_answered(&self) -> bool {
        !self.answer.trim().is_empty()
    }
}

/// Extract the questions from the clarification persona's output.
///
/// List items (`1.`, `2)`, `-`, `*`) are preferred; when the output has none,
/// every non-empty line counts as a question.
pub fn parse_questions(output: &str) -> Vec<String> {
    let items: Vec<String> = output
        .lines()
        .filter_map(|line| LIST_ITEM.captures(line))
        .map(|caps| clean(&caps[1]))
        .filter(|q| !q.is_empty())
        .collect();
    if !items.is_empty() {
        return items;
    }

    output
        .lines()
        .map(clean)
        .filter(|line| !line.is_empty())
        .collect()
}

fn clean(text: &str) -> String {
    text.trim().trim_matches('*').trim().to_string()
}

/// Pair questions with answers by position; missing answers stay empty.
pub fn pair_answers(questions: &[String], answers: &[String]) -> Vec<ClarificationExchange> {
    questions
        .iter()
        .enumerate()
        .map(|(i, question)| ClarificationExchange {
            question: question.clone(),
            answer: answers.get(i).map(|a| a.trim().to_string()).unwrap_or_default(),
        })
        .collect()
}

/// Build the refined problem statement from the original request and answers.
///
/// Unanswered questions are left out. Without any answers the request is
/// returned unchanged.
pub fn compose_refined_request(request: &str, exchanges: &[ClarificationExchange]) -> String {
    let answered: Vec<&ClarificationExchange> =
        exchanges.iter().filter(|e| e.is_answered()).collect();
    if answered.is_empty() {
        return request.trim().to_string();
    }

    let mut refined = String::new();
    refined.push_str("## Problem\n\n");
    refined.push_str(request.trim());
    refined.push_str("\n\n## Additional context from the user\n");
    for exchange in answered {
        refined.push_str(&format!(
            "\n- Q: {}\n  A: {}",
            exchange.question, exchange.answer
        ));
    }
    refined.push('\n');
    refined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numbered_questions() {
        let output = "Here are my questions:\n\n1. What is the time horizon?\n2) Who are the stakeholders?\n3. **What does success look like?**\n";
        let questions = parse_questions(output);
        assert_eq!(
            questions,
            vec![
                "What is the time horizon?",
                "Who are the stakeholders?",
                "What does success look like?",
            ]
        );
    }

    #[test]
    fn test_parse_bulleted_questions() {
        let questions = parse_questions("- Budget?\n* Team size?");
        assert_eq!(questions, vec!["Budget?", "Team size?"]);
    }

    #[test]
    fn test_parse_falls_back_to_lines() {
        let questions = parse_questions("What budget?\n\nWhich markets?\n");
        assert_eq!(questions, vec!["What budget?", "Which markets?"]);
    }

    #[test]
    fn test_pair_answers_pads_missing() {
        let questions = vec!["Q1".to_string(), "Q2".to_string()];
        let exchanges = pair_answers(&questions, &[" yes ".to_string()]);
        assert_eq!(exchanges[0].answer, "yes");
        assert!(!exchanges[1].is_answered());
    }

    #[test]
    fn test_compose_refined_request_includes_answered_only() {
        let exchanges = vec![
            ClarificationExchange {
                question: "Time horizon?".to_string(),
                answer: "12 months".to_string(),
            },
            ClarificationExchange {
                question: "Budget?".to_string(),
                answer: String::new(),
            },
        ];
        let refined = compose_refined_request("Grow the team", &exchanges);
        assert!(refined.contains("Grow the team"));
        assert!(refined.contains("Q: Time horizon?"));
        assert!(refined.contains("A: 12 months"));
        assert!(!refined.contains("Budget?"));
    }

    #[test]
    fn test_compose_without_answers_returns_request() {
        assert_eq!(compose_refined_request("  Grow  ", &[]), "Grow");
    }
}
