//! Console output formatter for run results

use crate::output::formatter::OutputFormatter;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde_json::json;
use std::path::Path;
use think_tank_application::{RunAgentOutput, SessionSummary, ThinkTankReport};
use think_tank_domain::{ArtifactRef, EmailContent, RunEvent, Session, ThinkTankPersona};

/// Formats run results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Turn colored output off, e.g. for `[output] color = false`
    pub fn set_color(enabled: bool) {
        if !enabled {
            colored::control::set_override(false);
        }
    }

    /// Format the complete think tank report
    pub fn format(report: &ThinkTankReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Think Tank Report"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Session:".cyan().bold(),
            report.session
        ));

        if !report.exchanges.is_empty() {
            output.push_str(&Self::section_header("Clarifications"));
            for exchange in &report.exchanges {
                let answer = if exchange.answer.trim().is_empty() {
                    "(no answer)".dimmed().to_string()
                } else {
                    exchange.answer.clone()
                };
                output.push_str(&format!("\n{} {}\n  {}\n", "Q:".bold(), exchange.question, answer));
            }
        }

        output.push_str(&Self::section_header("Persona Analyses"));
        for (persona, content) in &report.persona_outputs {
            output.push_str(&format!(
                "\n{}\n{}\n",
                format!("── {} ──", Self::persona_title(persona)).yellow().bold(),
                content
            ));
        }

        for group in &report.groups {
            for failure in &group.failures {
                output.push_str(&format!(
                    "\n{}\nError: {}\n",
                    format!("── {} ──", Self::persona_title(&failure.member)).red().bold(),
                    failure.error
                ));
            }
        }

        output.push_str(&Self::section_header("Final Report"));
        if report.is_partial() {
            output.push_str(&format!(
                "{}\n",
                "Some personas failed; the report is based on partial input."
                    .yellow()
            ));
        }
        output.push_str(&format!("\n{}\n", report.report));

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(report: &ThinkTankReport) -> String {
        let personas: serde_json::Map<String, serde_json::Value> = report
            .persona_outputs
            .iter()
            .map(|(persona, content)| (persona.clone(), json!(content)))
            .collect();
        let value = json!({
            "session": report.session,
            "refined_request": report.refined_request,
            "clarifications": report.exchanges,
            "personas": personas,
            "groups": report.groups,
            "final_report": report.report,
            "events": report.events,
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the final report only (concise output)
    pub fn format_synthesis_only(report: &ThinkTankReport) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{}\n\n",
            "=== Think Tank Conclusion ===".cyan().bold()
        ));
        let consulted: Vec<&str> = report
            .persona_outputs
            .iter()
            .map(|(persona, _)| Self::persona_title(persona))
            .collect();
        output.push_str(&format!(
            "{} {}\n\n",
            "Personas consulted:".dimmed(),
            consulted.join(", ")
        ));
        output.push_str(&report.report);
        output.push('\n');
        output
    }

    /// Format the questions asked before the personas run
    pub fn format_questions(questions: &[String]) -> String {
        let mut output = Self::section_header("Clarification Questions");
        for (i, question) in questions.iter().enumerate() {
            output.push_str(&format!("  {}. {}\n", i + 1, question));
        }
        output
    }

    /// Format the structured email writer result
    pub fn format_email(email: &EmailContent) -> String {
        let mut output = String::new();
        output.push_str(&format!("{} {}\n", "Date:".cyan().bold(), email.date));
        output.push_str(&format!("{} {}\n", "From:".cyan().bold(), email.from_address));
        output.push_str(&format!("{} {}\n", "To:".cyan().bold(), email.to_address));
        output.push_str(&format!("{} {}\n", "Subject:".cyan().bold(), email.subject));
        output.push_str(&format!("\n{}\n", email.body));
        output
    }

    /// Format a single-agent run in JSON
    pub fn format_run_json(run: &RunAgentOutput) -> String {
        let value = json!({
            "session": run.session,
            "outcome": run.outcome,
            "final_response": run.final_response,
            "events": run.events,
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }

    /// One line for a published artifact
    pub fn format_published(reference: &ArtifactRef, path: &Path) -> String {
        format!(
            "{} {} -> {}\n",
            "Published".green().bold(),
            reference,
            path.display()
        )
    }

    pub fn format_sessions(sessions: &[SessionSummary]) -> String {
        if sessions.is_empty() {
            return format!("{}\n", "No sessions stored.".dimmed());
        }
        let mut output = format!(
            "{:<38} {:<20} {}\n",
            "SESSION".bold(),
            "UPDATED".bold(),
            "EVENTS".bold()
        );
        for summary in sessions {
            output.push_str(&format!(
                "{:<38} {:<20} {}\n",
                summary.key.session_id,
                Self::timestamp(summary.last_update_ms),
                summary.event_count
            ));
        }
        output
    }

    /// Every recorded event of a session, one per line
    pub fn format_session(session: &Session) -> String {
        let mut output = Self::header(&format!("Session {}", session.id()));
        output.push('\n');
        output.push_str(&format!(
            "{} {}\n\n",
            "Updated:".cyan().bold(),
            Self::timestamp(session.last_update_ms)
        ));
        for event in &session.events {
            output.push_str(&Self::format_event(event));
            output.push('\n');
        }
        output
    }

    /// One-line rendering of a run event
    pub fn format_event(event: &RunEvent) -> String {
        match event {
            RunEvent::UserMessage { content } => {
                format!("{} {}", "user>".magenta().bold(), Self::first_line(content))
            }
            RunEvent::StageStarted { stage, kind } => {
                format!("{} {} ({})", "->".cyan(), stage.bold(), kind.as_str())
            }
            RunEvent::AgentResponse { author, content } => format!(
                "  {} {} {}",
                "v".green(),
                author,
                format!("({} chars)", content.chars().count()).dimmed()
            ),
            RunEvent::StateDelta { author, key } => {
                format!("  {} {} wrote {}", "=".dimmed(), author.dimmed(), key.dimmed())
            }
            RunEvent::ToolCall { author, tool, .. } => {
                format!("  {} {} calls {}", "*".yellow(), author, tool.yellow())
            }
            RunEvent::ToolResult { tool, payload, .. } => {
                let status = payload
                    .get("status")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("unknown");
                let status = if status == "success" {
                    status.green()
                } else {
                    status.red()
                };
                format!("  {} {} {}", "*".yellow(), tool, status)
            }
            RunEvent::ClarificationRequested { questions } => format!(
                "{} {} clarification question(s)",
                "?".cyan().bold(),
                questions.len()
            ),
            RunEvent::MemberFailed { member, error } => {
                format!("  {} {} {}", "x".red(), member, error.red())
            }
            RunEvent::FinalResponse { author, content } => format!(
                "{} {}: {}",
                "final>".green().bold(),
                author,
                Self::first_line(content)
            ),
        }
    }

    fn persona_title(id: &str) -> &str {
        id.parse::<ThinkTankPersona>()
            .map(|persona| persona.display_name())
            .unwrap_or(id)
    }

    fn first_line(text: &str) -> String {
        let line = text.lines().next().unwrap_or("");
        if line.chars().count() > 80 {
            format!("{}...", line.chars().take(77).collect::<String>())
        } else {
            line.to_string()
        }
    }

    fn timestamp(epoch_ms: i64) -> String {
        DateTime::<Utc>::from_timestamp_millis(epoch_ms)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| epoch_ms.to_string())
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, report: &ThinkTankReport) -> String {
        Self::format(report)
    }

    fn format_json(&self, report: &ThinkTankReport) -> String {
        Self::format_json(report)
    }

    fn format_synthesis_only(&self, report: &ThinkTankReport) -> String {
        Self::format_synthesis_only(report)
    }
}
