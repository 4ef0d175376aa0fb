//! Progress reporting for think tank runs

use crate::output::console::ConsoleFormatter;
use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use think_tank_application::ProgressNotifier;
use think_tank_domain::{RunEvent, StageKind};

/// Reports progress with one bar per running stage
pub struct ProgressReporter {
    multi: MultiProgress,
    bars: Mutex<HashMap<String, ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
        }
    }

    fn group_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn println(&self, line: String) {
        // MultiProgress prints above the bars; fall back when hidden
        if self.multi.println(&line).is_err() {
            println!("{}", line);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_stage_start(&self, stage: &str, kind: StageKind, personas: usize) {
        let bar = match kind {
            StageKind::Parallel => {
                let bar = self.multi.add(ProgressBar::new(personas as u64));
                bar.set_style(Self::group_style());
                bar
            }
            StageKind::Persona => {
                let bar = self.multi.add(ProgressBar::new_spinner());
                bar.set_style(Self::spinner_style());
                bar.enable_steady_tick(Duration::from_millis(100));
                bar
            }
            // Pipelines show through their stages
            StageKind::Sequential => return,
        };
        bar.set_prefix(stage.to_string());
        bar.set_message("Starting...");
        self.bars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(stage.to_string(), bar);
    }

    fn on_persona_complete(&self, persona: &str, success: bool) {
        let bars = self.bars.lock().unwrap_or_else(PoisonError::into_inner);
        let status = if success {
            format!("{} {}", "v".green(), persona)
        } else {
            format!("{} {}", "x".red(), persona)
        };
        for bar in bars.values().filter(|bar| bar.length().is_some()) {
            bar.set_message(status.clone());
            bar.inc(1);
        }
    }

    fn on_stage_complete(&self, stage: &str, _kind: StageKind) {
        if let Some(bar) = self
            .bars
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(stage)
        {
            bar.finish_with_message(format!("{}", "done".green()));
        }
    }

    fn on_event(&self, event: &RunEvent) {
        match event {
            RunEvent::ToolCall { .. }
            | RunEvent::ToolResult { .. }
            | RunEvent::MemberFailed { .. } => self.println(ConsoleFormatter::format_event(event)),
            _ => {}
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_stage_start(&self, stage: &str, kind: StageKind, personas: usize) {
        if kind == StageKind::Parallel {
            println!(
                "{} {} ({} personas)",
                "->".cyan(),
                stage.bold(),
                personas
            );
        }
    }

    fn on_persona_complete(&self, persona: &str, success: bool) {
        if success {
            println!("  {} {}", "v".green(), persona);
        } else {
            println!("  {} {} (failed)", "x".red(), persona);
        }
    }

    fn on_stage_complete(&self, _stage: &str, kind: StageKind) {
        if kind == StageKind::Parallel {
            println!();
        }
    }

    fn on_event(&self, event: &RunEvent) {
        match event {
            RunEvent::StageStarted { .. }
            | RunEvent::AgentResponse { .. }
            | RunEvent::FinalResponse { .. } => {}
            _ => println!("{}", ConsoleFormatter::format_event(event)),
        }
    }
}
