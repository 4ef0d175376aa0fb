//! Progress notification port
//!
//! Defines the interface for reporting progress while a stage tree runs.

use think_tank_domain::{RunEvent, StageKind};

/// Callback for progress updates during a run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (spinners, plain lines, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called when a stage starts; `personas` is the number of personas it runs
    fn on_stage_start(&self, stage: &str, kind: StageKind, personas: usize);

    /// Called when a persona finishes, successfully or not
    fn on_persona_complete(&self, persona: &str, success: bool);

    /// Called when a stage completes
    fn on_stage_complete(&self, stage: &str, kind: StageKind);

    /// Called for every recorded run event
    fn on_event(&self, _event: &RunEvent) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_stage_start(&self, _stage: &str, _kind: StageKind, _personas: usize) {}
    fn on_persona_complete(&self, _persona: &str, _success: bool) {}
    fn on_stage_complete(&self, _stage: &str, _kind: StageKind) {}
}
