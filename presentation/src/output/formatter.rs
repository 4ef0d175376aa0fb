//! Output formatter trait

use think_tank_application::ThinkTankReport;

/// Trait for formatting think tank reports
pub trait OutputFormatter {
    /// Format the complete report with every persona output
    fn format(&self, report: &ThinkTankReport) -> String;

    /// Format as JSON
    fn format_json(&self, report: &ThinkTankReport) -> String;

    /// Format the final report only (concise output)
    fn format_synthesis_only(&self, report: &ThinkTankReport) -> String;
}
