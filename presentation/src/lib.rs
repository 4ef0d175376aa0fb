//! Presentation layer for think-tank
//!
//! This crate contains the CLI definition, output formatters,
//! progress reporters and the interactive clarification responder.

pub mod clarification;
pub mod cli;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use clarification::InteractiveClarification;
pub use cli::commands::{AskArgs, Cli, Command, EmailArgs, OutputFormat, PublishArgs, SessionsArgs};
pub use output::console::ConsoleFormatter;
pub use output::formatter::OutputFormatter;
pub use progress::reporter::{ProgressReporter, SimpleProgress};
