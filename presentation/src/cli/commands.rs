//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for run results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every persona output followed by the final report
    Full,
    /// Only the final response
    Synthesis,
    /// JSON output
    Json,
}

impl From<OutputFormat> for think_tank_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => think_tank_domain::OutputFormat::Full,
            OutputFormat::Synthesis => think_tank_domain::OutputFormat::Synthesis,
            OutputFormat::Json => think_tank_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for think-tank
#[derive(Parser, Debug)]
#[command(name = "think-tank")]
#[command(author, version, about = "Multi-persona think tank over a hosted LLM")]
#[command(long_about = r#"
Think Tank runs a panel of specialist personas on a business request and
synthesizes their analyses into one executive report.

A run has three steps:
1. Clarification: a few questions about gaps in the request
2. Analysis: the personas answer in parallel, each into its own state key
3. Synthesis: one report built from every persona output

Configuration files are loaded from (in priority order):
1. --config <path>        Explicit config file
2. ./think-tank.toml      Project-level config
3. ~/.config/think-tank/config.toml   Global config

Example:
  think-tank ask "How should we roll out AI assistants to our support team?"
  think-tank ask --no-clarify -o full "Plan a four-day work week pilot"
  think-tank email "Thank jessica@oldin.se for the workshop"
  think-tank publish report.md --filename q3_report.pdf
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output format (overrides [output].format)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask the think tank for a multi-perspective report
    Ask(AskArgs),
    /// Write an email with the structured email writer
    Email(EmailArgs),
    /// Render a markdown file and publish it to the output directory
    Publish(PublishArgs),
    /// List, show or delete stored sessions
    Sessions(SessionsArgs),
}

#[derive(Args, Debug)]
pub struct AskArgs {
    /// The request to analyze
    pub request: String,

    /// Answer clarification questions from a file (one answer per line)
    #[arg(long, value_name = "PATH", conflicts_with = "no_clarify")]
    pub answers_file: Option<PathBuf>,

    /// Skip the clarification questions
    #[arg(long)]
    pub no_clarify: bool,

    /// Also render the final report and publish it
    #[arg(long)]
    pub publish: bool,
}

#[derive(Args, Debug)]
pub struct EmailArgs {
    /// What the email should say, including the recipient
    pub request: String,
}

#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Markdown file to publish
    pub input: PathBuf,

    /// Name of the published file (default published_report.pdf)
    #[arg(long, value_name = "NAME")]
    pub filename: Option<String>,

    /// Let the content publisher agent drive the tools
    #[arg(long)]
    pub agent: bool,
}

#[derive(Args, Debug)]
pub struct SessionsArgs {
    /// Print the events of one session
    #[arg(long, value_name = "SESSION_ID", conflicts_with = "delete")]
    pub show: Option<String>,

    /// Delete one session
    #[arg(long, value_name = "SESSION_ID")]
    pub delete: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask_with_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "think-tank",
            "ask",
            "--no-clarify",
            "Plan a pilot",
            "-vv",
            "-o",
            "json",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.output, Some(OutputFormat::Json));
        match cli.command {
            Some(Command::Ask(args)) => {
                assert_eq!(args.request, "Plan a pilot");
                assert!(args.no_clarify);
                assert!(args.answers_file.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_answers_file_conflicts_with_no_clarify() {
        let result = Cli::try_parse_from([
            "think-tank",
            "ask",
            "--no-clarify",
            "--answers-file",
            "a.txt",
            "x",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_publish_and_sessions() {
        let cli = Cli::parse_from(["think-tank", "publish", "r.md", "--filename", "out.pdf"]);
        assert!(matches!(
            cli.command,
            Some(Command::Publish(PublishArgs { ref filename, agent: false, .. }))
                if filename.as_deref() == Some("out.pdf")
        ));

        let cli = Cli::parse_from(["think-tank", "sessions", "--show", "abc"]);
        assert!(matches!(
            cli.command,
            Some(Command::Sessions(SessionsArgs { ref show, .. })) if show.as_deref() == Some("abc")
        ));
    }

    #[test]
    fn test_show_config_without_subcommand() {
        let cli = Cli::parse_from(["think-tank", "--show-config"]);
        assert!(cli.show_config);
        assert!(cli.command.is_none());
    }
}
