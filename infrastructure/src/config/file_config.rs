//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use think_tank_application::RuntimeConfig;
use think_tank_domain::{
    AgentCatalog, FailurePolicy, Model, OutputFormat, SharedState, StateKey, ThinkTankPersona,
    keys,
};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("gemini.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("orchestration.max_concurrency cannot be 0")]
    InvalidConcurrency,

    #[error("orchestration.max_tool_rounds cannot be 0")]
    InvalidToolRounds,

    #[error("model name cannot be empty ({0})")]
    EmptyModelName(String),

    #[error("orchestration.roster cannot be empty")]
    EmptyRoster,
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Default model and per-agent overrides
    pub model: FileModelConfig,
    /// Gemini API settings
    pub gemini: FileGeminiConfig,
    /// Parallel group and tool loop settings
    pub orchestration: FileOrchestrationConfig,
    /// Session store settings
    pub session: FileSessionConfig,
    /// Facts about the user, seeded into every session
    pub user: FileUserConfig,
    /// Artifact publisher settings
    pub publisher: FilePublisherConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Log file and transcript settings
    pub logging: FileLoggingConfig,
}

/// Model selection from TOML (`[model]` section)
///
/// # Example
///
/// ```toml
/// [model]
/// default = "gemini-2.0-flash"
///
/// [model.overrides]
/// synthesizer = "gemini-2.5-pro"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    pub default: Model,
    /// Agent name → model
    pub overrides: BTreeMap<String, Model>,
}

impl FileModelConfig {
    /// Agent catalog carrying the configured overrides
    pub fn catalog(&self) -> AgentCatalog {
        AgentCatalog::new(self.overrides.clone())
    }
}

/// Gemini `generateContent` settings (`[gemini]` section)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGeminiConfig {
    pub base_url: String,
    /// API key; usually supplied through `GEMINI_API_KEY`
    pub api_key: Option<String>,
    /// OAuth access token for a Vertex AI `base_url`; takes precedence over `api_key`
    pub access_token: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for FileGeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: None,
            access_token: None,
            timeout_seconds: 120,
        }
    }
}

impl FileGeminiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Orchestration settings (`[orchestration]` section)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOrchestrationConfig {
    pub failure_policy: FailurePolicy,
    /// Upper bound on concurrently running parallel group members
    pub max_concurrency: usize,
    /// Upper bound on tool call rounds per persona invocation
    pub max_tool_rounds: usize,
    /// Active think tank personas, in report order
    pub roster: Vec<ThinkTankPersona>,
}

impl Default for FileOrchestrationConfig {
    fn default() -> Self {
        let runtime = RuntimeConfig::default();
        Self {
            failure_policy: runtime.failure_policy,
            max_concurrency: runtime.max_concurrency,
            max_tool_rounds: runtime.max_tool_rounds,
            roster: ThinkTankPersona::default_roster(),
        }
    }
}

/// Session store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    /// Sessions live only as long as the process
    #[default]
    Memory,
    /// Sessions are kept in a SQLite database
    Sqlite,
}

/// Session settings (`[session]` section)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionConfig {
    pub backend: SessionBackend,
    pub sqlite_path: PathBuf,
    pub app_name: String,
    pub user_id: String,
}

impl Default for FileSessionConfig {
    fn default() -> Self {
        Self {
            backend: SessionBackend::Memory,
            sqlite_path: PathBuf::from("./agent_data.db"),
            app_name: "think_tank".to_string(),
            user_id: "user".to_string(),
        }
    }
}

/// Facts about the user (`[user]` section)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileUserConfig {
    pub name: Option<String>,
    pub email: Option<String>,
    pub language: String,
    pub preferences: Option<String>,
}

impl Default for FileUserConfig {
    fn default() -> Self {
        Self {
            name: None,
            email: None,
            language: "English".to_string(),
            preferences: None,
        }
    }
}

impl FileUserConfig {
    /// Initial Shared State of a new session
    pub fn seed_state(&self, today: NaiveDate) -> SharedState {
        let mut state = SharedState::new();
        let mut seed = |key: &str, value: &str| {
            if let Ok(key) = StateKey::new(key) {
                state.insert(key, value);
            }
        };
        seed(keys::TODAYS_DATE, &today.format("%Y-%m-%d").to_string());
        seed(keys::USER_LANGUAGE, &self.language);
        if let Some(name) = &self.name {
            seed(keys::USER_NAME, name);
        }
        if let Some(email) = &self.email {
            seed(keys::USER_EMAIL, email);
        }
        if let Some(preferences) = &self.preferences {
            seed(keys::USER_PREFERENCES, preferences);
        }
        state
    }
}

/// Document renderer used by the artifact publisher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// PDF through the `weasyprint` command
    #[default]
    Weasyprint,
    /// Styled standalone HTML
    Html,
}

/// Artifact publisher settings (`[publisher]` section)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePublisherConfig {
    pub output_dir: PathBuf,
    pub renderer: RendererKind,
    /// Text in the page footer of rendered reports
    pub footer: String,
}

impl Default for FilePublisherConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./published"),
            renderer: RendererKind::Weasyprint,
            footer: "Company Confidential".to_string(),
        }
    }
}

/// Raw output configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Output format (uses domain type)
    pub format: Option<OutputFormat>,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
        }
    }
}

/// Logging settings (`[logging]` section)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL transcript of run events
    pub conversation_log: Option<PathBuf>,
    /// Directory for daily rolling diagnostic logs
    pub dir: Option<PathBuf>,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        // Timeout of 0 seconds doesn't make sense
        if self.gemini.timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if self.orchestration.max_concurrency == 0 {
            return Err(ConfigValidationError::InvalidConcurrency);
        }
        if self.orchestration.max_tool_rounds == 0 {
            return Err(ConfigValidationError::InvalidToolRounds);
        }
        if self.orchestration.roster.is_empty() {
            return Err(ConfigValidationError::EmptyRoster);
        }

        // Check for empty model names
        if self.model.default.as_str().trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName(
                "model.default".to_string(),
            ));
        }
        for (agent, model) in &self.model.overrides {
            if model.as_str().trim().is_empty() {
                return Err(ConfigValidationError::EmptyModelName(format!(
                    "model.overrides.{}",
                    agent
                )));
            }
        }

        Ok(())
    }

    /// Runtime settings handed to the use cases
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig::default()
            .with_default_model(self.model.default.clone())
            .with_failure_policy(self.orchestration.failure_policy)
            .with_max_concurrency(self.orchestration.max_concurrency)
            .with_max_tool_rounds(self.orchestration.max_tool_rounds)
    }
}
