//! Configuration file loading for think-tank
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment: `THINK_TANK_*` (with `__` nesting), `VERTEX_AI_MODEL`,
//!    `GEMINI_API_KEY`, `ARTIFACTS_DIR`
//! 2. `--config <path>` specified file
//! 3. Project root: `./think-tank.toml` or `./.think-tank.toml`
//! 4. Global: `$XDG_CONFIG_HOME/think-tank/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileGeminiConfig, FileLoggingConfig, FileModelConfig,
    FileOrchestrationConfig, FileOutputConfig, FilePublisherConfig, FileSessionConfig,
    FileUserConfig, RendererKind, SessionBackend,
};
pub use loader::ConfigLoader;
