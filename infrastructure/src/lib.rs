//! Infrastructure layer for think-tank
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod artifact;
pub mod config;
pub mod gemini;
pub mod logging;
pub mod render;
pub mod session;

// Re-export commonly used types
pub use artifact::InMemoryArtifactStore;
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileGeminiConfig, FileLoggingConfig,
    FileModelConfig, FileOrchestrationConfig, FileOutputConfig, FilePublisherConfig,
    FileSessionConfig, FileUserConfig, RendererKind, SessionBackend,
};
pub use gemini::GeminiCompletionService;
pub use logging::JsonlConversationLogger;
pub use render::{HtmlRenderer, StyledDocument, WeasyPrintRenderer, renderer_for};
pub use session::{ConfiguredSessionStore, InMemorySessionStore, SqliteSessionStore};
