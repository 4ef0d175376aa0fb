//! Ports (interfaces) for external adapters
//!
//! These traits define the boundaries between the application layer
//! and infrastructure/presentation layers.

pub mod artifact_store;
pub mod clarification;
pub mod completion;
pub mod conversation_logger;
pub mod document_renderer;
pub mod progress;
pub mod session_store;
pub mod tool_handler;
