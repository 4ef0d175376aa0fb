//! Gemini adapter for the completion service port

pub mod client;
pub mod protocol;

pub use client::GeminiCompletionService;
