//! Document Renderer port
//!
//! Turns marked-up report text into a styled document (PDF or HTML).

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Renderer not available: {0}")]
    Unavailable(String),

    #[error("Conversion failed: {0}")]
    ConversionFailed(String),

    #[error("Input is empty")]
    EmptyInput,
}

/// A report to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    /// Document title, e.g. the file name without extension
    pub title: String,
    /// Markdown body
    pub markdown: String,
}

#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(&self, document: &ReportDocument) -> Result<Vec<u8>, RenderError>;

    /// MIME type of the rendered bytes
    fn mime_type(&self) -> &'static str;
}
