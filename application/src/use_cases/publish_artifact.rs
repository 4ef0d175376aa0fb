//! Publish Artifact use case
//!
//! `render` turns report markdown into a styled document saved as a
//! versioned artifact; `persist` writes a saved artifact to the output
//! directory. Both return errors as values, and [`PublisherTools`] turns
//! them into tool payloads for the content publisher persona.

use crate::ports::artifact_store::{ArtifactStore, ArtifactStoreError};
use crate::ports::document_renderer::{DocumentRenderer, RenderError, ReportDocument};
use crate::ports::tool_handler::ToolHandler;
use async_trait::async_trait;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use think_tank_domain::artifact::extension_for_mime;
use think_tank_domain::catalog::content_publisher::{
    DEFAULT_PUBLISH_FILENAME, DEFAULT_RENDER_FILENAME, markdown_to_pdf_tool, publish_pdf_tool,
};
use think_tank_domain::{ArtifactRef, MARKDOWN_TO_PDF, PUBLISH_PDF, ToolCall, ToolDefinition, ToolResponse};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Artifact not found: {0}")]
    NotFound(String),

    #[error("Failed to write {path}: {message}")]
    IoFailure { path: PathBuf, message: String },

    #[error("Artifact storage failed: {0}")]
    Storage(String),
}

impl From<RenderError> for PublishError {
    fn from(error: RenderError) -> Self {
        PublishError::Render(error.to_string())
    }
}

impl From<ArtifactStoreError> for PublishError {
    fn from(error: ArtifactStoreError) -> Self {
        PublishError::Storage(error.to_string())
    }
}

/// Renders reports and writes them to the output directory
pub struct ArtifactPublisher {
    renderer: Arc<dyn DocumentRenderer>,
    artifacts: Arc<dyn ArtifactStore>,
    output_dir: PathBuf,
}

impl ArtifactPublisher {
    pub fn new(
        renderer: Arc<dyn DocumentRenderer>,
        artifacts: Arc<dyn ArtifactStore>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            renderer,
            artifacts,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render `markdown` and save it under `user:{filename}`.
    ///
    /// Every call creates a new artifact version, even for identical text.
    pub async fn render(
        &self,
        markdown: &str,
        filename: Option<&str>,
    ) -> Result<ArtifactRef, PublishError> {
        if markdown.trim().is_empty() {
            return Err(RenderError::EmptyInput.into());
        }
        let filename = sanitize(
            filename,
            &default_name(DEFAULT_RENDER_FILENAME, self.renderer.mime_type()),
        );
        let document = ReportDocument {
            title: title_of(&filename),
            markdown: markdown.to_string(),
        };

        let bytes = self.renderer.render(&document).await?;
        debug!("Rendered {} ({} bytes)", filename, bytes.len());

        let reference = self
            .artifacts
            .save(
                &ArtifactRef::user_scoped(&filename),
                self.renderer.mime_type(),
                bytes,
            )
            .await?;
        info!("Saved artifact {}", reference);
        Ok(reference)
    }

    /// Write the bytes of `reference` to `{output_dir}/{filename}`.
    ///
    /// A reference without the `user:` scope also matches the scoped name.
    pub async fn persist(
        &self,
        reference: &ArtifactRef,
        filename: Option<&str>,
    ) -> Result<PathBuf, PublishError> {
        let mut artifact = self.artifacts.load(reference).await?;
        if artifact.is_none() && reference.file_name() == reference.name {
            let scoped = ArtifactRef {
                name: ArtifactRef::user_scoped(&reference.name),
                version: reference.version,
            };
            artifact = self.artifacts.load(&scoped).await?;
        }
        let artifact = artifact
            .filter(|artifact| !artifact.bytes.is_empty())
            .ok_or_else(|| PublishError::NotFound(reference.to_string()))?;

        let filename = sanitize(
            filename,
            &default_name(DEFAULT_PUBLISH_FILENAME, &artifact.mime_type),
        );
        let path = self.output_dir.join(&filename);
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| PublishError::IoFailure {
                path: self.output_dir.clone(),
                message: e.to_string(),
            })?;
        tokio::fs::write(&path, &artifact.bytes)
            .await
            .map_err(|e| PublishError::IoFailure {
                path: path.clone(),
                message: e.to_string(),
            })?;

        info!(
            "Published {} to {} ({} bytes)",
            artifact.reference,
            path.display(),
            artifact.bytes.len()
        );
        Ok(path)
    }
}

/// Plain file name, falling back to `default` for empty or path-only input
fn sanitize(filename: Option<&str>, default: &str) -> String {
    filename
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .and_then(|f| Path::new(f).file_name())
        .and_then(|f| f.to_str())
        .unwrap_or(default)
        .to_string()
}

/// `default` with its extension matched to the document's MIME type
fn default_name(default: &str, mime_type: &str) -> String {
    Path::new(default)
        .with_extension(extension_for_mime(mime_type))
        .to_string_lossy()
        .into_owned()
}

fn title_of(filename: &str) -> String {
    filename
        .strip_suffix(".pdf")
        .or_else(|| filename.strip_suffix(".html"))
        .unwrap_or(filename)
        .to_string()
}

/// Tool surface of the publisher: `markdown_to_pdf` and `publish_pdf`
pub struct PublisherTools {
    publisher: Arc<ArtifactPublisher>,
}

impl PublisherTools {
    pub fn new(publisher: Arc<ArtifactPublisher>) -> Self {
        Self { publisher }
    }

    async fn markdown_to_pdf(&self, call: &ToolCall) -> serde_json::Value {
        let markdown = match call.require_str("markdown_text") {
            Ok(markdown) => markdown,
            Err(message) => return error_payload(message),
        };
        match self
            .publisher
            .render(markdown, call.get_str("filename"))
            .await
        {
            Ok(reference) => json!({
                "status": "success",
                "message": format!("PDF saved as artifact '{}'", reference),
                "artifact_name": reference.to_string(),
            }),
            Err(error) => {
                warn!("{} failed: {}", MARKDOWN_TO_PDF, error);
                error_payload(error.to_string())
            }
        }
    }

    async fn publish_pdf(&self, call: &ToolCall) -> serde_json::Value {
        let reference = match call
            .require_str("pdf_artifact_name")
            .and_then(|name| name.parse::<ArtifactRef>())
        {
            Ok(reference) => reference,
            Err(message) => return error_payload(message),
        };
        match self
            .publisher
            .persist(&reference, call.get_str("filename"))
            .await
        {
            Ok(path) => json!({
                "status": "success",
                "message": format!("PDF published to {}", path.display()),
                "file_path": path.display().to_string(),
            }),
            Err(error) => {
                warn!("{} failed: {}", PUBLISH_PDF, error);
                error_payload(error.to_string())
            }
        }
    }
}

fn error_payload(message: impl Into<String>) -> serde_json::Value {
    json!({"status": "error", "message": message.into()})
}

#[async_trait]
impl ToolHandler for PublisherTools {
    fn definitions(&self) -> Vec<ToolDefinition> {
        vec![markdown_to_pdf_tool(), publish_pdf_tool()]
    }

    async fn call(&self, call: &ToolCall) -> ToolResponse {
        let payload = match call.name.as_str() {
            MARKDOWN_TO_PDF => self.markdown_to_pdf(call).await,
            PUBLISH_PDF => self.publish_pdf(call).await,
            other => error_payload(format!("Unknown tool '{}'", other)),
        };
        ToolResponse::new(call, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use crate::ports::completion::Completion;
    use crate::testing::{FakeArtifactStore, FakeRenderer, ScriptedCompletion};
    use crate::use_cases::invoke_persona::PersonaInvoker;
    use crate::use_cases::run_context::RunContext;
    use think_tank_domain::{AgentCatalog, SharedState};

    fn publisher(dir: &Path) -> Arc<ArtifactPublisher> {
        Arc::new(ArtifactPublisher::new(
            Arc::new(FakeRenderer),
            Arc::new(FakeArtifactStore::default()),
            dir.join("published"),
        ))
    }

    // ==================== Render / Persist ====================

    #[tokio::test]
    async fn test_persist_writes_rendered_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = publisher(dir.path());

        let reference = publisher.render("# Report\n\nBody", Some("q3.pdf")).await.unwrap();
        assert_eq!(reference.name, "user:q3.pdf");

        let path = publisher.persist(&reference, Some("final.pdf")).await.unwrap();
        let written = std::fs::read(&path).unwrap();
        let stored = publisher.artifacts.load(&reference).await.unwrap().unwrap();
        assert_eq!(written, stored.bytes);
        assert_eq!(path, dir.path().join("published").join("final.pdf"));
        assert!(String::from_utf8(written).unwrap().contains("q3\n"));
    }

    #[tokio::test]
    async fn test_render_twice_gives_distinct_references() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = publisher(dir.path());

        let first = publisher.render("same", None).await.unwrap();
        let second = publisher.render("same", None).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(first.name, "user:generated_report.pdf");
        let a = publisher.artifacts.load(&first).await.unwrap().unwrap();
        let b = publisher.artifacts.load(&second).await.unwrap().unwrap();
        assert_eq!(a.bytes, b.bytes);
    }

    #[tokio::test]
    async fn test_persist_unknown_reference_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = publisher(dir.path());

        let error = publisher
            .persist(&ArtifactRef::latest("user:missing.pdf"), None)
            .await
            .unwrap_err();

        assert!(matches!(error, PublishError::NotFound(_)));
        assert!(!dir.path().join("published").exists());
    }

    #[tokio::test]
    async fn test_render_failure_is_a_value() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = publisher(dir.path());

        assert!(matches!(
            publisher.render("<<broken>>", None).await,
            Err(PublishError::Render(_))
        ));
        assert!(matches!(
            publisher.render("   ", None).await,
            Err(PublishError::Render(_))
        ));
    }

    #[tokio::test]
    async fn test_filename_is_reduced_to_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = publisher(dir.path());
        let reference = publisher.render("text", None).await.unwrap();

        let path = publisher
            .persist(&reference, Some("../../etc/report.pdf"))
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("published").join("report.pdf"));
    }

    #[tokio::test]
    async fn test_persist_accepts_unscoped_name() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = publisher(dir.path());
        publisher.render("text", Some("plan.pdf")).await.unwrap();

        let path = publisher
            .persist(&ArtifactRef::latest("plan.pdf"), None)
            .await
            .unwrap();

        assert!(path.ends_with(DEFAULT_PUBLISH_FILENAME));
    }

    struct HtmlOnly;

    #[async_trait]
    impl DocumentRenderer for HtmlOnly {
        async fn render(&self, document: &ReportDocument) -> Result<Vec<u8>, RenderError> {
            Ok(format!("<html>{}</html>", document.markdown).into_bytes())
        }

        fn mime_type(&self) -> &'static str {
            think_tank_domain::artifact::HTML_MIME
        }
    }

    #[tokio::test]
    async fn test_html_documents_get_html_default_names() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = ArtifactPublisher::new(
            Arc::new(HtmlOnly),
            Arc::new(FakeArtifactStore::default()),
            dir.path().join("published"),
        );

        let reference = publisher.render("# Plan", None).await.unwrap();
        assert_eq!(reference.name, "user:generated_report.html");

        let path = publisher.persist(&reference, None).await.unwrap();
        assert_eq!(path, dir.path().join("published").join("published_report.html"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<html># Plan</html>");
    }

    // ==================== Tool Surface ====================

    #[tokio::test]
    async fn test_tools_report_errors_as_payloads() {
        let dir = tempfile::tempdir().unwrap();
        let tools = PublisherTools::new(publisher(dir.path()));

        let missing = tools
            .call(&ToolCall::new(PUBLISH_PDF).with_arg("pdf_artifact_name", "user:nope.pdf"))
            .await;
        assert!(missing.is_error());
        let no_args = tools.call(&ToolCall::new(MARKDOWN_TO_PDF)).await;
        assert!(no_args.is_error());
        let unknown = tools.call(&ToolCall::new("delete_everything")).await;
        assert!(unknown.is_error());
    }

    #[tokio::test]
    async fn test_content_publisher_drives_both_tools() {
        let dir = tempfile::tempdir().unwrap();
        let tools = Arc::new(PublisherTools::new(publisher(dir.path())));
        let completion = Arc::new(
            ScriptedCompletion::new()
                .push(
                    "content_publisher",
                    Ok(Completion::ToolCalls(vec![
                        ToolCall::new(MARKDOWN_TO_PDF)
                            .with_arg("markdown_text", "# Plan")
                            .with_arg("filename", "plan.pdf"),
                    ])),
                )
                .push(
                    "content_publisher",
                    Ok(Completion::ToolCalls(vec![
                        ToolCall::new(PUBLISH_PDF).with_arg("pdf_artifact_name", "user:plan.pdf@v1"),
                    ])),
                )
                .reply("content_publisher", "Published."),
        );
        let invoker = PersonaInvoker::new(Arc::clone(&completion), RuntimeConfig::default())
            .with_tools(tools);
        let persona = AgentCatalog::default().content_publisher().unwrap();

        let result = invoker
            .produce(&persona, &SharedState::new(), "Publish this", &RunContext::detached())
            .await
            .unwrap();

        assert_eq!(result.as_text(), "Published.");
        assert!(dir.path().join("published").join(DEFAULT_PUBLISH_FILENAME).exists());
    }
}
