//! PDF renderer driving the `weasyprint` executable
//!
//! The styled HTML document is piped to `weasyprint - -` and the PDF is
//! read back from stdout.

use super::document::StyledDocument;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use think_tank_application::ports::document_renderer::{
    DocumentRenderer, RenderError, ReportDocument,
};
use think_tank_domain::artifact::PDF_MIME;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Renders reports to PDF with WeasyPrint
pub struct WeasyPrintRenderer {
    program: PathBuf,
    footer: String,
    timeout: Duration,
}

impl WeasyPrintRenderer {
    /// Locate `weasyprint` on `PATH`
    pub fn locate(footer: impl Into<String>) -> Result<Self, RenderError> {
        let program = which::which("weasyprint").map_err(|e| {
            RenderError::Unavailable(format!("weasyprint not found on PATH: {}", e))
        })?;
        debug!("Using weasyprint at {}", program.display());
        Ok(Self::with_program(program, footer))
    }

    pub fn with_program(program: impl Into<PathBuf>, footer: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            footer: footer.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn print(&self, html: Vec<u8>) -> Result<Vec<u8>, RenderError> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-")
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Linux: the renderer dies with us
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        let mut child = cmd.spawn().map_err(|e| {
            RenderError::Unavailable(format!("{}: {}", self.program.display(), e))
        })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| RenderError::ConversionFailed("stdin not captured".to_string()))?;
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(&html).await;
            drop(stdin);
            result
        });

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                RenderError::ConversionFailed(format!(
                    "weasyprint did not finish within {}s",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| RenderError::ConversionFailed(e.to_string()))?;

        match writer.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Writing to weasyprint failed: {}", e),
            Err(e) => warn!("weasyprint writer task failed: {}", e),
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RenderError::ConversionFailed(format!(
                "weasyprint exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        if output.stdout.is_empty() {
            return Err(RenderError::ConversionFailed(
                "weasyprint produced no output".to_string(),
            ));
        }
        Ok(output.stdout)
    }
}

#[async_trait]
impl DocumentRenderer for WeasyPrintRenderer {
    async fn render(&self, document: &ReportDocument) -> Result<Vec<u8>, RenderError> {
        if document.markdown.trim().is_empty() {
            return Err(RenderError::EmptyInput);
        }
        let html = StyledDocument::from_markdown(&document.title, &document.markdown, &self.footer);
        let pdf = self.print(html.into_bytes()).await?;
        debug!("weasyprint produced {} bytes for {}", pdf.len(), document.title);
        Ok(pdf)
    }

    fn mime_type(&self) -> &'static str {
        PDF_MIME
    }
}
