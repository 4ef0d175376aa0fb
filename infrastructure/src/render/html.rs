//! Renderer producing the styled HTML document

use super::document::StyledDocument;
use async_trait::async_trait;
use think_tank_application::ports::document_renderer::{
    DocumentRenderer, RenderError, ReportDocument,
};
use think_tank_domain::artifact::HTML_MIME;

/// Renders reports as standalone HTML; needs no external tools
pub struct HtmlRenderer {
    footer: String,
}

impl HtmlRenderer {
    pub fn new(footer: impl Into<String>) -> Self {
        Self {
            footer: footer.into(),
        }
    }
}

#[async_trait]
impl DocumentRenderer for HtmlRenderer {
    async fn render(&self, document: &ReportDocument) -> Result<Vec<u8>, RenderError> {
        if document.markdown.trim().is_empty() {
            return Err(RenderError::EmptyInput);
        }
        Ok(StyledDocument::from_markdown(&document.title, &document.markdown, &self.footer).into_bytes())
    }

    fn mime_type(&self) -> &'static str {
        HTML_MIME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_renders_html_with_footer() {
        let renderer = HtmlRenderer::new("Internal");
        let bytes = renderer
            .render(&ReportDocument {
                title: "quarterly".to_string(),
                markdown: "# Q3\n\nAll good.".to_string(),
            })
            .await
            .unwrap();
        let html = String::from_utf8(bytes).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Internal"));
        assert_eq!(renderer.mime_type(), "text/html");
    }

    #[tokio::test]
    async fn test_empty_markdown_rejected() {
        let renderer = HtmlRenderer::new("x");
        let result = renderer
            .render(&ReportDocument {
                title: "t".to_string(),
                markdown: "  \n".to_string(),
            })
            .await;
        assert!(matches!(result, Err(RenderError::EmptyInput)));
    }
}
