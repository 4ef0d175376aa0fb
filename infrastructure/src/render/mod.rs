//! Document renderers for the artifact publisher
//!
//! - [`HtmlRenderer`]: the styled HTML document itself
//! - [`WeasyPrintRenderer`]: the same document printed to PDF by the
//!   `weasyprint` executable

pub mod document;
pub mod html;
pub mod weasyprint;

pub use document::StyledDocument;
pub use html::HtmlRenderer;
pub use weasyprint::WeasyPrintRenderer;

use crate::config::{FilePublisherConfig, RendererKind};
use std::sync::Arc;
use think_tank_application::ports::document_renderer::{DocumentRenderer, RenderError};

/// Build the renderer selected by `[publisher].renderer`
pub fn renderer_for(
    config: &FilePublisherConfig,
) -> Result<Arc<dyn DocumentRenderer>, RenderError> {
    Ok(match config.renderer {
        RendererKind::Weasyprint => Arc::new(WeasyPrintRenderer::locate(&config.footer)?),
        RendererKind::Html => Arc::new(HtmlRenderer::new(&config.footer)),
    })
}
