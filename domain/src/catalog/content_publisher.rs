//! Content publisher: an agent driving the render and persist tools.

use super::AgentCatalog;
use crate::core::error::CompositionError;
use crate::persona::descriptor::PersonaDescriptor;
use crate::prompt::UtilityPrompt;
use crate::tool::entities::{ToolDefinition, ToolParameter};

pub const CONTENT_PUBLISHER_AGENT: &str = "content_publisher";

pub const MARKDOWN_TO_PDF: &str = "markdown_to_pdf";
pub const PUBLISH_PDF: &str = "publish_pdf";

pub const DEFAULT_RENDER_FILENAME: &str = "generated_report.pdf";
pub const DEFAULT_PUBLISH_FILENAME: &str = "published_report.pdf";

pub fn markdown_to_pdf_tool() -> ToolDefinition {
    ToolDefinition::new(
        MARKDOWN_TO_PDF,
        "Convert markdown text to a styled PDF and save it as an artifact. Returns the artifact name.",
    )
    .with_parameter(ToolParameter::new(
        "markdown_text",
        "The markdown content to convert",
        true,
    ))
    .with_parameter(ToolParameter::new(
        "filename",
        "Name of the PDF artifact (default generated_report.pdf)",
        false,
    ))
}

pub fn publish_pdf_tool() -> ToolDefinition {
    ToolDefinition::new(
        PUBLISH_PDF,
        "Write a PDF artifact to the published output directory. Returns the file path.",
    )
    .with_parameter(ToolParameter::new(
        "pdf_artifact_name",
        "Artifact name returned by markdown_to_pdf",
        true,
    ))
    .with_parameter(ToolParameter::new(
        "filename",
        "File name to write (default published_report.pdf)",
        false,
    ))
}

pub(super) fn build(catalog: &AgentCatalog) -> Result<PersonaDescriptor, CompositionError> {
    Ok(catalog.apply_model(
        PersonaDescriptor::new(CONTENT_PUBLISHER_AGENT, UtilityPrompt::content_publisher())?
            .with_description("Converts markdown to a PDF artifact and publishes it as a local file.")
            .with_tool(markdown_to_pdf_tool())
            .with_tool(publish_pdf_tool()),
    ))
}
