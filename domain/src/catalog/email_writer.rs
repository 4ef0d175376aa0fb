//! Email writer: a single structured-output agent.

use super::AgentCatalog;
use crate::core::error::CompositionError;
use crate::persona::descriptor::PersonaDescriptor;
use crate::persona::schema::{OutputSchema, SchemaField};
use crate::prompt::UtilityPrompt;
use crate::state::key::StateKey;
use crate::state::keys;
use serde::{Deserialize, Serialize};

pub const EMAIL_WRITER_AGENT: &str = "email_writer";

/// Structured result of the email writer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailContent {
    pub date: String,
    pub from_address: String,
    pub to_address: String,
    pub subject: String,
    pub body: String,
}

impl EmailContent {
    pub fn schema() -> OutputSchema {
        OutputSchema::new("EmailContent")
            .with_field(SchemaField::string("date", "The date of the email"))
            .with_field(SchemaField::string("from_address", "The sender of the email"))
            .with_field(SchemaField::string("to_address", "The recipient of the email"))
            .with_field(SchemaField::string("subject", "The subject of the email"))
            .with_field(SchemaField::string(
                "body",
                "The body of the email, well formatted with proper paragraphs and spacing",
            ))
    }
}

pub(super) fn build(catalog: &AgentCatalog) -> Result<PersonaDescriptor, CompositionError> {
    Ok(catalog.apply_model(
        PersonaDescriptor::new(EMAIL_WRITER_AGENT, UtilityPrompt::email_writer())?
            .with_description("Writes emails with structured date, addresses, subject and body.")
            .with_output_schema(EmailContent::schema())
            .with_output_key(StateKey::new(keys::EMAIL)?),
    ))
}
