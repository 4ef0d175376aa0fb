//! Persona domain.
//!
//! - [`descriptor::PersonaDescriptor`]: name, instruction, output key
//! - [`schema::OutputSchema`]: optional structured output contract

pub mod descriptor;
pub mod schema;
