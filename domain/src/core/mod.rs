//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`]: hosted models a persona can run on
//! - [`error::CompositionError`]: agent tree construction errors

pub mod error;
pub mod model;
