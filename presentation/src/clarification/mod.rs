//! Clarification responders for the terminal

pub mod interactive;

pub use interactive::InteractiveClarification;
