//! Application-level configuration.
//!
//! - [`RuntimeConfig`]: model default, group failure policy, loop limits

pub mod runtime_config;

pub use runtime_config::RuntimeConfig;
