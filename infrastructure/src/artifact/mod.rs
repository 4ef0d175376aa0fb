//! Artifact store adapters

pub mod memory;

pub use memory::InMemoryArtifactStore;
