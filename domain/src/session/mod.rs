//! Session domain
//!
//! A [`entities::Session`] owns the Shared State of one user conversation
//! and the [`events::RunEvent`]s recorded while agents ran against it.

pub mod entities;
pub mod events;
