//! Prompt domain
//!
//! Instruction texts for every agent in the catalog.

pub mod personas;
mod think_tank;
mod utility;

pub use think_tank::ThinkTankPrompt;
pub use utility::UtilityPrompt;
