//! NPC combat decisions and turn resolution.

pub mod evaluator;
pub mod resolution;
pub mod search;
pub mod types;

pub use evaluator::*;
pub use resolution::*;
pub use search::*;
pub use types::*;
