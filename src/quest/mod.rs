//! Quests and the policy that hands them out.

pub mod policy;
pub mod types;

pub use policy::*;
pub use types::*;
