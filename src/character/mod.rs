//! Player and NPC definitions.

pub mod combatant;
pub mod npc;

pub use combatant::*;
pub use npc::*;
