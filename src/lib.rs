//! Encounter - Turn-Based Encounter Director Library
//!
//! NPC combat decisions by bounded minimax, history-aware quest generation
//! and periodic difficulty balancing for a single-player encounter.
//! Narrative text comes from a pluggable generator with built-in fallbacks.

pub mod character;
pub mod combat;
pub mod core;
pub mod encounter;
pub mod narrative;
pub mod quest;
