//! Dice, tuning constants and runtime configuration.

pub mod config;
pub mod constants;
pub mod dice;

pub use config::*;
pub use constants::*;
pub use dice::*;
