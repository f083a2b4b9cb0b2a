//! Encounter state, the difficulty director and the turn controller.

pub mod controller;
pub mod director;
pub mod state;

pub use controller::*;
pub use director::*;
pub use state::*;
