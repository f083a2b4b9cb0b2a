//! Narrative text: quest descriptions, NPC dialogue and completion lines.

pub mod error;
pub mod generator;
pub mod hosted;
pub mod session;
pub mod templates;

pub use error::NarrativeError;
pub use generator::*;
pub use hosted::HostedGenerator;
pub use session::*;
pub use templates::TemplateGenerator;
