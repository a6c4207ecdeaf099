//! Domain models for the symptom-dx system.

mod conversation;
mod diagnosis;
mod disease;

pub use conversation::*;
pub use diagnosis::*;
pub use disease::*;
