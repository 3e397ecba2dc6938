//! Domain models for the bloodwise system.

mod parameters;
mod risk;
mod segment;
mod values;

pub use parameters::*;
pub use risk::*;
pub use segment::*;
pub use values::*;
