//! Export of analysis results.

mod report;

pub use report::*;
