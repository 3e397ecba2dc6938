//! Model-facing half of the blood report pipeline.
//!
//! - [`completion`]: the `Completor` seam, retry decorator and test doubles
//! - [`prompts`]: extraction and narrative instructions
//! - [`extraction`]: per-parameter value extraction (sequential or threaded)
//! - [`narrative`]: risk narrative and paced fragment streaming
//! - [`pipeline`]: extract → classify → describe for one document
//! - [`config`]: serde-backed pipeline configuration
//! - `groq` (feature `groq`): HTTP chat completions client

pub mod completion;
pub mod config;
pub mod extraction;
pub mod narrative;
pub mod pipeline;
pub mod prompts;

#[cfg(feature = "groq")]
pub mod groq;

pub use completion::*;
pub use config::{CompletionSettings, ConfigError, PipelineConfig};
pub use extraction::*;
pub use narrative::*;
pub use pipeline::*;

#[cfg(feature = "groq")]
pub use groq::{GroqClient, GroqConfig};
