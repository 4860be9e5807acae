//! LLM backend implementations.
//!
//! # Available Backends
//!
//! - [`openai`] - Atoma, OpenAI and other OpenAI-compatible endpoints
//! - [`mock`] - Scripted provider for tests and offline runs

pub mod mock;
pub mod openai;

pub use mock::MockProvider;
pub use openai::{OpenAI, OpenAIConfig};
