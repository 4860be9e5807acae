//! OpenAI-compatible chat completion client.
//!
//! Atoma exposes the same `/chat/completions` surface as OpenAI, so one client
//! covers both. Only chat completions are implemented.

mod chat;
mod client;
mod config;
mod types;

pub use client::OpenAI;
pub use config::OpenAIConfig;
