//! Aegir - intent dispatch and tool execution for a Sui assistant
//!
//! A query is classified into an intent, optionally routed to one of a small
//! set of tools (balance lookup, SUI transfer preparation, price lookup, gas
//! estimation), and the tool's raw output is rewritten into a user-facing
//! answer by a second LLM pass.
//!
//! ```text
//! query -> IntentClassifier -> direct answer
//!                           -> needs-info answer
//!                           -> ToolExecutor -> ResponseFormatter -> AgentResponse
//! ```
//!
//! Build an [`Agent`] with [`Agent::builder`] or from an
//! [`AegirConfig`](config::AegirConfig), then call
//! [`Agent::process_query`].

pub mod agent;
pub mod cache;
pub mod chain;
pub mod chat;
pub mod config;
pub mod error;
pub mod formatter;
pub mod intent;
pub mod llms;
pub mod prelude;
pub mod price;
pub mod prompts;
pub mod response;
pub mod tool;

pub use agent::{Agent, AgentBuilder, QueryContext};
pub use error::{Error, LlmError, Result, ToolError};
pub use response::{AgentResponse, Status};
