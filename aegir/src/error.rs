//! Unified error types for aegir.
//!
//! This module provides the error hierarchy covering:
//! - LLM backend errors (transport, authentication, malformed output)
//! - Tool execution errors (validation, unknown tools, unsupported assets)
//! - Chain RPC and price service errors
//!
//! Only [`Error`] crosses the public construction APIs. Query processing never
//! returns it: every failure while answering a query ends up inside an
//! [`AgentResponse`](crate::response::AgentResponse).

use std::fmt;
use std::time::Duration;

pub use crate::chain::ChainError;
pub use crate::config::ConfigError;
pub use crate::price::PriceError;

/// Result type alias for aegir operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for aegir.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// LLM backend error.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Tool execution error.
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Chain client error.
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    /// Price service error.
    #[error("Price error: {0}")]
    Price(#[from] PriceError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Agent construction error.
    #[error("Agent error: {0}")]
    Agent(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an agent error with a message.
    #[must_use]
    pub fn agent(msg: impl Into<String>) -> Self {
        Self::Agent(msg.into())
    }
}

/// Error type for LLM backend operations.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct LlmError {
    /// The error kind.
    pub kind: LlmErrorKind,
    /// The provider name (e.g., "atoma", "openai").
    pub provider: Option<String>,
    /// Additional error message.
    pub message: String,
    /// Optional error code from the provider.
    pub code: Option<String>,
}

/// Categories of LLM errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum LlmErrorKind {
    /// Authentication or authorization failure.
    Auth,
    /// Rate limit exceeded.
    RateLimited,
    /// Invalid request parameters.
    InvalidRequest,
    /// The model answered, but not in the requested shape.
    ResponseFormat,
    /// Network or connection error.
    Network,
    /// The call did not complete within the configured deadline.
    Timeout,
    /// HTTP status error.
    HttpStatus,
    /// Provider-specific error.
    Provider,
    /// Internal error.
    Internal,
}

impl LlmError {
    /// Create an authentication error.
    #[must_use]
    pub fn auth(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::Auth,
            provider: Some(provider.into()),
            message: message.into(),
            code: None,
        }
    }

    /// Create a rate limit error.
    #[must_use]
    pub fn rate_limited(provider: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::RateLimited,
            provider: Some(provider.into()),
            message: "Rate limit exceeded. Please retry after some time.".into(),
            code: None,
        }
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::InvalidRequest,
            provider: Some(provider.into()),
            message: message.into(),
            code: None,
        }
    }

    /// Create a response format error.
    #[must_use]
    pub fn response_format(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::ResponseFormat,
            provider: None,
            message: format!("Expected {}, got {}", expected.into(), got.into()),
            code: None,
        }
    }

    /// Create a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::Network,
            provider: None,
            message: message.into(),
            code: None,
        }
    }

    /// Create a timeout error.
    #[must_use]
    pub fn timeout(limit: Duration) -> Self {
        Self {
            kind: LlmErrorKind::Timeout,
            provider: None,
            message: format!("LLM call timed out after {limit:?}"),
            code: None,
        }
    }

    /// Create an HTTP status error.
    #[must_use]
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::HttpStatus,
            provider: None,
            message: format!("HTTP {status}: {}", body.into()),
            code: Some(status.to_string()),
        }
    }

    /// Create a provider-specific error.
    #[must_use]
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::Provider,
            provider: Some(provider.into()),
            message: message.into(),
            code: None,
        }
    }

    /// Create a provider error with an error code.
    #[must_use]
    pub fn provider_code(
        provider: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind: LlmErrorKind::Provider,
            provider: Some(provider.into()),
            message: message.into(),
            code: Some(code.into()),
        }
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: LlmErrorKind::Internal,
            provider: None,
            message: message.into(),
            code: None,
        }
    }

    /// Attach a provider name if none is set yet.
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        if self.provider.is_none() {
            self.provider = Some(provider.into());
        }
        self
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{provider}] ")?;
        }
        write!(f, "{}", self.message)?;
        if let Some(code) = &self.code {
            write!(f, " (code: {code})")?;
        }
        Ok(())
    }
}

impl std::error::Error for LlmError {}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self {
                kind: LlmErrorKind::Timeout,
                provider: None,
                message: "Request timed out".into(),
                code: None,
            }
        } else if err.is_connect() {
            Self::network(format!("Connection failed: {err}"))
        } else {
            Self::network(err.to_string())
        }
    }
}

/// Error type for tool execution failures.
///
/// The variants map onto the user-facing failure taxonomy: validation and
/// unsupported-asset failures are user-correctable, unknown tools are a
/// configuration problem, and upstream failures carry the message of the
/// chain or price backend that failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ToolError {
    /// Malformed address, non-positive amount, or similar user input problem.
    #[error("ValidationError: {0}")]
    Validation(String),

    /// A required argument is missing or empty.
    #[error("InvalidArgument: {0}")]
    InvalidArgument(String),

    /// The requested tool is not registered.
    #[error("UnknownTool: {0}")]
    UnknownTool(String),

    /// A tool with this name is already registered.
    #[error("DuplicateTool: {0}")]
    DuplicateTool(String),

    /// The price service has no mapping for the symbol.
    #[error("UnsupportedAsset: {0}")]
    UnsupportedAsset(String),

    /// The chain RPC or price backend failed.
    #[error("UpstreamError: {0}")]
    Upstream(String),
}

impl ToolError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an invalid argument error.
    #[must_use]
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create an unknown tool error.
    #[must_use]
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool(name.into())
    }

    /// Create a duplicate tool error.
    #[must_use]
    pub fn duplicate_tool(name: impl Into<String>) -> Self {
        Self::DuplicateTool(name.into())
    }

    /// Create an unsupported asset error.
    #[must_use]
    pub fn unsupported_asset(symbol: impl Into<String>) -> Self {
        Self::UnsupportedAsset(symbol.into())
    }

    /// Create an upstream error.
    #[must_use]
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }
}

impl From<ChainError> for ToolError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::InvalidAddress(_) | ChainError::InvalidAmount(_) => {
                Self::Validation(err.to_string())
            }
            ChainError::Rpc { .. }
            | ChainError::Http(_)
            | ChainError::Decode(_)
            | ChainError::UnknownNetwork(_) => {
                Self::Upstream(err.to_string())
            }
        }
    }
}

impl From<PriceError> for ToolError {
    fn from(err: PriceError) -> Self {
        match err {
            PriceError::Unsupported(symbol) => Self::UnsupportedAsset(symbol),
            PriceError::InvalidSymbol => Self::InvalidArgument(err.to_string()),
            PriceError::NoData(_) | PriceError::Http(_) => Self::Upstream(err.to_string()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    mod error {
        use super::*;

        #[test]
        fn agent_creates_error() {
            let err = Error::agent("no provider");
            assert!(matches!(err, Error::Agent(_)));
            assert!(err.to_string().contains("no provider"));
        }

        #[test]
        fn from_llm_error() {
            let err: Error = LlmError::network("timeout").into();
            assert!(matches!(err, Error::Llm(_)));
        }

        #[test]
        fn from_tool_error() {
            let err: Error = ToolError::unknown_tool("swap").into();
            assert!(matches!(err, Error::Tool(_)));
        }

        #[test]
        fn from_json_error() {
            let json_err = serde_json::from_str::<i32>("invalid").unwrap_err();
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    mod llm_error {
        use super::*;

        #[test]
        fn auth_creates_error() {
            let err = LlmError::auth("atoma", "Invalid API key");
            assert_eq!(err.kind, LlmErrorKind::Auth);
            assert_eq!(err.provider.as_deref(), Some("atoma"));
            assert!(err.code.is_none());
        }

        #[test]
        fn timeout_reports_sub_second_deadlines() {
            let err = LlmError::timeout(Duration::from_millis(250));
            assert_eq!(err.kind, LlmErrorKind::Timeout);
            assert!(err.message.contains("250ms"), "{}", err.message);

            let err = LlmError::timeout(Duration::from_secs(30));
            assert!(err.message.contains("30s"), "{}", err.message);
        }

        #[test]
        fn invalid_request_names_provider() {
            let err = LlmError::invalid_request("atoma", "unknown model");
            assert_eq!(err.kind, LlmErrorKind::InvalidRequest);
            assert!(err.to_string().starts_with("[atoma] unknown model"));
        }

        #[test]
        fn http_status_sets_code() {
            let err = LlmError::http_status(503, "Service Unavailable");
            assert_eq!(err.code.as_deref(), Some("503"));
            assert!(err.to_string().contains("(code: 503)"));
        }

        #[test]
        fn with_provider_keeps_existing() {
            let err = LlmError::auth("atoma", "x").with_provider("openai");
            assert_eq!(err.provider.as_deref(), Some("atoma"));

            let err = LlmError::network("down").with_provider("openai");
            assert_eq!(err.provider.as_deref(), Some("openai"));
        }

        #[test]
        fn display_with_provider() {
            let s = LlmError::provider("atoma", "model not found").to_string();
            assert!(s.starts_with("[atoma] "));
            assert!(s.contains("model not found"));
        }
    }

    mod tool_error {
        use super::*;

        #[test]
        fn display_carries_taxonomy_tag() {
            assert!(
                ToolError::validation("bad address")
                    .to_string()
                    .starts_with("ValidationError")
            );
            assert!(
                ToolError::unknown_tool("swap")
                    .to_string()
                    .starts_with("UnknownTool")
            );
            assert!(
                ToolError::unsupported_asset("FOO")
                    .to_string()
                    .starts_with("UnsupportedAsset")
            );
            assert!(
                ToolError::upstream("rpc down")
                    .to_string()
                    .starts_with("UpstreamError")
            );
        }

        #[test]
        fn chain_address_error_becomes_validation() {
            let err: ToolError = ChainError::InvalidAddress("0x12".into()).into();
            assert!(matches!(err, ToolError::Validation(_)));
        }

        #[test]
        fn chain_rpc_error_becomes_upstream() {
            let err: ToolError = ChainError::Rpc {
                code: -32602,
                message: "invalid params".into(),
            }
            .into();
            assert!(matches!(err, ToolError::Upstream(_)));
            assert!(err.to_string().contains("invalid params"));
        }

        #[test]
        fn price_unsupported_becomes_unsupported_asset() {
            let err: ToolError = PriceError::Unsupported("DOGE".into()).into();
            assert_eq!(err, ToolError::UnsupportedAsset("DOGE".into()));
        }
    }
}
