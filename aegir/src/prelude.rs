//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use aegir::prelude::*;
//! ```

pub use crate::agent::{Agent, AgentBuilder, QueryContext};
pub use crate::cache::{Clock, ManualClock, SystemClock, TtlCache};
pub use crate::chain::{
    ChainClient, ChainError, GasEstimate, MIST_PER_SUI, Network, SuiAddress, SuiRpcClient,
    UnsignedTransaction, format_mist, parse_sui_amount,
};
pub use crate::chat::{
    ChatProvider, ChatProviderExt, ChatRequest, ChatResponse, LlmBackend, Message,
    ResponseFormat, Role, SharedChatProvider,
};
pub use crate::config::{AegirConfig, ConfigError, ConfigIssue, IssueLevel};
pub use crate::error::{Error, LlmError, LlmErrorKind, Result, ToolError};
pub use crate::formatter::ResponseFormatter;
pub use crate::intent::{Intent, IntentClassifier, IntentResult};
pub use crate::llms::{MockProvider, OpenAI, OpenAIConfig};
pub use crate::price::{CoinGecko, PriceError, PriceQuote, PriceService, PriceSource};
pub use crate::prompts::PromptTemplates;
pub use crate::response::{AgentResponse, Status};
pub use crate::tool::{
    CONNECTED_WALLET, ToolDefinition, ToolExecutor, ToolKind, ToolOutcome, ToolOutput,
    ToolRegistry,
};
