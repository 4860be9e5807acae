//! The query facade.
//!
//! [`Agent`] runs one query through classify, execute and format:
//!
//! ```text
//! Idle -> Classifying -> DirectAnswer                      -> Done
//!                     -> NeedsInfo                         -> Done
//!                     -> Executing -> Formatting           -> Done
//! ```
//!
//! Every path ends in a well-formed [`AgentResponse`]; query processing has
//! no error type.
//!
//! # Example
//!
//! ```rust,ignore
//! use aegir::prelude::*;
//!
//! let agent = Agent::builder()
//!     .provider(Arc::new(OpenAI::from_env()?))
//!     .chain(Arc::new(SuiRpcClient::for_network(&Network::Mainnet)?))
//!     .prices(Arc::new(PriceService::new(Arc::new(CoinGecko::new(timeout)?))))
//!     .build()?;
//!
//! let answer = agent.process_query("price of sui").await;
//! println!("{}", answer.response);
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{Instrument, debug, info, info_span};
use uuid::Uuid;

use crate::chain::ChainClient;
use crate::chat::{LlmBackend, SharedChatProvider};
use crate::error::{Error, Result};
use crate::formatter::ResponseFormatter;
use crate::intent::{Intent, IntentClassifier};
use crate::price::PriceService;
use crate::prompts::PromptTemplates;
use crate::response::AgentResponse;
use crate::tool::builtin::TRANSFER_ACTION;
use crate::tool::{ToolExecutor, ToolOutcome, ToolRegistry};

/// Default deadline for each LLM call.
pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-query information supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryContext {
    /// Address of the wallet connected in the host, if any.
    pub wallet_address: Option<String>,
}

impl QueryContext {
    /// Context with a connected wallet.
    #[must_use]
    pub fn with_wallet(address: impl Into<String>) -> Self {
        Self {
            wallet_address: Some(address.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Idle,
    Classifying,
    DirectAnswer,
    NeedsInfo,
    Executing,
    Formatting,
    Done,
}

impl Stage {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Classifying => "classifying",
            Self::DirectAnswer => "direct_answer",
            Self::NeedsInfo => "needs_info",
            Self::Executing => "executing",
            Self::Formatting => "formatting",
            Self::Done => "done",
        }
    }

    fn enter(self) {
        debug!(stage = self.as_str(), "stage");
    }
}

/// Sui assistant core: classifier, executor and formatter over one
/// long-lived LLM backend.
///
/// `Agent` is `Send + Sync`; share it behind an `Arc` to serve concurrent
/// queries.
pub struct Agent {
    classifier: IntentClassifier,
    executor: ToolExecutor,
    formatter: ResponseFormatter,
}

impl Agent {
    /// Start building an agent.
    #[must_use]
    pub fn builder() -> AgentBuilder {
        AgentBuilder::default()
    }

    /// The registry shared by the classifier and the executor.
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        self.executor.registry()
    }

    /// Answer a query with no connected wallet.
    pub async fn process_query(&self, query: &str) -> AgentResponse {
        self.process_query_with(query, &QueryContext::default()).await
    }

    /// Answer a query on behalf of the host described by `context`.
    pub async fn process_query_with(&self, query: &str, context: &QueryContext) -> AgentResponse {
        let span = info_span!("query", id = %Uuid::new_v4());
        async {
            info!(query, "processing query");
            let response = self.run(query, context).await.into_well_formed();
            Stage::Done.enter();
            info!(status = response.status.as_str(), "query finished");
            response
        }
        .instrument(span)
        .await
    }

    async fn run(&self, query: &str, context: &QueryContext) -> AgentResponse {
        Stage::Idle.enter();

        Stage::Classifying.enter();
        let intent = match self.classifier.classify(query).await {
            Ok(intent) => intent,
            Err(err) => return AgentResponse::failure(query, err.to_string()),
        };

        match intent.resolve() {
            Intent::Direct(text) => {
                Stage::DirectAnswer.enter();
                AgentResponse::direct(query, text)
            }
            Intent::NeedsInfo { missing, message } => {
                Stage::NeedsInfo.enter();
                AgentResponse::needs_info(query, &missing, message.as_deref())
            }
            Intent::Tool { name, arguments } => {
                Stage::Executing.enter();
                let outcome = self.executor.execute(&name, &arguments, context).await;

                Stage::Formatting.enter();
                let answer = self.formatter.format(query, &outcome.raw_result()).await;
                match outcome {
                    ToolOutcome::Success(output) => match output.transaction {
                        Some(tx) => answer.with_transaction(
                            tx,
                            output.action.unwrap_or_else(|| TRANSFER_ACTION.to_owned()),
                        ),
                        None => answer,
                    },
                    ToolOutcome::Failure(err) => answer.with_error(err.to_string()),
                }
            }
        }
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("classifier", &self.classifier)
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Agent`].
#[derive(Default)]
pub struct AgentBuilder {
    provider: Option<SharedChatProvider>,
    model: Option<String>,
    temperature: Option<f32>,
    llm_timeout: Option<Duration>,
    chain: Option<Arc<dyn ChainClient>>,
    prices: Option<Arc<PriceService>>,
    registry: Option<ToolRegistry>,
    prompts: Option<PromptTemplates>,
}

impl fmt::Debug for AgentBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentBuilder")
            .field("has_provider", &self.provider.is_some())
            .field("model", &self.model)
            .field("has_chain", &self.chain.is_some())
            .field("has_prices", &self.prices.is_some())
            .field("llm_timeout", &self.llm_timeout)
            .finish_non_exhaustive()
    }
}

impl AgentBuilder {
    /// Set the LLM provider. Required.
    #[must_use]
    pub fn provider(mut self, provider: SharedChatProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Override the provider's default model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub const fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the deadline for each LLM call. Defaults to 30 seconds.
    #[must_use]
    pub const fn llm_timeout(mut self, timeout: Duration) -> Self {
        self.llm_timeout = Some(timeout);
        self
    }

    /// Set the chain client. Required.
    #[must_use]
    pub fn chain(mut self, chain: Arc<dyn ChainClient>) -> Self {
        self.chain = Some(chain);
        self
    }

    /// Set the price service. Required.
    #[must_use]
    pub fn prices(mut self, prices: Arc<PriceService>) -> Self {
        self.prices = Some(prices);
        self
    }

    /// Replace the built-in tool registry.
    #[must_use]
    pub fn registry(mut self, registry: ToolRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Replace the prompt templates.
    #[must_use]
    pub fn prompts(mut self, prompts: PromptTemplates) -> Self {
        self.prompts = Some(prompts);
        self
    }

    /// Build the agent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Agent`] when the provider, chain client or price
    /// service is missing, or when the registry is empty.
    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| Error::agent("an LLM provider is required"))?;
        let chain = self
            .chain
            .ok_or_else(|| Error::agent("a chain client is required"))?;
        let prices = self
            .prices
            .ok_or_else(|| Error::agent("a price service is required"))?;

        let registry = Arc::new(self.registry.unwrap_or_else(ToolRegistry::builtin));
        if registry.is_empty() {
            return Err(Error::agent("the tool registry is empty"));
        }

        let mut backend = LlmBackend::new(provider)
            .with_timeout(self.llm_timeout.unwrap_or(DEFAULT_LLM_TIMEOUT));
        if let Some(model) = self.model {
            backend = backend.with_model(model);
        }
        if let Some(temperature) = self.temperature {
            backend = backend.with_temperature(temperature);
        }

        let prompts = self.prompts.unwrap_or_default();
        info!(
            provider = backend.provider_name(),
            model = backend.model(),
            tools = registry.len(),
            "agent ready"
        );

        Ok(Agent {
            classifier: IntentClassifier::with_prompts(
                backend.clone(),
                Arc::clone(&registry),
                &prompts,
            ),
            executor: ToolExecutor::new(registry, chain, prices),
            formatter: ResponseFormatter::with_prompts(backend, &prompts),
        })
    }
}
