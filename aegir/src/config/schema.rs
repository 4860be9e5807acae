//! Configuration schema and agent assembly.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::agent::Agent;
use crate::cache::SystemClock;
use crate::chain::{DEFAULT_GAS_BUDGET, Network, SuiRpcClient};
use crate::error::Result;
use crate::llms::{OpenAI, OpenAIConfig};
use crate::price::{CoinGecko, DEFAULT_PRICE_TTL, PriceService};
use crate::prompts::PromptTemplates;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AegirConfig {
    /// LLM endpoint settings.
    #[serde(default)]
    pub llm: LlmSection,
    /// Sui RPC settings.
    #[serde(default)]
    pub chain: ChainSection,
    /// Price service settings.
    #[serde(default)]
    pub price: PriceSection,
    /// Query pipeline settings.
    #[serde(default)]
    pub agent: AgentSection,
}

/// Which OpenAI-compatible preset to start from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    /// Atoma inference API.
    #[default]
    Atoma,
    /// OpenAI API.
    OpenAI,
}

/// `[llm]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmSection {
    /// Endpoint preset.
    #[serde(default)]
    pub provider: LlmProviderKind,
    /// API key. Usually supplied through the environment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Model override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Force JSON mode on or off.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_mode: Option<bool>,
    /// HTTP timeout in seconds.
    #[serde(default = "default_llm_http_timeout")]
    pub timeout_secs: u64,
}

const fn default_llm_http_timeout() -> u64 {
    60
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: LlmProviderKind::default(),
            api_key: None,
            base_url: None,
            model: None,
            temperature: None,
            json_mode: None,
            timeout_secs: default_llm_http_timeout(),
        }
    }
}

/// `[chain]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSection {
    /// `mainnet`, `testnet`, `devnet`, `localnet` or a fullnode URL.
    #[serde(default = "default_network")]
    pub network: String,
    /// Explicit RPC URL; wins over `network`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
    /// Gas budget for prepared transactions, in MIST.
    #[serde(default = "default_gas_budget")]
    pub gas_budget: u64,
    /// HTTP timeout in seconds.
    #[serde(default = "default_chain_timeout")]
    pub timeout_secs: u64,
}

fn default_network() -> String {
    "mainnet".to_owned()
}

const fn default_gas_budget() -> u64 {
    DEFAULT_GAS_BUDGET
}

const fn default_chain_timeout() -> u64 {
    30
}

impl Default for ChainSection {
    fn default() -> Self {
        Self {
            network: default_network(),
            rpc_url: None,
            gas_budget: default_gas_budget(),
            timeout_secs: default_chain_timeout(),
        }
    }
}

impl ChainSection {
    /// The network this section points at.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an unknown network name.
    pub fn resolve_network(&self) -> std::result::Result<Network, ConfigError> {
        if let Some(url) = &self.rpc_url {
            return Ok(Network::Custom(url.clone()));
        }
        self.network
            .parse()
            .map_err(|_| ConfigError::InvalidValue(format!("chain.network: {}", self.network)))
    }
}

/// `[price]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSection {
    /// CoinGecko base URL override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// CoinGecko demo API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// How long a quote stays fresh, in seconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    /// HTTP timeout in seconds.
    #[serde(default = "default_price_timeout")]
    pub timeout_secs: u64,
    /// Extra symbol to CoinGecko id mappings.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub symbols: BTreeMap<String, String>,
}

const fn default_cache_ttl() -> u64 {
    DEFAULT_PRICE_TTL.as_secs()
}

const fn default_price_timeout() -> u64 {
    10
}

impl Default for PriceSection {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            cache_ttl_secs: default_cache_ttl(),
            timeout_secs: default_price_timeout(),
            symbols: BTreeMap::new(),
        }
    }
}

/// `[agent]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSection {
    /// Deadline for each LLM call, in seconds.
    #[serde(default = "default_llm_timeout")]
    pub llm_timeout_secs: u64,
    /// Extra instructions appended to both system prompts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<String>,
}

const fn default_llm_timeout() -> u64 {
    30
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            llm_timeout_secs: default_llm_timeout(),
            custom_instructions: None,
        }
    }
}

impl AegirConfig {
    /// Validate the configuration and return any issues found.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.llm.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
            issues.push(ConfigIssue::error(
                "llm.api_key",
                "No API key set. Set AEGIR_API_KEY or ATOMA_API_KEY.",
            ));
        }

        if let Some(t) = self.llm.temperature
            && !(0.0..=2.0).contains(&t)
        {
            issues.push(ConfigIssue::error(
                "llm.temperature",
                "Temperature must be between 0 and 2",
            ));
        }

        if let Some(url) = &self.llm.base_url
            && !is_http_url(url)
        {
            issues.push(ConfigIssue::error("llm.base_url", "Base URL must start with http(s)://"));
        }

        if let Err(err) = self.chain.resolve_network() {
            issues.push(ConfigIssue::error("chain.network", err.to_string()));
        }

        if let Some(url) = &self.chain.rpc_url
            && !is_http_url(url)
        {
            issues.push(ConfigIssue::error("chain.rpc_url", "RPC URL must start with http(s)://"));
        }

        if self.chain.gas_budget == 0 {
            issues.push(ConfigIssue::error("chain.gas_budget", "Gas budget must be at least 1"));
        }

        if self.price.cache_ttl_secs == 0 {
            issues.push(ConfigIssue::warning(
                "price.cache_ttl_secs",
                "Cache TTL is 0, every price query hits CoinGecko",
            ));
        }

        if self.agent.llm_timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                "agent.llm_timeout_secs",
                "LLM timeout must be at least 1 second",
            ));
        }

        issues
    }

    /// Check if the configuration is valid (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate()
            .iter()
            .all(|issue| issue.level != IssueLevel::Error)
    }

    /// Merge environment variables into the configuration.
    ///
    /// `AEGIR_API_KEY`, `AEGIR_MODEL`, `AEGIR_LLM_BASE_URL` and
    /// `AEGIR_RPC_URL` override the file. `ATOMA_API_KEY` and
    /// `COINGECKO_API_KEY` only fill keys the file leaves unset.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_env_from(|name| std::env::var(name).ok())
    }

    /// [`with_env`](Self::with_env) with a custom variable lookup.
    #[must_use]
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = var("AEGIR_API_KEY") {
            self.llm.api_key = Some(key);
        } else if self.llm.api_key.is_none()
            && let Some(key) = var("ATOMA_API_KEY")
        {
            self.llm.api_key = Some(key);
        }

        if let Some(model) = var("AEGIR_MODEL") {
            self.llm.model = Some(model);
        }
        if let Some(url) = var("AEGIR_LLM_BASE_URL") {
            self.llm.base_url = Some(url);
        }
        if let Some(url) = var("AEGIR_RPC_URL") {
            self.chain.rpc_url = Some(url);
        }

        if self.price.api_key.is_none()
            && let Some(key) = var("COINGECKO_API_KEY")
        {
            self.price.api_key = Some(key);
        }

        self
    }

    /// OpenAI-compatible client settings for the `[llm]` section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when no API key is set.
    pub fn openai_config(&self) -> std::result::Result<OpenAIConfig, ConfigError> {
        let api_key = self
            .llm
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingField("llm.api_key".into()))?;

        let mut config = match self.llm.provider {
            LlmProviderKind::Atoma => OpenAIConfig::atoma(api_key),
            LlmProviderKind::OpenAI => OpenAIConfig::openai(api_key),
        }
        .with_timeout(self.llm.timeout_secs);

        if let Some(url) = &self.llm.base_url {
            config = config.with_base_url(url);
        }
        if let Some(model) = &self.llm.model {
            config = config.with_model(model);
        }
        if let Some(json_mode) = self.llm.json_mode {
            config = config.with_json_mode(json_mode);
        }
        Ok(config)
    }

    /// Sui RPC client for the `[chain]` section.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown network or when the HTTP client
    /// cannot be built.
    pub fn build_chain(&self) -> Result<SuiRpcClient> {
        let network = self.chain.resolve_network()?;
        let client = SuiRpcClient::new(
            network.rpc_url(),
            Duration::from_secs(self.chain.timeout_secs),
        )?
        .with_gas_budget(self.chain.gas_budget);
        Ok(client)
    }

    /// Cached price service for the `[price]` section.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn build_prices(&self) -> Result<PriceService> {
        let timeout = Duration::from_secs(self.price.timeout_secs);
        let mut source = match &self.price.base_url {
            Some(url) => CoinGecko::with_base_url(url, timeout)?,
            None => CoinGecko::new(timeout)?,
        };
        if let Some(key) = &self.price.api_key {
            source = source.with_api_key(key);
        }

        let mut service = PriceService::with_cache(
            Arc::new(source),
            Duration::from_secs(self.price.cache_ttl_secs),
            Arc::new(SystemClock),
        );
        for (symbol, coin_id) in &self.price.symbols {
            service = service.with_symbol(symbol, coin_id);
        }
        Ok(service)
    }

    /// Assemble a ready-to-use [`Agent`].
    ///
    /// # Errors
    ///
    /// Returns an error when the API key is missing or any client cannot be
    /// built.
    pub fn build_agent(&self) -> Result<Agent> {
        let provider = OpenAI::new(self.openai_config()?)?;

        let mut prompts = PromptTemplates::default();
        if let Some(extra) = &self.agent.custom_instructions {
            prompts = prompts.with_custom_instructions(extra);
        }

        let mut builder = Agent::builder()
            .provider(Arc::new(provider))
            .chain(Arc::new(self.build_chain()?))
            .prices(Arc::new(self.build_prices()?))
            .llm_timeout(Duration::from_secs(self.agent.llm_timeout_secs))
            .prompts(prompts);
        if let Some(temperature) = self.llm.temperature {
            builder = builder.temperature(temperature);
        }
        builder.build()
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Configuration validation issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// Issue severity level.
    pub level: IssueLevel,
    /// Configuration path (e.g., `chain.network`).
    pub path: String,
    /// Human-readable message.
    pub message: String,
}

impl ConfigIssue {
    /// Create an error-level issue.
    #[must_use]
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Error,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a warning-level issue.
    #[must_use]
    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Warning,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.level {
            IssueLevel::Error => "ERROR",
            IssueLevel::Warning => "WARN",
        };
        write!(f, "[{}] {}: {}", prefix, self.path, self.message)
    }
}

/// Severity level for configuration issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueLevel {
    /// The agent cannot be built or will misbehave.
    Error,
    /// Works, but probably not as intended.
    Warning,
}
