//! End-to-end tests for the query pipeline with scripted collaborators.

#![allow(clippy::unwrap_used, clippy::panic, clippy::clone_on_ref_ptr)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use aegir::intent::{GREETING_RESPONSE, OFF_TOPIC_RESPONSE, patterns};
use aegir::prelude::*;
use aegir::price::SourcePrice;
use aegir::response::INSUFFICIENT_INFORMATION;
use async_trait::async_trait;

const RECIPIENT: &str = "0x2b5b6a9c0f4e1d3c7a8b9e0f1a2b3c4d5e6f708192a3b4c5d6e7f8091a2b3c4d";

/// Formatter reply used wherever the pipeline reaches the second LLM pass.
const FORMATTED: &str = r#"[{"reasoning":"Tool output summarized","response":"Done.","status":"success","query":"ignored","errors":[]}]"#;

#[derive(Debug)]
struct StaticChain {
    balance_mist: u128,
}

#[async_trait]
impl ChainClient for StaticChain {
    async fn get_balance(&self, _owner: &SuiAddress) -> std::result::Result<u128, ChainError> {
        Ok(self.balance_mist)
    }

    async fn estimate_gas(
        &self,
        tx: &UnsignedTransaction,
    ) -> std::result::Result<GasEstimate, ChainError> {
        Ok(GasEstimate::new(1_000, 1_000, tx.gas_budget))
    }
}

#[derive(Debug, Default)]
struct CountingSource {
    calls: AtomicUsize,
}

#[async_trait]
impl PriceSource for CountingSource {
    async fn fetch_usd(&self, coin_id: &str) -> std::result::Result<SourcePrice, PriceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match coin_id {
            "sui" => Ok(SourcePrice {
                usd: 3.42,
                last_updated_at: Some(1_718_000_000),
            }),
            other => Err(PriceError::NoData(other.to_owned())),
        }
    }
}

struct Harness {
    agent: Agent,
    llm: Arc<MockProvider>,
    source: Arc<CountingSource>,
    clock: Arc<ManualClock>,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn harness(script: Vec<&str>) -> Harness {
    init_tracing();
    let llm = Arc::new(MockProvider::new(script));
    let source = Arc::new(CountingSource::default());
    let clock = Arc::new(ManualClock::new());
    let prices = PriceService::with_cache(source.clone(), Duration::from_secs(60), clock.clone());

    let agent = Agent::builder()
        .provider(llm.clone())
        .chain(Arc::new(StaticChain {
            balance_mist: 12_340_000_000,
        }))
        .prices(Arc::new(prices))
        .llm_timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    Harness {
        agent,
        llm,
        source,
        clock,
    }
}

#[tokio::test]
async fn test_greetings_short_circuit() {
    for query in ["hi", "Hello there", "HEY, you", "greetings friend"] {
        let h = harness(vec![]);
        let answer = h.agent.process_query(query).await;

        assert_eq!(answer.status, Status::Success, "{query}");
        assert_eq!(answer.response, GREETING_RESPONSE);
        assert_eq!(h.llm.call_count(), 0, "{query}");
        assert!(answer.is_well_formed());
    }
}

#[tokio::test]
async fn test_off_topic_short_circuit() {
    for query in ["what's the weather like", "what time is it", "today's date?"] {
        let h = harness(vec![]);
        let answer = h.agent.process_query(query).await;

        assert_eq!(answer.response, OFF_TOPIC_RESPONSE, "{query}");
        assert_eq!(h.llm.call_count(), 0);
    }
}

#[test]
fn test_transfer_pattern_converts_to_mist() {
    let intent = patterns::extract(&format!("transfer 5 sui to {RECIPIENT}")).unwrap();

    assert_eq!(intent.selected_tool.as_deref(), Some("transfer"));
    assert_eq!(
        intent.tool_arguments,
        Some(vec!["5000000000".to_owned(), RECIPIENT.to_owned()])
    );
}

#[tokio::test]
async fn test_transfer_without_recipient_needs_info() {
    let intent = patterns::extract("transfer 1 sui").unwrap();
    assert!(intent.needs_additional_info);
    assert_eq!(
        intent.additional_info_required,
        Some(vec!["recipient_address".to_owned()])
    );

    let h = harness(vec![]);
    let answer = h.agent.process_query("transfer 1 sui").await;

    assert_eq!(answer.status, Status::Failure);
    assert_eq!(answer.errors, vec![INSUFFICIENT_INFORMATION.to_owned()]);
    assert_eq!(h.llm.call_count(), 0, "formatter must not run");
}

#[tokio::test]
async fn test_transfer_prepares_unsigned_transaction() {
    let h = harness(vec![FORMATTED]);
    let answer = h
        .agent
        .process_query(&format!("send 5 sui to {RECIPIENT}"))
        .await;

    assert_eq!(answer.status, Status::Success);
    assert_eq!(answer.action.as_deref(), Some("transfer"));
    assert_eq!(answer.requires_wallet, Some(true));

    let tx = answer.transaction.unwrap();
    assert_eq!(tx.transfer_amount(), 5_000_000_000);
    assert_eq!(tx.recipient().unwrap().as_str(), RECIPIENT);
}

#[tokio::test]
async fn test_malformed_recipient_is_validation_error() {
    for recipient in ["0x1234", RECIPIENT.trim_start_matches("0x")] {
        let h = harness(vec![FORMATTED]);
        let answer = h
            .agent
            .process_query(&format!("transfer 5 sui to {recipient}"))
            .await;

        assert_eq!(answer.status, Status::Failure, "{recipient}");
        assert!(answer.errors[0].starts_with("ValidationError"), "{:?}", answer.errors);
        assert!(answer.transaction.is_none());
        assert!(answer.is_well_formed());
    }
}

#[tokio::test]
async fn test_zero_and_negative_amounts_fail_validation() {
    for amount in ["0", "-3"] {
        let h = harness(vec![FORMATTED]);
        let answer = h
            .agent
            .process_query(&format!("transfer {amount} sui to {RECIPIENT}"))
            .await;

        assert_eq!(answer.status, Status::Failure, "{amount}");
        assert!(answer.errors[0].starts_with("ValidationError"), "{:?}", answer.errors);
    }
}

#[tokio::test]
async fn test_grouped_amount_is_rejected_not_truncated() {
    let h = harness(vec![FORMATTED]);
    let answer = h
        .agent
        .process_query(&format!("send 1,000 sui to {RECIPIENT}"))
        .await;

    assert_eq!(answer.status, Status::Failure);
    assert!(answer.errors[0].starts_with("ValidationError"), "{:?}", answer.errors);
    assert!(answer.transaction.is_none());
}

#[tokio::test]
async fn test_invalid_classifier_json_is_recovered() {
    let h = harness(vec!["Sorry, I cannot produce JSON right now."]);
    let answer = h.agent.process_query("tell me something about sui").await;

    assert_eq!(answer.status, Status::Success);
    assert!(!answer.response.is_empty());
    assert!(answer.is_well_formed());
    assert_eq!(h.llm.call_count(), 1);
}

#[tokio::test]
async fn test_price_is_cached_within_window() {
    let h = harness(vec![FORMATTED, FORMATTED, FORMATTED]);

    let first = h.agent.process_query("price of sui").await;
    let second = h.agent.process_query("what's the SUI price").await;
    assert!(first.is_success() && second.is_success());
    assert_eq!(h.source.calls.load(Ordering::SeqCst), 1);

    h.clock.advance(Duration::from_secs(61));
    h.agent.process_query("price of sui").await;
    assert_eq!(h.source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_unknown_tool_is_reported() {
    let h = harness(vec![
        r#"{"success":true,"selected_tool":"swap","tool_arguments":["1","SUI","USDC"]}"#,
        FORMATTED,
    ]);
    let answer = h.agent.process_query("swap one sui for usdc").await;

    assert_eq!(answer.status, Status::Failure);
    assert_eq!(answer.errors, vec!["UnknownTool: swap".to_owned()]);
    assert!(answer.is_well_formed());
}

#[tokio::test]
async fn test_connected_wallet_balance() {
    let h = harness(vec![FORMATTED]);
    let answer = h
        .agent
        .process_query_with("show my balance", &QueryContext::with_wallet(RECIPIENT))
        .await;
    assert_eq!(answer.status, Status::Success);

    let formatter_input = &h.llm.requests()[0].messages[1].content;
    assert!(formatter_input.contains("12340000000"));
    assert!(formatter_input.contains("12.34"));
}

#[tokio::test]
async fn test_connected_wallet_missing() {
    let h = harness(vec![FORMATTED]);
    let answer = h.agent.process_query("check my wallet").await;

    assert_eq!(answer.status, Status::Failure);
    assert!(answer.errors[0].starts_with("ValidationError"));
}

#[tokio::test]
async fn test_classifier_outage_is_failure() {
    let llm = Arc::new(MockProvider::from_results([Err(LlmError::http_status(
        503,
        "service unavailable",
    ))]));
    let agent = Agent::builder()
        .provider(llm)
        .chain(Arc::new(StaticChain { balance_mist: 0 }))
        .prices(Arc::new(PriceService::new(Arc::new(CountingSource::default()))))
        .build()
        .unwrap();

    let answer = agent.process_query("what can you do for me").await;
    assert_eq!(answer.status, Status::Failure);
    assert!(answer.errors[0].contains("503") || answer.errors[0].contains("unavailable"));
}

#[tokio::test]
async fn test_concurrent_queries_share_agent() {
    let h = harness(vec![]);
    let agent = Arc::new(h.agent);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let agent = agent.clone();
            tokio::spawn(async move { agent.process_query("hello").await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().is_well_formed());
    }
}
