//! Deterministic short-circuits and argument extraction.
//!
//! These run before the LLM. A pattern either produces a complete
//! [`IntentResult`] or nothing; partial or ambiguous matches fail closed and
//! leave the decision to the model.

use std::sync::LazyLock;

use regex::Regex;

use crate::chain::parse_sui_amount;
use crate::tool::{CONNECTED_WALLET, ToolKind};

use super::IntentResult;

static GREETING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:hi|hello|hey|greetings)\b").expect("valid regex"));

static OFF_TOPIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:weather|time|date|forecast|clock)\b").expect("valid regex")
});

static TRANSFER_VERB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:transfer|send)\b").expect("valid regex"));

static TRANSFER_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:transfer|send)\s+(-?\d[\d,_]*(?:\.\d+)?)\s*([a-z][a-z0-9_]*)?")
        .expect("valid regex")
});

static RECIPIENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bto\s+(\S+)").expect("valid regex"));

static BALANCE_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:balance|portfolio|holdings)\b").expect("valid regex")
});

static HEX_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"0x[a-fA-F0-9]+").expect("valid regex"));

static MY_WALLET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bmy\s+(?:sui\s+)?(?:wallet|balance|portfolio|holdings)\b")
        .expect("valid regex")
});

static PRICE_OF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bprice\s+(?:of|for)\s+(?:the\s+)?\$?([a-z][a-z0-9]{1,9})\b")
        .expect("valid regex")
});

static SYMBOL_PRICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z0-9$])\$?([a-z][a-z0-9]{1,9})\s+price\b").expect("valid regex")
});

/// Words that can precede "price" without naming a token.
const NOT_SYMBOLS: &[&str] = &[
    "the", "current", "latest", "token", "coin", "what", "whats", "market", "today", "gas",
    "best", "spot", "live", "its", "your", "a", "an",
];

/// Whether the query opens with a greeting.
#[must_use]
pub fn is_greeting(query: &str) -> bool {
    GREETING.is_match(query)
}

/// Whether the query is about weather, time or dates.
#[must_use]
pub fn is_off_topic(query: &str) -> bool {
    OFF_TOPIC.is_match(query)
}

fn clean_address(raw: &str) -> String {
    raw.trim_end_matches(['.', ',', '!', '?', ';', ':', ')', '"', '\''])
        .to_owned()
}

fn transfer(query: &str) -> Option<IntentResult> {
    let verb = TRANSFER_VERB.find(query)?;

    let amount = TRANSFER_AMOUNT.captures(query);
    let (amount_text, search_from) = match &amount {
        Some(caps) => {
            let amount = caps.get(1)?;
            // "1.5.3" and similar leave numeric debris behind; fail closed.
            if query[amount.end()..]
                .chars()
                .next()
                .is_some_and(|c| !c.is_whitespace() && !c.is_ascii_alphabetic())
            {
                return None;
            }
            if let Some(token) = caps.get(2) {
                let token = token.as_str();
                if !token.eq_ignore_ascii_case("to") && !token.eq_ignore_ascii_case("sui") {
                    return None;
                }
            }
            (Some(amount.as_str()), amount.end())
        }
        None => (None, verb.end()),
    };

    let recipient = RECIPIENT
        .captures(&query[search_from..])
        .and_then(|caps| caps.get(1))
        .map(|m| clean_address(m.as_str()))
        .filter(|r| !r.is_empty());

    match (amount_text, recipient) {
        (Some(amount), Some(recipient)) => {
            // Unparseable amounts go through verbatim so the tool reports them.
            let mist = parse_sui_amount(amount).map_or_else(|_| amount.to_owned(), |m| m.to_string());
            Some(IntentResult::tool(
                ToolKind::Transfer.as_str(),
                vec![mist, recipient],
            ))
        }
        (Some(_), None) => Some(IntentResult::needs_info(
            vec!["recipient_address".into()],
            "I need the recipient's address to process the transfer.",
        )),
        (None, Some(_)) => Some(IntentResult::needs_info(
            vec!["amount".into()],
            "How much SUI would you like to transfer?",
        )),
        (None, None) => None,
    }
}

fn balance(query: &str) -> Option<IntentResult> {
    if BALANCE_KEYWORD.is_match(query)
        && let Some(address) = HEX_ADDRESS.find(query)
    {
        return Some(IntentResult::tool(
            ToolKind::Balance.as_str(),
            vec![address.as_str().to_owned()],
        ));
    }
    if MY_WALLET.is_match(query) {
        return Some(IntentResult::tool(
            ToolKind::Balance.as_str(),
            vec![CONNECTED_WALLET.to_owned()],
        ));
    }
    None
}

fn price(query: &str) -> Option<IntentResult> {
    let symbol = PRICE_OF
        .captures(query)
        .or_else(|| SYMBOL_PRICE.captures(query))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_ascii_uppercase())
        .filter(|s| !NOT_SYMBOLS.contains(&s.to_ascii_lowercase().as_str()))?;

    Some(IntentResult::tool(ToolKind::Price.as_str(), vec![symbol]))
}

/// Extract a tool call or missing-information request from `query`.
///
/// Tried in order: transfer, balance, price. Returns `None` when nothing
/// matches cleanly, including transfers of tokens other than SUI.
#[must_use]
pub fn extract(query: &str) -> Option<IntentResult> {
    transfer(query)
        .or_else(|| balance(query))
        .or_else(|| price(query))
}
