//! The user-facing answer shape.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::chain::UnsignedTransaction;

/// Reasoning attached to answers that skipped the formatter.
pub const DIRECT_REASONING: &str = "Direct response";

/// Error entry for needs-info answers.
pub const INSUFFICIENT_INFORMATION: &str = "Insufficient information";

/// Outcome of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The request was answered.
    #[default]
    Success,
    /// The request could not be completed.
    Failure,
}

impl Status {
    /// Wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

/// Final answer returned for every query.
///
/// Well-formed answers satisfy three rules: a failure carries at least one
/// error, a success carries a non-empty response, and an attached
/// transaction always sets `requiresWallet`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Short explanation of how the answer was produced.
    pub reasoning: String,
    /// Text shown to the user.
    pub response: String,
    /// Overall outcome.
    pub status: Status,
    /// The original query.
    pub query: String,
    /// Error messages, empty on success.
    #[serde(default)]
    pub errors: Vec<String>,
    /// Unsigned transaction awaiting a wallet signature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction: Option<UnsignedTransaction>,
    /// Action tag for the host, such as `"transfer"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Whether the host must route the answer through a wallet.
    #[serde(
        default,
        rename = "requiresWallet",
        skip_serializing_if = "Option::is_none"
    )]
    pub requires_wallet: Option<bool>,
}

impl AgentResponse {
    /// A successful answer.
    #[must_use]
    pub fn success(
        query: impl Into<String>,
        response: impl Into<String>,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            reasoning: reasoning.into(),
            response: response.into(),
            status: Status::Success,
            query: query.into(),
            errors: Vec::new(),
            transaction: None,
            action: None,
            requires_wallet: None,
        }
    }

    /// A successful answer produced without the formatter.
    #[must_use]
    pub fn direct(query: impl Into<String>, response: impl Into<String>) -> Self {
        Self::success(query, response, DIRECT_REASONING)
    }

    /// A failed answer carrying `error`.
    #[must_use]
    pub fn failure(query: impl Into<String>, error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            reasoning: "Request failed".to_owned(),
            response: error.clone(),
            status: Status::Failure,
            query: query.into(),
            errors: vec![error],
            transaction: None,
            action: None,
            requires_wallet: None,
        }
    }

    /// An answer asking the user for the `missing` fields.
    ///
    /// `message` is the classifier's own question; it is kept after the
    /// generated line when present.
    #[must_use]
    pub fn needs_info(query: impl Into<String>, missing: &[String], message: Option<&str>) -> Self {
        let list = if missing.is_empty() {
            "details".to_owned()
        } else {
            missing.join(", ")
        };
        let mut response =
            format!("I need more information to complete this request. Missing: {list}");
        if let Some(message) = message.map(str::trim).filter(|m| !m.is_empty()) {
            response.push(' ');
            response.push_str(message);
        }

        Self {
            reasoning: "Missing required information".to_owned(),
            response,
            status: Status::Failure,
            query: query.into(),
            errors: vec![INSUFFICIENT_INFORMATION.to_owned()],
            transaction: None,
            action: None,
            requires_wallet: None,
        }
    }

    /// The formatter's fallback: the raw tool result, passed through.
    #[must_use]
    pub fn fallback(query: impl Into<String>, raw_result: impl Into<String>) -> Self {
        Self::direct(query, raw_result)
    }

    /// Attach an unsigned transaction for the wallet to sign.
    #[must_use]
    pub fn with_transaction(
        mut self,
        transaction: UnsignedTransaction,
        action: impl Into<String>,
    ) -> Self {
        self.transaction = Some(transaction);
        self.action = Some(action.into());
        self.requires_wallet = Some(true);
        self
    }

    /// Force failure status and record `error`.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.status = Status::Failure;
        let error = error.into();
        if !self.errors.contains(&error) {
            self.errors.push(error);
        }
        self
    }

    /// Whether the answer succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, Status::Success)
    }

    /// Check the three shape rules.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let status_ok = match self.status {
            Status::Success => !self.response.trim().is_empty(),
            Status::Failure => !self.errors.is_empty(),
        };
        status_ok && (self.transaction.is_none() || self.requires_wallet == Some(true))
    }

    /// Repair whatever shape rule is broken.
    #[must_use]
    pub fn into_well_formed(mut self) -> Self {
        if self.status == Status::Success && self.response.trim().is_empty() {
            self.status = Status::Failure;
            self.errors.push("Empty response".to_owned());
        }
        if self.status == Status::Failure && self.errors.is_empty() {
            self.errors.push("Unknown error".to_owned());
        }
        if self.response.trim().is_empty() {
            self.response = self.errors.join("; ");
        }
        if self.transaction.is_some() {
            self.requires_wallet = Some(true);
        }
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::chain::{DEFAULT_GAS_BUDGET, SuiAddress};

    const ADDR: &str = "0x7d20dcdb2bca4f508ea9613994683eb4e76e9c4ed371169571c9e2ac3e4a1aeb";

    fn transaction() -> UnsignedTransaction {
        let recipient: SuiAddress = ADDR.parse().unwrap();
        UnsignedTransaction::transfer_sui(recipient, 1_000, DEFAULT_GAS_BUDGET).unwrap()
    }

    mod constructors {
        use super::*;

        #[test]
        fn direct_is_success_without_errors() {
            let response = AgentResponse::direct("hi", "hello");
            assert!(response.is_success());
            assert_eq!(response.reasoning, DIRECT_REASONING);
            assert!(response.errors.is_empty());
            assert!(response.is_well_formed());
        }

        #[test]
        fn needs_info_lists_missing_fields() {
            let response = AgentResponse::needs_info(
                "send 1 sui",
                &["recipient_address".to_owned()],
                Some("Who should receive it?"),
            );
            assert_eq!(response.status, Status::Failure);
            assert_eq!(response.errors, vec![INSUFFICIENT_INFORMATION.to_owned()]);
            assert!(response.response.contains("Missing: recipient_address"));
            assert!(response.response.ends_with("Who should receive it?"));
        }

        #[test]
        fn failure_keeps_message() {
            let response = AgentResponse::failure("q", "UpstreamError: boom");
            assert_eq!(response.errors, vec!["UpstreamError: boom".to_owned()]);
            assert!(response.is_well_formed());
        }

        #[test]
        fn with_error_does_not_duplicate() {
            let response = AgentResponse::failure("q", "x").with_error("x");
            assert_eq!(response.errors.len(), 1);
        }
    }

    mod shape {
        use super::*;

        #[test]
        fn empty_success_is_malformed_and_repaired() {
            let response = AgentResponse::direct("q", "   ");
            assert!(!response.is_well_formed());

            let repaired = response.into_well_formed();
            assert_eq!(repaired.status, Status::Failure);
            assert!(repaired.is_well_formed());
        }

        #[test]
        fn transaction_requires_wallet() {
            let mut response =
                AgentResponse::direct("q", "ready").with_transaction(transaction(), "transfer");
            assert!(response.is_well_formed());

            response.requires_wallet = None;
            assert!(!response.is_well_formed());
            assert_eq!(response.into_well_formed().requires_wallet, Some(true));
        }

        #[test]
        fn serializes_camel_case_wallet_flag() {
            let json = serde_json::to_value(
                AgentResponse::direct("q", "ready").with_transaction(transaction(), "transfer"),
            )
            .unwrap();
            assert_eq!(json["status"], "success");
            assert_eq!(json["requiresWallet"], true);
            assert_eq!(json["action"], "transfer");
            assert_eq!(json["transaction"]["kind"], "ProgrammableTransaction");
        }

        #[test]
        fn optional_fields_are_omitted() {
            let json = serde_json::to_value(AgentResponse::direct("q", "a")).unwrap();
            assert!(json.get("transaction").is_none());
            assert!(json.get("requiresWallet").is_none());
            assert_eq!(json["errors"], serde_json::json!([]));
        }
    }
}
