//! Built-in tool handlers.
//!
//! Handlers validate their own arguments and return [`ToolOutput`] whose
//! `text` is the JSON document handed to the response formatter.

use serde::Serialize;
use serde_json::json;

use crate::chain::{ChainClient, GasEstimate, SUI_COIN_TYPE, SuiAddress, format_mist, parse_mist};
use crate::error::ToolError;
use crate::price::PriceService;

use super::ToolOutput;

/// Action tag attached to transfer results.
pub const TRANSFER_ACTION: &str = "transfer";

fn to_text(value: &impl Serialize) -> Result<String, ToolError> {
    serde_json::to_string(value)
        .map_err(|e| ToolError::upstream(format!("failed to serialize tool output: {e}")))
}

fn parse_recipient(recipient: &str) -> Result<SuiAddress, ToolError> {
    if recipient.trim().is_empty() {
        return Err(ToolError::validation("recipient address is required"));
    }
    recipient.parse::<SuiAddress>().map_err(ToolError::from)
}

fn parse_transfer_amount(amount: &str) -> Result<u64, ToolError> {
    let mist = parse_mist(amount).map_err(ToolError::from)?;
    if mist == 0 {
        return Err(ToolError::validation(
            "transfer amount must be greater than zero",
        ));
    }
    Ok(mist)
}

/// SUI balance of `address`.
///
/// # Errors
///
/// [`ToolError::InvalidArgument`] for an empty address,
/// [`ToolError::Validation`] for a malformed one, and
/// [`ToolError::Upstream`] when the RPC call fails.
pub async fn balance(chain: &dyn ChainClient, address: &str) -> Result<ToolOutput, ToolError> {
    if address.trim().is_empty() {
        return Err(ToolError::invalid_argument("address must not be empty"));
    }
    let owner: SuiAddress = address.parse()?;
    let mist = chain.get_balance(&owner).await?;

    let text = to_text(&json!({
        "address": owner,
        "coin_type": SUI_COIN_TYPE,
        "balance_mist": mist.to_string(),
        "balance_sui": format_mist(mist),
    }))?;
    Ok(ToolOutput::text(text))
}

/// Unsigned transfer of `amount` MIST to `recipient`.
///
/// # Errors
///
/// [`ToolError::Validation`] for a malformed recipient or an amount that is
/// not a positive integer.
pub fn transfer(
    chain: &dyn ChainClient,
    amount: &str,
    recipient: &str,
) -> Result<ToolOutput, ToolError> {
    let mist = parse_transfer_amount(amount)?;
    let to = parse_recipient(recipient)?;
    let tx = chain.build_transfer(to.clone(), mist)?;

    let text = to_text(&json!({
        "action": TRANSFER_ACTION,
        "status": "awaiting_signature",
        "amount_mist": mist.to_string(),
        "amount_sui": format_mist(u128::from(mist)),
        "recipient": to,
        "gas_budget": tx.gas_budget.to_string(),
        "transaction": tx,
    }))?;
    Ok(ToolOutput::text(text).with_transaction(tx, TRANSFER_ACTION))
}

/// USD price of `symbol`.
///
/// # Errors
///
/// [`ToolError::UnsupportedAsset`] for an unmapped symbol,
/// [`ToolError::InvalidArgument`] for a blank one, and
/// [`ToolError::Upstream`] when the price source fails.
pub async fn price(prices: &PriceService, symbol: &str) -> Result<ToolOutput, ToolError> {
    let quote = prices.get_price(symbol).await?;
    Ok(ToolOutput::text(to_text(&quote)?))
}

/// Gas estimate for transferring `amount` MIST to `recipient`.
///
/// # Errors
///
/// Same validation as [`transfer`], plus [`ToolError::Upstream`] when the
/// reference gas price cannot be fetched.
pub async fn estimate_gas(
    chain: &dyn ChainClient,
    amount: &str,
    recipient: &str,
) -> Result<ToolOutput, ToolError> {
    let mist = parse_transfer_amount(amount)?;
    let to = parse_recipient(recipient)?;
    let tx = chain.build_transfer(to.clone(), mist)?;
    let GasEstimate {
        reference_gas_price,
        computation_units,
        computation_cost_mist,
        gas_budget,
        within_budget,
    } = chain.estimate_gas(&tx).await?;

    let text = to_text(&json!({
        "recipient": to,
        "amount_mist": mist.to_string(),
        "reference_gas_price": reference_gas_price,
        "computation_units": computation_units,
        "estimated_fee_mist": computation_cost_mist.to_string(),
        "estimated_fee_sui": format_mist(u128::from(computation_cost_mist)),
        "gas_budget": gas_budget.to_string(),
        "within_budget": within_budget,
    }))?;
    Ok(ToolOutput::text(text))
}
