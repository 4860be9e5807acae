//! Unsigned Sui programmable transactions.
//!
//! The core never signs. A transfer is returned as a description of the
//! programmable transaction the wallet must build and sign:
//!
//! ```text
//! inputs:   [Pure(u64 amount), Pure(address recipient)]
//! commands: SplitCoins(GasCoin, [Input(0)])
//!           TransferObjects([NestedResult(0, 0)], Input(1))
//! ```

use serde::{Deserialize, Serialize};

use super::address::SuiAddress;
use super::ChainError;

/// Gas budget used when none is configured, in MIST.
pub const DEFAULT_GAS_BUDGET: u64 = 20_000_000;

/// A pure (BCS-encodable) input value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "valueType", content = "value", rename_all = "lowercase")]
pub enum PureValue {
    /// Unsigned 64-bit integer, rendered as a decimal string.
    U64(#[serde(with = "u64_string")] u64),
    /// Account address.
    Address(SuiAddress),
}

/// Transaction input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallArg {
    /// Pure value input.
    Pure(PureValue),
}

/// Reference to a value inside the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Argument {
    /// The gas coin.
    GasCoin,
    /// One of the transaction inputs.
    Input(u16),
    /// A command's result.
    Result(u16),
    /// One element of a command's multi-value result.
    NestedResult(u16, u16),
}

/// A programmable transaction command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Split `amounts` off `coin`.
    SplitCoins(Argument, Vec<Argument>),
    /// Transfer `objects` to `recipient`.
    TransferObjects(Vec<Argument>, Argument),
}

/// An unsigned programmable transaction ready for wallet signing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTransaction {
    /// Transaction kind tag.
    pub kind: String,
    /// Sender, when known. The signing wallet fills it in otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<SuiAddress>,
    /// Inputs referenced by the commands.
    pub inputs: Vec<CallArg>,
    /// Commands, executed in order.
    pub commands: Vec<Command>,
    /// Gas budget in MIST.
    #[serde(with = "u64_string")]
    pub gas_budget: u64,
}

impl UnsignedTransaction {
    /// Build a SUI transfer: split `amount_mist` off the gas coin and send it
    /// to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::InvalidAmount`] when `amount_mist` is zero or the
    /// gas budget is zero.
    pub fn transfer_sui(
        recipient: SuiAddress,
        amount_mist: u64,
        gas_budget: u64,
    ) -> Result<Self, ChainError> {
        if amount_mist == 0 {
            return Err(ChainError::InvalidAmount(
                "transfer amount must be greater than zero".into(),
            ));
        }
        if gas_budget == 0 {
            return Err(ChainError::InvalidAmount(
                "gas budget must be greater than zero".into(),
            ));
        }

        Ok(Self {
            kind: "ProgrammableTransaction".into(),
            sender: None,
            inputs: vec![
                CallArg::Pure(PureValue::U64(amount_mist)),
                CallArg::Pure(PureValue::Address(recipient)),
            ],
            commands: vec![
                Command::SplitCoins(Argument::GasCoin, vec![Argument::Input(0)]),
                Command::TransferObjects(vec![Argument::NestedResult(0, 0)], Argument::Input(1)),
            ],
            gas_budget,
        })
    }

    /// Set the sender.
    #[must_use]
    pub fn with_sender(mut self, sender: SuiAddress) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Total MIST split off the gas coin.
    #[must_use]
    pub fn transfer_amount(&self) -> u64 {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                Command::SplitCoins(_, amounts) => Some(amounts),
                Command::TransferObjects(..) => None,
            })
            .flatten()
            .filter_map(|arg| match arg {
                Argument::Input(i) => self.inputs.get(usize::from(*i)),
                _ => None,
            })
            .map(|input| match input {
                CallArg::Pure(PureValue::U64(v)) => *v,
                CallArg::Pure(PureValue::Address(_)) => 0,
            })
            .sum()
    }

    /// Recipient of the first `TransferObjects` command.
    #[must_use]
    pub fn recipient(&self) -> Option<&SuiAddress> {
        self.commands.iter().find_map(|cmd| match cmd {
            Command::TransferObjects(_, Argument::Input(i)) => {
                match self.inputs.get(usize::from(*i)) {
                    Some(CallArg::Pure(PureValue::Address(addr))) => Some(addr),
                    _ => None,
                }
            }
            _ => None,
        })
    }
}

mod u64_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn recipient() -> SuiAddress {
        format!("0x{}", "ab".repeat(32)).parse().unwrap()
    }

    #[test]
    fn transfer_layout() {
        let tx = UnsignedTransaction::transfer_sui(recipient(), 1_000_000_000, DEFAULT_GAS_BUDGET)
            .unwrap();

        assert_eq!(tx.inputs.len(), 2);
        assert_eq!(tx.commands.len(), 2);
        assert!(matches!(tx.commands[0], Command::SplitCoins(Argument::GasCoin, _)));
        assert_eq!(tx.transfer_amount(), 1_000_000_000);
        assert_eq!(tx.recipient(), Some(&recipient()));
        assert_eq!(tx.gas_budget, 20_000_000);
    }

    #[test]
    fn zero_amount_rejected() {
        let err = UnsignedTransaction::transfer_sui(recipient(), 0, DEFAULT_GAS_BUDGET).unwrap_err();
        assert!(matches!(err, ChainError::InvalidAmount(_)));
    }

    #[test]
    fn json_shape() {
        let tx = UnsignedTransaction::transfer_sui(recipient(), 5, 100).unwrap();
        let json = serde_json::to_value(&tx).unwrap();

        assert_eq!(json["kind"], "ProgrammableTransaction");
        assert_eq!(json["gasBudget"], "100");
        assert_eq!(json["inputs"][0]["Pure"]["valueType"], "u64");
        assert_eq!(json["inputs"][0]["Pure"]["value"], "5");
        assert_eq!(json["inputs"][1]["Pure"]["valueType"], "address");
        assert_eq!(json["commands"][0]["SplitCoins"][0], "GasCoin");
        assert!(json.get("sender").is_none());

        let back: UnsignedTransaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, tx);
    }
}
