//! Trading action emitted by a strategy for a single decision point.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The only three decisions a strategy can make.
///
/// Serialized as `"Buy"`, `"Sell"`, `"Hold"`. Any other label is rejected at
/// parse/deserialize time, so an `Action` value is valid by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl Action {
    /// Canonical priority order used to resolve tied ensemble votes.
    /// The first action in this order wins among equal scores.
    pub const PRIORITY: [Action; 3] = [Action::Buy, Action::Sell, Action::Hold];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "Buy",
            Action::Sell => "Sell",
            Action::Hold => "Hold",
        }
    }

    /// Position of this action in [`Action::PRIORITY`].
    pub fn index(&self) -> usize {
        match self {
            Action::Buy => 0,
            Action::Sell => 1,
            Action::Hold => 2,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a label outside {Buy, Sell, Hold} is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid action '{0}': expected one of Buy, Sell, Hold")]
pub struct ActionParseError(pub String);

impl FromStr for Action {
    type Err = ActionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Buy" => Ok(Action::Buy),
            "Sell" => Ok(Action::Sell),
            "Hold" => Ok(Action::Hold),
            other => Err(ActionParseError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_exact_labels() {
        assert_eq!("Buy".parse::<Action>(), Ok(Action::Buy));
        assert_eq!("Sell".parse::<Action>(), Ok(Action::Sell));
        assert_eq!("Hold".parse::<Action>(), Ok(Action::Hold));
    }

    #[test]
    fn parse_rejects_anything_else() {
        for label in ["buy", "SELL", "", "Short", "Hold "] {
            assert!(label.parse::<Action>().is_err(), "accepted '{label}'");
        }
    }

    #[test]
    fn deserialize_rejects_unknown_label() {
        assert!(serde_json::from_str::<Action>("\"Buy\"").is_ok());
        assert!(serde_json::from_str::<Action>("\"Cover\"").is_err());
    }

    #[test]
    fn priority_order_is_buy_sell_hold() {
        assert_eq!(Action::PRIORITY, [Action::Buy, Action::Sell, Action::Hold]);
        for (i, action) in Action::PRIORITY.iter().enumerate() {
            assert_eq!(action.index(), i);
        }
    }
}
