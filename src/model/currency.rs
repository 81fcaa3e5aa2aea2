//! Currency codes for display formatting.
//!
//! Amounts in this crate are plain scalars; a group's currency only matters
//! when an amount is rendered for the user. There is no conversion between
//! currencies.

use crate::model::Amount;
use serde::{Deserialize, Serialize};

/// ISO 4217 currency codes supported for group display.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US Dollar
    #[default]
    Usd,
    /// Euro
    Eur,
    /// British Pound
    Gbp,
    /// Japanese Yen
    Jpy,
    /// Indian Rupee
    Inr,
}

serde_plain::derive_display_from_serialize!(Currency);
serde_plain::derive_fromstr_from_deserialize!(Currency);

impl Currency {
    /// The symbol prefixed to formatted amounts.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Jpy => "¥",
            Currency::Inr => "₹",
        }
    }

    /// Formats an amount for human-facing output, e.g. `-$1,250.00`.
    pub fn format(&self, amount: Amount) -> String {
        if amount.is_negative() {
            format!("-{}{}", self.symbol(), amount.abs().display_pretty())
        } else {
            format!("{}{}", self.symbol(), amount.display_pretty())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_and_display() {
        assert_eq!(Currency::from_str("USD").unwrap(), Currency::Usd);
        assert_eq!(Currency::from_str("EUR").unwrap(), Currency::Eur);
        assert_eq!(Currency::Gbp.to_string(), "GBP");
        assert!(Currency::from_str("XYZ").is_err());
    }

    #[test]
    fn test_format_positive() {
        let formatted = Currency::Usd.format(Amount::from_minor_units(123450));
        assert_eq!(formatted, "$1,234.50");
    }

    #[test]
    fn test_format_negative() {
        let formatted = Currency::Eur.format(Amount::from_minor_units(-5000));
        assert_eq!(formatted, "-€50.00");
    }
}
