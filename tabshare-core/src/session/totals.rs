//! Session totals input
//!
//! Totals arrive either as fixed figures from the ingestion process or as a
//! subtotal with tax and tip rates that are resolved here.

use serde::{Deserialize, Serialize};

use super::TotalInfo;
use crate::error::SessionError;

/// How a session's `totalInfo` is supplied
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TotalsInput {
    /// Pre-summed figures, stored as given
    Fixed(TotalInfo),
    /// Derived: `tax = subtotal × tax_rate`, `tip = subtotal × tip_rate`,
    /// `total = subtotal + tax + tip`. Rates are fractions (0.0825 for 8.25%).
    /// Without an explicit subtotal the item subtotal is used.
    Rates {
        #[serde(default)]
        subtotal: Option<f64>,
        tax_rate: f64,
        tip_rate: f64,
    },
}

impl TotalsInput {
    /// Resolve into stored figures
    pub fn resolve(&self, items_subtotal: f64) -> Result<TotalInfo, SessionError> {
        match *self {
            TotalsInput::Fixed(totals) => {
                for (name, value) in [
                    ("total", totals.total),
                    ("tax", totals.tax),
                    ("tip", totals.tip),
                ] {
                    non_negative(name, value)?;
                }
                Ok(totals)
            }
            TotalsInput::Rates {
                subtotal,
                tax_rate,
                tip_rate,
            } => {
                let subtotal = subtotal.unwrap_or(items_subtotal);
                non_negative("subtotal", subtotal)?;
                non_negative("tax_rate", tax_rate)?;
                non_negative("tip_rate", tip_rate)?;

                let tax = subtotal * tax_rate;
                let tip = subtotal * tip_rate;
                Ok(TotalInfo::new(subtotal + tax + tip, tax, tip))
            }
        }
    }
}

fn non_negative(name: &str, value: f64) -> Result<(), SessionError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SessionError::InvalidArgument(format!(
            "{} must be a non-negative number, got {}",
            name, value
        )))
    }
}
