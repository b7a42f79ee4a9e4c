//! Treasury positions and derived aggregates

use serde::{Deserialize, Serialize};

/// A single yield position held by the treasury.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreasuryPosition {
    pub name: String,
    pub protocol: String,
    /// Token balance as a decimal string
    pub balance: String,
    /// Value in the reporting currency
    #[serde(default)]
    pub value: f64,
    /// Annual yield as a percentage string, e.g. `"4.25%"`
    pub apy: String,
}

/// Authoritative totals from `GET treasury/portfolio`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_value: f64,
}

/// Collateral locked against the account versus what is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusLockBalance {
    #[serde(default)]
    pub locked_amount: f64,
    #[serde(default)]
    pub required_amount: f64,
    #[serde(default)]
    deficit: Option<f64>,
    #[serde(default)]
    pub last_calculated_at: Option<String>,
}

impl BusLockBalance {
    /// Shortfall of locked collateral, never negative.
    #[must_use]
    pub fn deficit(&self) -> f64 {
        self.deficit
            .unwrap_or(self.required_amount - self.locked_amount)
            .max(0.0)
    }
}

/// Parses `"4.5%"`, `"4.5 %"` or `"4.5"` into `4.5`.
///
/// Anything unparseable, including non-finite values, yields `0.0`.
#[must_use]
pub fn parse_percentage(raw: &str) -> f64 {
    raw.trim()
        .trim_end_matches('%')
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Arithmetic mean APY over the loaded positions, `0.0` when there are none.
#[must_use]
#[allow(clippy::cast_precision_loss)] // position counts are far below 2^52
pub fn average_apy(positions: &[TreasuryPosition]) -> f64 {
    if positions.is_empty() {
        return 0.0;
    }
    let sum: f64 = positions
        .iter()
        .map(|position| parse_percentage(&position.apy))
        .sum();
    sum / positions.len() as f64
}

/// Two-decimal rendering used by every aggregate display.
#[must_use]
pub fn format_percentage(value: f64) -> String {
    format!("{value:.2}%")
}
