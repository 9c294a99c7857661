//! Payment request and statistics types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Identifier of a payment request, embedded in its shareable link.
pub type GatewayId = String;

/// Supported payment denominations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eth,
    Usdc,
    Btc,
    Lisk,
}

impl Currency {
    /// Every supported denomination, in display order.
    pub const ALL: [Currency; 5] = [
        Currency::Usd,
        Currency::Eth,
        Currency::Usdc,
        Currency::Btc,
        Currency::Lisk,
    ];

    /// Uppercase ticker code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eth => "ETH",
            Currency::Usdc => "USDC",
            Currency::Btc => "BTC",
            Currency::Lisk => "LISK",
        }
    }

    /// Whether payments in this currency settle through a wallet.
    pub fn is_crypto(&self) -> bool {
        !matches!(self, Currency::Usd)
    }

    /// Format an amount for display, e.g. `$25.00` or `0.5 ETH`.
    pub fn format_amount(&self, amount: f64) -> String {
        match self {
            Currency::Usd => format!("${:.2}", amount),
            other => format!("{} {}", amount, other.code()),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Currency::ALL
            .into_iter()
            .find(|c| c.code() == upper)
            .ok_or_else(|| format!("Unsupported currency: {}", s))
    }
}

/// User-supplied fields for a new payment request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayForm {
    pub title: String,
    pub description: String,
    /// Requested amount as typed by the creator; may be empty.
    pub amount: String,
    pub recipient_address: String,
    pub currency: Currency,
}

impl GatewayForm {
    pub fn new(title: impl Into<String>, currency: Currency) -> Self {
        Self {
            title: title.into(),
            currency,
            ..Default::default()
        }
    }
}

/// A shareable payment request. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub id: GatewayId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub recipient_address: String,
    #[serde(default)]
    pub currency: Currency,
    /// Data URL of the QR image, empty when encoding failed.
    #[serde(default)]
    pub qr_code: String,
    pub link: String,
    pub created_at: DateTime<Utc>,
}

impl PaymentRequest {
    /// The requested amount as a number, if one was given.
    pub fn requested_amount(&self) -> Option<f64> {
        self.amount
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|a| a.is_finite())
    }

    pub fn has_qr_code(&self) -> bool {
        !self.qr_code.is_empty()
    }

    fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}

/// Running totals for one payment request.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayStats {
    #[serde(default)]
    pub total_received: f64,
    #[serde(default)]
    pub transaction_count: u64,
}

impl GatewayStats {
    /// Add one accepted payment.
    pub fn accumulate(&mut self, amount: f64) {
        self.total_received += amount;
        self.transaction_count += 1;
    }
}

/// Both persisted collections as read by a single load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewaySnapshot {
    pub gateways: Vec<PaymentRequest>,
    pub stats: HashMap<GatewayId, GatewayStats>,
}

impl GatewaySnapshot {
    pub fn get(&self, id: &str) -> Option<&PaymentRequest> {
        self.gateways.iter().find(|g| g.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Stats for an id, zero when no entry exists.
    pub fn stats_for(&self, id: &str) -> GatewayStats {
        self.stats.get(id).copied().unwrap_or_default()
    }

    /// Sum of `total_received` across every stats entry.
    pub fn total_received(&self) -> f64 {
        self.stats.values().map(|s| s.total_received).sum()
    }

    /// Sum of `transaction_count` across every stats entry.
    pub fn total_transactions(&self) -> u64 {
        self.stats.values().map(|s| s.transaction_count).sum()
    }

    /// Case-insensitive match on title or description. An empty term matches everything.
    pub fn search(&self, term: &str) -> Vec<&PaymentRequest> {
        let needle = term.trim().to_lowercase();
        self.gateways
            .iter()
            .filter(|g| needle.is_empty() || g.matches(&needle))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.gateways.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gateways.is_empty()
    }
}
