//! Step sequences for the dashboard, creation and payment flows.
//!
//! Each flow is a fixed ordered list of named steps. Moving forward past the
//! last step or back before the first yields `None`; for `prev` that means the
//! caller leaves the flow.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A flow whose steps advance along a fixed order.
pub trait StepSequence: Copy + Eq + Debug + 'static {
    const ORDER: &'static [Self];

    fn first() -> Self {
        Self::ORDER[0]
    }

    fn position(self) -> usize {
        Self::ORDER
            .iter()
            .position(|s| *s == self)
            .unwrap_or_default()
    }

    fn next(self) -> Option<Self> {
        Self::ORDER.get(self.position() + 1).copied()
    }

    fn prev(self) -> Option<Self> {
        self.position()
            .checked_sub(1)
            .and_then(|i| Self::ORDER.get(i).copied())
    }

    fn is_last(self) -> bool {
        self.position() + 1 == Self::ORDER.len()
    }
}

/// Top-level views of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MainStep {
    Dashboard,
    Pay,
    Create,
    Gateways,
}

impl StepSequence for MainStep {
    const ORDER: &'static [Self] = &[
        MainStep::Dashboard,
        MainStep::Pay,
        MainStep::Create,
        MainStep::Gateways,
    ];
}

/// Creating a payment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreateStep {
    Form,
    Preview,
    Generated,
}

impl StepSequence for CreateStep {
    const ORDER: &'static [Self] = &[CreateStep::Form, CreateStep::Preview, CreateStep::Generated];
}

/// Paying from the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStep {
    Method,
    Details,
    Processing,
    Success,
}

impl StepSequence for PaymentStep {
    const ORDER: &'static [Self] = &[
        PaymentStep::Method,
        PaymentStep::Details,
        PaymentStep::Processing,
        PaymentStep::Success,
    ];
}

/// Paying a shared request through its `/pay/<id>` link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStep {
    Details,
    Method,
    Form,
    Processing,
    Success,
}

impl StepSequence for CheckoutStep {
    const ORDER: &'static [Self] = &[
        CheckoutStep::Details,
        CheckoutStep::Method,
        CheckoutStep::Form,
        CheckoutStep::Processing,
        CheckoutStep::Success,
    ];
}

/// How the payer settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Mobile,
    Web3,
    Wallet,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Card,
        PaymentMethod::Mobile,
        PaymentMethod::Web3,
        PaymentMethod::Wallet,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "Credit Card",
            PaymentMethod::Mobile => "Mobile Pay",
            PaymentMethod::Web3 => "Web3 Wallet",
            PaymentMethod::Wallet => "Digital Wallet",
        }
    }

    /// Web3 requires a connected wallet address.
    pub fn is_available(&self, wallet_connected: bool) -> bool {
        match self {
            PaymentMethod::Web3 => wallet_connected,
            _ => true,
        }
    }
}
