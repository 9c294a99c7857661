//! API request and response types.

use crate::flow::{CheckoutStep, CreateStep, MainStep, PaymentMethod, PaymentStep};
use gateway_store::{Currency, GatewayForm, GatewayId, GatewayStats, PaymentRequest};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub gateway_count: usize,
    pub wallet_configured: bool,
}

/// Query string for listing gateways.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub search: Option<String>,
}

/// Dashboard totals across every gateway.
#[derive(Debug, Serialize)]
pub struct Totals {
    pub gateway_count: usize,
    pub total_received: f64,
    pub total_transactions: u64,
}

/// Gateways plus their stats.
#[derive(Debug, Serialize)]
pub struct GatewayListResponse {
    pub gateways: Vec<PaymentRequest>,
    pub stats: HashMap<GatewayId, GatewayStats>,
    pub totals: Totals,
}

/// Preview of a form before it is generated.
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub step: CreateStep,
    pub form: GatewayForm,
    pub display_amount: Option<String>,
}

/// Result of generating a gateway.
#[derive(Debug, Serialize)]
pub struct CreateGatewayResponse {
    pub step: CreateStep,
    pub gateway: PaymentRequest,
}

/// One gateway and its stats.
#[derive(Debug, Serialize)]
pub struct GatewayDetailResponse {
    pub gateway: PaymentRequest,
    pub stats: GatewayStats,
}

/// Request to record a received payment.
#[derive(Debug, Default, Deserialize)]
pub struct RecordPaymentRequest {
    /// Amount received; defaults to the gateway's requested amount
    #[serde(default)]
    pub amount: Option<f64>,
}

/// Stats after recording a payment.
#[derive(Debug, Serialize)]
pub struct RecordPaymentResponse {
    pub gateway_id: GatewayId,
    pub amount: f64,
    pub stats: GatewayStats,
}

/// Payload for a native share sheet, with the clipboard fallback.
#[derive(Debug, Serialize)]
pub struct ShareResponse {
    pub title: String,
    pub text: String,
    pub url: String,
    pub clipboard_text: String,
}

impl From<&PaymentRequest> for ShareResponse {
    fn from(gateway: &PaymentRequest) -> Self {
        Self {
            title: gateway.title.clone(),
            text: gateway.description.clone(),
            url: gateway.link.clone(),
            clipboard_text: gateway.link.clone(),
        }
    }
}

/// Outcome of asking the wallet for its address.
#[derive(Debug, Serialize)]
pub struct WalletConnectResponse {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A selectable payment method.
#[derive(Debug, Serialize)]
pub struct MethodOption {
    pub id: PaymentMethod,
    pub label: String,
    pub available: bool,
}

/// Query string for the checkout view.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutQuery {
    #[serde(default)]
    pub wallet_address: Option<String>,
}

/// The `/pay/<id>` view.
#[derive(Debug, Serialize)]
pub struct CheckoutViewResponse {
    pub step: CheckoutStep,
    pub gateway: PaymentRequest,
    pub display_amount: Option<String>,
    pub methods: Vec<MethodOption>,
}

/// Shown when a `/pay/<id>` link no longer resolves.
#[derive(Debug, Serialize)]
pub struct NotFoundResponse {
    pub error: String,
    pub code: String,
    pub action: MainStep,
    pub href: String,
}

/// Request to complete a checkout.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub method: PaymentMethod,
    #[serde(default)]
    pub wallet_address: Option<String>,
    /// Overrides the gateway's requested amount
    #[serde(default)]
    pub amount: Option<f64>,
}

/// Completed checkout.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub step: CheckoutStep,
    pub gateway_id: GatewayId,
    pub method: PaymentMethod,
    pub amount: f64,
    pub stats: GatewayStats,
}

/// Request to run a payment from the dashboard.
#[derive(Debug, Deserialize)]
pub struct DirectPaymentRequest {
    pub method: PaymentMethod,
    pub amount: f64,
    #[serde(default)]
    pub wallet_address: Option<String>,
}

/// Completed dashboard payment. Not tied to any gateway.
#[derive(Debug, Serialize)]
pub struct DirectPaymentResponse {
    pub step: PaymentStep,
    pub method: PaymentMethod,
    pub currency: Currency,
    pub amount: f64,
    pub display_amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_fee: Option<f64>,
    pub display_total: String,
}
