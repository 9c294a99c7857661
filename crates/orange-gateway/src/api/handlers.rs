//! HTTP request handlers.

use super::types::{
    CheckoutQuery, CheckoutRequest, CheckoutResponse, CheckoutViewResponse,
    CreateGatewayResponse, DirectPaymentRequest, DirectPaymentResponse, GatewayDetailResponse, GatewayListResponse, HealthResponse, ListQuery,
    MethodOption, NotFoundResponse, PreviewResponse, RecordPaymentRequest, RecordPaymentResponse,
    ShareResponse, Totals, WalletConnectResponse,
};
use super::AppState;
use crate::error::ApiError;
use crate::flow::{CheckoutStep, CreateStep, MainStep, PaymentMethod, PaymentStep, StepSequence};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gateway_store::{Currency, GatewayForm, PaymentRequest};
use tracing::{info, warn};

/// Estimated gas added to web3 payments, in ETH.
const WEB3_NETWORK_FEE: f64 = 0.002;

/// Shown when no wallet bridge is configured.
const NO_WALLET_MESSAGE: &str = "Please install MetaMask or another Web3 wallet!";

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.store.load_all().await;

    Json(HealthResponse {
        status: "ok".to_string(),
        gateway_count: snapshot.len(),
        wallet_configured: state.wallet.is_some(),
    })
}

/// List gateways with stats and dashboard totals.
pub async fn list_gateways(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<GatewayListResponse> {
    let snapshot = state.store.load_all().await;

    let totals = Totals {
        gateway_count: snapshot.len(),
        total_received: snapshot.total_received(),
        total_transactions: snapshot.total_transactions(),
    };

    let gateways = snapshot
        .search(query.search.as_deref().unwrap_or_default())
        .into_iter()
        .cloned()
        .collect();

    Json(GatewayListResponse {
        gateways,
        stats: snapshot.stats.clone(),
        totals,
    })
}

/// Validate a form and show it back before generating.
pub async fn preview_gateway(Json(form): Json<GatewayForm>) -> Result<Json<PreviewResponse>, ApiError> {
    validate_form(&form)?;

    let display_amount = display_amount(&form.amount, form.currency);

    Ok(Json(PreviewResponse {
        step: CreateStep::Form.next().unwrap_or(CreateStep::Preview),
        form,
        display_amount,
    }))
}

/// Generate a new payment gateway.
pub async fn create_gateway(
    State(state): State<AppState>,
    Json(form): Json<GatewayForm>,
) -> Result<(StatusCode, Json<CreateGatewayResponse>), ApiError> {
    validate_form(&form)?;

    let gateway = state.store.create_gateway(form).await;
    info!(gateway_id = %gateway.id, link = %gateway.link, "Gateway generated");

    Ok((
        StatusCode::CREATED,
        Json(CreateGatewayResponse {
            step: CreateStep::Generated,
            gateway,
        }),
    ))
}

/// Get one gateway with its stats.
pub async fn get_gateway(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GatewayDetailResponse>, ApiError> {
    let (gateway, stats) = state.store.get(&id).await.ok_or(ApiError::NotFound(id))?;

    Ok(Json(GatewayDetailResponse { gateway, stats }))
}

/// Delete a gateway and its stats.
pub async fn delete_gateway(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    state.store.delete_gateway(&id).await;
    StatusCode::NO_CONTENT
}

/// Record a payment received against a gateway.
pub async fn record_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<Json<RecordPaymentResponse>, ApiError> {
    let amount = match request.amount {
        Some(amount) => amount,
        None => {
            let (gateway, _) = state
                .store
                .get(&id)
                .await
                .ok_or_else(|| ApiError::NotFound(id.clone()))?;
            requested_amount(&gateway)?
        }
    };

    let stats = state.store.record_payment(&id, amount).await?;

    Ok(Json(RecordPaymentResponse {
        gateway_id: id,
        amount,
        stats,
    }))
}

/// Share-sheet payload for a gateway.
pub async fn share_gateway(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ShareResponse>, ApiError> {
    let (gateway, _) = state.store.get(&id).await.ok_or(ApiError::NotFound(id))?;

    Ok(Json(ShareResponse::from(&gateway)))
}

/// Ask the wallet bridge for the connected address.
pub async fn connect_wallet(
    State(state): State<AppState>,
) -> Result<Json<WalletConnectResponse>, ApiError> {
    let Some(wallet) = state.wallet.as_ref() else {
        info!("Wallet connect requested but no wallet bridge is configured");
        return Ok(Json(WalletConnectResponse {
            connected: false,
            address: None,
            message: Some(NO_WALLET_MESSAGE.to_string()),
        }));
    };

    let address = wallet.connected_address().await.map_err(|e| {
        warn!("Failed to connect wallet: {}", e);
        ApiError::from(e)
    })?;

    info!(address = %address, "Wallet connected");

    Ok(Json(WalletConnectResponse {
        connected: true,
        address: Some(address),
        message: None,
    }))
}

/// The `/pay/<id>` view.
pub async fn checkout_view(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<CheckoutQuery>,
) -> Response {
    let Some((gateway, _)) = state.store.get(&id).await else {
        return not_found(&id);
    };

    let wallet_connected = has_wallet(query.wallet_address.as_deref());
    let methods = PaymentMethod::ALL
        .iter()
        .map(|m| MethodOption {
            id: *m,
            label: m.label().to_string(),
            available: m.is_available(wallet_connected),
        })
        .collect();

    Json(CheckoutViewResponse {
        step: CheckoutStep::first(),
        display_amount: display_amount(&gateway.amount, gateway.currency),
        gateway,
        methods,
    })
    .into_response()
}

/// Pay a shared gateway: form -> processing -> success.
pub async fn checkout(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Response, ApiError> {
    let Some((gateway, _)) = state.store.get(&id).await else {
        return Ok(not_found(&id));
    };

    if !request
        .method
        .is_available(has_wallet(request.wallet_address.as_deref()))
    {
        return Err(ApiError::MethodUnavailable(format!(
            "{} requires a connected wallet",
            request.method.label()
        )));
    }

    let amount = match request.amount {
        Some(amount) => amount,
        None => requested_amount(&gateway)?,
    };
    if !amount.is_finite() || amount < 0.0 {
        return Err(ApiError::InvalidAmount(amount.to_string()));
    }

    let mut step = CheckoutStep::Form;
    step = step.next().unwrap_or(CheckoutStep::Processing);
    info!(gateway_id = %id, method = ?request.method, ?step, amount, "Processing checkout");

    tokio::time::sleep(state.processing_delay).await;

    let stats = state.store.record_payment(&id, amount).await?;
    step = step.next().unwrap_or(CheckoutStep::Success);

    info!(gateway_id = %id, ?step, "Checkout complete");

    Ok(Json(CheckoutResponse {
        step,
        gateway_id: id,
        method: request.method,
        amount,
        stats,
    })
    .into_response())
}

/// Dashboard pay: method -> details -> processing -> success.
///
/// Settles nothing and leaves every gateway's stats untouched.
pub async fn pay(
    State(state): State<AppState>,
    Json(request): Json<DirectPaymentRequest>,
) -> Result<Json<DirectPaymentResponse>, ApiError> {
    let mut step = PaymentStep::first();

    if !request
        .method
        .is_available(has_wallet(request.wallet_address.as_deref()))
    {
        return Err(ApiError::MethodUnavailable(format!(
            "{} requires a connected wallet",
            request.method.label()
        )));
    }
    step = step.next().unwrap_or(PaymentStep::Details);

    let amount = request.amount;
    if !amount.is_finite() || amount < 0.0 {
        return Err(ApiError::InvalidAmount(amount.to_string()));
    }

    let currency = if request.method == PaymentMethod::Web3 {
        Currency::Eth
    } else {
        Currency::Usd
    };
    let network_fee = currency.is_crypto().then_some(WEB3_NETWORK_FEE);
    let display_total = match network_fee {
        Some(fee) => format!("{:.3} {}", amount + fee, currency.code()),
        None => currency.format_amount(amount),
    };

    step = step.next().unwrap_or(PaymentStep::Processing);
    info!(method = ?request.method, ?step, amount, "Processing payment");

    tokio::time::sleep(state.processing_delay).await;
    step = step.next().unwrap_or(PaymentStep::Success);

    Ok(Json(DirectPaymentResponse {
        step,
        method: request.method,
        currency,
        amount,
        display_amount: currency.format_amount(amount),
        network_fee,
        display_total,
    }))
}

fn validate_form(form: &GatewayForm) -> Result<(), ApiError> {
    if form.title.trim().is_empty() {
        return Err(ApiError::InvalidRequest("title is required".into()));
    }
    Ok(())
}

fn requested_amount(gateway: &PaymentRequest) -> Result<f64, ApiError> {
    gateway.requested_amount().ok_or_else(|| {
        ApiError::InvalidAmount(format!("gateway {} has no requested amount", gateway.id))
    })
}

fn display_amount(amount: &str, currency: Currency) -> Option<String> {
    amount
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|a| a.is_finite())
        .map(|a| currency.format_amount(a))
}

fn has_wallet(address: Option<&str>) -> bool {
    address.is_some_and(|a| !a.trim().is_empty())
}

fn not_found(id: &str) -> Response {
    let body = NotFoundResponse {
        error: format!("Payment gateway not found: {}", id),
        code: "NOT_FOUND".to_string(),
        action: MainStep::Dashboard,
        href: "/".to_string(),
    };

    (StatusCode::NOT_FOUND, Json(body)).into_response()
}
