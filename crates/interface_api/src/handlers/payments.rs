//! Gateway payment handlers
//!
//! Checkout creates a gateway order for a payable installment; completion
//! arrives from the client confirm call or from a signed webhook. Either
//! path settles the premium atomically with the payment record.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use serde_json::json;
use tracing::{info, warn};

use core_kernel::{CallerIdentity, PremiumId};
use domain_billing::{GatewayKind, GatewayPayment, PaymentGateway, PaymentMethod};

use crate::dto::payments::{
    CheckoutRequest, CheckoutResponse, ConfirmPaymentRequest, PaymentResponse, WebhookEvent,
};
use crate::error::ApiError;
use crate::handlers::premiums::load_visible_premium;
use crate::response::ApiResponse;
use crate::validation::validate_request;
use crate::AppState;

/// Header carrying the hex HMAC signature on webhook calls
pub const WEBHOOK_SIGNATURE_HEADER: &str = "x-webhook-signature";

/// POST /api/v1/payments/orders
pub async fn checkout(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CheckoutResponse>>), ApiError> {
    let kind = GatewayKind::parse(&request.gateway)
        .ok_or_else(|| ApiError::invalid_field("gateway", "Unknown payment gateway"))?;

    let installment =
        load_visible_premium(&state, &caller, PremiumId::from(request.premium_id)).await?;
    if !installment.status.is_payable() {
        return Err(ApiError::Conflict(format!(
            "Premium '{}' is not in a payable state",
            installment.id
        )));
    }

    let gateway = state.gateway(kind);
    let order = gateway.create_order(installment.final_amount).await?;

    let payment = GatewayPayment::new(
        installment.id,
        caller.user_id,
        kind,
        order.order_id,
        installment.final_amount,
    );
    state.payments().insert(&payment).await?;

    info!(order_id = %payment.order_id, premium_id = %installment.id, "Checkout started");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(CheckoutResponse {
            payment: PaymentResponse::from(&payment),
            amount_minor: order.amount_minor,
        })),
    ))
}

/// POST /api/v1/payments/confirm
///
/// Client-side completion. The signature covers the order id and must
/// come from the gateway's secret; settlement then runs atomically, so a
/// replayed confirm surfaces as a conflict.
pub async fn confirm_payment(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(request): Json<ConfirmPaymentRequest>,
) -> Result<Json<ApiResponse<PaymentResponse>>, ApiError> {
    validate_request(&request)?;

    let payment = state.payments().find_by_order_id(&request.order_id).await?;
    if !state.payments().visible_to(&payment, &caller.scope()) {
        return Err(ApiError::NotFound(format!(
            "Payment '{}' not found",
            request.order_id
        )));
    }

    let gateway = state.gateway(payment.gateway);
    if !gateway.verify_signature(request.order_id.as_bytes(), &request.signature) {
        warn!(order_id = %request.order_id, "Confirm rejected: bad signature");
        return Err(ApiError::Unauthorized);
    }

    let completed = state
        .payments()
        .complete_and_settle(&request.order_id, method_for(payment.gateway))
        .await?;
    send_receipt(&state, &completed).await;

    info!(order_id = %completed.order_id, "Payment confirmed");
    Ok(Json(ApiResponse::with_message(
        PaymentResponse::from(&completed),
        "Payment completed",
    )))
}

/// GET /api/v1/payments/:order_id
pub async fn get_payment(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(order_id): Path<String>,
) -> Result<Json<ApiResponse<PaymentResponse>>, ApiError> {
    let payment = state.payments().find_by_order_id(&order_id).await?;
    if !state.payments().visible_to(&payment, &caller.scope()) {
        return Err(ApiError::NotFound(format!(
            "Payment '{order_id}' not found"
        )));
    }
    Ok(Json(ApiResponse::ok(PaymentResponse::from(&payment))))
}

/// POST /api/v1/webhooks/:gateway
///
/// Unauthenticated but signed: the HMAC over the raw body must verify
/// against the gateway's secret before the payload is even parsed.
pub async fn gateway_webhook(
    State(state): State<AppState>,
    Path(gateway): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let kind = GatewayKind::parse(&gateway)
        .ok_or_else(|| ApiError::NotFound(format!("Unknown gateway '{gateway}'")))?;

    let signature = headers
        .get(WEBHOOK_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("Missing webhook signature".to_string()))?;

    if !state.gateway(kind).verify_signature(&body, signature) {
        warn!(gateway = kind.as_str(), "Webhook rejected: bad signature");
        return Err(ApiError::Unauthorized);
    }

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Malformed webhook payload: {e}")))?;

    match event.event.as_str() {
        "payment.completed" => {
            let completed = state
                .payments()
                .complete_and_settle(&event.order_id, method_for(kind))
                .await?;
            send_receipt(&state, &completed).await;
            info!(order_id = %event.order_id, "Webhook completed payment");
        }
        "payment.failed" => {
            let reason = event.reason.as_deref().unwrap_or("unspecified");
            state.payments().mark_failed(&event.order_id, reason).await?;
            info!(order_id = %event.order_id, reason, "Webhook marked payment failed");
        }
        other => {
            return Err(ApiError::BadRequest(format!(
                "Unsupported webhook event '{other}'"
            )));
        }
    }

    Ok(Json(ApiResponse::message("Webhook processed")))
}

/// Settlement method recorded for a gateway-routed payment
fn method_for(kind: GatewayKind) -> PaymentMethod {
    match kind {
        GatewayKind::Stripe => PaymentMethod::Card,
        GatewayKind::Razorpay => PaymentMethod::Wallet,
    }
}

async fn send_receipt(state: &AppState, payment: &GatewayPayment) {
    if let Ok(payer) = state.users().find_by_id(payment.payer_id).await {
        state.mailer.send(
            &payer.email,
            "payment_receipt",
            json!({
                "order_id": payment.order_id,
                "amount": payment.amount.amount(),
                "currency": payment.amount.currency().code(),
            }),
        );
    }
}
