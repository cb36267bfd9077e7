//! Draft order checkout endpoint.

use std::sync::Arc;

use axum::{Json, body::Bytes, extract::State};
use chrono::Utc;
use quote_checkout_core::DraftOrderId;
use serde::Serialize;
use tracing::instrument;

use crate::error::AppError;
use crate::quote::{QuoteRequest, ValidationError, draft_order, line_items};
use crate::services::spawn_notification;
use crate::state::AppState;

/// Successful checkout response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub success: bool,
    pub checkout_url: String,
    pub draft_order_id: DraftOrderId,
    pub order_name: String,
    pub total_price: String,
}

/// Turn a calculator quote into a Shopify draft order and return its
/// checkout link.
///
/// Validation happens before any outbound call. The order is created
/// exactly once; staff notification runs detached and cannot affect the
/// response.
#[instrument(skip_all)]
pub async fn create_draft_order(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CheckoutResponse>, AppError> {
    let request: QuoteRequest = serde_json::from_slice(&body)
        .map_err(|e| ValidationError::InvalidBody(e.to_string()))?;

    let commerce = state.commerce().ok_or_else(|| {
        AppError::Configuration("Shopify store or admin access token is not set".to_string())
    })?;

    let quote = request.validate()?;
    tracing::info!(
        mode = quote.mode.tag(),
        calculator = quote.calculator_type.as_deref().unwrap_or("unknown"),
        "Creating draft order"
    );

    let items = line_items::build(&quote, &commerce.resolver, Utc::now()).await?;
    let payload = draft_order::assemble(&quote, items);
    let order = commerce.draft_orders.create_draft_order(&payload).await?;

    tracing::info!(
        draft_order_id = %order.id,
        order_name = %order.name,
        "Draft order created"
    );

    if let Some(sender) = state.notifier() {
        spawn_notification(
            quote,
            order.clone(),
            commerce.resolver.clone(),
            Arc::clone(sender),
        );
    }

    Ok(Json(CheckoutResponse {
        success: true,
        checkout_url: order.invoice_url,
        draft_order_id: order.id,
        order_name: order.name,
        total_price: order.total_price,
    }))
}

/// Any other method on the checkout route.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
