use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use common_auth::AuthContext;
use common_http_errors::{ApiError, ApiResult};

use crate::app::{gateway_error, store_error, AppState};
use crate::gateway::CreateIntent;
use crate::repo::{self, Order, OrderStatus, StatusUpdate};

/// Payload for `POST /payment`. Any `status` the client sends is discarded:
/// recorded orders always start at `pending` and move only through the
/// transition table.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub transaction_reference: String,
    /// Smallest currency unit.
    pub amount: i64,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub name: String,
    pub quantity: i32,
    /// Smallest currency unit per item.
    pub unit_amount: i64,
}

/// Record a checkout under its transaction reference.
///
/// Replays of the same reference return the stored order as-is, so a client
/// retrying after a lost response cannot duplicate the order or knock a
/// settled one back to `pending`.
pub async fn record_order(
    State(state): State<AppState>,
    _auth: AuthContext,
    Json(draft): Json<OrderDraft>,
) -> ApiResult<Json<Order>> {
    if draft.transaction_reference.trim().is_empty() {
        return Err(ApiError::bad_request(
            "missing_reference",
            "transactionReference must not be empty",
        ));
    }

    let items = serde_json::to_value(&draft.items).map_err(|_| ApiError::Internal)?;
    let order = repo::record_order(
        &state.db,
        repo::NewOrder {
            transaction_reference: &draft.transaction_reference,
            amount: draft.amount,
            items: &items,
            customer_name: draft.name.as_deref(),
            customer_email: draft.email.as_deref(),
            customer_address: draft.address.as_deref(),
        },
    )
    .await
    .map_err(store_error)?;

    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
pub struct StatusPatch {
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateReport {
    pub success: bool,
    pub message: &'static str,
    pub transaction_reference: String,
    pub new_status: OrderStatus,
    pub matched: u64,
    pub modified: u64,
}

/// `PATCH /payment/:tnxId`: move an order to a new lifecycle state.
///
/// Failure ladder, most specific first: unknown target label (400), no such
/// order (404), stored state already equals the target (400, soft), table
/// forbids the move (409). A same-state write is checked before legality,
/// so replaying a successful settlement reports "already updated" rather
/// than an illegal transition.
pub async fn update_order_status(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(tnx_id): Path<String>,
    Json(patch): Json<StatusPatch>,
) -> ApiResult<Json<StatusUpdateReport>> {
    let Some(to) = OrderStatus::parse(&patch.status) else {
        return Err(ApiError::bad_request(
            "unknown_status",
            format!("unsupported status '{}'", patch.status),
        ));
    };

    match repo::update_status(&state.db, &tnx_id, to)
        .await
        .map_err(store_error)?
    {
        StatusUpdate::Applied => Ok(Json(StatusUpdateReport {
            success: true,
            message: "Order status updated successfully",
            transaction_reference: tnx_id,
            new_status: to,
            matched: 1,
            modified: 1,
        })),
        StatusUpdate::NoChange => Err(ApiError::NoChange),
        StatusUpdate::Illegal { from } => Err(ApiError::IllegalTransition {
            from,
            to: to.as_str().to_string(),
        }),
        StatusUpdate::NotFound => Err(ApiError::not_found("order_not_found")),
    }
}

/// `GET /payment/:tnxId`: fetch one order by transaction reference.
pub async fn get_order(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(tnx_id): Path<String>,
) -> ApiResult<Json<Order>> {
    let order = repo::order_by_reference(&state.db, &tnx_id)
        .await
        .map_err(store_error)?;
    order.map(Json).ok_or_else(|| ApiError::not_found("order_not_found"))
}

/// `GET /payment`: every stored order, any authenticated caller.
pub async fn list_orders(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> ApiResult<Json<Vec<Order>>> {
    let orders = repo::list_orders(&state.db).await.map_err(store_error)?;
    Ok(Json(orders))
}

#[derive(Debug, Deserialize)]
pub struct IntentRequest {
    /// Smallest currency unit; forwarded to the gateway unchanged.
    pub amount: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentResponse {
    pub client_secret: String,
}

/// `POST /create-payment-intent`: open an intent with the remote processor
/// and hand the confirmation secret back to the browser.
///
/// Intent creation and order recording are separate calls by design; the
/// link between an intent and its eventual order exists only client-side.
pub async fn create_payment_intent(
    State(state): State<AppState>,
    _auth: AuthContext,
    Json(request): Json<IntentRequest>,
) -> ApiResult<Json<IntentResponse>> {
    let intent = state
        .gateway
        .create_intent(CreateIntent {
            amount: request.amount,
            name: request.name,
            email: request.email,
            address: request.address,
        })
        .await
        .map_err(gateway_error)?;

    Ok(Json(IntentResponse {
        client_secret: intent.client_secret,
    }))
}
