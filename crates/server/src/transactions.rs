//! Coin transfer and purchase endpoints.

use api_types::transfer::SendCoinRequest;
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{PurchaseCmd, TransferCmd};

use crate::{CallerId, ServerError, server::ServerState};

/// `POST /api/sendCoin`
pub async fn send_coin(
    Extension(CallerId(caller)): Extension<CallerId>,
    State(state): State<ServerState>,
    Json(payload): Json<SendCoinRequest>,
) -> Result<StatusCode, ServerError> {
    if payload.to_user.trim().is_empty() {
        return Err(ServerError::Generic("toUser is required".to_string()));
    }
    if payload.amount <= 0 {
        return Err(ServerError::Generic("amount must be positive".to_string()));
    }

    let cmd = TransferCmd::new(caller, payload.to_user, payload.amount).deadline(state.deadline());
    state.engine.transfer(cmd).await?;
    Ok(StatusCode::OK)
}

/// `GET /api/buy/{item}`
pub async fn buy(
    Extension(CallerId(caller)): Extension<CallerId>,
    State(state): State<ServerState>,
    Path(item): Path<String>,
) -> Result<StatusCode, ServerError> {
    if item.trim().is_empty() {
        return Err(ServerError::Generic("item is required".to_string()));
    }

    let cmd = PurchaseCmd::new(caller, item).deadline(state.deadline());
    state.engine.purchase(cmd).await?;
    Ok(StatusCode::OK)
}
