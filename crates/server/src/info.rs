//! `GET /api/info`: balance, inventory and coin history of the caller.

use api_types::info::{CoinHistory, InfoResponse, Item, Received, Sent};
use axum::{Extension, Json, extract::State};
use engine::Snapshot;

use crate::{CallerId, ServerError, server::ServerState};

fn to_response(snapshot: Snapshot) -> InfoResponse {
    let received = snapshot
        .received()
        .map(|entry| Received {
            from_user: entry.counterparty.clone(),
            amount: entry.amount,
        })
        .collect();
    let sent = snapshot
        .sent()
        .map(|entry| Sent {
            to_user: entry.counterparty.clone(),
            amount: entry.amount,
        })
        .collect();

    InfoResponse {
        coins: snapshot.coins,
        inventory: snapshot
            .inventory
            .into_iter()
            .map(|item| Item {
                kind: item.name,
                quantity: item.quantity,
            })
            .collect(),
        coin_history: CoinHistory { received, sent },
    }
}

pub async fn get(
    Extension(CallerId(caller)): Extension<CallerId>,
    State(state): State<ServerState>,
) -> Result<Json<InfoResponse>, ServerError> {
    let snapshot = state.engine.snapshot(caller, Some(state.deadline())).await?;
    Ok(Json(to_response(snapshot)))
}
