//! Purchase API endpoint

use api_types::purchase::{PurchaseNew, PurchaseReceipt};
use axum::{Extension, Json, extract::State};
use axum_extra::extract::WithRejection;
use engine::{ItemId, PurchaseLine, StallId, User};

use crate::{ServerError, server::ServerState};

/// Handle requests for buying a cart of stall items in one checkout
pub async fn purchase(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<PurchaseNew>, ServerError>,
) -> Result<Json<PurchaseReceipt>, ServerError> {
    let lines: Vec<PurchaseLine> = payload
        .items
        .iter()
        .map(|item| PurchaseLine {
            stall_id: StallId(item.stall_id),
            item_id: ItemId(item.item_id),
            quantity: item.quantity,
        })
        .collect();

    let posted = state.engine.purchase(user.id, &lines).await?;
    let total = posted.iter().map(|tx| -tx.amount).sum();
    let balance = match posted.last() {
        Some(tx) => tx.resulting_balance,
        None => state.engine.balance(user.id).await?,
    };

    Ok(Json(PurchaseReceipt {
        total,
        balance,
        transaction_ids: posted.iter().map(|tx| tx.id.get()).collect(),
    }))
}
