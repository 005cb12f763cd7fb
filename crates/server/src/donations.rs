//! Donation API endpoints

use api_types::donation::DonationNew;
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use axum_extra::extract::WithRejection;
use engine::{CauseId, CauseProgress, DonationReceipt, DonationSummary, User};

use crate::{ServerError, server::ServerState};

pub async fn donate(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<DonationNew>, ServerError>,
) -> Result<Json<DonationReceipt>, ServerError> {
    let receipt = state
        .engine
        .donate(user.id, CauseId(payload.cause_id), payload.amount)
        .await?;

    Ok(Json(receipt))
}

/// All causes with their progress and the totals.
pub async fn summary(State(state): State<ServerState>) -> Json<DonationSummary> {
    Json(state.engine.donation_summary().await)
}

pub async fn cause(
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<u32>, ServerError>,
) -> Result<Json<CauseProgress>, ServerError> {
    Ok(Json(state.engine.cause_progress(CauseId(id)).await?))
}
