//! Caller's own balance and history

use api_types::me::{Balance, HistoryQuery};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use axum_extra::extract::WithRejection;
use engine::{Transaction, User, policy};

use crate::{ServerError, server::ServerState};

pub async fn balance(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Balance>, ServerError> {
    let balance = state.engine.balance(user.id).await?;

    Ok(Json(Balance {
        user_id: user.id.get(),
        balance,
        suggested_donations: policy::suggested_donations(balance),
    }))
}

/// Most-recent-first history, `?limit=` caps the number of entries
pub async fn history(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Query(query), _): WithRejection<Query<HistoryQuery>, ServerError>,
) -> Result<Json<Vec<Transaction>>, ServerError> {
    Ok(Json(state.engine.history(user.id, query.limit).await?))
}
