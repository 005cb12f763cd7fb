//! Catalog browsing and rate quotes

use api_types::catalog::{QuoteQuery, StallKind, StallQuery};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use axum_extra::extract::WithRejection;
use engine::{Bank, BankId, LoanQuote, SchemeId, Stall, StallCategory, User};

use crate::{ServerError, server::ServerState};

pub async fn banks(State(state): State<ServerState>) -> Json<Vec<Bank>> {
    Json(state.engine.catalog().banks().to_vec())
}

/// Stalls, optionally narrowed by `?category=` and a `?q=` name search
pub async fn stalls(
    State(state): State<ServerState>,
    WithRejection(Query(query), _): WithRejection<Query<StallQuery>, ServerError>,
) -> Json<Vec<Stall>> {
    let category = query.category.map(|kind| match kind {
        StallKind::Entertainment => StallCategory::Entertainment,
        StallKind::Food => StallCategory::Food,
        StallKind::Accessories => StallCategory::Accessories,
    });
    let stalls = state
        .engine
        .catalog()
        .search_stalls(category, query.q.as_deref().unwrap_or_default())
        .into_iter()
        .cloned()
        .collect();

    Json(stalls)
}

/// The rate the caller would get on a scheme today, without applying
pub async fn quote(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path((bank_id, scheme_id)), _): WithRejection<Path<(u32, u32)>, ServerError>,
    WithRejection(Query(query), _): WithRejection<Query<QuoteQuery>, ServerError>,
) -> Result<Json<LoanQuote>, ServerError> {
    let quote = state
        .engine
        .quote_loan(user.id, BankId(bank_id), SchemeId(scheme_id), query.amount)
        .await?;

    Ok(Json(quote))
}
