//! Loan API endpoints

use api_types::loan::{LoanNew, LoanReview, ReviewDecision};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use axum_extra::extract::WithRejection;
use engine::{BankId, LoanApplication, LoanDecision, LoanId, LoanRequest, SchemeId, User};

use crate::{ServerError, server::ServerState};

/// Handle requests for a new loan application of the caller
pub async fn apply(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<LoanNew>, ServerError>,
) -> Result<Json<LoanApplication>, ServerError> {
    let application = state
        .engine
        .apply_for_loan(LoanRequest::new(
            user.id,
            BankId(payload.bank_id),
            SchemeId(payload.scheme_id),
            payload.amount,
        ))
        .await?;

    Ok(Json(application))
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<LoanApplication>>, ServerError> {
    Ok(Json(state.engine.applications_for_user(user.id).await?))
}

/// Handle bank decisions on a pending application.
///
/// There is no bank actor in the portal, so an employer stands in for the
/// bank desk.
pub async fn review(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(id), _): WithRejection<Path<u64>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<LoanReview>, ServerError>,
) -> Result<Json<LoanApplication>, ServerError> {
    let reviewer = state.engine.employer(user.id)?;
    let decision = match payload.decision {
        ReviewDecision::Approve => LoanDecision::Approve,
        ReviewDecision::Reject => LoanDecision::Reject,
    };
    tracing::info!(reviewer = %reviewer.employer_id(), loan_id = id, "reviewing loan");

    Ok(Json(state.engine.review_loan(LoanId(id), decision).await?))
}
