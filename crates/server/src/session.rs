//! Sign-in endpoint

use api_types::session::{Session, SessionNew};
use axum::{Json, extract::State};
use axum_extra::extract::WithRejection;
use engine::{RosterScan, TracingGreeter, UserId};

use crate::{ServerError, server::ServerState};

/// Handle sign-in requests. The returned session id goes into the
/// `x-user-id` header of later requests.
pub async fn sign_in(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<SessionNew>, ServerError>,
) -> Result<Json<Session>, ServerError> {
    let signed = state
        .engine
        .sign_in(&RosterScan(UserId(payload.user_id)), &TracingGreeter)
        .await?;

    Ok(Json(Session {
        session_id: signed.user.id.get(),
        employer: signed.user.is_employer(),
        name: signed.user.name,
        greeting: signed.greeting,
    }))
}
