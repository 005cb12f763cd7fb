//! Employer dashboard endpoints

use api_types::team::{Attendance, AttendanceNew, BlackPointsNew, CreditsNew, PenaltyNew};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use axum_extra::extract::WithRejection;
use engine::{AttendanceMark, PenaltyCmd, TeamOverview, Transaction, User, UserId};

use crate::{ServerError, server::ServerState};

pub async fn overview(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<TeamOverview>, ServerError> {
    Ok(Json(state.engine.team_overview(user.id).await?))
}

pub async fn reward(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(employee_id), _): WithRejection<Path<u32>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<CreditsNew>, ServerError>,
) -> Result<Json<Transaction>, ServerError> {
    let tx = state
        .engine
        .employer(user.id)?
        .reward(UserId(employee_id), payload.amount)
        .await?;
    Ok(Json(tx))
}

pub async fn salary(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(employee_id), _): WithRejection<Path<u32>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<CreditsNew>, ServerError>,
) -> Result<Json<Transaction>, ServerError> {
    let tx = state
        .engine
        .employer(user.id)?
        .pay_salary(UserId(employee_id), payload.amount)
        .await?;
    Ok(Json(tx))
}

pub async fn penalty(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(employee_id), _): WithRejection<Path<u32>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<PenaltyNew>, ServerError>,
) -> Result<Json<Transaction>, ServerError> {
    let mut cmd = PenaltyCmd::new(UserId(employee_id), payload.amount, payload.points);
    if let Some(note) = payload.note {
        cmd = cmd.note(note);
    }

    let tx = state.engine.employer(user.id)?.penalize(cmd).await?;
    Ok(Json(tx))
}

pub async fn black_points(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(employee_id), _): WithRejection<Path<u32>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<BlackPointsNew>, ServerError>,
) -> Result<Json<User>, ServerError> {
    let employee = state
        .engine
        .employer(user.id)?
        .assign_black_points(UserId(employee_id), payload.points)
        .await?;
    Ok(Json(employee))
}

pub async fn attendance(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    WithRejection(Path(employee_id), _): WithRejection<Path<u32>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<AttendanceNew>, ServerError>,
) -> Result<Json<User>, ServerError> {
    let mark = match payload.status {
        Attendance::Present => AttendanceMark::Present,
        Attendance::Absent => AttendanceMark::Absent,
    };
    let employee = state
        .engine
        .employer(user.id)?
        .record_attendance(UserId(employee_id), mark)
        .await?;
    Ok(Json(employee))
}
