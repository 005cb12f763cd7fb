use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::typed_header::TypedHeaderRejection;
use engine::EngineError;

use serde::Serialize;
pub use server::{router, run_with_listener};

mod catalog;
mod donations;
mod loans;
mod me;
mod purchases;
mod server;
mod session;
mod team;

pub mod types {
    pub mod session {
        pub use api_types::session::{Session, SessionNew};
    }

    pub mod purchase {
        pub use api_types::purchase::{PurchaseItem, PurchaseNew, PurchaseReceipt};
    }

    pub mod catalog {
        pub use api_types::catalog::{QuoteQuery, StallKind, StallQuery};
        pub use engine::{Bank, LoanQuote, LoanScheme, Stall, StallItem};
    }

    pub mod loan {
        pub use api_types::loan::{LoanNew, LoanReview, ReviewDecision};
        pub use engine::{LoanApplication, LoanStatus};
    }

    pub mod team {
        pub use api_types::team::{Attendance, AttendanceNew, BlackPointsNew, CreditsNew, PenaltyNew};
        pub use engine::{TeamMember, TeamOverview};
    }

    pub mod donation {
        pub use api_types::donation::DonationNew;
        pub use engine::{CauseProgress, DonationReceipt, DonationSummary};
    }

    pub mod me {
        pub use api_types::me::{Balance, HistoryQuery};
        pub use engine::Transaction;
    }
}

pub enum ServerError {
    Engine(EngineError),
    /// The caller's session does not match a roster user.
    Unauthorized(String),
    /// Malformed request: bad body, path, query or header.
    Generic(String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::UnknownUser(_) | EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::UnauthorizedAction(_) => StatusCode::FORBIDDEN,
        EngineError::CheckoutInProgress(_) | EngineError::InvalidTransition(_) => {
            StatusCode::CONFLICT
        }
        EngineError::Catalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InsufficientBalance(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidCart(_)
        | EngineError::ExceedsSchemeLimit(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Catalog(msg) => {
            tracing::error!("catalog error: {msg}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Unauthorized(err) => (StatusCode::UNAUTHORIZED, err),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::Generic(value.body_text())
    }
}

impl From<PathRejection> for ServerError {
    fn from(value: PathRejection) -> Self {
        Self::Generic(value.body_text())
    }
}

impl From<QueryRejection> for ServerError {
    fn from(value: QueryRejection) -> Self {
        Self::Generic(value.body_text())
    }
}

impl From<TypedHeaderRejection> for ServerError {
    fn from(value: TypedHeaderRejection) -> Self {
        Self::Generic(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: EngineError) -> StatusCode {
        ServerError::from(err).into_response().status()
    }

    #[test]
    fn unknown_keys_map_to_404() {
        assert_eq!(status_of(EngineError::UnknownUser("9".to_string())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(EngineError::KeyNotFound("x".to_string())), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unauthorized_maps_to_403() {
        assert_eq!(
            status_of(EngineError::UnauthorizedAction("x".to_string())),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn conflicts_map_to_409() {
        assert_eq!(
            status_of(EngineError::CheckoutInProgress("x".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(EngineError::InvalidTransition("x".to_string())),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn validation_maps_to_422() {
        for err in [
            EngineError::InsufficientBalance("x".to_string()),
            EngineError::InvalidAmount("x".to_string()),
            EngineError::InvalidCart("x".to_string()),
            EngineError::ExceedsSchemeLimit("x".to_string()),
        ] {
            assert_eq!(status_of(err), StatusCode::UNPROCESSABLE_ENTITY);
        }
    }

    #[test]
    fn unknown_session_maps_to_401() {
        let res = ServerError::Unauthorized("x".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
