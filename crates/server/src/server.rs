use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    extract::WithRejection,
    headers::{Error as AxumError, Header},
};

use std::sync::Arc;

use crate::{ServerError, catalog, donations, loans, me, purchases, session, team};
use engine::{Engine, UserId};

static USER_ID_HEADER: axum::http::HeaderName = axum::http::HeaderName::from_static("x-user-id");

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// `TypedHeader` for the caller's session.
///
/// Authenticated requests must contain the "x-user-id" entry returned by
/// `POST /session`.
#[derive(Debug)]
struct UserIdHeader(u32);

impl Header for UserIdHeader {
    fn name() -> &'static axum::http::HeaderName {
        &USER_ID_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, AxumError>
    where
        Self: Sized,
        I: Iterator<Item = &'i axum::http::HeaderValue>,
    {
        let value = values.next().ok_or_else(AxumError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(AxumError::invalid());
        };
        let Ok(value) = value.trim().parse() else {
            return Err(AxumError::invalid());
        };

        Ok(UserIdHeader(value))
    }

    fn encode<E: Extend<axum::http::HeaderValue>>(&self, values: &mut E) {
        values.extend(std::iter::once(axum::http::HeaderValue::from(self.0)));
    }
}

async fn auth(
    WithRejection(TypedHeader(UserIdHeader(user_id)), _): WithRejection<
        TypedHeader<UserIdHeader>,
        ServerError,
    >,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let user = match state.engine.user(UserId(user_id)).await {
        Ok(user) => user,
        Err(err) => {
            tracing::debug!("rejected session {user_id}: {err}");
            return Err(ServerError::Unauthorized(format!(
                "unknown session {user_id}"
            )));
        }
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Builds the HTTP surface over `engine`.
pub fn router(engine: Arc<Engine>) -> Router {
    let state = ServerState { engine };

    Router::new()
        .route("/purchases", post(purchases::purchase))
        .route("/loans", post(loans::apply).get(loans::list))
        .route("/loans/{id}/review", post(loans::review))
        .route("/team", get(team::overview))
        .route("/team/{employee_id}/reward", post(team::reward))
        .route("/team/{employee_id}/salary", post(team::salary))
        .route("/team/{employee_id}/penalty", post(team::penalty))
        .route("/team/{employee_id}/black-points", post(team::black_points))
        .route("/team/{employee_id}/attendance", post(team::attendance))
        .route("/donations", post(donations::donate))
        .route("/causes", get(donations::summary))
        .route("/causes/{id}", get(donations::cause))
        .route("/me/balance", get(me::balance))
        .route("/me/history", get(me::history))
        .route(
            "/catalog/banks/{bank_id}/schemes/{scheme_id}/quote",
            get(catalog::quote),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .route("/session", post(session::sign_in))
        .route("/catalog/banks", get(catalog::banks))
        .route("/catalog/stalls", get(catalog::stalls))
        .with_state(state)
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(Arc::new(engine))).await
}
