pub mod docs_handler;
pub mod oauth;

use crate::edge::trace_client_key;
use crate::models::AppState;
use axum::{
    Router,
    http::{StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use docs_handler::docs_handler;
use oauth::{callback_handler, login_url_handler};

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/oauth/naver/login-url", get(login_url_handler))
        .route("/oauth/naver/callback", get(callback_handler))
        .route("/docs", get(docs_handler))
        .route("/docs/", get(docs_handler))
        .layer(middleware::from_fn(trace_client_key))
        .with_state(app_state)
}

/// 302 Found. axum's `Redirect` only offers 303/307/308.
pub(crate) fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
