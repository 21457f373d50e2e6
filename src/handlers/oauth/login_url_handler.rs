use crate::error::OAuthError;
use crate::models::AppState;
use crate::models::oauth::{ErrorResponse, LoginUrlResponse};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use tracing::warn;

pub async fn login_url_handler(
    State(app_state): State<AppState>,
) -> Result<Json<LoginUrlResponse>, OAuthError> {
    let login = app_state.login_flow.start()?;
    Ok(Json(login))
}

impl IntoResponse for OAuthError {
    fn into_response(self) -> Response {
        let status = match self {
            OAuthError::TooManyPendingLogins => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        warn!(error = %self, status = status.as_u16(), "login url request refused");

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}
