use crate::auth::{error_redirect_url, success_redirect_url};
use crate::error::OAuthError;
use crate::handlers::found;
use crate::models::AppState;
use crate::models::oauth::CallbackParams;
use axum::{
    extract::{Query, State},
    response::Response,
};
use tracing::{error, info, warn};

/// Finishes a Naver login and always answers with a 302 to the front end.
pub async fn callback_handler(
    Query(params): Query<CallbackParams>,
    State(app_state): State<AppState>,
) -> Response {
    let frontend = &app_state.config.frontend_redirect_url;

    let location = match app_state.login_flow.complete(&params).await {
        Ok(result) => {
            info!(
                provider = result.provider,
                user_id = %result.user.id,
                email = result.user.email.as_deref().unwrap_or("N/A"),
                name = result.user.name.as_deref().unwrap_or("N/A"),
                nickname = result.user.nickname.as_deref().unwrap_or("N/A"),
                "naver login succeeded"
            );
            success_redirect_url(frontend, &result)
        }
        Err(err) => {
            let reason = err.reason().unwrap_or("");
            match &err {
                OAuthError::TokenSigningFailed { .. } => {
                    error!(error = %err, reason, "OAuth callback error")
                }
                _ => warn!(error = %err, reason, "OAuth callback error"),
            }
            error_redirect_url(frontend, &err.to_string())
        }
    };

    found(location.as_str())
}
