use crate::error::OAuthError;
use crate::models::app_config::NaverConfig;
use crate::models::oauth::{
    NaverTokenResponse, NaverUserInfo, ProviderTokenResult, ProviderUserProfile,
};
use oauth2::{AccessToken, CsrfToken};
use reqwest::Url;
use std::sync::Arc;
use tracing::debug;

/// HTTP client for the Naver authorization server and profile API.
#[derive(Clone)]
pub struct NaverClient {
    config: Arc<NaverConfig>,
    http: reqwest::Client,
}

impl NaverClient {
    pub fn new(config: Arc<NaverConfig>) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn build_authorize_url(&self, state: &CsrfToken) -> Url {
        let mut url = self.config.authorize_url.url().clone();

        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", self.config.client_id.as_str())
            // Verbatim: the token-exchange redirect_uri must match what was registered.
            .append_pair("redirect_uri", self.config.redirect_uri.as_str())
            .append_pair("state", state.secret());

        debug!(
            client_id = %self.config.client_id.as_str(),
            redirect_uri = self.config.redirect_uri.as_str(),
            "built naver authorize url"
        );

        url
    }

    pub async fn exchange_code(
        &self,
        code: &str,
        state: &str,
    ) -> Result<ProviderTokenResult, OAuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.secret().as_str()),
            ("code", code),
            ("state", state),
        ];

        let response = self
            .http
            .post(self.config.token_url.url().clone())
            .form(&params)
            .send()
            .await
            .map_err(|e| OAuthError::exchange(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error body".to_string());
            return Err(OAuthError::exchange(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body = response
            .json::<NaverTokenResponse>()
            .await
            .map_err(|e| OAuthError::exchange(format!("unreadable token response: {}", e)))?;

        match body.access_token.filter(|token| !token.secret().is_empty()) {
            Some(access_token) => Ok(ProviderTokenResult {
                access_token,
                refresh_token: body.refresh_token,
                token_type: body.token_type,
                expires_in: body.expires_in,
            }),
            None => Err(OAuthError::exchange(format!(
                "no access_token in response (error: {}, description: {})",
                body.error.as_deref().unwrap_or("none"),
                body.error_description.as_deref().unwrap_or("none"),
            ))),
        }
    }

    pub async fn fetch_user_profile(
        &self,
        access_token: &AccessToken,
    ) -> Result<ProviderUserProfile, OAuthError> {
        let response = self
            .http
            .get(self.config.user_info_url.clone())
            .bearer_auth(access_token.secret())
            .send()
            .await
            .map_err(|e| OAuthError::profile(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error body".to_string());
            return Err(OAuthError::profile(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body = response
            .json::<NaverUserInfo>()
            .await
            .map_err(|e| OAuthError::profile(format!("unreadable profile response: {}", e)))?;

        let Some(user) = body.response else {
            return Err(OAuthError::profile(format!(
                "no response object (resultcode: {}, message: {})",
                body.result_code.as_deref().unwrap_or("none"),
                body.message.as_deref().unwrap_or("none"),
            )));
        };
        let Some(external_id) = user.id.filter(|id| !id.is_empty()) else {
            return Err(OAuthError::profile("no id in profile response"));
        };

        Ok(ProviderUserProfile {
            external_id,
            email: user.email,
            name: user.name,
            nickname: user.nickname,
            profile_image_url: user.profile_image,
        })
    }
}
