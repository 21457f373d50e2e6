use crate::auth::jwt::{ClaimSet, TokenIssuer};
use crate::auth::naver::NaverClient;
use crate::auth::state_store::StateStore;
use crate::error::OAuthError;
use crate::models::app_config::{AppConfig, ConfigError};
use crate::models::oauth::{
    CallbackParams, IssuedTokenPair, LoginResult, LoginUrlResponse, PROVIDER_NAVER,
    ProfileSummary, ProviderUserProfile,
};
use reqwest::Url;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Sequences the Naver round trips and token issuance for one login attempt.
pub struct LoginFlow {
    naver: NaverClient,
    issuer: TokenIssuer,
    states: StateStore,
    verify_state: bool,
}

impl LoginFlow {
    pub fn new(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            naver: NaverClient::new(Arc::new(config.naver.clone())),
            issuer: TokenIssuer::new(&config.jwt)?,
            states: StateStore::with_limit(config.state_ttl, config.max_pending_states),
            verify_state: config.verify_state,
        })
    }

    pub fn token_issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    pub fn start(&self) -> Result<LoginUrlResponse, OAuthError> {
        let state = self.states.issue().ok_or(OAuthError::TooManyPendingLogins)?;
        let url = self.naver.build_authorize_url(&state);

        debug!(pending_states = self.states.len(), "issued login state");

        Ok(LoginUrlResponse {
            url: url.to_string(),
            state: state.secret().clone(),
        })
    }

    pub async fn complete(&self, params: &CallbackParams) -> Result<LoginResult, OAuthError> {
        if let Some(error) = params.error.as_deref() {
            let message = params
                .error_description
                .as_deref()
                .filter(|d| !d.is_empty())
                .unwrap_or(error);
            return Err(OAuthError::ProviderDenied(message.to_string()));
        }

        let Some(code) = params.code.as_deref().filter(|c| !c.is_empty()) else {
            return Err(OAuthError::MissingCode);
        };
        let state = params.state.as_deref().unwrap_or_default();

        if self.verify_state && !self.states.consume(state) {
            return Err(OAuthError::InvalidState);
        }

        let provider_token = self.naver.exchange_code(code, state).await?;
        let profile = self
            .naver
            .fetch_user_profile(&provider_token.access_token)
            .await?;
        debug!(
            token_type = provider_token.token_type.as_deref().unwrap_or("none"),
            expires_in = ?provider_token.expires_in,
            has_refresh_token = provider_token.refresh_token.is_some(),
            has_profile_image = profile.profile_image_url.is_some(),
            "naver token exchanged and profile fetched"
        );

        let claims = profile_claims(&profile);
        let tokens = IssuedTokenPair {
            access_token: self.issuer.issue_access_token(&profile.external_id, &claims)?,
            refresh_token: self.issuer.issue_refresh_token(&profile.external_id, &claims)?,
        };

        Ok(LoginResult {
            tokens,
            user: ProfileSummary::from(&profile),
            provider: PROVIDER_NAVER,
        })
    }
}

/// `email` and `name` claims; absent profile fields become empty strings.
fn profile_claims(profile: &ProviderUserProfile) -> ClaimSet {
    ClaimSet::from([
        (
            "email".to_string(),
            Value::String(profile.email.clone().unwrap_or_default()),
        ),
        (
            "name".to_string(),
            Value::String(profile.name.clone().unwrap_or_default()),
        ),
    ])
}

fn frontend_url(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    let joined = format!("{}{}", base.path().trim_end_matches('/'), path);
    url.set_path(&joined);
    url
}

pub fn success_redirect_url(base: &Url, result: &LoginResult) -> Url {
    let mut url = frontend_url(base, "/oauth/callback");
    url.query_pairs_mut()
        .append_pair("accessToken", &result.tokens.access_token)
        .append_pair("refreshToken", &result.tokens.refresh_token)
        .append_pair("provider", result.provider)
        .append_pair("success", "true");
    url
}

pub fn error_redirect_url(base: &Url, message: &str) -> Url {
    let mut url = frontend_url(base, "/oauth/error");
    url.query_pairs_mut()
        .append_pair("error", message)
        .append_pair("provider", PROVIDER_NAVER);
    url
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::auth::naver::tests::naver_config_for;
    use crate::models::app_config::tests::{config_from, test_vars};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub(crate) fn config_for(server: &MockServer) -> AppConfig {
        let mut config = config_from(&test_vars()).unwrap();
        config.naver = naver_config_for(&server.uri());
        config
    }

    pub(crate) async fn mount_token(server: &MockServer, body: Value) {
        Mock::given(method("POST"))
            .and(path("/oauth2.0/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    pub(crate) async fn mount_profile(server: &MockServer, body: Value) {
        Mock::given(method("GET"))
            .and(path("/v1/nid/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    fn callback(code: &str, state: &str) -> CallbackParams {
        CallbackParams {
            code: Some(code.to_string()),
            state: Some(state.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_complete_issues_tokens_for_profile() {
        let server = MockServer::start().await;
        mount_token(&server, json!({ "access_token": "X", "token_type": "bearer" })).await;
        mount_profile(
            &server,
            json!({
                "resultcode": "00",
                "message": "success",
                "response": { "id": "abc123", "email": "a@b.com", "name": "Kim", "nickname": "kimmy" }
            }),
        )
        .await;

        let flow = LoginFlow::new(&config_for(&server)).unwrap();
        let started = flow.start().unwrap();
        let result = flow.complete(&callback("code", &started.state)).await.unwrap();

        assert_eq!(result.provider, "naver");
        assert_eq!(result.user.id, "abc123");
        assert_eq!(result.user.nickname.as_deref(), Some("kimmy"));

        let access = flow.token_issuer().parse_token(&result.tokens.access_token).unwrap();
        assert_eq!(access.sub, "abc123");
        assert_eq!(access.claims["email"], "a@b.com");
        assert_eq!(access.claims["name"], "Kim");

        let refresh = flow.token_issuer().parse_token(&result.tokens.refresh_token).unwrap();
        assert_eq!(refresh.sub, "abc123");
        assert!(refresh.exp > access.exp);
    }

    #[tokio::test]
    async fn test_missing_optional_fields_become_empty_claims() {
        let server = MockServer::start().await;
        mount_token(&server, json!({ "access_token": "X" })).await;
        mount_profile(&server, json!({ "resultcode": "00", "response": { "id": "abc123" } })).await;

        let flow = LoginFlow::new(&config_for(&server)).unwrap();
        let started = flow.start().unwrap();
        let result = flow.complete(&callback("code", &started.state)).await.unwrap();

        let access = flow.token_issuer().parse_token(&result.tokens.access_token).unwrap();
        assert_eq!(access.claims["email"], "");
        assert_eq!(access.claims["name"], "");
    }

    #[tokio::test]
    async fn test_exchange_failure_stops_flow() {
        let server = MockServer::start().await;
        mount_token(&server, json!({ "error": "invalid_grant" })).await;
        Mock::given(method("GET"))
            .and(path("/v1/nid/me"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let flow = LoginFlow::new(&config_for(&server)).unwrap();
        let started = flow.start().unwrap();
        let err = flow.complete(&callback("code", &started.state)).await.unwrap_err();

        assert!(matches!(err, OAuthError::ExchangeFailed { .. }));
        assert_eq!(err.to_string(), "provider token exchange failed");
    }

    #[tokio::test]
    async fn test_profile_without_id_fails() {
        let server = MockServer::start().await;
        mount_token(&server, json!({ "access_token": "X" })).await;
        mount_profile(&server, json!({ "resultcode": "00", "response": { "email": "a@b.com" } })).await;

        let flow = LoginFlow::new(&config_for(&server)).unwrap();
        let started = flow.start().unwrap();
        let err = flow.complete(&callback("code", &started.state)).await.unwrap_err();

        assert!(matches!(err, OAuthError::ProfileFetchFailed { .. }));
        assert_eq!(err.to_string(), "profile fetch failed");
    }

    #[tokio::test]
    async fn test_unknown_or_replayed_state_rejected() {
        let server = MockServer::start().await;
        mount_token(&server, json!({ "access_token": "X" })).await;
        mount_profile(&server, json!({ "response": { "id": "abc123" } })).await;

        let flow = LoginFlow::new(&config_for(&server)).unwrap();
        let err = flow.complete(&callback("code", "forged")).await.unwrap_err();
        assert!(matches!(err, OAuthError::InvalidState));

        let started = flow.start().unwrap();
        flow.complete(&callback("code", &started.state)).await.unwrap();
        let err = flow.complete(&callback("code", &started.state)).await.unwrap_err();
        assert!(matches!(err, OAuthError::InvalidState));
    }

    #[tokio::test]
    async fn test_state_check_can_be_disabled() {
        let server = MockServer::start().await;
        mount_token(&server, json!({ "access_token": "X" })).await;
        mount_profile(&server, json!({ "response": { "id": "abc123" } })).await;

        let mut config = config_for(&server);
        config.verify_state = false;
        let flow = LoginFlow::new(&config).unwrap();

        let result = flow.complete(&callback("code", "never-issued")).await.unwrap();
        assert_eq!(result.user.id, "abc123");
    }

    #[tokio::test]
    async fn test_provider_denial_and_missing_code() {
        let flow = LoginFlow::new(&config_from(&test_vars()).unwrap()).unwrap();

        let denied = CallbackParams {
            error: Some("access_denied".to_string()),
            error_description: Some("Canceled By User".to_string()),
            ..Default::default()
        };
        let err = flow.complete(&denied).await.unwrap_err();
        assert_eq!(err.to_string(), "Canceled By User");

        let err = flow.complete(&CallbackParams::default()).await.unwrap_err();
        assert!(matches!(err, OAuthError::MissingCode));
    }

    #[test]
    fn test_redirect_urls() {
        let base = Url::parse("https://www.example.com/app/").unwrap();
        let result = LoginResult {
            tokens: IssuedTokenPair {
                access_token: "aaa.bbb.ccc".to_string(),
                refresh_token: "ddd.eee.fff".to_string(),
            },
            user: ProfileSummary {
                id: "abc123".to_string(),
                email: None,
                nickname: None,
                name: None,
                profile_image: None,
            },
            provider: PROVIDER_NAVER,
        };

        assert_eq!(
            success_redirect_url(&base, &result).as_str(),
            "https://www.example.com/app/oauth/callback?accessToken=aaa.bbb.ccc&refreshToken=ddd.eee.fff&provider=naver&success=true"
        );
        assert_eq!(
            error_redirect_url(&base, "profile fetch failed").as_str(),
            "https://www.example.com/app/oauth/error?error=profile+fetch+failed&provider=naver"
        );

        let root = Url::parse("http://localhost:3000").unwrap();
        assert_eq!(
            error_redirect_url(&root, "x").as_str(),
            "http://localhost:3000/oauth/error?error=x&provider=naver"
        );
    }
}
