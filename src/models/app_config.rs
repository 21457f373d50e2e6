use oauth2::{AuthUrl, ClientId, ClientSecret, RedirectUrl, TokenUrl};
use reqwest::Url;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use time::Duration;

use crate::auth::LoginFlow;

const DEFAULT_AUTHORIZE_URL: &str = "https://nid.naver.com/oauth2.0/authorize";
const DEFAULT_TOKEN_URL: &str = "https://nid.naver.com/oauth2.0/token";
const DEFAULT_USER_INFO_URL: &str = "https://openapi.naver.com/v1/nid/me";
const DEFAULT_FRONTEND_REDIRECT_URL: &str = "http://localhost:3000";
const DEFAULT_ACCESS_TOKEN_VALIDITY_SECONDS: &str = "3600";
const DEFAULT_REFRESH_TOKEN_VALIDITY_SECONDS: &str = "1209600";
const DEFAULT_STATE_TTL_SECONDS: &str = "600";
const DEFAULT_STATE_MAX_PENDING: &str = "10000";
// 100 years; keeps `now + validity` inside the representable date range.
const MAX_SECONDS: i64 = 100 * 365 * 24 * 3600;
const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not found")]
    Missing(&'static str),
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid(var: &'static str, reason: impl ToString) -> Self {
        ConfigError::Invalid {
            var,
            reason: reason.to_string(),
        }
    }
}

/// Naver application registration and endpoints.
#[derive(Debug, Clone)]
pub struct NaverConfig {
    pub client_id: ClientId,
    pub client_secret: ClientSecret,
    pub redirect_uri: RedirectUrl,
    pub authorize_url: AuthUrl,
    pub token_url: TokenUrl,
    pub user_info_url: Url,
}

/// Signing material for issued tokens. Not `Debug` so the secret never ends up in a log line.
#[derive(Clone)]
pub struct JwtConfig {
    /// Base64-encoded HMAC key.
    pub secret: String,
    pub access_token_validity: Duration,
    pub refresh_token_validity: Duration,
}

#[derive(Clone)]
pub struct AppConfig {
    pub naver: NaverConfig,
    pub jwt: JwtConfig,
    pub frontend_redirect_url: Url,
    pub verify_state: bool,
    pub state_ttl: Duration,
    pub max_pending_states: usize,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        use dotenvy::dotenv;
        use std::env;

        dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let required = |var: &'static str| value(var).ok_or(ConfigError::Missing(var));
        let or_default = |var: &str, default: &str| value(var).unwrap_or_else(|| default.to_string());

        let naver = NaverConfig {
            client_id: ClientId::new(required("OAUTH_NAVER_CLIENT_ID")?),
            client_secret: ClientSecret::new(required("OAUTH_NAVER_CLIENT_SECRET")?),
            redirect_uri: RedirectUrl::new(required("OAUTH_NAVER_REDIRECT_URI")?)
                .map_err(|e| ConfigError::invalid("OAUTH_NAVER_REDIRECT_URI", e))?,
            authorize_url: AuthUrl::new(or_default("OAUTH_NAVER_AUTHORIZE_URL", DEFAULT_AUTHORIZE_URL))
                .map_err(|e| ConfigError::invalid("OAUTH_NAVER_AUTHORIZE_URL", e))?,
            token_url: TokenUrl::new(or_default("OAUTH_NAVER_TOKEN_URL", DEFAULT_TOKEN_URL))
                .map_err(|e| ConfigError::invalid("OAUTH_NAVER_TOKEN_URL", e))?,
            user_info_url: parse_url(
                "OAUTH_NAVER_USER_INFO_URL",
                &or_default("OAUTH_NAVER_USER_INFO_URL", DEFAULT_USER_INFO_URL),
            )?,
        };

        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            access_token_validity: parse_seconds(
                "JWT_ACCESS_TOKEN_VALIDITY_IN_SECONDS",
                &or_default(
                    "JWT_ACCESS_TOKEN_VALIDITY_IN_SECONDS",
                    DEFAULT_ACCESS_TOKEN_VALIDITY_SECONDS,
                ),
            )?,
            refresh_token_validity: parse_seconds(
                "JWT_REFRESH_TOKEN_VALIDITY_IN_SECONDS",
                &or_default(
                    "JWT_REFRESH_TOKEN_VALIDITY_IN_SECONDS",
                    DEFAULT_REFRESH_TOKEN_VALIDITY_SECONDS,
                ),
            )?,
        };

        let frontend_redirect_url = parse_url(
            "OAUTH_FRONTEND_REDIRECT_URL",
            &or_default("OAUTH_FRONTEND_REDIRECT_URL", DEFAULT_FRONTEND_REDIRECT_URL),
        )?;
        if frontend_redirect_url.cannot_be_a_base() {
            return Err(ConfigError::invalid(
                "OAUTH_FRONTEND_REDIRECT_URL",
                "must be an absolute http(s) URL",
            ));
        }

        let verify_state = parse_bool("OAUTH_STATE_VERIFY", &or_default("OAUTH_STATE_VERIFY", "true"))?;
        let state_ttl = parse_seconds(
            "OAUTH_STATE_TTL_SECONDS",
            &or_default("OAUTH_STATE_TTL_SECONDS", DEFAULT_STATE_TTL_SECONDS),
        )?;
        let max_pending_states = or_default("OAUTH_STATE_MAX_PENDING", DEFAULT_STATE_MAX_PENDING)
            .trim()
            .parse::<usize>()
            .map_err(|e| ConfigError::invalid("OAUTH_STATE_MAX_PENDING", e))?;
        if max_pending_states == 0 {
            return Err(ConfigError::invalid("OAUTH_STATE_MAX_PENDING", "must be at least 1"));
        }
        let bind_addr = or_default("SERVER_ADDR", DEFAULT_SERVER_ADDR)
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::invalid("SERVER_ADDR", e))?;

        Ok(Self {
            naver,
            jwt,
            frontend_redirect_url,
            verify_state,
            state_ttl,
            max_pending_states,
            bind_addr,
        })
    }
}

fn parse_url(var: &'static str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError::invalid(var, e))
}

fn parse_seconds(var: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    let seconds = raw
        .trim()
        .parse::<i64>()
        .map_err(|e| ConfigError::invalid(var, e))?;
    if seconds <= 0 {
        return Err(ConfigError::invalid(var, "must be a positive number of seconds"));
    }
    if seconds > MAX_SECONDS {
        return Err(ConfigError::invalid(
            var,
            format!("must not exceed {} seconds", MAX_SECONDS),
        ));
    }
    Ok(Duration::seconds(seconds))
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(ConfigError::invalid(var, format!("expected a boolean, got '{}'", other))),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub login_flow: Arc<LoginFlow>,
}
