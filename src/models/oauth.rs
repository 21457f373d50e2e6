use oauth2::{AccessToken, RefreshToken};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const PROVIDER_NAVER: &str = "naver";

/// Query string of the provider redirect. Naver sends `error`/`error_description`
/// instead of `code` when the user cancels consent.
#[derive(Debug, Deserialize, Default)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginUrlResponse {
    pub url: String,
    pub state: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Raw body of the Naver token endpoint.
#[derive(Debug, Deserialize)]
pub struct NaverTokenResponse {
    pub access_token: Option<AccessToken>,
    pub refresh_token: Option<RefreshToken>,
    pub token_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_expires_in")]
    pub expires_in: Option<u64>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Raw body of the Naver user-info endpoint.
#[derive(Debug, Deserialize)]
pub struct NaverUserInfo {
    #[serde(rename = "resultcode")]
    pub result_code: Option<String>,
    pub message: Option<String>,
    pub response: Option<NaverUserResponse>,
}

#[derive(Debug, Deserialize)]
pub struct NaverUserResponse {
    pub id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub nickname: Option<String>,
    pub profile_image: Option<String>,
}

/// A successful code exchange; the access token is guaranteed present.
#[derive(Debug, Clone)]
pub struct ProviderTokenResult {
    pub access_token: AccessToken,
    pub refresh_token: Option<RefreshToken>,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderUserProfile {
    pub external_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub nickname: Option<String>,
    pub profile_image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedTokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSummary {
    pub id: String,
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub name: Option<String>,
    pub profile_image: Option<String>,
}

impl From<&ProviderUserProfile> for ProfileSummary {
    fn from(profile: &ProviderUserProfile) -> Self {
        ProfileSummary {
            id: profile.external_id.clone(),
            email: profile.email.clone(),
            nickname: profile.nickname.clone(),
            name: profile.name.clone(),
            profile_image: profile.profile_image_url.clone(),
        }
    }
}

/// Outcome of a completed login; delivered to the browser as redirect query parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResult {
    pub tokens: IssuedTokenPair,
    pub user: ProfileSummary,
    pub provider: &'static str,
}

// Naver reports `expires_in` as a string ("3600"); other providers use a number.
fn deserialize_expires_in<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    })
}
