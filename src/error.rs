use thiserror::Error;

/// Failures of a login attempt.
///
/// `Display` is the message shown on the front-end error page. The `reason`
/// fields carry diagnostics that are logged and never sent to the browser.
#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("{0}")]
    ProviderDenied(String),
    #[error("authorization code missing")]
    MissingCode,
    #[error("invalid or expired state")]
    InvalidState,
    #[error("too many pending logins, try again shortly")]
    TooManyPendingLogins,
    #[error("provider token exchange failed")]
    ExchangeFailed { reason: String },
    #[error("profile fetch failed")]
    ProfileFetchFailed { reason: String },
    #[error("token issuance failed")]
    TokenSigningFailed { reason: String },
}

impl OAuthError {
    pub fn exchange(reason: impl ToString) -> Self {
        OAuthError::ExchangeFailed {
            reason: reason.to_string(),
        }
    }

    pub fn profile(reason: impl ToString) -> Self {
        OAuthError::ProfileFetchFailed {
            reason: reason.to_string(),
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            OAuthError::ExchangeFailed { reason }
            | OAuthError::ProfileFetchFailed { reason }
            | OAuthError::TokenSigningFailed { reason } => Some(reason.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(err.to_string()),
        }
    }
}
