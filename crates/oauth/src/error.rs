use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("invalid authorization code: expected at least {min} characters, got {len}")]
    InvalidAuthorizationCode { len: usize, min: usize },

    #[error("token endpoint returned token_type {0:?}, expected \"bearer\"")]
    UnexpectedTokenType(String),

    #[error("token endpoint returned HTTP {status}: {body}")]
    TokenEndpoint { status: u16, body: String },

    #[error("token endpoint returned an unreadable token: {0}")]
    InvalidTokenResponse(#[source] serde_json::Error),

    #[error("access token expired and no refresh token is stored; run `nibe auth login`")]
    MissingRefreshToken,

    #[error("API call not successful: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to decode API response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no token stored at {}; run `nibe auth login` first", path.display())]
    NotFound { path: PathBuf },

    #[error("token file {} is not valid token JSON: {source}", path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("token file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize token: {0}")]
    Serialize(#[source] serde_json::Error),
}
