//! OAuth2 token lifecycle for the NIBE Uplink API: acquisition with the
//! Authorization-Code grant, file storage, and transparent refresh.

pub mod client;
pub mod defaults;
pub mod error;
pub mod flow;
pub mod state;
pub mod storage;
pub mod types;

pub use {
    client::{ApiResponse, AuthorizedClient},
    defaults::{default_token_path, load_oauth_config, token_path},
    error::{OAuthError, StoreError},
    flow::{MIN_AUTHORIZATION_CODE_LEN, OAuthFlow, validate_authorization_code},
    state::generate_state,
    storage::{TokenPersister, TokenStore},
    types::{OAuthConfig, OAuthTokens, now_secs, serialize_option_secret, serialize_secret},
};
