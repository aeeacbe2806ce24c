use std::time::{SystemTime, UNIX_EPOCH};

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize, Serializer},
    serde_json::{Map, Number, Value},
};

/// Client registration plus the endpoints of the authorization server.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub auth_url: String,
    pub token_url: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    /// Fixed anti-forgery state; generated per login when `None`.
    pub state: Option<String>,
}

/// Token set as issued by the token endpoint.
///
/// Fields the endpoint returns beyond the ones modelled here are kept in
/// `extra` so a stored file survives a load/save cycle unchanged.
#[derive(Clone, Serialize, Deserialize)]
pub struct OAuthTokens {
    #[serde(serialize_with = "serialize_secret")]
    pub access_token: Secret<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_option_secret"
    )]
    pub refresh_token: Option<Secret<String>>,
    pub token_type: String,
    /// Lifetime in seconds, as returned by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<Number>,
    /// Absolute expiry as UNIX seconds (integer or fractional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl std::fmt::Debug for OAuthTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthTokens")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("expires_at", &self.expires_at)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl OAuthTokens {
    /// Fill in `expires_at` from `expires_in` when the server sent only the latter.
    pub fn stamp_expiry(&mut self, now: f64) {
        if self.expires_at.is_some() {
            return;
        }
        if let Some(lifetime) = self.expires_in.as_ref().and_then(Number::as_f64) {
            self.expires_at = Number::from_f64(now + lifetime);
        }
    }

    pub fn expires_at_secs(&self) -> Option<f64> {
        self.expires_at.as_ref().and_then(Number::as_f64)
    }

    /// True when the access token expires within `leeway` seconds of `now`.
    /// A token without expiry metadata never counts as expired.
    pub fn is_expired(&self, now: f64, leeway: f64) -> bool {
        self.expires_at_secs()
            .is_some_and(|expires_at| expires_at <= now + leeway)
    }

    /// Seconds until expiry, negative once expired.
    pub fn remaining_secs(&self, now: f64) -> Option<f64> {
        self.expires_at_secs().map(|expires_at| expires_at - now)
    }
}

/// Current time as fractional UNIX seconds.
pub fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

pub fn serialize_secret<S: Serializer>(secret: &Secret<String>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(secret.expose_secret())
}

pub fn serialize_option_secret<S: Serializer>(
    secret: &Option<Secret<String>>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(secret) => s.serialize_some(secret.expose_secret()),
        None => s.serialize_none(),
    }
}
