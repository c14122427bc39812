//! OAuth2 access tokens for the FCM HTTP v1 API.
//!
//! Tokens come either from configuration as-is or are minted from a Google
//! service account key (JWT bearer grant) and cached until shortly before
//! they expire.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{FastNewsError, Result};

/// OAuth2 scope for sending FCM messages.
pub const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

/// Lifetime requested for minted tokens, in seconds.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens are refreshed this long before they expire.
const REFRESH_MARGIN_SECS: i64 = 300;

/// The fields of a service account key file that are needed here.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl ServiceAccountKey {
    /// Load a key from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse a key from JSON.
    pub fn parse(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| FastNewsError::Config(format!("invalid service account key: {e}")))
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

enum TokenSource {
    Static(String),
    ServiceAccount {
        key: ServiceAccountKey,
        encoding_key: EncodingKey,
        client: Client,
        cache: Mutex<Option<CachedToken>>,
    },
}

/// Source of bearer tokens for the push API.
pub struct TokenProvider {
    source: TokenSource,
}

impl TokenProvider {
    /// Provider returning a fixed token.
    pub fn fixed(token: impl Into<String>) -> Self {
        Self {
            source: TokenSource::Static(token.into()),
        }
    }

    /// Provider minting tokens from a service account key.
    pub fn service_account(key: ServiceAccountKey, client: Client) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| FastNewsError::Config(format!("invalid service account private key: {e}")))?;
        Ok(Self {
            source: TokenSource::ServiceAccount {
                key,
                encoding_key,
                client,
                cache: Mutex::new(None),
            },
        })
    }

    /// Get a valid access token.
    pub async fn token(&self) -> Result<String> {
        match &self.source {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::ServiceAccount {
                key,
                encoding_key,
                client,
                cache,
            } => {
                let mut cache = cache.lock().await;
                let now = Utc::now();
                if let Some(cached) = cache.as_ref().filter(|c| c.is_fresh(now)) {
                    return Ok(cached.value.clone());
                }

                let fresh = exchange_assertion(client, key, encoding_key, now).await?;
                let value = fresh.value.clone();
                *cache = Some(fresh);
                Ok(value)
            }
        }
    }
}

async fn exchange_assertion(
    client: &Client,
    key: &ServiceAccountKey,
    encoding_key: &EncodingKey,
    now: DateTime<Utc>,
) -> Result<CachedToken> {
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: FCM_SCOPE,
        aud: &key.token_uri,
        iat: now.timestamp(),
        exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
    };
    let assertion = encode(&Header::new(Algorithm::RS256), &claims, encoding_key)
        .map_err(|e| FastNewsError::Push(format!("failed to sign token assertion: {e}")))?;

    debug!("Requesting access token from {}", key.token_uri);
    let response = client
        .post(&key.token_uri)
        .form(&[
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion.as_str()),
        ])
        .send()
        .await
        .map_err(|e| FastNewsError::Push(format!("token request failed: {e}")))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(FastNewsError::Push(format!(
            "token request rejected: {status}: {body}"
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| FastNewsError::Push(format!("invalid token response: {e}")))?;

    Ok(CachedToken {
        value: token.access_token,
        expires_at: now + Duration::seconds(token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS)),
    })
}
