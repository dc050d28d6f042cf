//! Bearer-token authentication against the external auth provider.
//!
//! Handlers take an [`AuthUser`] argument; the extractor rejects the request
//! with 401 before the handler runs if the token is missing or rejected.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

const INVALID_TOKEN: &str = "Invalid or expired token";

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: String,
}

/// Verifies a bearer token and resolves the identity behind it.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn verify(&self, token: &str) -> Result<AuthUser, AppError>;
}

/// Asks the auth provider's user endpoint who owns the token.
#[derive(Clone)]
pub struct RemoteAuthenticator {
    client: Client,
    user_endpoint: String,
    service_key: String,
}

impl RemoteAuthenticator {
    pub fn new(auth_url: &str, service_key: String) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()?,
            user_endpoint: format!("{}/auth/v1/user", auth_url.trim_end_matches('/')),
            service_key,
        })
    }
}

#[async_trait]
impl Authenticator for RemoteAuthenticator {
    async fn verify(&self, token: &str) -> Result<AuthUser, AppError> {
        let response = self
            .client
            .get(&self.user_endpoint)
            .header("apikey", &self.service_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                warn!("Auth provider unreachable: {e}");
                AppError::Unauthorized(INVALID_TOKEN.to_string())
            })?;

        if !response.status().is_success() {
            return Err(AppError::Unauthorized(INVALID_TOKEN.to_string()));
        }

        response.json::<AuthUser>().await.map_err(|e| {
            warn!("Auth provider returned an unreadable user: {e}");
            AppError::Unauthorized(INVALID_TOKEN.to_string())
        })
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;
        state.auth.verify(token).await
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
