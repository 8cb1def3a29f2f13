// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication collaborator.
//!
//! The API issues a signed session token on sign-in/sign-up. The token's
//! payload carries the user record; the client decodes it without checking
//! the signature (only the server holds the key) but does enforce expiry.

use crate::error::{AppError, FieldErrors, Result};
use crate::models::{Credentials, User};
use crate::services::http::ApiClient;
use crate::services::token_store::TokenStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// Authentication operations consumed by the session flows.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// User from a previous sign-in, if the stored session is still valid.
    fn get_user(&self) -> Option<User>;

    /// Exchange credentials for a session. Fails with `Auth` on bad credentials.
    async fn sign_in(&self, credentials: &Credentials) -> Result<User>;

    /// Create an account and start a session.
    async fn sign_up(&self, credentials: &Credentials) -> Result<User>;

    /// Drop the stored session token.
    fn sign_out(&self);
}

/// Session token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user: User,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl SessionClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Decode a session token's claims, rejecting expired tokens.
pub fn decode_session_token(token: &str) -> Result<SessionClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();

    decode::<SessionClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AppError::Auth("Session expired".to_string()),
            _ => AppError::Auth(format!("Invalid session token: {}", e)),
        })
}

/// Turn `validator` failures into form-level errors.
pub(crate) fn credential_errors(errors: validator::ValidationErrors) -> AppError {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let mut out = FieldErrors::new();
    for (field, failures) in fields {
        for failure in failures {
            let message = failure
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("{} is invalid", field));
            out.push_form(message);
        }
    }
    AppError::Validation(out)
}

#[derive(Deserialize)]
struct TokenResponse {
    token: String,
}

/// HTTP-backed authentication service.
#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
    tokens: Arc<dyn TokenStore>,
}

impl AuthService {
    pub fn new(api: ApiClient, tokens: Arc<dyn TokenStore>) -> Self {
        Self { api, tokens }
    }

    /// POST credentials to an auth endpoint and persist the returned token.
    async fn request_session(&self, path: &str, credentials: &Credentials) -> Result<User> {
        credentials.validate().map_err(credential_errors)?;

        let request = self.api.http().post(self.api.url(path)).json(credentials);
        let response = self.api.send(request).await?;
        let TokenResponse { token } = self.api.check_response_json(response, "account").await?;

        let claims = decode_session_token(&token)?;
        self.tokens.save(&token)?;

        tracing::info!(
            user_id = %claims.user.id,
            username = %claims.user.username,
            expires_at = ?claims.expires_at(),
            "Session started"
        );
        Ok(claims.user)
    }
}

#[async_trait]
impl AuthApi for AuthService {
    fn get_user(&self) -> Option<User> {
        let token = self.tokens.load()?;

        match decode_session_token(&token) {
            Ok(claims) => Some(claims.user),
            Err(e) => {
                tracing::info!(error = %e, "Discarding stored session token");
                self.tokens.clear();
                None
            }
        }
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<User> {
        self.request_session("/auth/signin", credentials).await
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<User> {
        self.request_session("/auth/signup", credentials).await
    }

    fn sign_out(&self) {
        self.tokens.clear();
        tracing::info!("Session token cleared");
    }
}
