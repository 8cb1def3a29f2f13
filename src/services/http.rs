// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared HTTP plumbing for the remote API.
//!
//! Maps response statuses onto [`AppError`]:
//! - 401/403 → `Auth`
//! - 404 → `NotFound`
//! - 400/422 → `Validation` (server-rejected payload)
//! - anything else, and transport failures → `Network`
//!
//! A success status with a body that does not decode is `InvalidResponse`.

use crate::error::{AppError, FieldErrors};
use crate::form::FormField;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Thin wrapper over `reqwest` bound to the API base URL.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url` (trailing slash optional).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Absolute URL for an API path such as `/characters/c1`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a prepared request, mapping transport failures.
    pub(crate) async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, AppError> {
        request.send().await.map_err(|e| {
            if e.is_timeout() {
                tracing::warn!(error = %e, "API request timed out");
            }
            AppError::Network(e.to_string())
        })
    }

    /// Check response status and parse the JSON body.
    pub(crate) async fn check_response_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        resource: &str,
    ) -> Result<T, AppError> {
        let response = check_status(response, resource).await?;

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;
        decode_body(&body, resource)
    }

    /// Check response status; an empty or `204` body yields `None`.
    pub(crate) async fn check_response_optional_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        resource: &str,
    ) -> Result<Option<T>, AppError> {
        let response = check_status(response, resource).await?;
        if response.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;
        if body.trim().is_empty() {
            return Ok(None);
        }

        decode_body(&body, resource).map(Some)
    }
}

fn decode_body<T: DeserializeOwned>(body: &str, resource: &str) -> Result<T, AppError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::warn!(resource, error = %e, "Undecodable API response");
        AppError::InvalidResponse(format!("{}: {}", resource, e))
    })
}

/// JSON error body returned by the API.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
    /// Per-field messages keyed by wire field name
    pub fields: BTreeMap<String, String>,
}

impl ErrorResponse {
    fn message(&self) -> String {
        match &self.details {
            Some(details) if !details.is_empty() => details.clone(),
            _ => self.error.clone(),
        }
    }

    fn into_field_errors(self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for (key, message) in &self.fields {
            match FormField::from_key(key) {
                Some(field) => errors.push(field, message.clone()),
                None => errors.push_form(format!("{}: {}", key, message)),
            }
        }
        if errors.is_empty() {
            errors.push_form(self.message());
        }
        errors
    }
}

async fn check_status(
    response: reqwest::Response,
    resource: &str,
) -> Result<reqwest::Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(error_from_status(status.as_u16(), &body, resource))
}

/// Map a non-success status and its body to an application error.
pub fn error_from_status(status: u16, body: &str, resource: &str) -> AppError {
    let parsed: Option<ErrorResponse> = serde_json::from_str(body).ok();

    match status {
        401 | 403 => {
            let message = parsed
                .map(|p| p.message())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "unauthorized".to_string());
            AppError::Auth(message)
        }
        404 => AppError::NotFound(resource.to_string()),
        400 | 422 => {
            let errors = match parsed {
                Some(p) => p.into_field_errors(),
                None if !body.trim().is_empty() => FieldErrors::form(body.trim()),
                None => FieldErrors::form("Request rejected by server"),
            };
            AppError::Validation(errors)
        }
        _ => {
            tracing::warn!(status, body = %body, "Unexpected API response");
            AppError::Network(format!("HTTP {}: {}", status, body))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            error_from_status(401, "", "Character c1"),
            AppError::Auth(_)
        ));
        assert!(matches!(
            error_from_status(403, "", "Character c1"),
            AppError::Auth(_)
        ));
        match error_from_status(404, "", "Character c1") {
            AppError::NotFound(what) => assert_eq!(what, "Character c1"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            error_from_status(503, "down", "Character c1"),
            AppError::Network(_)
        ));
    }

    #[test]
    fn test_server_field_errors_are_mapped() {
        let body = r#"{"error":"validation","fields":{"age":"must be positive","level":"bad"}}"#;
        let err = error_from_status(422, body, "Character c1");

        let errors = err.field_errors().expect("validation error");
        assert_eq!(errors.for_field(FormField::Age), Some("must be positive"));
        assert!(errors.iter().any(|e| e.field.is_none() && e.message == "level: bad"));
    }

    #[test]
    fn test_undecodable_body_is_not_retryable() {
        let err = decode_body::<crate::models::Character>(
            r#"{"_id":"c1","strength":"lots"}"#,
            "Character c1",
        )
        .unwrap_err();

        assert!(matches!(err, AppError::InvalidResponse(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_plain_text_rejection_is_form_level() {
        let err = error_from_status(400, "bad payload", "Character c1");
        let errors = err.field_errors().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.to_string(), "bad payload");
    }
}
