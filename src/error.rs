// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with user-facing failure banners.

use crate::form::FormField;
use serde::Serialize;
use std::fmt;

/// Application error type shared by the store, collaborators and editor.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Network error: {0}")]
    Network(String),

    /// The server answered but the body could not be decoded. Retrying the
    /// same request returns the same body.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("No character currently selected")]
    MissingSelection,

    #[error("A save is already in progress")]
    SaveInProgress,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Coarse classification used by views to pick a failure presentation.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Auth(_) => ErrorKind::Auth,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::Network(_) => ErrorKind::Network,
            AppError::InvalidResponse(_) => ErrorKind::InvalidResponse,
            AppError::MissingSelection => ErrorKind::MissingSelection,
            AppError::SaveInProgress => ErrorKind::Busy,
            AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether retrying the same request could succeed without user changes.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Network(_) | AppError::SaveInProgress)
    }

    /// Expired or rejected sessions should send the user back to sign-in.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, AppError::Auth(_))
    }

    /// Per-field errors, if this is a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            AppError::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Convert into the banner shown to the user.
    pub fn banner(&self) -> ErrorBanner {
        let message = match self {
            AppError::Auth(_) => "Your session is invalid. Please sign in again.".to_string(),
            AppError::NotFound(what) => format!("Not found: {}", what),
            AppError::Validation(errors) => errors.to_string(),
            AppError::Network(_) => "Could not reach the server. Try again.".to_string(),
            AppError::InvalidResponse(_) => {
                "The server sent data this client cannot read.".to_string()
            }
            AppError::MissingSelection => "No character currently selected.".to_string(),
            AppError::SaveInProgress => "Still saving, please wait.".to_string(),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal error");
                "Something went wrong.".to_string()
            }
        };

        ErrorBanner {
            kind: self.kind(),
            message,
            retryable: self.is_retryable(),
        }
    }
}

/// Error classification exposed to views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Auth,
    NotFound,
    Validation,
    Network,
    InvalidResponse,
    MissingSelection,
    Busy,
    Internal,
}

/// User-visible failure state (error banner with optional retry affordance).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBanner {
    pub kind: ErrorKind,
    pub message: String,
    pub retryable: bool,
}

/// A single validation failure. `field` is `None` for form-level errors
/// reported by the server without a field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: Option<FormField>,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field {
            Some(field) => write!(f, "{}: {}", field.label(), self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Ordered collection of validation failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: FormField, message: impl Into<String>) {
        self.0.push(FieldError {
            field: Some(field),
            message: message.into(),
        });
    }

    /// Error not tied to a sheet field.
    pub fn push_form(&mut self, message: impl Into<String>) {
        self.0.push(FieldError {
            field: None,
            message: message.into(),
        });
    }

    /// Form-level error (e.g. a server-rejected payload).
    pub fn form(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push_form(message);
        errors
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// First message recorded for `field`, used to render inline messages.
    pub fn for_field(&self, field: FormField) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == Some(field))
            .map(|e| e.message.as_str())
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AppError>;
