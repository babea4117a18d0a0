//! Error handling for the document engine
//!
//! Every error maps to a stable code so the front end can show a message and
//! focus the offending field.

use serde::Serialize;
use shared::SaveValidationError;
use thiserror::Error;

/// Engine error types
#[derive(Error, Debug)]
pub enum EngineError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    // Lifecycle errors
    #[error("Document is locked while {status}")]
    DocumentLocked { status: String },

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Linked document: {0}")]
    LinkedDocument(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Collaborator errors
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Serializable error body for the UI boundary
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl EngineError {
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Validation { .. } => "VALIDATION_ERROR",
            EngineError::DocumentLocked { .. } => "DOCUMENT_LOCKED",
            EngineError::InvalidStateTransition(_) => "INVALID_STATE_TRANSITION",
            EngineError::LinkedDocument(_) => "LINKED_DOCUMENT",
            EngineError::NotFound(_) => "NOT_FOUND",
            EngineError::StorageError(_) => "STORAGE_ERROR",
            EngineError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    pub fn detail(&self) -> ErrorDetail {
        let (message, field) = match self {
            EngineError::Validation { field, message } => (message.clone(), Some(field.clone())),
            EngineError::DocumentLocked { status } => (
                format!("This document is {} and cannot be edited", status.to_lowercase()),
                None,
            ),
            EngineError::InvalidStateTransition(msg) => (msg.clone(), None),
            EngineError::LinkedDocument(msg) => (msg.clone(), None),
            EngineError::NotFound(resource) => (format!("{} not found", resource), None),
            EngineError::StorageError(msg) => (format!("Could not save: {}", msg), None),
            EngineError::Configuration(msg) => (format!("Configuration error: {}", msg), None),
        };

        ErrorDetail {
            code: self.code().to_string(),
            message,
            field,
        }
    }
}

impl From<SaveValidationError> for EngineError {
    fn from(err: SaveValidationError) -> Self {
        EngineError::Validation {
            field: err.field,
            message: err.message,
        }
    }
}

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        EngineError::Configuration(err.to_string())
    }
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
