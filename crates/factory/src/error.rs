//! Error types for the factory system

use thiserror::Error;

/// Result type alias for factory operations
pub type FactoryResult<T> = Result<T, FactoryError>;

/// Errors raised while synthesizing, persisting or seeding records
#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("Unknown entity kind: {kind}")]
    UnknownEntityKind { kind: String },

    #[error("Unknown override '{name}' for entity kind {kind}")]
    UnknownOverride { kind: String, name: String },

    #[error("Invalid parameter '{parameter}' for override '{name}': {message}")]
    InvalidOverrideParameter {
        name: String,
        parameter: String,
        message: String,
    },

    #[error("Invalid attribute for {kind}: {source}")]
    InvalidAttribute {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{kind} record has no identifier; persist it before using it as a relation")]
    MissingIdentifier { kind: String },

    #[error("Relation depth exceeded while creating {kind} (limit: {limit})")]
    RelationDepthExceeded { kind: String, limit: usize },

    #[error("Failed to persist {kind} record: {source}")]
    Persistence {
        kind: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Seeding error: {message}")]
    Seeding { message: String },

    #[error("Invalid configuration value '{value}' for {field}, expected {expected}")]
    Configuration {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FactoryError {
    pub fn unknown_override(kind: impl Into<String>, name: impl Into<String>) -> Self {
        FactoryError::UnknownOverride {
            kind: kind.into(),
            name: name.into(),
        }
    }

    pub fn invalid_parameter(
        name: impl Into<String>,
        parameter: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        FactoryError::InvalidOverrideParameter {
            name: name.into(),
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Wrap an error coming from a record store
    pub fn persistence<E>(kind: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        FactoryError::Persistence {
            kind: kind.into(),
            source: Box::new(source),
        }
    }

    pub fn seeding(message: impl Into<String>) -> Self {
        FactoryError::Seeding {
            message: message.into(),
        }
    }
}
