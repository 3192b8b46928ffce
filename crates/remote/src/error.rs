//! Error types for remote associations
//!
//! Separates declaration and resolution failures (`AssociationError`) from
//! failures reported by the remote API itself (`RemoteError`).

use thiserror::Error;

/// Result type alias for association operations
pub type AssociationResult<T> = Result<T, AssociationError>;

/// Result type alias for remote client operations
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors raised while declaring or resolving associations
#[derive(Debug, Error)]
pub enum AssociationError {
    /// No definition registered under this name for the model
    #[error("Association '{name}' not found for model '{model}'")]
    NotFound { model: String, name: String },

    /// The name is already registered for the model
    #[error("Association '{name}' is already defined for model '{model}'")]
    Duplicate { model: String, name: String },

    /// Declaration options could not produce a complete definition
    #[error("Invalid association '{name}' on model '{model}': {message}")]
    InvalidDefinition {
        model: String,
        name: String,
        message: String,
    },

    /// The local record does not expose its declared key field
    #[error("Record of model '{model}' does not expose key field '{field}'")]
    MissingKey { model: String, field: String },

    /// A typed accessor was used against the other cardinality
    #[error("Association '{name}' on model '{model}' is not a {expected} association")]
    CardinalityMismatch {
        model: String,
        name: String,
        expected: String,
    },

    /// Failure reported by the remote client
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl AssociationError {
    pub fn not_found(model: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            model: model.into(),
            name: name.into(),
        }
    }

    pub fn duplicate(model: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Duplicate {
            model: model.into(),
            name: name.into(),
        }
    }

    pub fn invalid(
        model: impl Into<String>,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidDefinition {
            model: model.into(),
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn missing_key(model: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingKey {
            model: model.into(),
            field: field.into(),
        }
    }
}

/// Errors reported by a `RemoteClient`
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The remote API has nothing for this request
    #[error("Remote resource '{resource}' not found")]
    NotFound { resource: String },

    /// Non-success HTTP status other than 404
    #[error("Remote resource '{resource}' returned status {status}: {message}")]
    Status {
        resource: String,
        status: u16,
        message: String,
    },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Decode error: {message}")]
    Decode { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl RemoteError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// True only for the "no relation" outcome, never for lookup failures
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::decode(err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        Self::decode(err.to_string())
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration '{field}': {hint}")]
    MissingRequired { field: String, hint: String },

    #[error("Invalid value '{value}' for '{field}', expected {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },
}

impl From<ConfigError> for RemoteError {
    fn from(err: ConfigError) -> Self {
        Self::configuration(err.to_string())
    }
}
