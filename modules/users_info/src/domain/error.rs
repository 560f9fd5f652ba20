use serde_json::Value;
use thiserror::Error;

/// Every failure the users domain can report. Rendered to HTTP only by
/// `api::rest::error::map_domain_error`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("User with Id {id} was not found")]
    UserNotFound { id: String },

    #[error("User with the email {email} already exists in the database")]
    EmailAlreadyExists { email: String },

    #[error("User with Id {id} already exists in the database")]
    IdAlreadyExists { id: String },

    #[error("{message}")]
    Validation {
        field: String,
        message: String,
        invalid_value: Option<Value>,
    },

    /// The random-user service answered with a failure status.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    /// The random-user service could not be reached or sent garbage.
    #[error("{message}")]
    Gateway { message: String },

    #[error("{message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn user_not_found(id: impl Into<String>) -> Self {
        Self::UserNotFound { id: id.into() }
    }

    pub fn email_already_exists(email: impl Into<String>) -> Self {
        Self::EmailAlreadyExists {
            email: email.into(),
        }
    }

    pub fn id_already_exists(id: impl Into<String>) -> Self {
        Self::IdAlreadyExists { id: id.into() }
    }

    pub fn validation(
        field: impl Into<String>,
        message: impl Into<String>,
        invalid_value: Option<Value>,
    ) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
            invalid_value,
        }
    }

    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    pub fn gateway(message: impl Into<String>) -> Self {
        Self::Gateway {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
