use thiserror::Error;

use journal_auth::{AccessDenied, DirectoryError};
use journal_core::DomainError;

pub type AdminResult<T> = Result<T, AdminError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdminError {
    /// The guard refused; `reason` is shown to the user verbatim.
    #[error("{0}")]
    Denied(#[from] AccessDenied),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

impl AdminError {
    /// Stable machine-readable code for callers that render errors.
    pub fn code(&self) -> &'static str {
        match self {
            AdminError::Denied(_) => "forbidden",
            AdminError::Domain(DomainError::Validation(_)) => "validation_error",
            AdminError::Domain(DomainError::InvalidId(_)) => "invalid_id",
            AdminError::Domain(DomainError::InvariantViolation(_)) => "invariant_violation",
            AdminError::Domain(DomainError::NotFound) => "not_found",
            AdminError::Domain(DomainError::Conflict(_)) => "conflict",
            AdminError::Unavailable(_) => "unavailable",
        }
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, AdminError::Denied(_))
    }
}

impl From<DirectoryError> for AdminError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Unavailable(msg) => AdminError::Unavailable(msg),
            DirectoryError::NotFound => DomainError::not_found().into(),
            DirectoryError::UnknownRole(id) => DomainError::validation(format!("unknown role {id}")).into(),
            DirectoryError::Conflict(msg) => DomainError::conflict(msg).into(),
            DirectoryError::LastProtectedUser => DomainError::invariant(err.to_string()).into(),
        }
    }
}
