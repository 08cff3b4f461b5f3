//! Service error taxonomy.

use quire_types::{DocumentId, SectionId};

/// What a persistence call can fail with.
///
/// `Clone` so failures can be both surfaced to callers and retained as
/// editor state without re-contacting the service.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The document does not exist at the service.
    #[error("document {0} not found")]
    DocumentNotFound(DocumentId),
    /// The section does not exist at the service.
    #[error("section {0} not found")]
    SectionNotFound(SectionId),
    /// The service could not be reached or refused the call.
    #[error("service unavailable: {0}")]
    Unavailable(String),
    /// The backend failed internally.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result alias for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
