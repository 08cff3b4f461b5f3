//! Editor error taxonomy.
//!
//! Every variant here is a *foreground* failure: it halts the operation
//! that triggered it and is retained as the editor's last error. Debounced
//! persist failures never appear here — they are background noise, logged
//! and broadcast as [`EditorEvent::PersistFailed`](crate::EditorEvent)
//! while editing continues.

use quire_service::ServiceError;
use quire_types::{PartKind, SectionId};

/// A foreground editor failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    /// Fetching the document or its sections failed; the collection is
    /// left empty and nothing is retried.
    #[error("failed to load document: {0}")]
    Load(ServiceError),
    /// Creating the template catalog for an empty document failed partway.
    #[error("failed to provision manuscript template: {0}")]
    Provision(ServiceError),
    /// The remote create failed; nothing was applied locally.
    #[error("failed to add section: {0}")]
    Create(ServiceError),
    /// The remote delete failed; the collection is untouched.
    #[error("failed to delete section: {0}")]
    Delete(ServiceError),
    /// The section id is not in the open document.
    #[error("section {0} is not in the open document")]
    UnknownSection(SectionId),
    /// Only chapters have user-editable names.
    #[error("the {0} part has a fixed name")]
    FixedPartRename(PartKind),
    /// The editor has no loaded document metadata yet.
    #[error("no document is loaded")]
    NotLoaded,
}
