//! Events broadcast to UI layers.

use quire_service::ServiceError;
use quire_types::SectionId;

use crate::autosave::AutosaveKey;

/// What just happened to the editor's state.
///
/// Broadcast on a `tokio::sync::broadcast` channel; UI layers subscribe
/// via [`SectionEditor::subscribe`](crate::SectionEditor::subscribe) and
/// re-render from the read accessors. Missing an event is safe — events
/// carry ids, not state.
#[derive(Clone, Debug)]
pub enum EditorEvent {
    /// The document finished loading (or provisioning) and the collection
    /// was replaced.
    Loaded { sections: usize, provisioned: bool },
    /// The selection moved.
    Selected { section: Option<SectionId> },
    /// A section's content changed locally.
    ContentEdited { section: SectionId },
    /// A chapter was renamed locally.
    NameEdited { section: SectionId },
    /// A new chapter was created and selected.
    ChapterAdded { section: SectionId },
    /// A section was deleted (selection may have been repaired).
    SectionDeleted { section: SectionId },
    /// A section traded order with a neighbor.
    Reordered { section: SectionId },
    /// The document metadata changed locally.
    MetaEdited,
    /// A debounced persist failed. Background only: local state keeps the
    /// optimistic value and the next edit on the key retries naturally.
    PersistFailed {
        key: AutosaveKey,
        error: ServiceError,
    },
    /// `flush()` pushed this many pending writes out immediately.
    Flushed { writes: usize },
}
