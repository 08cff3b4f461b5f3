//! The `DocumentService` trait.

use async_trait::async_trait;

use quire_types::{
    DocumentId, DocumentMeta, DocumentPatch, NewDocument, NewSection, Section, SectionId,
    SectionPatch,
};

use crate::error::ServiceResult;

/// The Document Persistence Service.
///
/// Object-safe and `Send + Sync` so one `Arc<dyn DocumentService>` can be
/// shared between the editor and its autosave timer tasks.
///
/// Semantics the editor relies on:
///
/// - `create_section` mints the [`SectionId`](quire_types::SectionId) —
///   callers never invent one.
/// - `update_section` / `update_document` are full-value overwrites of the
///   fields present in the patch, never deltas, so calls for different
///   fields or sections may complete in any order.
/// - No operation retries internally; a failure is terminal for that
///   attempt and the caller decides what it means.
#[async_trait]
pub trait DocumentService: Send + Sync {
    // ── Sections ─────────────────────────────────────────────────────────

    /// All sections of a document, in no particular order.
    async fn list_sections(&self, document: DocumentId) -> ServiceResult<Vec<Section>>;

    /// Create a section; the service assigns the id and returns the full
    /// record.
    async fn create_section(
        &self,
        document: DocumentId,
        section: NewSection,
    ) -> ServiceResult<Section>;

    /// Overwrite the fields present in `patch` on one section.
    async fn update_section(
        &self,
        document: DocumentId,
        section: SectionId,
        patch: SectionPatch,
    ) -> ServiceResult<()>;

    /// Delete one section.
    async fn delete_section(&self, document: DocumentId, section: SectionId)
        -> ServiceResult<()>;

    // ── Documents ────────────────────────────────────────────────────────

    /// Create a document record.
    async fn create_document(&self, document: NewDocument) -> ServiceResult<DocumentMeta>;

    /// All document records.
    async fn list_documents(&self) -> ServiceResult<Vec<DocumentMeta>>;

    /// One document's metadata.
    async fn get_document(&self, document: DocumentId) -> ServiceResult<DocumentMeta>;

    /// Overwrite the fields present in `patch` on one document.
    async fn update_document(
        &self,
        document: DocumentId,
        patch: DocumentPatch,
    ) -> ServiceResult<()>;

    /// Delete a document and all of its sections.
    async fn delete_document(&self, document: DocumentId) -> ServiceResult<()>;
}
