//! Fault-injecting service wrapper.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use quire_types::{
    DocumentId, DocumentMeta, DocumentPatch, NewDocument, NewSection, Section, SectionId,
    SectionPatch,
};

use crate::error::{ServiceError, ServiceResult};
use crate::service::DocumentService;

/// Operation classes that failures can be armed for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpClass {
    ListSections,
    CreateSection,
    UpdateSection,
    DeleteSection,
    CreateDocument,
    ListDocuments,
    GetDocument,
    UpdateDocument,
    DeleteDocument,
}

/// Wraps another service and fails armed operations.
///
/// Each call first consumes one armed failure for its class, if any, and
/// returns [`ServiceError::Unavailable`] without touching the inner
/// service. Used to exercise the editor's foreground/background failure
/// split without a real network.
pub struct FlakyService<S> {
    inner: S,
    armed: Mutex<HashMap<OpClass, u32>>,
}

impl<S> FlakyService<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            armed: Mutex::new(HashMap::new()),
        }
    }

    /// Arm the next call of `op` to fail.
    pub fn fail_next(&self, op: OpClass) {
        self.fail_times(op, 1);
    }

    /// Arm the next `times` calls of `op` to fail.
    pub fn fail_times(&self, op: OpClass, times: u32) {
        *self.armed.lock().entry(op).or_insert(0) += times;
    }

    /// The wrapped service.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Consume one armed failure for `op`, if any.
    fn trip(&self, op: OpClass) -> ServiceResult<()> {
        let mut armed = self.armed.lock();
        match armed.get_mut(&op) {
            Some(n) if *n > 0 => {
                *n -= 1;
                Err(ServiceError::Unavailable(format!(
                    "injected failure for {op:?}"
                )))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl<S: DocumentService> DocumentService for FlakyService<S> {
    async fn list_sections(&self, document: DocumentId) -> ServiceResult<Vec<Section>> {
        self.trip(OpClass::ListSections)?;
        self.inner.list_sections(document).await
    }

    async fn create_section(
        &self,
        document: DocumentId,
        section: NewSection,
    ) -> ServiceResult<Section> {
        self.trip(OpClass::CreateSection)?;
        self.inner.create_section(document, section).await
    }

    async fn update_section(
        &self,
        document: DocumentId,
        section: SectionId,
        patch: SectionPatch,
    ) -> ServiceResult<()> {
        self.trip(OpClass::UpdateSection)?;
        self.inner.update_section(document, section, patch).await
    }

    async fn delete_section(
        &self,
        document: DocumentId,
        section: SectionId,
    ) -> ServiceResult<()> {
        self.trip(OpClass::DeleteSection)?;
        self.inner.delete_section(document, section).await
    }

    async fn create_document(&self, document: NewDocument) -> ServiceResult<DocumentMeta> {
        self.trip(OpClass::CreateDocument)?;
        self.inner.create_document(document).await
    }

    async fn list_documents(&self) -> ServiceResult<Vec<DocumentMeta>> {
        self.trip(OpClass::ListDocuments)?;
        self.inner.list_documents().await
    }

    async fn get_document(&self, document: DocumentId) -> ServiceResult<DocumentMeta> {
        self.trip(OpClass::GetDocument)?;
        self.inner.get_document(document).await
    }

    async fn update_document(
        &self,
        document: DocumentId,
        patch: DocumentPatch,
    ) -> ServiceResult<()> {
        self.trip(OpClass::UpdateDocument)?;
        self.inner.update_document(document, patch).await
    }

    async fn delete_document(&self, document: DocumentId) -> ServiceResult<()> {
        self.trip(OpClass::DeleteDocument)?;
        self.inner.delete_document(document).await
    }
}

// ============================================================================
// Tests
// ============================================================================
