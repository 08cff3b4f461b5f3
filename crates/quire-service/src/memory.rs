//! In-memory reference backend.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use quire_types::{
    DocumentId, DocumentMeta, DocumentPatch, DocumentStatus, NewDocument, NewSection, Section,
    SectionId, SectionPatch, now_millis,
};

use crate::error::{ServiceError, ServiceResult};
use crate::service::DocumentService;

/// One document's stored state.
struct DocumentRecord {
    meta: DocumentMeta,
    sections: Vec<Section>,
}

/// In-memory system of record.
///
/// Mints [`SectionId`]s on create and stamps `updated_at`, exactly like a
/// real backend would. Storage order is insertion order — callers sort by
/// `order` themselves, as they must with any backend.
#[derive(Default)]
pub struct MemoryService {
    documents: RwLock<HashMap<DocumentId, DocumentRecord>>,
}

impl MemoryService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentService for MemoryService {
    async fn list_sections(&self, document: DocumentId) -> ServiceResult<Vec<Section>> {
        let documents = self.documents.read();
        let record = documents
            .get(&document)
            .ok_or(ServiceError::DocumentNotFound(document))?;
        Ok(record.sections.clone())
    }

    async fn create_section(
        &self,
        document: DocumentId,
        section: NewSection,
    ) -> ServiceResult<Section> {
        let mut documents = self.documents.write();
        let record = documents
            .get_mut(&document)
            .ok_or(ServiceError::DocumentNotFound(document))?;

        let created = Section {
            id: SectionId::new(),
            document_id: document,
            name: section.name,
            content: section.content,
            order: section.order,
            part: section.part,
            updated_at: now_millis(),
        };
        debug!(section = %created.id, order = created.order, "created section");
        record.sections.push(created.clone());
        Ok(created)
    }

    async fn update_section(
        &self,
        document: DocumentId,
        section: SectionId,
        patch: SectionPatch,
    ) -> ServiceResult<()> {
        let mut documents = self.documents.write();
        let record = documents
            .get_mut(&document)
            .ok_or(ServiceError::DocumentNotFound(document))?;
        let stored = record
            .sections
            .iter_mut()
            .find(|s| s.id == section)
            .ok_or(ServiceError::SectionNotFound(section))?;

        if let Some(name) = patch.name {
            stored.name = name;
        }
        if let Some(content) = patch.content {
            stored.content = content;
        }
        if let Some(order) = patch.order {
            stored.order = order;
        }
        stored.updated_at = now_millis();
        Ok(())
    }

    async fn delete_section(
        &self,
        document: DocumentId,
        section: SectionId,
    ) -> ServiceResult<()> {
        let mut documents = self.documents.write();
        let record = documents
            .get_mut(&document)
            .ok_or(ServiceError::DocumentNotFound(document))?;
        let before = record.sections.len();
        record.sections.retain(|s| s.id != section);
        if record.sections.len() == before {
            return Err(ServiceError::SectionNotFound(section));
        }
        Ok(())
    }

    async fn create_document(&self, document: NewDocument) -> ServiceResult<DocumentMeta> {
        let meta = DocumentMeta {
            id: DocumentId::new(),
            title: document.title,
            author: document.author,
            status: DocumentStatus::InProgress,
            created_at: now_millis(),
        };
        debug!(document = %meta.id, "created document");
        self.documents.write().insert(
            meta.id,
            DocumentRecord {
                meta: meta.clone(),
                sections: Vec::new(),
            },
        );
        Ok(meta)
    }

    async fn list_documents(&self) -> ServiceResult<Vec<DocumentMeta>> {
        Ok(self
            .documents
            .read()
            .values()
            .map(|r| r.meta.clone())
            .collect())
    }

    async fn get_document(&self, document: DocumentId) -> ServiceResult<DocumentMeta> {
        self.documents
            .read()
            .get(&document)
            .map(|r| r.meta.clone())
            .ok_or(ServiceError::DocumentNotFound(document))
    }

    async fn update_document(
        &self,
        document: DocumentId,
        patch: DocumentPatch,
    ) -> ServiceResult<()> {
        let mut documents = self.documents.write();
        let record = documents
            .get_mut(&document)
            .ok_or(ServiceError::DocumentNotFound(document))?;

        if let Some(title) = patch.title {
            record.meta.title = title;
        }
        if let Some(author) = patch.author {
            record.meta.author = author;
        }
        if let Some(status) = patch.status {
            record.meta.status = status;
        }
        Ok(())
    }

    async fn delete_document(&self, document: DocumentId) -> ServiceResult<()> {
        self.documents
            .write()
            .remove(&document)
            .map(|_| ())
            .ok_or(ServiceError::DocumentNotFound(document))
    }
}

// ============================================================================
// Tests
// ============================================================================
