//! The section editor: async orchestration over the store.
//!
//! [`SectionEditor`] wires the pure [`SectionStore`] to a
//! [`DocumentService`] and the [`Autosave`] coordinator, and keeps a
//! freshly rendered preview after every mutation. One editor instance per
//! open document; create on open, [`close`](SectionEditor::close) on
//! navigate-away.
//!
//! Mutations follow the optimistic pattern throughout: local state first
//! (synchronous, immediate UI feedback), persistence second. Create and
//! delete are the exceptions — they must round-trip before local state
//! changes, because the service mints ids and owns existence.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use quire_render::{Preview, render_preview};
use quire_service::DocumentService;
use quire_types::{
    DocumentId, DocumentMeta, NewSection, Section, SectionId, default_manuscript,
};

use crate::autosave::Autosave;
use crate::config::AutosaveConfig;
use crate::error::EditorError;
use crate::event::EditorEvent;
use crate::store::{OrderSwap, SectionStore};

/// State manager for one open document.
///
/// All methods take `&self`; interior state is behind parking_lot locks so
/// an `Arc<SectionEditor>` can be shared between the UI layer and event
/// consumers. There is no locking discipline to get wrong on a cooperative
/// single-threaded runtime — the locks are ownership plumbing, never
/// contended across awaits.
pub struct SectionEditor {
    document_id: DocumentId,
    service: Arc<dyn DocumentService>,
    store: RwLock<SectionStore>,
    meta: RwLock<Option<DocumentMeta>>,
    autosave: Autosave,
    events: broadcast::Sender<EditorEvent>,
    loading: AtomicBool,
    last_error: Mutex<Option<EditorError>>,
    preview: RwLock<Preview>,
}

impl SectionEditor {
    /// Create an editor for `document_id`. Call [`load`](Self::load) next.
    pub fn new(
        service: Arc<dyn DocumentService>,
        document_id: DocumentId,
        config: AutosaveConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity);
        let autosave = Autosave::new(
            document_id,
            Arc::clone(&service),
            config.quiet_interval,
            events.clone(),
        );
        Self {
            document_id,
            service,
            store: RwLock::new(SectionStore::new()),
            meta: RwLock::new(None),
            autosave,
            events,
            loading: AtomicBool::new(false),
            last_error: Mutex::new(None),
            preview: RwLock::new(Preview::default()),
        }
    }

    // ── Read state ───────────────────────────────────────────────────────

    pub fn document_id(&self) -> DocumentId {
        self.document_id
    }

    /// Section snapshots, sorted by order ascending.
    pub fn sections(&self) -> Vec<Section> {
        self.store.read().sections().to_vec()
    }

    pub fn section(&self, id: SectionId) -> Option<Section> {
        self.store.read().get(id).cloned()
    }

    pub fn selected_id(&self) -> Option<SectionId> {
        self.store.read().selected_id()
    }

    pub fn selected(&self) -> Option<Section> {
        self.store.read().selected().cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Relaxed)
    }

    /// The most recent foreground error, if any.
    pub fn last_error(&self) -> Option<EditorError> {
        self.last_error.lock().clone()
    }

    /// Loaded document metadata.
    pub fn meta(&self) -> Option<DocumentMeta> {
        self.meta.read().clone()
    }

    /// The latest rendered preview (recomputed on every mutation).
    pub fn preview(&self) -> Preview {
        self.preview.read().clone()
    }

    /// Writes currently waiting on an autosave timer.
    pub fn pending_autosave(&self) -> usize {
        self.autosave.pending_writes()
    }

    /// Subscribe to editor events.
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.events.subscribe()
    }

    // ── Loading ──────────────────────────────────────────────────────────

    /// Fetch the document and its sections, replacing local state.
    ///
    /// Sections come back sorted by order with the first selected. A
    /// document with no sections is provisioned from the manuscript
    /// template catalog first. On failure the collection is left empty,
    /// the error is surfaced, and nothing is retried.
    pub async fn load(&self) -> Result<(), EditorError> {
        self.loading.store(true, Ordering::Relaxed);
        let result = self.load_inner().await;
        self.loading.store(false, Ordering::Relaxed);
        if let Err(error) = &result {
            warn!(document = %self.document_id, %error, "load failed");
            self.store.write().replace_all(Vec::new());
            *self.meta.write() = None;
            self.refresh_preview();
            *self.last_error.lock() = Some(error.clone());
        }
        result
    }

    async fn load_inner(&self) -> Result<(), EditorError> {
        let meta = self
            .service
            .get_document(self.document_id)
            .await
            .map_err(EditorError::Load)?;
        let mut sections = self
            .service
            .list_sections(self.document_id)
            .await
            .map_err(EditorError::Load)?;

        let provisioned = sections.is_empty();
        if provisioned {
            sections = self.provision().await?;
        }

        let count = sections.len();
        self.store.write().replace_all(sections);
        *self.meta.write() = Some(meta);
        *self.last_error.lock() = None;
        self.refresh_preview();
        info!(document = %self.document_id, sections = count, provisioned, "document loaded");
        self.emit(EditorEvent::Loaded {
            sections: count,
            provisioned,
        });
        Ok(())
    }

    /// Create one section per template catalog entry, orders 1..=N.
    ///
    /// Stops at the first create failure: a half-provisioned manuscript
    /// would scramble the catalog order, so the error surfaces as a load
    /// failure instead.
    async fn provision(&self) -> Result<Vec<Section>, EditorError> {
        debug!(document = %self.document_id, "provisioning manuscript template");
        let mut sections = Vec::new();
        for (idx, part) in default_manuscript().into_iter().enumerate() {
            let new_section = NewSection {
                name: part.name.to_string(),
                content: String::new(),
                order: idx as i64 + 1,
                part: part.kind,
            };
            let created = self
                .service
                .create_section(self.document_id, new_section)
                .await
                .map_err(EditorError::Provision)?;
            sections.push(created);
        }
        Ok(sections)
    }

    // ── Selection ────────────────────────────────────────────────────────

    /// Select a section for editing. No-op if the id is not present or
    /// already selected.
    pub fn select(&self, id: SectionId) {
        {
            let mut store = self.store.write();
            if store.selected_id() == Some(id) || !store.select(id) {
                return;
            }
        }
        self.emit(EditorEvent::Selected { section: Some(id) });
    }

    // ── Edits ────────────────────────────────────────────────────────────

    /// Overwrite a section's content locally and schedule the debounced
    /// persist. Empty content is permitted; no validation.
    pub fn update_content(
        &self,
        id: SectionId,
        content: impl Into<String>,
    ) -> Result<(), EditorError> {
        let content = content.into();
        if !self.store.write().set_content(id, content.clone()) {
            return Err(self.foreground(EditorError::UnknownSection(id)));
        }
        self.autosave.schedule_content(id, content);
        self.refresh_preview();
        self.emit(EditorEvent::ContentEdited { section: id });
        Ok(())
    }

    /// Rename a chapter locally and schedule the debounced persist.
    ///
    /// Fixed parts (abstract, title page, ...) keep their conventional
    /// names; renaming one is a foreground error.
    pub fn rename(&self, id: SectionId, name: impl Into<String>) -> Result<(), EditorError> {
        let name = name.into();
        {
            let mut store = self.store.write();
            let part = match store.get(id) {
                Some(section) => section.part,
                None => {
                    drop(store);
                    return Err(self.foreground(EditorError::UnknownSection(id)));
                }
            };
            if !part.is_chapter() {
                drop(store);
                return Err(self.foreground(EditorError::FixedPartRename(part)));
            }
            store.set_name(id, name.clone());
        }
        self.autosave.schedule_name(id, name);
        self.refresh_preview();
        self.emit(EditorEvent::NameEdited { section: id });
        Ok(())
    }

    /// Overwrite the document title locally and schedule the debounced
    /// persist (keyed to the document, not a section).
    pub fn rename_document(&self, title: impl Into<String>) -> Result<(), EditorError> {
        let title = title.into();
        {
            let mut meta = self.meta.write();
            match meta.as_mut() {
                Some(meta) => meta.title = title.clone(),
                None => {
                    drop(meta);
                    return Err(self.foreground(EditorError::NotLoaded));
                }
            }
        }
        self.autosave.schedule_document_title(title);
        self.emit(EditorEvent::MetaEdited);
        Ok(())
    }

    // ── Structure ────────────────────────────────────────────────────────

    /// Add a chapter at the end (order = max + 1) and select it.
    ///
    /// Creation is not debounced: the service must mint the id before the
    /// section can exist locally. On failure nothing is applied.
    pub async fn add_chapter(&self, name: impl Into<String>) -> Result<SectionId, EditorError> {
        let order = self.store.read().next_order();
        let created = self
            .service
            .create_section(self.document_id, NewSection::chapter(name, order))
            .await
            .map_err(|e| self.foreground(EditorError::Create(e)))?;

        let id = created.id;
        debug!(section = %id, order, "chapter added");
        {
            let mut store = self.store.write();
            store.insert(created);
            store.select(id);
        }
        self.refresh_preview();
        self.emit(EditorEvent::ChapterAdded { section: id });
        Ok(id)
    }

    /// Delete a section remotely, then locally, repairing the selection.
    /// On remote failure the collection is untouched.
    pub async fn delete(&self, id: SectionId) -> Result<(), EditorError> {
        if !self.store.read().contains(id) {
            return Err(self.foreground(EditorError::UnknownSection(id)));
        }
        self.service
            .delete_section(self.document_id, id)
            .await
            .map_err(|e| self.foreground(EditorError::Delete(e)))?;

        let selection = {
            let mut store = self.store.write();
            store.remove(id);
            store.selected_id()
        };
        debug!(section = %id, "section deleted");
        self.refresh_preview();
        self.emit(EditorEvent::SectionDeleted { section: id });
        self.emit(EditorEvent::Selected { section: selection });
        Ok(())
    }

    // ── Reordering ───────────────────────────────────────────────────────

    /// Swap order with the section above. Returns whether anything moved
    /// (the top section and unknown ids are silent no-ops).
    pub fn move_up(&self, id: SectionId) -> bool {
        let swap = self.store.write().move_up(id);
        self.apply_swap(id, swap)
    }

    /// Swap order with the section below. Returns whether anything moved.
    pub fn move_down(&self, id: SectionId) -> bool {
        let swap = self.store.write().move_down(id);
        self.apply_swap(id, swap)
    }

    fn apply_swap(&self, id: SectionId, swap: Option<OrderSwap>) -> bool {
        let Some(swap) = swap else {
            return false;
        };
        // Two independent keys: a run of clicks coalesces per section.
        self.autosave.schedule_order(swap.moved.0, swap.moved.1);
        self.autosave.schedule_order(swap.displaced.0, swap.displaced.1);
        self.refresh_preview();
        self.emit(EditorEvent::Reordered { section: id });
        true
    }

    // ── Teardown ─────────────────────────────────────────────────────────

    /// Send every pending autosave write immediately. Returns the count.
    pub async fn flush(&self) -> usize {
        let writes = self.autosave.flush().await;
        if writes > 0 {
            self.emit(EditorEvent::Flushed { writes });
        }
        writes
    }

    /// Tear down on navigate-away: cancel pending autosave timers so no
    /// stray write hits a no-longer-open document. In-flight sends finish.
    pub fn close(&self) {
        info!(document = %self.document_id, "closing editor");
        self.autosave.close();
    }

    // ── Internals ────────────────────────────────────────────────────────

    fn refresh_preview(&self) {
        let rendered = render_preview(self.store.read().sections());
        *self.preview.write() = rendered;
    }

    fn emit(&self, event: EditorEvent) {
        // No subscribers is fine; the editor's read state is authoritative.
        let _ = self.events.send(event);
    }

    /// Record a foreground error and hand it back to the caller.
    fn foreground(&self, error: EditorError) -> EditorError {
        *self.last_error.lock() = Some(error.clone());
        error
    }
}

impl Drop for SectionEditor {
    fn drop(&mut self) {
        // Dropping without close() must not leave timers aimed at a
        // document nobody has open.
        self.autosave.close();
    }
}
