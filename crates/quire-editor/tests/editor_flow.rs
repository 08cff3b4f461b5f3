//! End-to-end editor flows over the in-memory service.
//!
//! Time is paused (`start_paused`), so debounce windows elapse via the
//! tokio test clock instead of wall-clock sleeps.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::broadcast;

use quire_editor::{
    AutosaveConfig, AutosaveTarget, EditorError, EditorEvent, FieldClass, SectionEditor,
};
use quire_service::{
    DocumentService, FlakyService, MemoryService, OpClass, ServiceError, ServiceResult,
};
use quire_types::{
    DocumentId, DocumentMeta, DocumentPatch, NewDocument, NewSection, PartKind, Section,
    SectionId, SectionPatch,
};

// ============================================================================
// Test service: records update calls, injects failures, stores in memory
// ============================================================================

/// Wrapper recording every attempted update call (successful or not).
struct Recording<S> {
    inner: S,
    section_updates: Mutex<Vec<(SectionId, SectionPatch)>>,
    document_updates: Mutex<Vec<DocumentPatch>>,
}

impl<S> Recording<S> {
    fn new(inner: S) -> Self {
        Self {
            inner,
            section_updates: Mutex::new(Vec::new()),
            document_updates: Mutex::new(Vec::new()),
        }
    }

    fn section_updates(&self) -> Vec<(SectionId, SectionPatch)> {
        self.section_updates.lock().clone()
    }

    fn document_updates(&self) -> Vec<DocumentPatch> {
        self.document_updates.lock().clone()
    }
}

#[async_trait]
impl<S: DocumentService> DocumentService for Recording<S> {
    async fn list_sections(&self, document: DocumentId) -> ServiceResult<Vec<Section>> {
        self.inner.list_sections(document).await
    }

    async fn create_section(
        &self,
        document: DocumentId,
        section: NewSection,
    ) -> ServiceResult<Section> {
        self.inner.create_section(document, section).await
    }

    async fn update_section(
        &self,
        document: DocumentId,
        section: SectionId,
        patch: SectionPatch,
    ) -> ServiceResult<()> {
        self.section_updates.lock().push((section, patch.clone()));
        self.inner.update_section(document, section, patch).await
    }

    async fn delete_section(
        &self,
        document: DocumentId,
        section: SectionId,
    ) -> ServiceResult<()> {
        self.inner.delete_section(document, section).await
    }

    async fn create_document(&self, document: NewDocument) -> ServiceResult<DocumentMeta> {
        self.inner.create_document(document).await
    }

    async fn list_documents(&self) -> ServiceResult<Vec<DocumentMeta>> {
        self.inner.list_documents().await
    }

    async fn get_document(&self, document: DocumentId) -> ServiceResult<DocumentMeta> {
        self.inner.get_document(document).await
    }

    async fn update_document(
        &self,
        document: DocumentId,
        patch: DocumentPatch,
    ) -> ServiceResult<()> {
        self.document_updates.lock().push(patch.clone());
        self.inner.update_document(document, patch).await
    }

    async fn delete_document(&self, document: DocumentId) -> ServiceResult<()> {
        self.inner.delete_document(document).await
    }
}

type TestService = Recording<FlakyService<MemoryService>>;

fn test_service() -> Arc<TestService> {
    // Honors RUST_LOG for debugging; first caller wins, the rest no-op.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    Arc::new(Recording::new(FlakyService::new(MemoryService::new())))
}

async fn open_document(service: &Arc<TestService>) -> DocumentId {
    service
        .create_document(NewDocument::new("On Debounce", "A. Student"))
        .await
        .expect("create document")
        .id
}

/// Seed chapters A(1), B(2), C(3) and return their ids.
async fn seed_abc(
    service: &Arc<TestService>,
    document: DocumentId,
) -> (SectionId, SectionId, SectionId) {
    let mut ids = Vec::new();
    for (name, order) in [("A", 1), ("B", 2), ("C", 3)] {
        let created = service
            .create_section(document, NewSection::chapter(name, order))
            .await
            .expect("seed section");
        ids.push(created.id);
    }
    (ids[0], ids[1], ids[2])
}

fn editor_over(service: &Arc<TestService>, document: DocumentId) -> SectionEditor {
    let service: Arc<dyn DocumentService> = (*service).clone();
    SectionEditor::new(service, document, AutosaveConfig::default())
}

/// Let spawned timer tasks run to completion.
async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// Let the full debounce window elapse, then settle.
async fn quiet_period() {
    tokio::time::sleep(Duration::from_millis(600)).await;
    settle().await;
}

fn drain(rx: &mut broadcast::Receiver<EditorEvent>) -> Vec<EditorEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn names(editor: &SectionEditor) -> Vec<String> {
    editor.sections().into_iter().map(|s| s.name).collect()
}

// ============================================================================
// Loading
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_load_sorts_by_order_and_selects_first() {
    let service = test_service();
    let document = open_document(&service).await;
    // Stored out of order on purpose
    for (name, order) in [("C", 3), ("A", 1), ("B", 2)] {
        service
            .create_section(document, NewSection::chapter(name, order))
            .await
            .unwrap();
    }

    let editor = editor_over(&service, document);
    editor.load().await.unwrap();

    assert_eq!(names(&editor), ["A", "B", "C"]);
    assert_eq!(editor.selected().unwrap().name, "A");
    assert_eq!(editor.meta().unwrap().title, "On Debounce");
    assert!(!editor.is_loading());
    assert!(editor.last_error().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_load_failure_surfaces_and_leaves_collection_empty() {
    let service = test_service();
    let document = open_document(&service).await;
    seed_abc(&service, document).await;
    service.inner.fail_next(OpClass::ListSections);

    let editor = editor_over(&service, document);
    let err = editor.load().await.unwrap_err();

    assert!(matches!(
        &err,
        EditorError::Load(ServiceError::Unavailable(_))
    ));
    assert!(editor.sections().is_empty());
    assert_eq!(editor.selected_id(), None);
    assert_eq!(editor.last_error(), Some(err));
    assert!(!editor.is_loading());
}

#[tokio::test(start_paused = true)]
async fn test_empty_document_provisions_template_catalog() {
    let service = test_service();
    let document = open_document(&service).await;

    let editor = editor_over(&service, document);
    let mut rx = editor.subscribe();
    editor.load().await.unwrap();

    let sections = editor.sections();
    assert_eq!(sections.len(), 16);
    // Catalog order with orders 1..=16
    assert_eq!(sections[0].part, PartKind::TitlePage);
    assert_eq!(sections[0].order, 1);
    assert_eq!(sections[15].part, PartKind::Appendices);
    assert_eq!(sections[15].order, 16);
    assert_eq!(
        sections.iter().filter(|s| s.part.is_chapter()).count(),
        5
    );
    // Title page selected
    assert_eq!(editor.selected().unwrap().part, PartKind::TitlePage);
    // Sections exist at the service too
    assert_eq!(service.list_sections(document).await.unwrap().len(), 16);

    assert!(drain(&mut rx).iter().any(|e| matches!(
        e,
        EditorEvent::Loaded {
            sections: 16,
            provisioned: true
        }
    )));
}

#[tokio::test(start_paused = true)]
async fn test_provision_failure_is_a_load_failure() {
    let service = test_service();
    let document = open_document(&service).await;
    // The first template create dies
    service.inner.fail_next(OpClass::CreateSection);

    let editor = editor_over(&service, document);
    let err = editor.load().await.unwrap_err();

    assert!(matches!(err, EditorError::Provision(_)));
    assert!(editor.sections().is_empty());
}

// ============================================================================
// Adding and deleting
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_add_chapter_takes_next_order_and_selects() {
    let service = test_service();
    let document = open_document(&service).await;
    seed_abc(&service, document).await;

    let editor = editor_over(&service, document);
    editor.load().await.unwrap();

    let id = editor.add_chapter("D").await.unwrap();
    let added = editor.section(id).unwrap();
    assert_eq!(added.order, 4);
    assert_eq!(names(&editor), ["A", "B", "C", "D"]);
    assert_eq!(editor.selected_id(), Some(id));
    // The id came from the service
    assert!(
        service
            .list_sections(document)
            .await
            .unwrap()
            .iter()
            .any(|s| s.id == id)
    );
}

#[tokio::test(start_paused = true)]
async fn test_add_chapter_failure_applies_nothing() {
    let service = test_service();
    let document = open_document(&service).await;
    let (ida, ..) = seed_abc(&service, document).await;

    let editor = editor_over(&service, document);
    editor.load().await.unwrap();
    service.inner.fail_next(OpClass::CreateSection);

    let err = editor.add_chapter("D").await.unwrap_err();
    assert!(matches!(&err, EditorError::Create(_)));
    assert_eq!(names(&editor), ["A", "B", "C"]);
    assert_eq!(editor.selected_id(), Some(ida));
    assert_eq!(editor.last_error(), Some(err));
}

#[tokio::test(start_paused = true)]
async fn test_delete_selected_repairs_selection() {
    let service = test_service();
    let document = open_document(&service).await;
    let (ida, idb, _) = seed_abc(&service, document).await;

    let editor = editor_over(&service, document);
    editor.load().await.unwrap();
    editor.select(idb);

    editor.delete(idb).await.unwrap();
    assert_eq!(names(&editor), ["A", "C"]);
    // Falls back to the first remaining section by order
    assert_eq!(editor.selected_id(), Some(ida));
    assert_eq!(service.list_sections(document).await.unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_delete_last_section_selects_none() {
    let service = test_service();
    let document = open_document(&service).await;
    let only = service
        .create_section(document, NewSection::chapter("Only", 1))
        .await
        .unwrap();

    let editor = editor_over(&service, document);
    editor.load().await.unwrap();
    editor.delete(only.id).await.unwrap();

    assert!(editor.sections().is_empty());
    assert_eq!(editor.selected_id(), None);
}

#[tokio::test(start_paused = true)]
async fn test_delete_failure_leaves_collection_untouched() {
    let service = test_service();
    let document = open_document(&service).await;
    let (_, idb, _) = seed_abc(&service, document).await;

    let editor = editor_over(&service, document);
    editor.load().await.unwrap();
    editor.select(idb);
    service.inner.fail_next(OpClass::DeleteSection);

    let err = editor.delete(idb).await.unwrap_err();
    assert!(matches!(err, EditorError::Delete(_)));
    assert_eq!(names(&editor), ["A", "B", "C"]);
    assert_eq!(editor.selected_id(), Some(idb));
}

// ============================================================================
// Reordering
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_move_up_scenario() {
    // [A(1), B(2), C(3)]: select B, move it up.
    let service = test_service();
    let document = open_document(&service).await;
    let (ida, idb, _) = seed_abc(&service, document).await;

    let editor = editor_over(&service, document);
    editor.load().await.unwrap();
    editor.select(idb);

    assert!(editor.move_up(idb));
    assert_eq!(names(&editor), ["B", "A", "C"]);
    assert_eq!(editor.section(idb).unwrap().order, 1);
    assert_eq!(editor.section(ida).unwrap().order, 2);

    // Preview follows immediately
    let headings: Vec<_> = editor
        .preview()
        .blocks
        .iter()
        .map(|b| b.heading.clone())
        .collect();
    assert_eq!(headings, ["B", "A", "C"]);

    // Two order persists, one per affected section
    quiet_period().await;
    let updates = service.section_updates();
    assert_eq!(updates.len(), 2);
    assert!(updates.contains(&(idb, SectionPatch::order(1))));
    assert!(updates.contains(&(ida, SectionPatch::order(2))));
    // And the service converged
    let remote = service.list_sections(document).await.unwrap();
    assert_eq!(remote.iter().find(|s| s.id == idb).unwrap().order, 1);
    assert_eq!(remote.iter().find(|s| s.id == ida).unwrap().order, 2);
}

#[tokio::test(start_paused = true)]
async fn test_boundary_moves_are_silent_noops() {
    let service = test_service();
    let document = open_document(&service).await;
    let (ida, _, idc) = seed_abc(&service, document).await;

    let editor = editor_over(&service, document);
    editor.load().await.unwrap();

    assert!(!editor.move_up(ida));
    assert!(!editor.move_down(idc));
    assert_eq!(names(&editor), ["A", "B", "C"]);

    quiet_period().await;
    assert!(service.section_updates().is_empty());
    assert!(editor.last_error().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_move_up_then_down_restores_order() {
    let service = test_service();
    let document = open_document(&service).await;
    let (ida, idb, idc) = seed_abc(&service, document).await;

    let editor = editor_over(&service, document);
    editor.load().await.unwrap();

    assert!(editor.move_up(idb));
    assert!(editor.move_down(idb));
    assert_eq!(names(&editor), ["A", "B", "C"]);

    // The rapid click pair coalesced per section: one write each, with the
    // original orders restored.
    quiet_period().await;
    let updates = service.section_updates();
    assert_eq!(updates.len(), 2);
    assert!(updates.contains(&(idb, SectionPatch::order(2))));
    assert!(updates.contains(&(ida, SectionPatch::order(1))));
    let _ = idc;
}

// ============================================================================
// Debounced content autosave
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_rapid_edits_coalesce_to_one_persist() {
    let service = test_service();
    let document = open_document(&service).await;
    let (ida, ..) = seed_abc(&service, document).await;

    let editor = editor_over(&service, document);
    editor.load().await.unwrap();

    editor.update_content(ida, "foo").unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    editor.update_content(ida, "foobar").unwrap();

    // Local state is immediate
    assert_eq!(editor.section(ida).unwrap().content, "foobar");

    quiet_period().await;
    let updates = service.section_updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0], (ida, SectionPatch::content("foobar")));
}

#[tokio::test(start_paused = true)]
async fn test_update_content_unknown_section_is_foreground_error() {
    let service = test_service();
    let document = open_document(&service).await;
    seed_abc(&service, document).await;

    let editor = editor_over(&service, document);
    editor.load().await.unwrap();

    let ghost = SectionId::new();
    let err = editor.update_content(ghost, "lost").unwrap_err();
    assert_eq!(err, EditorError::UnknownSection(ghost));
}

#[tokio::test(start_paused = true)]
async fn test_persist_failure_is_background_and_self_heals() {
    let service = test_service();
    let document = open_document(&service).await;
    let (ida, ..) = seed_abc(&service, document).await;

    let editor = editor_over(&service, document);
    editor.load().await.unwrap();
    let mut rx = editor.subscribe();

    service.inner.fail_next(OpClass::UpdateSection);
    editor.update_content(ida, "optimistic").unwrap();
    quiet_period().await;

    // Background: broadcast, not a foreground error; local value kept
    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        EditorEvent::PersistFailed {
            key,
            error: ServiceError::Unavailable(_),
        } if key.target == AutosaveTarget::Section(ida) && key.field == FieldClass::Content
    )));
    assert!(editor.last_error().is_none());
    assert_eq!(editor.section(ida).unwrap().content, "optimistic");
    // The service still has the old value — divergence is tolerated
    let remote = service.list_sections(document).await.unwrap();
    assert_eq!(remote.iter().find(|s| s.id == ida).unwrap().content, "");

    // The next edit schedules a fresh attempt and converges
    editor.update_content(ida, "optimistic v2").unwrap();
    quiet_period().await;
    let remote = service.list_sections(document).await.unwrap();
    assert_eq!(
        remote.iter().find(|s| s.id == ida).unwrap().content,
        "optimistic v2"
    );
}

#[tokio::test(start_paused = true)]
async fn test_close_cancels_pending_persists() {
    let service = test_service();
    let document = open_document(&service).await;
    let (ida, ..) = seed_abc(&service, document).await;

    let editor = editor_over(&service, document);
    editor.load().await.unwrap();

    editor.update_content(ida, "never persisted").unwrap();
    assert_eq!(editor.pending_autosave(), 1);
    editor.close();

    quiet_period().await;
    assert!(service.section_updates().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_flush_sends_everything_immediately() {
    let service = test_service();
    let document = open_document(&service).await;
    let (ida, idb, _) = seed_abc(&service, document).await;

    let editor = editor_over(&service, document);
    editor.load().await.unwrap();
    let mut rx = editor.subscribe();

    editor.update_content(ida, "alpha").unwrap();
    editor.update_content(idb, "beta").unwrap();
    // No waiting: flush pushes both now
    assert_eq!(editor.flush().await, 2);

    let updates = service.section_updates();
    assert_eq!(updates.len(), 2);
    assert!(updates.contains(&(ida, SectionPatch::content("alpha"))));
    assert!(updates.contains(&(idb, SectionPatch::content("beta"))));
    assert!(
        drain(&mut rx)
            .iter()
            .any(|e| matches!(e, EditorEvent::Flushed { writes: 2 }))
    );
}

// ============================================================================
// Renaming
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_rename_chapter_debounces_name_patch() {
    let service = test_service();
    let document = open_document(&service).await;
    let (ida, ..) = seed_abc(&service, document).await;

    let editor = editor_over(&service, document);
    editor.load().await.unwrap();

    editor.rename(ida, "Chapter I: Beginnings").unwrap();
    assert_eq!(editor.section(ida).unwrap().name, "Chapter I: Beginnings");

    quiet_period().await;
    assert_eq!(
        service.section_updates(),
        vec![(ida, SectionPatch::name("Chapter I: Beginnings"))]
    );
}

#[tokio::test(start_paused = true)]
async fn test_rename_fixed_part_is_rejected() {
    let service = test_service();
    let document = open_document(&service).await;

    let editor = editor_over(&service, document);
    editor.load().await.unwrap(); // provisions the catalog

    let abstract_section = editor
        .sections()
        .into_iter()
        .find(|s| s.part == PartKind::Abstract)
        .unwrap();
    let err = editor.rename(abstract_section.id, "My Summary").unwrap_err();
    assert_eq!(err, EditorError::FixedPartRename(PartKind::Abstract));
    // Nothing changed locally or remotely
    assert_eq!(editor.section(abstract_section.id).unwrap().name, "Abstract");
    quiet_period().await;
    assert!(service.section_updates().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_document_title_autosave_targets_document() {
    let service = test_service();
    let document = open_document(&service).await;
    seed_abc(&service, document).await;

    let editor = editor_over(&service, document);
    editor.load().await.unwrap();

    editor.rename_document("On Coalescing Writes").unwrap();
    editor.rename_document("On Coalescing Writes, Revised").unwrap();
    assert_eq!(editor.meta().unwrap().title, "On Coalescing Writes, Revised");

    quiet_period().await;
    // Coalesced to one document patch; no section was touched
    assert_eq!(
        service.document_updates(),
        vec![DocumentPatch::title("On Coalescing Writes, Revised")]
    );
    assert!(service.section_updates().is_empty());
    assert_eq!(
        service.get_document(document).await.unwrap().title,
        "On Coalescing Writes, Revised"
    );
}

// ============================================================================
// Preview
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_preview_recomputes_on_every_mutation() {
    let service = test_service();
    let document = open_document(&service).await;
    let (ida, idb, _) = seed_abc(&service, document).await;

    let editor = editor_over(&service, document);
    editor.load().await.unwrap();
    assert_eq!(editor.preview().len(), 3);

    editor.update_content(ida, "**bold claim**").unwrap();
    assert!(
        editor.preview().blocks[0]
            .body_html
            .contains("<strong>bold claim</strong>")
    );

    editor.delete(idb).await.unwrap();
    assert_eq!(editor.preview().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_preview_sanitizes_untrusted_content() {
    let service = test_service();
    let document = open_document(&service).await;
    let (ida, ..) = seed_abc(&service, document).await;

    let editor = editor_over(&service, document);
    editor.load().await.unwrap();

    editor
        .update_content(ida, "<script>steal()</script> [x](javascript:alert(1))")
        .unwrap();
    let html = editor.preview().to_html();
    assert!(!html.contains("<script>"));
    assert!(!html.contains("javascript:"));
}
