//! The autosave coordinator: per-key debounced persistence.
//!
//! Coalesces bursts of edits into one remote call per key after a quiet
//! period. One logical timer per [`AutosaveKey`]; every schedule call on a
//! key overwrites its pending write and restarts the interval, so only the
//! most recent value is ever sent. Keys are independent — a slow send for
//! one section never delays another.
//!
//! ```text
//!   edit ──▶ schedule(key, write) ──▶ pending[key] = (generation, write)
//!                                         │ spawn sleep(quiet)
//!                                         ▼
//!                        fire: still the newest generation for key?
//!                          no  ──▶ exit (a later edit owns the key)
//!                          yes ──▶ take write, send to service
//! ```
//!
//! Failures are deliberately terminal for the attempt: logged, broadcast
//! as [`EditorEvent::PersistFailed`], no retry, no rollback. The local
//! store keeps the optimistic value and the user's next edit on that key
//! schedules a fresh attempt. `close()` cancels timers that have not
//! fired; a send already handed to the service is never cancelled.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use quire_service::DocumentService;
use quire_types::{DocumentId, DocumentPatch, SectionId, SectionPatch};

use crate::event::EditorEvent;

/// Which field group a pending write targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldClass {
    Content,
    Name,
    Order,
}

/// What a pending write targets: one section, or the document itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AutosaveTarget {
    Section(SectionId),
    Document,
}

/// Debounce key: one timer per (document, target, field class).
///
/// Keying on the field class keeps a burst of reorder clicks coalescing
/// per section without swallowing a concurrent content edit to the same
/// section.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AutosaveKey {
    pub document: DocumentId,
    pub target: AutosaveTarget,
    pub field: FieldClass,
}

/// The write a timer will send when it fires.
#[derive(Clone, Debug)]
enum PendingWrite {
    Section {
        section: SectionId,
        patch: SectionPatch,
    },
    Document {
        patch: DocumentPatch,
    },
}

struct Pending {
    /// Which schedule call owns this entry; stale timers check and exit.
    generation: u64,
    write: PendingWrite,
}

struct Inner {
    document: DocumentId,
    service: Arc<dyn DocumentService>,
    quiet: Duration,
    pending: Mutex<HashMap<AutosaveKey, Pending>>,
    generation: AtomicU64,
    cancel: CancellationToken,
    events: broadcast::Sender<EditorEvent>,
}

/// Per-document autosave coordinator.
///
/// Created when a document opens and torn down with [`Autosave::close`]
/// when it closes, so repeated open/close cycles can never cross-contaminate
/// timers.
///
/// Scheduling spawns timer tasks, so all methods must be called from within
/// a tokio runtime. A current-thread runtime is sufficient — nothing here
/// needs parallelism.
pub struct Autosave {
    inner: Arc<Inner>,
}

impl Autosave {
    pub(crate) fn new(
        document: DocumentId,
        service: Arc<dyn DocumentService>,
        quiet: Duration,
        events: broadcast::Sender<EditorEvent>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                document,
                service,
                quiet,
                pending: Mutex::new(HashMap::new()),
                generation: AtomicU64::new(0),
                cancel: CancellationToken::new(),
                events,
            }),
        }
    }

    // ── Scheduling ───────────────────────────────────────────────────────

    /// Debounce a content overwrite for one section.
    pub fn schedule_content(&self, section: SectionId, content: impl Into<String>) {
        self.schedule(
            AutosaveTarget::Section(section),
            FieldClass::Content,
            PendingWrite::Section {
                section,
                patch: SectionPatch::content(content),
            },
        );
    }

    /// Debounce a name overwrite for one section.
    pub fn schedule_name(&self, section: SectionId, name: impl Into<String>) {
        self.schedule(
            AutosaveTarget::Section(section),
            FieldClass::Name,
            PendingWrite::Section {
                section,
                patch: SectionPatch::name(name),
            },
        );
    }

    /// Debounce an order overwrite for one section. Keyed per section, so
    /// a rapid run of up/down clicks coalesces per section rather than per
    /// reorder operation.
    pub fn schedule_order(&self, section: SectionId, order: i64) {
        self.schedule(
            AutosaveTarget::Section(section),
            FieldClass::Order,
            PendingWrite::Section {
                section,
                patch: SectionPatch::order(order),
            },
        );
    }

    /// Debounce a title overwrite for the document itself.
    pub fn schedule_document_title(&self, title: impl Into<String>) {
        self.schedule(
            AutosaveTarget::Document,
            FieldClass::Name,
            PendingWrite::Document {
                patch: DocumentPatch::title(title),
            },
        );
    }

    fn schedule(&self, target: AutosaveTarget, field: FieldClass, write: PendingWrite) {
        let inner = &self.inner;
        if inner.cancel.is_cancelled() {
            debug!(?target, "autosave closed; dropping scheduled write");
            return;
        }

        let key = AutosaveKey {
            document: inner.document,
            target,
            field,
        };
        let generation = inner.generation.fetch_add(1, Ordering::Relaxed) + 1;
        inner
            .pending
            .lock()
            .insert(key, Pending { generation, write });
        trace!(?key, generation, "scheduled autosave");

        let inner = Arc::clone(inner);
        tokio::spawn(async move {
            tokio::select! {
                _ = inner.cancel.cancelled() => return,
                _ = tokio::time::sleep(inner.quiet) => {}
            }

            // Only the newest schedule for this key gets to send; earlier
            // timers find a newer generation (or nothing) and drop out.
            let write = {
                let mut pending = inner.pending.lock();
                let current = pending
                    .get(&key)
                    .is_some_and(|p| p.generation == generation);
                if current {
                    pending.remove(&key).map(|p| p.write)
                } else {
                    None
                }
            };
            if let Some(write) = write {
                inner.send(key, write).await;
            }
        });
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    /// Number of writes waiting on a timer.
    pub fn pending_writes(&self) -> usize {
        self.inner.pending.lock().len()
    }

    /// Send every pending write immediately, without waiting for timers.
    ///
    /// Returns how many writes were sent. The abandoned timers wake later,
    /// find their entries gone, and exit.
    pub async fn flush(&self) -> usize {
        let drained: Vec<(AutosaveKey, PendingWrite)> = {
            let mut pending = self.inner.pending.lock();
            pending.drain().map(|(k, p)| (k, p.write)).collect()
        };
        let count = drained.len();
        if count > 0 {
            debug!(writes = count, "flushing pending autosaves");
            futures::future::join_all(
                drained
                    .into_iter()
                    .map(|(key, write)| self.inner.send(key, write)),
            )
            .await;
        }
        count
    }

    /// Cancel every timer that has not fired and refuse new schedules.
    ///
    /// In-flight sends (already handed to the service) are not cancelled —
    /// only not-yet-fired timers die.
    pub fn close(&self) {
        self.inner.cancel.cancel();
        let dropped = {
            let mut pending = self.inner.pending.lock();
            let n = pending.len();
            pending.clear();
            n
        };
        if dropped > 0 {
            debug!(dropped, "closed autosave with pending writes cancelled");
        }
    }

    /// Whether `close()` has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }
}

impl Inner {
    /// Send one write. Failure is terminal for the attempt: warn, broadcast,
    /// move on.
    async fn send(&self, key: AutosaveKey, write: PendingWrite) {
        let result = match write {
            PendingWrite::Section { section, patch } => {
                trace!(%section, field = ?key.field, "persisting section field");
                self.service
                    .update_section(self.document, section, patch)
                    .await
            }
            PendingWrite::Document { patch } => {
                trace!(document = %self.document, "persisting document metadata");
                self.service.update_document(self.document, patch).await
            }
        };

        if let Err(error) = result {
            warn!(?key, %error, "autosave persist failed; keeping local value");
            let _ = self.events.send(EditorEvent::PersistFailed { key, error });
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
