//! # quire-editor
//!
//! The section editor state manager: the component that backs each open
//! manuscript in a Quire front end.
//!
//! ```text
//!   UI edits ──▶ SectionEditor ──▶ SectionStore (sync, optimistic)
//!                     │                  │
//!                     │                  └──▶ Preview (recomputed)
//!                     ▼
//!                 Autosave ── quiet period ──▶ DocumentService
//! ```
//!
//! Control flow: edit events mutate the [`SectionStore`] synchronously for
//! immediate UI feedback, then the [`Autosave`] coordinator persists the
//! change after a quiet period, one debounce timer per (document, target,
//! field) key. Reorders mutate locally and schedule two order writes.
//! Every store mutation re-renders the preview.
//!
//! The local store is a cache that may run ahead of the service (optimistic
//! updates) and converges once pending autosaves complete. Persist failures
//! are background events — logged, broadcast, never blocking the editor —
//! while load/create/delete failures are foreground errors that halt their
//! operation.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use quire_editor::{AutosaveConfig, SectionEditor};
//! use quire_service::{DocumentService, MemoryService};
//! use quire_types::NewDocument;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let service = Arc::new(MemoryService::new());
//! let meta = service.create_document(NewDocument::new("Thesis", "A. Student")).await?;
//!
//! let editor = SectionEditor::new(service, meta.id, AutosaveConfig::default());
//! editor.load().await?; // provisions the manuscript template
//!
//! let chapter = editor.sections().into_iter().find(|s| s.part.is_chapter()).unwrap();
//! editor.update_content(chapter.id, "# Introduction\n\nIn this thesis...")?;
//! println!("{}", editor.preview().to_html());
//!
//! editor.flush().await; // or editor.close() to discard pending timers
//! # Ok(())
//! # }
//! ```

mod autosave;
mod config;
mod editor;
mod error;
mod event;
mod store;

pub use autosave::{Autosave, AutosaveKey, AutosaveTarget, FieldClass};
pub use config::AutosaveConfig;
pub use editor::SectionEditor;
pub use error::EditorError;
pub use event::EditorEvent;
pub use store::{OrderSwap, SectionStore};
