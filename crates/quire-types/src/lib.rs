//! # quire-types
//!
//! Shared identifier and record types for Quire manuscripts.
//!
//! A manuscript (one thesis) is an ordered collection of [`Section`]s. Each
//! section is one editable part of the document — a fixed front-matter page
//! such as the abstract, or a body chapter. Ordering is carried by an
//! explicit `order` field rather than array position, so two sections can be
//! swapped by exchanging their order values and re-sorting.
//!
//! The remote persistence service is the party that mints [`SectionId`]s:
//! a section that has not been created remotely is represented by the
//! [`NewSection`] payload, which has no id field at all.

pub mod document;
pub mod ids;
pub mod part;
pub mod section;

pub use document::{DocumentMeta, DocumentPatch, DocumentStatus, NewDocument};
pub use ids::{DocumentId, SectionId};
pub use part::{PartKind, TemplatePart, default_manuscript};
pub use section::{NewSection, Section, SectionPatch};

/// Current time as Unix milliseconds.
///
/// Used for `updated_at` / `created_at` stamps on records. Falls back to 0
/// if the system clock is before the epoch.
pub fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
