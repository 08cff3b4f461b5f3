//! Section records and update payloads.
//!
//! [`Section`] is the persisted form: it always carries a service-minted
//! [`SectionId`]. [`NewSection`] is the create payload (no id — the service
//! assigns one). [`SectionPatch`] is a partial update: exactly the fields
//! present are overwritten remotely, each as a full-value write.

use serde::{Deserialize, Serialize};

use crate::ids::{DocumentId, SectionId};
use crate::part::PartKind;

/// One editable, orderable unit of a manuscript.
///
/// `order` defines display/export sequence. Values are unique within a
/// document but not required to be contiguous; ties are a defect that the
/// next explicit reorder repairs, not something enforced at write time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Identifier, assigned by the persistence service.
    pub id: SectionId,
    /// The document this section belongs to.
    pub document_id: DocumentId,
    /// Display title. User-editable for chapters, fixed for named parts.
    pub name: String,
    /// Body text (markdown-flavored). Empty is permitted.
    pub content: String,
    /// Display/export sequence within the document.
    pub order: i64,
    /// Which manuscript part this section is.
    pub part: PartKind,
    /// Last-modified stamp (Unix millis), maintained by the service.
    pub updated_at: u64,
}

/// Payload for creating a section the service has not seen yet.
///
/// Deliberately has no id field: "a transient section with an id" is
/// unrepresentable. The service returns the full [`Section`] once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSection {
    pub name: String,
    pub content: String,
    pub order: i64,
    pub part: PartKind,
}

impl NewSection {
    /// A new body chapter with the given title.
    pub fn chapter(name: impl Into<String>, order: i64) -> Self {
        Self {
            name: name.into(),
            content: String::new(),
            order,
            part: PartKind::Chapter,
        }
    }

    /// A fixed named part (abstract, title page, ...) with its conventional
    /// name. Falls back to the kind's snake_case token for chapters, but
    /// callers should use [`NewSection::chapter`] for those.
    pub fn part(kind: PartKind, order: i64) -> Self {
        Self {
            name: kind.fixed_name().unwrap_or(kind.as_str()).to_string(),
            content: String::new(),
            order,
            part: kind,
        }
    }
}

/// Partial update for one section. Absent fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl SectionPatch {
    /// A patch overwriting only the content field.
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// A patch overwriting only the name field.
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// A patch overwriting only the order field.
    pub fn order(order: i64) -> Self {
        Self {
            order: Some(order),
            ..Self::default()
        }
    }

    /// Check if the patch touches nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.content.is_none() && self.order.is_none()
    }
}

// ============================================================================
// Tests
// ============================================================================
