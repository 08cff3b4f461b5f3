//! Part kinds and the manuscript template catalog.
//!
//! A thesis is assembled from a conventional sequence of parts: front
//! matter (title page through the list of tables), body chapters, then
//! references and appendices. [`PartKind`] is a closed enum over those
//! parts; [`default_manuscript`] is the catalog used to provision a brand
//! new document with one section per template entry.
//!
//! `Chapter` is the only kind whose display name the user may edit — every
//! other part has a fixed conventional name.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::EnumString;

/// What kind of manuscript part a section is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PartKind {
    /// Title page.
    TitlePage,
    /// Copyright page.
    Copyright,
    /// Signature page.
    Signature,
    /// Abstract.
    Abstract,
    /// Dedication page.
    Dedication,
    /// Acknowledgements page.
    Acknowledgements,
    /// Table of contents.
    TableOfContents,
    /// List of figures.
    ListOfFigures,
    /// List of tables.
    ListOfTables,
    /// A body chapter — the only kind with a user-editable name.
    #[default]
    Chapter,
    /// References.
    References,
    /// Appendices.
    Appendices,
}

impl PartKind {
    /// Parse from string (case-insensitive snake_case).
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        <Self as FromStr>::from_str(s).ok()
    }

    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PartKind::TitlePage => "title_page",
            PartKind::Copyright => "copyright",
            PartKind::Signature => "signature",
            PartKind::Abstract => "abstract",
            PartKind::Dedication => "dedication",
            PartKind::Acknowledgements => "acknowledgements",
            PartKind::TableOfContents => "table_of_contents",
            PartKind::ListOfFigures => "list_of_figures",
            PartKind::ListOfTables => "list_of_tables",
            PartKind::Chapter => "chapter",
            PartKind::References => "references",
            PartKind::Appendices => "appendices",
        }
    }

    /// Check if this part's name is user-editable.
    pub fn is_chapter(&self) -> bool {
        matches!(self, PartKind::Chapter)
    }

    /// The fixed conventional display name, or `None` for chapters.
    pub fn fixed_name(&self) -> Option<&'static str> {
        match self {
            PartKind::TitlePage => Some("Title Page"),
            PartKind::Copyright => Some("Copyright"),
            PartKind::Signature => Some("Signature Page"),
            PartKind::Abstract => Some("Abstract"),
            PartKind::Dedication => Some("Dedication"),
            PartKind::Acknowledgements => Some("Acknowledgements"),
            PartKind::TableOfContents => Some("Table of Contents"),
            PartKind::ListOfFigures => Some("List of Figures"),
            PartKind::ListOfTables => Some("List of Tables"),
            PartKind::Chapter => None,
            PartKind::References => Some("References"),
            PartKind::Appendices => Some("Appendices"),
        }
    }
}

impl std::fmt::Display for PartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of the provisioning catalog: a part kind plus the display
/// name its section is created with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TemplatePart {
    pub kind: PartKind,
    pub name: &'static str,
}

/// The catalog of parts a brand-new manuscript is provisioned with, in
/// display order.
///
/// Front matter, the five conventional body chapters, then references and
/// appendices. Orders are assigned 1..=N from this sequence.
pub fn default_manuscript() -> Vec<TemplatePart> {
    fn fixed(kind: PartKind) -> TemplatePart {
        TemplatePart {
            kind,
            name: kind.fixed_name().unwrap_or(kind.as_str()),
        }
    }
    fn chapter(name: &'static str) -> TemplatePart {
        TemplatePart {
            kind: PartKind::Chapter,
            name,
        }
    }

    vec![
        fixed(PartKind::TitlePage),
        fixed(PartKind::Copyright),
        fixed(PartKind::Signature),
        fixed(PartKind::Abstract),
        fixed(PartKind::Dedication),
        fixed(PartKind::Acknowledgements),
        fixed(PartKind::TableOfContents),
        fixed(PartKind::ListOfFigures),
        fixed(PartKind::ListOfTables),
        chapter("Chapter I: Introduction"),
        chapter("Chapter II: Literature Review"),
        chapter("Chapter III: Methods"),
        chapter("Chapter IV: Results"),
        chapter("Chapter V: Discussion"),
        fixed(PartKind::References),
        fixed(PartKind::Appendices),
    ]
}

// ============================================================================
// Tests
// ============================================================================
