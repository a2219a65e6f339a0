//! Table structure analysis.
//!
//! The analyzer never touches `docx-rs` directly. It reads tables through the
//! [`TableView`] / [`CellView`] / [`CellMarkup`] capabilities so it can run
//! against the document adapter or against in-memory fakes.

pub mod merge;
pub mod structure;
pub mod style;

pub use merge::{MergeDescriptor, MergeType, detect_merge};
pub use structure::{
    AnalysisWarning, AnalyzeOptions, CellAnalysis, CellContent, CellPosition, DocumentAnalysis,
    FileInfo, HeaderInfo, MergeAnalysis, StyleConsistency, StyleSummary, TableInfo,
    TableStructureReport, WarningStage, analyze_document, analyze_table, detect_header,
};
pub use style::{
    AlignmentSnapshot, BackgroundSnapshot, BordersSnapshot, CellStyle, StyleExtraction,
    TextFormatSnapshot, extract_cell_style,
};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MarkupError {
    #[error("failed to read {element}: {reason}")]
    Unreadable {
        element: &'static str,
        reason: String,
    },
    #[error("unexpected value for {element}: {found}")]
    UnexpectedShape {
        element: &'static str,
        found: String,
    },
}

impl MarkupError {
    pub fn unreadable(element: &'static str, reason: impl Into<String>) -> Self {
        Self::Unreadable {
            element,
            reason: reason.into(),
        }
    }

    pub fn unexpected(element: &'static str, found: impl ToString) -> Self {
        Self::UnexpectedShape {
            element,
            found: found.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum BorderSide {
    Top,
    Bottom,
    Left,
    Right,
}

/// Value of a cell's vertical-merge marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalMerge {
    Restart,
    Continue,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BorderFacts {
    pub style: Option<String>,
    pub width: Option<u32>,
    pub color: Option<String>,
}

/// Explicit formatting found on a single run. `None` means the property is
/// not set on the run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunFacts {
    pub font_family: Option<String>,
    pub half_points: Option<u32>,
    pub color: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub strike: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TableProperties {
    pub style_name: Option<String>,
    pub alignment: Option<String>,
    pub width: Option<String>,
}

/// Low-level cell properties: grid span, merge markers, shading, borders.
pub trait CellMarkup {
    fn grid_span(&self) -> Result<Option<usize>, MarkupError>;
    fn vertical_merge(&self) -> Result<Option<VerticalMerge>, MarkupError>;
    fn shading_fill(&self) -> Result<Option<String>, MarkupError>;
    fn vertical_alignment(&self) -> Result<Option<String>, MarkupError>;
    fn border(&self, side: BorderSide) -> Result<Option<BorderFacts>, MarkupError>;
}

pub trait CellView {
    /// Visible text, paragraphs joined with `\n`.
    fn text(&self) -> String;
    /// Alignment of the first paragraph only.
    fn paragraph_alignment(&self) -> Result<Option<String>, MarkupError>;
    /// Formatting of the first run of the first paragraph, `None` without runs.
    fn first_run(&self) -> Result<Option<RunFacts>, MarkupError>;
    fn markup(&self) -> &dyn CellMarkup;
}

pub trait TableView {
    fn row_count(&self) -> usize;
    fn cell_count(&self, row: usize) -> usize;
    fn cell(&self, row: usize, column: usize) -> Option<&dyn CellView>;
    fn properties(&self) -> TableProperties;

    /// Widest row, in cell elements.
    fn column_count(&self) -> usize {
        (0..self.row_count())
            .map(|row| self.cell_count(row))
            .max()
            .unwrap_or(0)
    }
}

/// Normalize an OOXML justification value to the names reported by the analyzer.
pub fn normalize_horizontal(value: &str) -> String {
    match value.to_ascii_lowercase().as_str() {
        "both" | "justified" | "distribute" => "justify".to_string(),
        "start" => "left".to_string(),
        "end" => "right".to_string(),
        other => other.to_string(),
    }
}
