use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{message}")]
pub struct InvalidParamsError {
    tool: &'static str,
    message: String,
    path: Option<String>,
}

impl InvalidParamsError {
    pub fn new(tool: &'static str, message: impl Into<String>) -> Self {
        Self {
            tool,
            message: message.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn tool(&self) -> &'static str {
        self.tool
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}

/// Caller-correctable failures of document and table operations.
#[derive(Debug, Error)]
pub enum DocxTableError {
    #[error("document not found: {}", .0.display())]
    DocumentNotFound(PathBuf),
    #[error("document {} is not open; call open_document first", .0.display())]
    DocumentNotOpen(PathBuf),
    #[error("document {} is already open in another session; close it first", .0.display())]
    DocumentAlreadyOpen(PathBuf),
    #[error("Table index {index} out of range. Document has {count} tables.")]
    TableIndexOutOfRange { index: usize, count: usize },
    #[error("Row index {row} out of range. Table has {rows} rows.")]
    RowOutOfRange { row: usize, rows: usize },
    #[error("Column index {column} out of range. Row {row} has {columns} cells.")]
    ColumnOutOfRange {
        row: usize,
        column: usize,
        columns: usize,
    },
    #[error("paragraph index {index} out of range. Document has {count} paragraphs.")]
    ParagraphOutOfRange { index: usize, count: usize },
    #[error("invalid data format: {0}")]
    InvalidDataFormat(String),
    #[error("file {} is {size} bytes, limit is {limit} bytes", path.display())]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        limit: u64,
    },
    #[error("{limit} documents are already open; close one before opening {}", path.display())]
    TooManyOpenDocuments { path: PathBuf, limit: usize },
}

impl DocxTableError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::DocumentNotFound(_) => "DOCUMENT_NOT_FOUND",
            Self::DocumentNotOpen(_) => "DOCUMENT_NOT_OPEN",
            Self::DocumentAlreadyOpen(_) => "DOCUMENT_ALREADY_OPEN",
            Self::TableIndexOutOfRange { .. } => "TABLE_INDEX_OUT_OF_RANGE",
            Self::RowOutOfRange { .. } | Self::ColumnOutOfRange { .. } => {
                "CELL_POSITION_OUT_OF_RANGE"
            }
            Self::ParagraphOutOfRange { .. } => "PARAGRAPH_INDEX_OUT_OF_RANGE",
            Self::InvalidDataFormat(_) => "INVALID_DATA_FORMAT",
            Self::FileTooLarge { .. } => "FILE_TOO_LARGE",
            Self::TooManyOpenDocuments { .. } => "TOO_MANY_OPEN_DOCUMENTS",
        }
    }
}
