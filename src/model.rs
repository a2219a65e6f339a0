use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use indexmap::IndexMap;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DocumentDescriptor {
    /// Path relative to the workspace root.
    pub path: String,
    pub bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    pub is_open: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentDescriptor>,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_offset: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OpenDocumentResponse {
    pub file_path: String,
    pub table_count: usize,
    pub paragraph_count: usize,
    pub is_new: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SaveDocumentResponse {
    pub file_path: String,
    pub bytes_written: u64,
    /// SHA-256 of the written package.
    pub fingerprint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CloseDocumentResponse {
    pub file_path: String,
    pub closed: bool,
    pub had_unsaved_changes: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TableSummary {
    pub table_index: usize,
    pub rows: usize,
    pub columns: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_headers: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_row_data: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DocumentInfoResponse {
    pub file_path: String,
    pub table_count: usize,
    pub paragraph_count: usize,
    pub is_dirty: bool,
    pub tables: Vec<TableSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OpenDocumentEntry {
    pub file_path: String,
    pub is_dirty: bool,
    pub is_new: bool,
    pub table_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OpenDocumentsResponse {
    pub documents: Vec<OpenDocumentEntry>,
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateTableResponse {
    pub file_path: String,
    pub table_index: usize,
    pub rows: usize,
    pub cols: usize,
    pub position: String,
    pub has_headers: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DeleteTableResponse {
    pub file_path: String,
    pub table_index: usize,
    pub remaining_tables: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AddRowsResponse {
    pub table_index: usize,
    pub rows_added: usize,
    pub new_row_count: usize,
    pub position: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AddColumnsResponse {
    pub table_index: usize,
    pub columns_added: usize,
    pub new_column_count: usize,
    pub position: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DeleteRowsResponse {
    pub table_index: usize,
    pub rows_deleted: usize,
    pub remaining_rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CellValueResponse {
    pub table_index: usize,
    pub row_index: usize,
    pub column_index: usize,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum TableData {
    Rows(Vec<Vec<String>>),
    /// One object per body row, keys in column order.
    Records(Vec<IndexMap<String, String>>),
    Csv(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TableDataResponse {
    pub table_index: usize,
    pub format: String,
    pub rows: usize,
    pub columns: usize,
    pub has_headers: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<String>>,
    pub data: TableData,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListTablesResponse {
    pub file_path: String,
    pub table_count: usize,
    pub tables: Vec<TableSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FormatCellResponse {
    pub table_index: usize,
    pub row_index: usize,
    pub column_index: usize,
    /// Formatting parts written to the cell, in application order.
    pub applied: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchMatch {
    pub table_index: usize,
    pub row_index: usize,
    pub column_index: usize,
    pub cell_value: String,
    pub matched_text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SearchSummary {
    pub tables_with_matches: usize,
    pub total_cells_searched: usize,
    /// Match count keyed by table index; tables without matches are omitted.
    pub matches_per_table: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchResponse {
    pub query: String,
    pub search_mode: String,
    pub case_sensitive: bool,
    pub matches: Vec<SearchMatch>,
    pub total_matches: usize,
    pub tables_searched: usize,
    pub truncated: bool,
    pub summary: SearchSummary,
}
