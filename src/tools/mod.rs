pub mod analyze;
pub mod document;
pub mod format;
pub mod param_enums;
pub mod search;
pub mod table;

pub use analyze::*;
pub use document::*;
pub use format::*;
pub use search::*;
pub use table::*;

use crate::analysis::detect_header;
use crate::document::DocumentSession;
use crate::document::edit;
use crate::document::markup::{DocxTableView, cell_text, cells, rows, table_properties};
use crate::model::TableSummary;
use crate::state::AppState;
use anyhow::Result;
use docx_rs::Table;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task;

/// Run `work` against the open session for `file_path` on the blocking pool.
pub(crate) async fn with_session<T, F>(
    state: Arc<AppState>,
    tool: &'static str,
    file_path: String,
    work: F,
) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&AppState, PathBuf, &mut DocumentSession) -> Result<T> + Send + 'static,
{
    task::spawn_blocking(move || {
        let path = state.resolve(tool, "file_path", &file_path)?;
        let session = state.session(&path)?;
        let mut guard = session.lock();
        work(&state, path, &mut guard)
    })
    .await?
}

pub(crate) fn row_texts(table: &Table) -> Vec<Vec<String>> {
    rows(table)
        .map(|row| cells(row).map(cell_text).collect())
        .collect()
}

pub(crate) fn summarize_table(table: &Table, index: usize, include_summary: bool) -> TableSummary {
    let row_count = edit::row_count(table);
    let columns = edit::column_count(table);
    if !include_summary {
        return TableSummary {
            table_index: index,
            rows: row_count,
            columns,
            has_headers: None,
            style_name: None,
            first_row_data: None,
        };
    }

    let header = detect_header(&DocxTableView::new(table));
    let first_row_data = rows(table)
        .next()
        .map(|row| cells(row).map(cell_text).collect())
        .unwrap_or_default();
    TableSummary {
        table_index: index,
        rows: row_count,
        columns,
        has_headers: Some(header.has_header),
        style_name: table_properties(table).style_name,
        first_row_data: Some(first_row_data),
    }
}
