use crate::runtime::stateless::StatelessRuntime;
use crate::tools;
use crate::tools::{SaveDocumentParams, SetCellValueParams};
use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct SetCellResponse {
    file: String,
    table_index: usize,
    row_index: usize,
    column_index: usize,
    value: String,
    bytes_written: u64,
}

pub async fn set_cell(
    file: PathBuf,
    table: usize,
    row: usize,
    column: usize,
    value: String,
) -> Result<Value> {
    let runtime = StatelessRuntime;
    let (state, file_path) = runtime.open_state_for_file(&file).await?;
    let written = tools::set_cell_value(
        state.clone(),
        SetCellValueParams {
            file_path: file_path.clone(),
            table_index: table,
            row_index: row,
            column_index: column,
            value,
        },
    )
    .await?;
    let saved = tools::save_document(
        state,
        SaveDocumentParams {
            file_path,
            save_as: None,
        },
    )
    .await?;

    Ok(serde_json::to_value(SetCellResponse {
        file: file.display().to_string(),
        table_index: written.table_index,
        row_index: written.row_index,
        column_index: written.column_index,
        value: written.value,
        bytes_written: saved.bytes_written,
    })?)
}
