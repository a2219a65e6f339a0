use anyhow::Result;
use serde_json::Value;
use std::path::PathBuf;

use crate::runtime::stateless::StatelessRuntime;
use crate::tools;
use crate::tools::param_enums::{SearchMode, TableDataFormat};
use crate::tools::{
    AnalyzeAllTablesParams, AnalyzeTableStructureParams, GetDocumentInfoParams,
    GetTableDataParams, ListTablesParams, SearchTableContentParams,
};

pub async fn describe(file: PathBuf) -> Result<Value> {
    let runtime = StatelessRuntime;
    let (state, file_path) = runtime.open_state_for_file(&file).await?;
    let response = tools::get_document_info(state, GetDocumentInfoParams { file_path }).await?;
    Ok(serde_json::to_value(response)?)
}

pub async fn list_tables(file: PathBuf) -> Result<Value> {
    let runtime = StatelessRuntime;
    let (state, file_path) = runtime.open_state_for_file(&file).await?;
    let response = tools::list_tables(
        state,
        ListTablesParams {
            file_path,
            include_summary: Some(true),
        },
    )
    .await?;
    Ok(serde_json::to_value(response)?)
}

pub async fn table_data(
    file: PathBuf,
    table: usize,
    format: TableDataFormat,
    include_headers: bool,
) -> Result<Value> {
    let runtime = StatelessRuntime;
    let (state, file_path) = runtime.open_state_for_file(&file).await?;
    let response = tools::get_table_data(
        state,
        GetTableDataParams {
            file_path,
            table_index: table,
            include_headers: Some(include_headers),
            format: Some(format),
        },
    )
    .await?;
    Ok(serde_json::to_value(response)?)
}

pub async fn analyze(
    file: PathBuf,
    table: Option<usize>,
    details: bool,
    resolve_vertical_spans: bool,
) -> Result<Value> {
    let runtime = StatelessRuntime;
    let (state, file_path) = runtime.open_state_for_file(&file).await?;
    match table {
        Some(table_index) => {
            let report = tools::analyze_table_structure(
                state,
                AnalyzeTableStructureParams {
                    file_path,
                    table_index,
                    include_cell_details: Some(details),
                    resolve_vertical_spans: Some(resolve_vertical_spans),
                },
            )
            .await?;
            Ok(serde_json::to_value(report)?)
        }
        None => {
            let analysis = tools::analyze_all_tables(
                state,
                AnalyzeAllTablesParams {
                    file_path,
                    include_cell_details: Some(details),
                    resolve_vertical_spans: Some(resolve_vertical_spans),
                },
            )
            .await?;
            Ok(serde_json::to_value(analysis)?)
        }
    }
}

pub async fn search(
    file: PathBuf,
    query: String,
    mode: SearchMode,
    case_sensitive: bool,
    headers_only: bool,
) -> Result<Value> {
    let runtime = StatelessRuntime;
    let (state, file_path) = runtime.open_state_for_file(&file).await?;
    let params = SearchTableContentParams {
        file_path,
        query,
        search_mode: Some(mode),
        case_sensitive: Some(case_sensitive),
        table_indices: None,
        max_results: None,
    };
    let response = if headers_only {
        tools::search_table_headers(state, params).await?
    } else {
        tools::search_table_content(state, params).await?
    };
    Ok(serde_json::to_value(response)?)
}
