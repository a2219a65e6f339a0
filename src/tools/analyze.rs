use super::with_session;
use crate::analysis::{
    AnalyzeOptions, DocumentAnalysis, TableStructureReport, TableView, analyze_document,
    analyze_table,
};
use crate::document::markup::DocxTableView;
use crate::state::AppState;
use anyhow::Result;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AnalyzeTableStructureParams {
    pub file_path: String,
    pub table_index: usize,
    /// Per-cell formatting snapshots and the style summary (default true).
    #[serde(default)]
    pub include_cell_details: Option<bool>,
    /// Report the real row extent of vertically merged cells, one region per
    /// merge (default false).
    #[serde(default)]
    pub resolve_vertical_spans: Option<bool>,
}

pub async fn analyze_table_structure(
    state: Arc<AppState>,
    params: AnalyzeTableStructureParams,
) -> Result<TableStructureReport> {
    let options = AnalyzeOptions {
        include_cell_details: params.include_cell_details.unwrap_or(true),
        resolve_vertical_spans: params.resolve_vertical_spans.unwrap_or(false),
    };
    let table_index = params.table_index;
    with_session(
        state,
        "analyze_table_structure",
        params.file_path,
        move |_, path, session| {
            let table = session.table(table_index)?;
            let report = analyze_table(&DocxTableView::new(table), table_index, options);
            if !report.warnings.is_empty() {
                tracing::warn!(
                    path = %path.display(),
                    table_index,
                    warnings = report.warnings.len(),
                    "table analyzed with unreadable cell markup"
                );
            }
            Ok(report)
        },
    )
    .await
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AnalyzeAllTablesParams {
    pub file_path: String,
    /// Per-cell formatting snapshots and style summaries (default false).
    #[serde(default)]
    pub include_cell_details: Option<bool>,
    /// Report the real row extent of vertically merged cells, one region per
    /// merge (default false).
    #[serde(default)]
    pub resolve_vertical_spans: Option<bool>,
}

pub async fn analyze_all_tables(
    state: Arc<AppState>,
    params: AnalyzeAllTablesParams,
) -> Result<DocumentAnalysis> {
    let options = AnalyzeOptions {
        include_cell_details: params.include_cell_details.unwrap_or(false),
        resolve_vertical_spans: params.resolve_vertical_spans.unwrap_or(false),
    };
    with_session(
        state,
        "analyze_all_tables",
        params.file_path,
        move |state, path, session| {
            let views: Vec<DocxTableView<'_>> =
                session.tables().into_iter().map(DocxTableView::new).collect();
            let analysis = analyze_document(
                state.display_path(&path),
                views.iter().map(|view| view as &dyn TableView),
                options,
            );
            tracing::info!(
                path = %path.display(),
                tables = analysis.file_info.total_tables,
                "document analyzed"
            );
            Ok(analysis)
        },
    )
    .await
}
