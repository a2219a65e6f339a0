use super::param_enums::{InsertPosition, TableDataFormat, TablePosition};
use super::{row_texts, summarize_table, with_session};
use crate::document::Placement;
use crate::document::edit::{self, build_table};
use crate::document::markup::cell_text;
use crate::errors::{DocxTableError, InvalidParamsError};
use crate::model::{
    AddColumnsResponse, AddRowsResponse, CellValueResponse, CreateTableResponse,
    DeleteRowsResponse, DeleteTableResponse, ListTablesResponse, TableData, TableDataResponse,
};
use crate::state::AppState;
use crate::validation::{ensure_positive, sanitize_text};
use anyhow::Result;
use schemars::JsonSchema;
use serde::Deserialize;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateTableParams {
    pub file_path: String,
    pub rows: usize,
    pub cols: usize,
    /// `end` (default), `beginning` or `after_paragraph`.
    #[serde(default)]
    pub position: Option<TablePosition>,
    /// Zero-based body paragraph index, required for `after_paragraph`.
    #[serde(default)]
    pub paragraph_index: Option<usize>,
    /// Texts for row 0; must have exactly `cols` entries.
    #[serde(default)]
    pub headers: Option<Vec<String>>,
}

pub async fn create_table(
    state: Arc<AppState>,
    params: CreateTableParams,
) -> Result<CreateTableResponse> {
    const TOOL: &str = "create_table";
    ensure_positive(TOOL, "rows", params.rows)?;
    ensure_positive(TOOL, "cols", params.cols)?;
    let position = params.position.unwrap_or_default();
    let placement = match position {
        TablePosition::End => Placement::End,
        TablePosition::Beginning => Placement::Beginning,
        TablePosition::AfterParagraph => {
            let index = params.paragraph_index.ok_or_else(|| {
                InvalidParamsError::new(
                    TOOL,
                    "paragraph_index is required for position 'after_paragraph'",
                )
                .with_path("paragraph_index")
            })?;
            Placement::AfterParagraph(index)
        }
    };
    let headers = match params.headers {
        Some(headers) if headers.len() != params.cols => {
            return Err(InvalidParamsError::new(
                TOOL,
                format!(
                    "headers length ({}) must match cols ({})",
                    headers.len(),
                    params.cols
                ),
            )
            .with_path("headers")
            .into());
        }
        Some(headers) => Some(headers.iter().map(|h| sanitize_text(h)).collect::<Vec<_>>()),
        None => None,
    };

    let (rows, cols) = (params.rows, params.cols);
    with_session(state.clone(), TOOL, params.file_path, move |state, path, session| {
        let table = build_table(rows, cols, headers.as_deref());
        let table_index = session.insert_table(table, placement)?;
        tracing::info!(path = %path.display(), table_index, rows, cols, "table created");
        Ok(CreateTableResponse {
            file_path: state.display_path(&path),
            table_index,
            rows,
            cols,
            position: position.to_string(),
            has_headers: headers.is_some(),
        })
    })
    .await
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteTableParams {
    pub file_path: String,
    pub table_index: usize,
}

pub async fn delete_table(
    state: Arc<AppState>,
    params: DeleteTableParams,
) -> Result<DeleteTableResponse> {
    let table_index = params.table_index;
    with_session(state, "delete_table", params.file_path, move |state, path, session| {
        session.remove_table(table_index)?;
        Ok(DeleteTableResponse {
            file_path: state.display_path(&path),
            table_index,
            remaining_tables: session.table_count(),
        })
    })
    .await
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddTableRowsParams {
    pub file_path: String,
    pub table_index: usize,
    /// Number of rows to add (default 1).
    #[serde(default)]
    pub count: Option<usize>,
    /// `end` (default), `beginning` or `at_index`.
    #[serde(default)]
    pub position: Option<InsertPosition>,
    /// Existing row the new rows are inserted before, for `at_index`.
    #[serde(default)]
    pub row_index: Option<usize>,
}

pub async fn add_table_rows(
    state: Arc<AppState>,
    params: AddTableRowsParams,
) -> Result<AddRowsResponse> {
    const TOOL: &str = "add_table_rows";
    let count = params.count.unwrap_or(1);
    ensure_positive(TOOL, "count", count)?;
    let position = params.position.unwrap_or_default();
    let row_index = match (position, params.row_index) {
        (InsertPosition::AtIndex, None) => {
            return Err(InvalidParamsError::new(
                TOOL,
                "row_index is required for position 'at_index'",
            )
            .with_path("row_index")
            .into());
        }
        (_, index) => index,
    };

    let table_index = params.table_index;
    with_session(state, TOOL, params.file_path, move |_, _, session| {
        let table = session.table_mut(table_index)?;
        let rows = edit::row_count(table);
        let at = match position {
            InsertPosition::End => rows,
            InsertPosition::Beginning => 0,
            InsertPosition::AtIndex => {
                let row = row_index.unwrap_or_default();
                if row >= rows {
                    return Err(DocxTableError::RowOutOfRange { row, rows }.into());
                }
                row
            }
        };
        edit::insert_rows(table, at, count)?;
        Ok(AddRowsResponse {
            table_index,
            rows_added: count,
            new_row_count: edit::row_count(table),
            position: position.to_string(),
        })
    })
    .await
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AddTableColumnsParams {
    pub file_path: String,
    pub table_index: usize,
    /// Number of columns to add (default 1).
    #[serde(default)]
    pub count: Option<usize>,
    /// `end` (default), `beginning` or `at_index`.
    #[serde(default)]
    pub position: Option<InsertPosition>,
    /// Existing column the new columns are inserted before, for `at_index`.
    #[serde(default)]
    pub column_index: Option<usize>,
}

pub async fn add_table_columns(
    state: Arc<AppState>,
    params: AddTableColumnsParams,
) -> Result<AddColumnsResponse> {
    const TOOL: &str = "add_table_columns";
    let count = params.count.unwrap_or(1);
    ensure_positive(TOOL, "count", count)?;
    let position = params.position.unwrap_or_default();
    if position == InsertPosition::AtIndex && params.column_index.is_none() {
        return Err(InvalidParamsError::new(
            TOOL,
            "column_index is required for position 'at_index'",
        )
        .with_path("column_index")
        .into());
    }

    let (table_index, column_index) = (params.table_index, params.column_index);
    with_session(state, TOOL, params.file_path, move |_, _, session| {
        let table = session.table_mut(table_index)?;
        let columns = edit::column_count(table);
        let at = match position {
            InsertPosition::End => columns,
            InsertPosition::Beginning => 0,
            InsertPosition::AtIndex => {
                let column = column_index.unwrap_or_default();
                if column >= columns {
                    return Err(DocxTableError::ColumnOutOfRange {
                        row: 0,
                        column,
                        columns,
                    }
                    .into());
                }
                column
            }
        };
        edit::insert_columns(table, at, count)?;
        Ok(AddColumnsResponse {
            table_index,
            columns_added: count,
            new_column_count: edit::column_count(table),
            position: position.to_string(),
        })
    })
    .await
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteTableRowsParams {
    pub file_path: String,
    pub table_index: usize,
    /// Rows to delete; duplicates are ignored.
    pub row_indices: Vec<usize>,
}

pub async fn delete_table_rows(
    state: Arc<AppState>,
    params: DeleteTableRowsParams,
) -> Result<DeleteRowsResponse> {
    const TOOL: &str = "delete_table_rows";
    if params.row_indices.is_empty() {
        return Err(InvalidParamsError::new(TOOL, "row_indices must not be empty")
            .with_path("row_indices")
            .into());
    }
    let (table_index, row_indices) = (params.table_index, params.row_indices);
    with_session(state, TOOL, params.file_path, move |_, _, session| {
        let table = session.table_mut(table_index)?;
        let rows_deleted = edit::delete_rows(table, &row_indices)?;
        Ok(DeleteRowsResponse {
            table_index,
            rows_deleted,
            remaining_rows: edit::row_count(table),
        })
    })
    .await
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SetCellValueParams {
    pub file_path: String,
    pub table_index: usize,
    pub row_index: usize,
    pub column_index: usize,
    /// New cell text. Newlines become line breaks, tabs become tab stops.
    pub value: String,
}

pub async fn set_cell_value(
    state: Arc<AppState>,
    params: SetCellValueParams,
) -> Result<CellValueResponse> {
    let value = sanitize_text(&params.value);
    let (table_index, row_index, column_index) =
        (params.table_index, params.row_index, params.column_index);
    with_session(state, "set_cell_value", params.file_path, move |_, _, session| {
        let table = session.table_mut(table_index)?;
        let cell = edit::cell_mut(table, row_index, column_index)?;
        edit::set_cell_text(cell, &value);
        Ok(CellValueResponse {
            table_index,
            row_index,
            column_index,
            value,
        })
    })
    .await
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetCellValueParams {
    pub file_path: String,
    pub table_index: usize,
    pub row_index: usize,
    pub column_index: usize,
}

pub async fn get_cell_value(
    state: Arc<AppState>,
    params: GetCellValueParams,
) -> Result<CellValueResponse> {
    let (table_index, row_index, column_index) =
        (params.table_index, params.row_index, params.column_index);
    with_session(state, "get_cell_value", params.file_path, move |_, _, session| {
        let table = session.table(table_index)?;
        let cell = edit::cell(table, row_index, column_index)?;
        Ok(CellValueResponse {
            table_index,
            row_index,
            column_index,
            value: cell_text(cell),
        })
    })
    .await
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetTableDataParams {
    pub file_path: String,
    pub table_index: usize,
    /// Treat row 0 as headers (default true).
    #[serde(default)]
    pub include_headers: Option<bool>,
    /// `array` (default), `object` or `csv`.
    #[serde(default)]
    pub format: Option<TableDataFormat>,
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn to_csv(rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    for row in rows {
        let line: Vec<String> = row.iter().map(|value| csv_field(value)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

/// Object keys for `width` columns: the header text, or `Column_{i}` when
/// the header is blank, missing or already taken.
fn record_keys(headers: &[String], width: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    (0..width.max(headers.len()))
        .map(|i| {
            let header = headers.get(i).map(|h| h.trim()).unwrap_or_default();
            let key = if header.is_empty() || seen.contains(header) {
                format!("Column_{i}")
            } else {
                header.to_string()
            };
            seen.insert(key.clone());
            key
        })
        .collect()
}

pub(crate) fn shape_table_data(
    table_index: usize,
    all_rows: Vec<Vec<String>>,
    include_headers: bool,
    format: TableDataFormat,
) -> TableDataResponse {
    let mut all_rows = all_rows.into_iter();
    let headers = if include_headers { all_rows.next() } else { None };
    let body: Vec<Vec<String>> = all_rows.collect();
    let columns = body
        .first()
        .or(headers.as_ref())
        .map(Vec::len)
        .unwrap_or(0);

    let data = match format {
        TableDataFormat::Array | TableDataFormat::Csv => {
            let mut rows = Vec::with_capacity(body.len() + 1);
            if let Some(headers) = &headers {
                rows.push(headers.clone());
            }
            rows.extend(body.iter().cloned());
            if format == TableDataFormat::Csv {
                TableData::Csv(to_csv(&rows))
            } else {
                TableData::Rows(rows)
            }
        }
        TableDataFormat::Object => {
            let width = body.iter().map(Vec::len).max().unwrap_or(0);
            let keys = record_keys(headers.as_deref().unwrap_or_default(), width);
            TableData::Records(
                body.iter()
                    .map(|row| {
                        row.iter()
                            .zip(&keys)
                            .map(|(value, key)| (key.clone(), value.clone()))
                            .collect::<IndexMap<_, _>>()
                    })
                    .collect(),
            )
        }
    };

    TableDataResponse {
        table_index,
        format: format.as_str().to_string(),
        rows: body.len(),
        columns,
        has_headers: headers.is_some(),
        headers,
        data,
    }
}

pub async fn get_table_data(
    state: Arc<AppState>,
    params: GetTableDataParams,
) -> Result<TableDataResponse> {
    let table_index = params.table_index;
    let include_headers = params.include_headers.unwrap_or(true);
    let format = params.format.unwrap_or_default();
    with_session(state, "get_table_data", params.file_path, move |_, _, session| {
        let table = session.table(table_index)?;
        Ok(shape_table_data(
            table_index,
            row_texts(table),
            include_headers,
            format,
        ))
    })
    .await
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListTablesParams {
    pub file_path: String,
    /// Include header detection, style and first-row text (default true).
    #[serde(default)]
    pub include_summary: Option<bool>,
}

pub async fn list_tables(
    state: Arc<AppState>,
    params: ListTablesParams,
) -> Result<ListTablesResponse> {
    let include_summary = params.include_summary.unwrap_or(true);
    with_session(state, "list_tables", params.file_path, move |state, path, session| {
        let tables: Vec<_> = session
            .tables()
            .into_iter()
            .enumerate()
            .map(|(index, table)| summarize_table(table, index, include_summary))
            .collect();
        Ok(ListTablesResponse {
            file_path: state.display_path(&path),
            table_count: tables.len(),
            tables,
        })
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Vec<Vec<String>> {
        vec![
            vec!["Name".into(), "City".into()],
            vec!["Ada".into(), "London, UK".into()],
            vec!["Lin".into(), "Say \"hi\"".into()],
        ]
    }

    #[test]
    fn object_format_keys_rows_by_header() {
        let response = shape_table_data(0, grid(), true, TableDataFormat::Object);
        assert_eq!(response.rows, 2);
        assert_eq!(response.columns, 2);
        let TableData::Records(records) = response.data else {
            panic!("expected records");
        };
        assert_eq!(records[0]["City"], "London, UK");
    }

    #[test]
    fn object_format_without_headers_uses_column_keys() {
        let response = shape_table_data(0, grid(), false, TableDataFormat::Object);
        assert_eq!(response.rows, 3);
        assert!(!response.has_headers);
        let TableData::Records(records) = response.data else {
            panic!("expected records");
        };
        assert_eq!(records[0]["Column_0"], "Name");
    }

    #[test]
    fn object_format_keeps_blank_and_repeated_headers_apart() {
        let rows = vec![
            vec!["Name".into(), "Name".into(), "".into(), "Age".into()],
            vec!["Ada".into(), "Lovelace".into(), "x".into(), "36".into()],
        ];
        let response = shape_table_data(0, rows, true, TableDataFormat::Object);
        let TableData::Records(records) = response.data else {
            panic!("expected records");
        };
        let keys: Vec<_> = records[0].keys().map(String::as_str).collect();
        assert_eq!(keys, ["Name", "Column_1", "Column_2", "Age"]);
        assert_eq!(records[0]["Name"], "Ada");
        assert_eq!(records[0]["Column_1"], "Lovelace");

        let json = serde_json::to_string(&records[0]).unwrap();
        assert!(json.starts_with(r#"{"Name":"Ada","Column_1""#));
    }

    #[test]
    fn csv_format_quotes_when_needed() {
        let response = shape_table_data(0, grid(), true, TableDataFormat::Csv);
        let TableData::Csv(csv) = response.data else {
            panic!("expected csv");
        };
        assert_eq!(
            csv,
            "Name,City\nAda,\"London, UK\"\nLin,\"Say \"\"hi\"\"\"\n"
        );
    }
}
