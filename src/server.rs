use crate::analysis::{DocumentAnalysis, TableStructureReport};
use crate::config::{ServerConfig, TransportKind};
use crate::errors::{DocxTableError, InvalidParamsError};
use crate::model::{
    AddColumnsResponse, AddRowsResponse, CellValueResponse, CloseDocumentResponse,
    CreateTableResponse, DeleteRowsResponse, DeleteTableResponse, DocumentInfoResponse,
    DocumentListResponse, FormatCellResponse, ListTablesResponse, OpenDocumentResponse,
    OpenDocumentsResponse, SaveDocumentResponse, SearchResponse, TableDataResponse,
};
use crate::state::AppState;
use crate::tools;
use anyhow::{Result, anyhow};
use rmcp::{
    ErrorData as McpError, Json, ServerHandler, ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
    transport::stdio,
    transport::streamable_http_server::{
        StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
    },
};
use serde::Serialize;
use serde_json::json;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use {once_cell::sync::Lazy, regex::Regex};

const INSTRUCTIONS: &str = "\
Word table MCP: build, edit, format and analyze tables in .docx documents.

WORKFLOW:
1) list_documents to find files, then open_document (creates a blank document when the file is missing unless create_if_not_exists=false)
2) list_tables or get_document_info for orientation
3) Read with get_table_data / get_cell_value, search with search_table_content / search_table_headers
4) Edit with create_table, add_table_rows, add_table_columns, delete_table_rows, set_cell_value, delete_table
5) Format with format_cell (several parts at once) or the format_cell_* tools
6) save_document to write changes (save_as writes a copy and keeps both paths open); close_document when done

ADDRESSING: table_index, row_index and column_index are zero-based. column_index counts the cell \
elements of the row, so merged cells shift later columns left. Indices are checked against the \
table as it is now; re-read after structural edits.

ANALYSIS:
- analyze_table_structure: header detection, merged cells, style consistency and per-cell formatting \
(include_cell_details defaults to true).
- analyze_all_tables: every table in one call; include_cell_details defaults to false to keep payloads small.
- Header detection marks row 0 as a header when all its cells have text. Treat it as a hint.
- Vertical merges report span_rows=1 unless resolve_vertical_spans=true, which
  reports one region per vertical merge with its full row extent.
- Cells whose markup could not be read appear in warnings; their other fields are still filled.

COLORS: hex RRGGBB, with or without a leading '#'.

Edits stay in memory until save_document. Unsaved documents are never closed implicitly.";

#[derive(Clone)]
pub struct DocxTableServer {
    state: Arc<AppState>,
    tool_router: ToolRouter<DocxTableServer>,
}

impl DocxTableServer {
    pub async fn new(config: Arc<ServerConfig>) -> Result<Self> {
        config.ensure_workspace_root()?;
        let state = Arc::new(AppState::new(config));
        Ok(Self::from_state(state))
    }

    pub fn from_state(state: Arc<AppState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    pub async fn run_stdio(self) -> Result<()> {
        let service = self
            .serve(stdio())
            .await
            .inspect_err(|error| tracing::error!("serving error: {:?}", error))?;
        service.waiting().await?;
        Ok(())
    }

    pub async fn run_http(self, bind: SocketAddr) -> Result<()> {
        let service = StreamableHttpService::new(
            move || Ok(self.clone()),
            LocalSessionManager::default().into(),
            StreamableHttpServerConfig::default(),
        );
        let router = axum::Router::new().nest_service("/mcp", service);
        let listener = tokio::net::TcpListener::bind(bind).await?;
        tracing::info!(%bind, "serving streamable HTTP at /mcp");
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await?;
        Ok(())
    }

    pub async fn run(self) -> Result<()> {
        let config = self.state.config();
        tracing::info!(
            transport = %config.transport,
            workspace = %config.workspace_root.display(),
            "starting docx-table-mcp"
        );
        match config.transport {
            TransportKind::Stdio => self.run_stdio().await,
            TransportKind::Http => self.run_http(config.http_bind_address).await,
        }
    }

    fn ensure_tool_enabled(&self, tool: &str) -> Result<()> {
        tracing::info!(tool = tool, "tool invocation requested");
        if self.state.config().is_tool_enabled(tool) {
            Ok(())
        } else {
            Err(ToolDisabledError::new(tool).into())
        }
    }

    async fn run_tool_with_timeout<T, F>(&self, tool: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
        T: Serialize,
    {
        let result = if let Some(timeout_duration) = self.state.config().tool_timeout() {
            match tokio::time::timeout(timeout_duration, fut).await {
                Ok(result) => result,
                Err(_) => Err(anyhow!(
                    "tool '{}' timed out after {}ms",
                    tool,
                    timeout_duration.as_millis()
                )),
            }
        } else {
            fut.await
        }?;

        self.ensure_response_size(tool, &result)?;
        Ok(result)
    }

    fn ensure_response_size<T: Serialize>(&self, tool: &str, value: &T) -> Result<()> {
        let Some(limit) = self.state.config().max_response_bytes() else {
            return Ok(());
        };
        let payload = serde_json::to_vec(value)
            .map_err(|e| anyhow!("failed to serialize response for {}: {}", tool, e))?;
        if payload.len() > limit {
            return Err(ResponseTooLargeError::new(tool, payload.len(), limit).into());
        }
        Ok(())
    }
}

#[tool_router]
impl DocxTableServer {
    #[tool(name = "list_documents", description = "List .docx documents in the workspace")]
    pub async fn list_documents(
        &self,
        Parameters(params): Parameters<tools::ListDocumentsParams>,
    ) -> Result<Json<DocumentListResponse>, McpError> {
        self.ensure_tool_enabled("list_documents")
            .map_err(|e| to_mcp_error_for_tool("list_documents", e))?;
        self.run_tool_with_timeout(
            "list_documents",
            tools::list_documents(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("list_documents", e))
    }

    #[tool(
        name = "open_document",
        description = "Open a document (or start a new one) for editing"
    )]
    pub async fn open_document(
        &self,
        Parameters(params): Parameters<tools::OpenDocumentParams>,
    ) -> Result<Json<OpenDocumentResponse>, McpError> {
        self.ensure_tool_enabled("open_document")
            .map_err(|e| to_mcp_error_for_tool("open_document", e))?;
        self.run_tool_with_timeout(
            "open_document",
            tools::open_document(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("open_document", e))
    }

    #[tool(name = "save_document", description = "Save an open document, optionally to a new path")]
    pub async fn save_document(
        &self,
        Parameters(params): Parameters<tools::SaveDocumentParams>,
    ) -> Result<Json<SaveDocumentResponse>, McpError> {
        self.ensure_tool_enabled("save_document")
            .map_err(|e| to_mcp_error_for_tool("save_document", e))?;
        self.run_tool_with_timeout(
            "save_document",
            tools::save_document(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("save_document", e))
    }

    #[tool(name = "close_document", description = "Close an open document without saving")]
    pub async fn close_document(
        &self,
        Parameters(params): Parameters<tools::CloseDocumentParams>,
    ) -> Result<Json<CloseDocumentResponse>, McpError> {
        self.ensure_tool_enabled("close_document")
            .map_err(|e| to_mcp_error_for_tool("close_document", e))?;
        self.run_tool_with_timeout(
            "close_document",
            tools::close_document(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("close_document", e))
    }

    #[tool(name = "get_document_info", description = "Summarize a document and its tables")]
    pub async fn get_document_info(
        &self,
        Parameters(params): Parameters<tools::GetDocumentInfoParams>,
    ) -> Result<Json<DocumentInfoResponse>, McpError> {
        self.ensure_tool_enabled("get_document_info")
            .map_err(|e| to_mcp_error_for_tool("get_document_info", e))?;
        self.run_tool_with_timeout(
            "get_document_info",
            tools::get_document_info(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("get_document_info", e))
    }

    #[tool(
        name = "list_open_documents",
        description = "List documents currently open in this server"
    )]
    pub async fn list_open_documents(
        &self,
        Parameters(params): Parameters<tools::ListOpenDocumentsParams>,
    ) -> Result<Json<OpenDocumentsResponse>, McpError> {
        self.ensure_tool_enabled("list_open_documents")
            .map_err(|e| to_mcp_error_for_tool("list_open_documents", e))?;
        self.run_tool_with_timeout(
            "list_open_documents",
            tools::list_open_documents(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("list_open_documents", e))
    }

    #[tool(name = "create_table", description = "Insert a new table")]
    pub async fn create_table(
        &self,
        Parameters(params): Parameters<tools::CreateTableParams>,
    ) -> Result<Json<CreateTableResponse>, McpError> {
        self.ensure_tool_enabled("create_table")
            .map_err(|e| to_mcp_error_for_tool("create_table", e))?;
        self.run_tool_with_timeout(
            "create_table",
            tools::create_table(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("create_table", e))
    }

    #[tool(name = "delete_table", description = "Delete a table")]
    pub async fn delete_table(
        &self,
        Parameters(params): Parameters<tools::DeleteTableParams>,
    ) -> Result<Json<DeleteTableResponse>, McpError> {
        self.ensure_tool_enabled("delete_table")
            .map_err(|e| to_mcp_error_for_tool("delete_table", e))?;
        self.run_tool_with_timeout(
            "delete_table",
            tools::delete_table(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("delete_table", e))
    }

    #[tool(name = "add_table_rows", description = "Insert empty rows into a table")]
    pub async fn add_table_rows(
        &self,
        Parameters(params): Parameters<tools::AddTableRowsParams>,
    ) -> Result<Json<AddRowsResponse>, McpError> {
        self.ensure_tool_enabled("add_table_rows")
            .map_err(|e| to_mcp_error_for_tool("add_table_rows", e))?;
        self.run_tool_with_timeout(
            "add_table_rows",
            tools::add_table_rows(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("add_table_rows", e))
    }

    #[tool(name = "add_table_columns", description = "Insert empty columns into a table")]
    pub async fn add_table_columns(
        &self,
        Parameters(params): Parameters<tools::AddTableColumnsParams>,
    ) -> Result<Json<AddColumnsResponse>, McpError> {
        self.ensure_tool_enabled("add_table_columns")
            .map_err(|e| to_mcp_error_for_tool("add_table_columns", e))?;
        self.run_tool_with_timeout(
            "add_table_columns",
            tools::add_table_columns(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("add_table_columns", e))
    }

    #[tool(name = "delete_table_rows", description = "Delete rows from a table")]
    pub async fn delete_table_rows(
        &self,
        Parameters(params): Parameters<tools::DeleteTableRowsParams>,
    ) -> Result<Json<DeleteRowsResponse>, McpError> {
        self.ensure_tool_enabled("delete_table_rows")
            .map_err(|e| to_mcp_error_for_tool("delete_table_rows", e))?;
        self.run_tool_with_timeout(
            "delete_table_rows",
            tools::delete_table_rows(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("delete_table_rows", e))
    }

    #[tool(name = "set_cell_value", description = "Replace the text of a table cell")]
    pub async fn set_cell_value(
        &self,
        Parameters(params): Parameters<tools::SetCellValueParams>,
    ) -> Result<Json<CellValueResponse>, McpError> {
        self.ensure_tool_enabled("set_cell_value")
            .map_err(|e| to_mcp_error_for_tool("set_cell_value", e))?;
        self.run_tool_with_timeout(
            "set_cell_value",
            tools::set_cell_value(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("set_cell_value", e))
    }

    #[tool(name = "get_cell_value", description = "Read the text of a table cell")]
    pub async fn get_cell_value(
        &self,
        Parameters(params): Parameters<tools::GetCellValueParams>,
    ) -> Result<Json<CellValueResponse>, McpError> {
        self.ensure_tool_enabled("get_cell_value")
            .map_err(|e| to_mcp_error_for_tool("get_cell_value", e))?;
        self.run_tool_with_timeout(
            "get_cell_value",
            tools::get_cell_value(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("get_cell_value", e))
    }

    #[tool(name = "get_table_data", description = "Read a whole table as rows, records or CSV")]
    pub async fn get_table_data(
        &self,
        Parameters(params): Parameters<tools::GetTableDataParams>,
    ) -> Result<Json<TableDataResponse>, McpError> {
        self.ensure_tool_enabled("get_table_data")
            .map_err(|e| to_mcp_error_for_tool("get_table_data", e))?;
        self.run_tool_with_timeout(
            "get_table_data",
            tools::get_table_data(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("get_table_data", e))
    }

    #[tool(name = "list_tables", description = "List the tables of a document")]
    pub async fn list_tables(
        &self,
        Parameters(params): Parameters<tools::ListTablesParams>,
    ) -> Result<Json<ListTablesResponse>, McpError> {
        self.ensure_tool_enabled("list_tables")
            .map_err(|e| to_mcp_error_for_tool("list_tables", e))?;
        self.run_tool_with_timeout(
            "list_tables",
            tools::list_tables(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("list_tables", e))
    }

    #[tool(
        name = "format_cell_text",
        description = "Set font, size, colour and emphasis of a cell's text"
    )]
    pub async fn format_cell_text(
        &self,
        Parameters(params): Parameters<tools::FormatCellTextParams>,
    ) -> Result<Json<FormatCellResponse>, McpError> {
        self.ensure_tool_enabled("format_cell_text")
            .map_err(|e| to_mcp_error_for_tool("format_cell_text", e))?;
        self.run_tool_with_timeout(
            "format_cell_text",
            tools::format_cell_text(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("format_cell_text", e))
    }

    #[tool(
        name = "format_cell_alignment",
        description = "Set horizontal and/or vertical alignment of a cell"
    )]
    pub async fn format_cell_alignment(
        &self,
        Parameters(params): Parameters<tools::FormatCellAlignmentParams>,
    ) -> Result<Json<FormatCellResponse>, McpError> {
        self.ensure_tool_enabled("format_cell_alignment")
            .map_err(|e| to_mcp_error_for_tool("format_cell_alignment", e))?;
        self.run_tool_with_timeout(
            "format_cell_alignment",
            tools::format_cell_alignment(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("format_cell_alignment", e))
    }

    #[tool(name = "format_cell_background", description = "Set the background colour of a cell")]
    pub async fn format_cell_background(
        &self,
        Parameters(params): Parameters<tools::FormatCellBackgroundParams>,
    ) -> Result<Json<FormatCellResponse>, McpError> {
        self.ensure_tool_enabled("format_cell_background")
            .map_err(|e| to_mcp_error_for_tool("format_cell_background", e))?;
        self.run_tool_with_timeout(
            "format_cell_background",
            tools::format_cell_background(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("format_cell_background", e))
    }

    #[tool(name = "format_cell_borders", description = "Replace the borders of a cell")]
    pub async fn format_cell_borders(
        &self,
        Parameters(params): Parameters<tools::FormatCellBordersParams>,
    ) -> Result<Json<FormatCellResponse>, McpError> {
        self.ensure_tool_enabled("format_cell_borders")
            .map_err(|e| to_mcp_error_for_tool("format_cell_borders", e))?;
        self.run_tool_with_timeout(
            "format_cell_borders",
            tools::format_cell_borders(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("format_cell_borders", e))
    }

    #[tool(name = "format_cell", description = "Apply several formatting parts to a cell at once")]
    pub async fn format_cell(
        &self,
        Parameters(params): Parameters<tools::FormatCellParams>,
    ) -> Result<Json<FormatCellResponse>, McpError> {
        self.ensure_tool_enabled("format_cell")
            .map_err(|e| to_mcp_error_for_tool("format_cell", e))?;
        self.run_tool_with_timeout(
            "format_cell",
            tools::format_cell(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("format_cell", e))
    }

    #[tool(name = "search_table_content", description = "Search cell text across tables")]
    pub async fn search_table_content(
        &self,
        Parameters(params): Parameters<tools::SearchTableContentParams>,
    ) -> Result<Json<SearchResponse>, McpError> {
        self.ensure_tool_enabled("search_table_content")
            .map_err(|e| to_mcp_error_for_tool("search_table_content", e))?;
        self.run_tool_with_timeout(
            "search_table_content",
            tools::search_table_content(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("search_table_content", e))
    }

    #[tool(name = "search_table_headers", description = "Search the first row of each table")]
    pub async fn search_table_headers(
        &self,
        Parameters(params): Parameters<tools::SearchTableHeadersParams>,
    ) -> Result<Json<SearchResponse>, McpError> {
        self.ensure_tool_enabled("search_table_headers")
            .map_err(|e| to_mcp_error_for_tool("search_table_headers", e))?;
        self.run_tool_with_timeout(
            "search_table_headers",
            tools::search_table_headers(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("search_table_headers", e))
    }

    #[tool(
        name = "analyze_table_structure",
        description = "Analyze headers, merges and formatting of one table"
    )]
    pub async fn analyze_table_structure(
        &self,
        Parameters(params): Parameters<tools::AnalyzeTableStructureParams>,
    ) -> Result<Json<TableStructureReport>, McpError> {
        self.ensure_tool_enabled("analyze_table_structure")
            .map_err(|e| to_mcp_error_for_tool("analyze_table_structure", e))?;
        self.run_tool_with_timeout(
            "analyze_table_structure",
            tools::analyze_table_structure(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("analyze_table_structure", e))
    }

    #[tool(name = "analyze_all_tables", description = "Analyze every table in a document")]
    pub async fn analyze_all_tables(
        &self,
        Parameters(params): Parameters<tools::AnalyzeAllTablesParams>,
    ) -> Result<Json<DocumentAnalysis>, McpError> {
        self.ensure_tool_enabled("analyze_all_tables")
            .map_err(|e| to_mcp_error_for_tool("analyze_all_tables", e))?;
        self.run_tool_with_timeout(
            "analyze_all_tables",
            tools::analyze_all_tables(self.state.clone(), params),
        )
        .await
        .map(Json)
        .map_err(|e| to_mcp_error_for_tool("analyze_all_tables", e))
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for DocxTableServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.to_string()),
            ..ServerInfo::default()
        }
    }
}

fn to_mcp_error_for_tool(tool: &str, error: anyhow::Error) -> McpError {
    if error.is::<ToolDisabledError>() || error.is::<ResponseTooLargeError>() {
        return McpError::invalid_request(error.to_string(), None);
    }

    if let Some(domain) = error.downcast_ref::<DocxTableError>() {
        return McpError::invalid_params(
            domain.to_string(),
            Some(json!({ "code": domain.code(), "tool": tool })),
        );
    }

    if let Some(inv) = error.downcast_ref::<InvalidParamsError>() {
        let msg = format_invalid_params_message(
            inv.tool(),
            inv.message(),
            inv.path(),
            None,
            tool_minimal_example(inv.tool()),
        );
        return McpError::invalid_params(
            msg,
            Some(json!({ "code": "INVALID_PARAMS", "tool": inv.tool() })),
        );
    }

    if let Some(serde_err) = error.downcast_ref::<serde_json::Error>() {
        let problem = serde_err.to_string();
        let variants = extract_expected_variants(&problem);
        let msg = format_invalid_params_message(
            tool,
            &problem,
            None,
            if variants.is_empty() {
                None
            } else {
                Some(&variants)
            },
            tool_minimal_example(tool),
        );
        return McpError::invalid_params(msg, Some(json!({ "code": "INVALID_PARAMS" })));
    }

    McpError::internal_error(error.to_string(), None)
}

fn format_invalid_params_message(
    tool: &str,
    problem: &str,
    path: Option<&str>,
    variants: Option<&[String]>,
    example: Option<&'static str>,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("Invalid params for tool '{tool}': {problem}"));

    if let Some(path) = path {
        out.push_str(&format!("\npath: {path}"));
    }

    if let Some(variants) = variants
        && !variants.is_empty()
    {
        out.push_str("\nvalid variants: ");
        out.push_str(&variants.join(", "));
    }

    if let Some(example) = example {
        out.push_str("\nexample: ");
        out.push_str(example);
    }

    out
}

fn tool_minimal_example(tool: &str) -> Option<&'static str> {
    match tool {
        "create_table" => Some(
            r#"{"file_path":"report.docx","rows":3,"cols":2,"position":"end","headers":["Name","Role"]}"#,
        ),
        "add_table_rows" => Some(
            r#"{"file_path":"report.docx","table_index":0,"count":1,"position":"at_index","row_index":1}"#,
        ),
        "add_table_columns" => Some(
            r#"{"file_path":"report.docx","table_index":0,"count":1,"position":"end"}"#,
        ),
        "delete_table_rows" => Some(
            r#"{"file_path":"report.docx","table_index":0,"row_indices":[2,3]}"#,
        ),
        "format_cell_text" => Some(
            r#"{"file_path":"report.docx","table_index":0,"row_index":0,"column_index":0,"text_format":{"bold":true,"font_size":12,"font_color":"1F4E79"}}"#,
        ),
        "format_cell_alignment" => Some(
            r#"{"file_path":"report.docx","table_index":0,"row_index":0,"column_index":0,"horizontal":"center","vertical":"middle"}"#,
        ),
        "format_cell_background" => Some(
            r##"{"file_path":"report.docx","table_index":0,"row_index":0,"column_index":0,"color":"#D9E2F3"}"##,
        ),
        "format_cell_borders" => Some(
            r#"{"file_path":"report.docx","table_index":0,"row_index":0,"column_index":0,"borders":{"bottom":{"style":"double","width":"medium","color":"000000"}}}"#,
        ),
        "format_cell" => Some(
            r#"{"file_path":"report.docx","table_index":0,"row_index":0,"column_index":0,"formatting":{"text_format":{"bold":true},"alignment":{"horizontal":"center"},"background_color":"D9E2F3"}}"#,
        ),
        "search_table_content" | "search_table_headers" => Some(
            r#"{"file_path":"report.docx","query":"total","search_mode":"contains","case_sensitive":false}"#,
        ),
        "list_documents" => Some(r#"{"path_glob":"reports/**/*.docx","limit":20}"#),
        _ => None,
    }
}

fn extract_expected_variants(problem: &str) -> Vec<String> {
    static EXPECTED_TAIL_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"expected(?: one of)? (?P<tail>.*)$").expect("regex"));
    static BACKTICK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").expect("regex"));

    let Some(caps) = EXPECTED_TAIL_RE.captures(problem) else {
        return Vec::new();
    };
    let tail = caps.name("tail").map(|m| m.as_str()).unwrap_or("");
    BACKTICK_RE
        .captures_iter(tail)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect()
}


#[derive(Debug, Error)]
#[error("tool '{tool_name}' is disabled by server configuration")]
struct ToolDisabledError {
    tool_name: String,
}

impl ToolDisabledError {
    fn new(tool_name: &str) -> Self {
        Self {
            tool_name: tool_name.to_ascii_lowercase(),
        }
    }
}

#[derive(Debug, Error)]
#[error(
    "tool '{tool_name}' response too large ({size} bytes > {limit} bytes); disable cell details or narrow the request"
)]
struct ResponseTooLargeError {
    tool_name: String,
    size: usize,
    limit: usize,
}

impl ResponseTooLargeError {
    fn new(tool_name: &str, size: usize, limit: usize) -> Self {
        Self {
            tool_name: tool_name.to_ascii_lowercase(),
            size,
            limit,
        }
    }
}
