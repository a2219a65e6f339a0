use super::summarize_table;
use crate::errors::InvalidParamsError;
use crate::model::{
    CloseDocumentResponse, DocumentDescriptor, DocumentInfoResponse, DocumentListResponse,
    OpenDocumentEntry, OpenDocumentResponse, OpenDocumentsResponse, SaveDocumentResponse,
};
use crate::state::AppState;
use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use globset::{Glob, GlobMatcher};
use schemars::JsonSchema;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tokio::task;
use walkdir::WalkDir;

const DEFAULT_LIST_LIMIT: usize = 100;

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListDocumentsParams {
    /// Sub-folder of the workspace to scan.
    #[serde(default)]
    pub folder: Option<String>,
    /// Glob matched against the workspace-relative path, e.g. `reports/**/*.docx`.
    #[serde(default)]
    pub path_glob: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: Option<usize>,
}

struct DocumentFilter {
    glob: Option<GlobMatcher>,
}

impl DocumentFilter {
    fn new(path_glob: Option<&str>) -> Result<Self> {
        let glob = match path_glob {
            Some(pattern) => Some(
                Glob::new(pattern)
                    .map_err(|e| {
                        InvalidParamsError::new("list_documents", format!("invalid glob: {e}"))
                            .with_path("path_glob")
                    })?
                    .compile_matcher(),
            ),
            None => None,
        };
        Ok(Self { glob })
    }

    fn matches(&self, relative: &str) -> bool {
        self.glob
            .as_ref()
            .map(|glob| glob.is_match(relative))
            .unwrap_or(true)
    }
}

fn is_docx(path: &Path) -> bool {
    let is_lock_file = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with("~$"));
    !is_lock_file
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"))
}

pub async fn list_documents(
    state: Arc<AppState>,
    params: ListDocumentsParams,
) -> Result<DocumentListResponse> {
    task::spawn_blocking(move || {
        let config = state.config();
        let root = config.workspace_root.canonicalize()?;
        let scan_root = match params.folder.as_deref() {
            Some(folder) => state.resolve("list_documents", "folder", folder)?,
            None => root.clone(),
        };
        let filter = DocumentFilter::new(params.path_glob.as_deref())?;

        let mut found = Vec::new();
        for entry in WalkDir::new(&scan_root).follow_links(false) {
            let entry = entry?;
            if !entry.file_type().is_file() || !is_docx(entry.path()) {
                continue;
            }
            let path = entry.path();
            let relative = state.display_path(path);
            if !filter.matches(&relative) {
                continue;
            }
            let metadata = entry.metadata()?;
            found.push(DocumentDescriptor {
                path: relative,
                bytes: metadata.len(),
                last_modified: metadata.modified().ok().map(|time| {
                    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Secs, true)
                }),
                is_open: state.is_open(path),
            });
        }
        found.sort_by(|a, b| a.path.cmp(&b.path));

        let total = found.len();
        let offset = params.offset.unwrap_or(0);
        let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT).max(1);
        let documents: Vec<_> = found.into_iter().skip(offset).take(limit).collect();
        let next_offset = (offset + documents.len() < total).then_some(offset + documents.len());

        Ok(DocumentListResponse {
            documents,
            total,
            next_offset,
        })
    })
    .await?
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct OpenDocumentParams {
    pub file_path: String,
    /// Start a blank document when the file does not exist (default true).
    #[serde(default)]
    pub create_if_not_exists: Option<bool>,
}

pub async fn open_document(
    state: Arc<AppState>,
    params: OpenDocumentParams,
) -> Result<OpenDocumentResponse> {
    task::spawn_blocking(move || {
        let path = state.resolve("open_document", "file_path", &params.file_path)?;
        let opened = state.open(&path, params.create_if_not_exists.unwrap_or(true))?;
        let session = opened.session.lock();
        tracing::info!(
            path = %path.display(),
            already_open = opened.already_open,
            tables = session.table_count(),
            "document opened"
        );
        Ok(OpenDocumentResponse {
            file_path: state.display_path(&path),
            table_count: session.table_count(),
            paragraph_count: session.paragraph_count(),
            is_new: session.is_new(),
        })
    })
    .await?
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SaveDocumentParams {
    pub file_path: String,
    /// Write to this path instead; the open session is then reachable under
    /// both paths.
    #[serde(default)]
    pub save_as: Option<String>,
}

pub async fn save_document(
    state: Arc<AppState>,
    params: SaveDocumentParams,
) -> Result<SaveDocumentResponse> {
    task::spawn_blocking(move || {
        let path = state.resolve("save_document", "file_path", &params.file_path)?;
        let session = state.session(&path)?;
        let target = match params.save_as.as_deref() {
            Some(save_as) => state.resolve("save_document", "save_as", save_as)?,
            None => path.clone(),
        };

        if target != path {
            state.ensure_aliasable(&target, &session)?;
        }
        let outcome = session.lock().save_to(&target)?;
        if target != path {
            state.alias(&target, session.clone())?;
        }

        Ok(SaveDocumentResponse {
            file_path: state.display_path(&outcome.path),
            bytes_written: outcome.bytes_written,
            fingerprint: outcome.fingerprint,
        })
    })
    .await?
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CloseDocumentParams {
    pub file_path: String,
}

pub async fn close_document(
    state: Arc<AppState>,
    params: CloseDocumentParams,
) -> Result<CloseDocumentResponse> {
    let path = state.resolve("close_document", "file_path", &params.file_path)?;
    let closed = state.close(&path);
    let had_unsaved_changes = closed
        .as_ref()
        .map(|session| session.lock().is_dirty())
        .unwrap_or(false);
    if had_unsaved_changes {
        tracing::warn!(path = %path.display(), "closing document with unsaved changes");
    }
    Ok(CloseDocumentResponse {
        file_path: state.display_path(&path),
        closed: closed.is_some(),
        had_unsaved_changes,
    })
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetDocumentInfoParams {
    pub file_path: String,
}

pub async fn get_document_info(
    state: Arc<AppState>,
    params: GetDocumentInfoParams,
) -> Result<DocumentInfoResponse> {
    task::spawn_blocking(move || {
        let path = state.resolve("get_document_info", "file_path", &params.file_path)?;
        let opened = state.open(&path, false)?;
        let session = opened.session.lock();
        let tables = session
            .tables()
            .into_iter()
            .enumerate()
            .map(|(index, table)| summarize_table(table, index, true))
            .collect();
        Ok(DocumentInfoResponse {
            file_path: state.display_path(&path),
            table_count: session.table_count(),
            paragraph_count: session.paragraph_count(),
            is_dirty: session.is_dirty(),
            tables,
        })
    })
    .await?
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListOpenDocumentsParams {}

pub async fn list_open_documents(
    state: Arc<AppState>,
    _params: ListOpenDocumentsParams,
) -> Result<OpenDocumentsResponse> {
    let documents = state
        .open_sessions()
        .into_iter()
        .map(|(path, session)| {
            let session = session.lock();
            OpenDocumentEntry {
                file_path: state.display_path(&path),
                is_dirty: session.is_dirty(),
                is_new: session.is_new(),
                table_count: session.table_count(),
            }
        })
        .collect();
    Ok(OpenDocumentsResponse {
        documents,
        limit: state.config().max_open_documents,
    })
}
