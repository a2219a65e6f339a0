use crate::config::ServerConfig;
use crate::errors::DocxTableError;
use crate::state::AppState;
use crate::tools::{self, OpenDocumentParams};
use anyhow::{Result, anyhow};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One-shot access to a single document for command line use.
#[derive(Debug, Default, Clone)]
pub struct StatelessRuntime;

impl StatelessRuntime {
    pub fn normalize_existing_file(&self, path: &Path) -> Result<PathBuf> {
        if !path.is_file() {
            return Err(DocxTableError::DocumentNotFound(path.to_path_buf()).into());
        }
        Ok(path.canonicalize()?)
    }

    /// Opens `path` in a fresh state rooted at its parent directory and
    /// returns the file path to address it by.
    pub async fn open_state_for_file(&self, path: &Path) -> Result<(Arc<AppState>, String)> {
        let absolute = self.normalize_existing_file(path)?;
        let config = Arc::new(self.build_cli_config(&absolute));
        let state = Arc::new(AppState::new(config));

        let file_name = absolute
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| anyhow!("unusable file name '{}'", absolute.display()))?;

        tools::open_document(
            state.clone(),
            OpenDocumentParams {
                file_path: file_name.clone(),
                create_if_not_exists: Some(false),
            },
        )
        .await?;
        Ok((state, file_name))
    }

    fn build_cli_config(&self, file: &Path) -> ServerConfig {
        let workspace_root = file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let mut config = ServerConfig::for_workspace(workspace_root);
        config.tool_timeout_ms = None;
        config.max_response_bytes = None;
        config.max_open_documents = 1;
        config
    }
}
