use crate::config::ServerConfig;
use crate::document::DocumentSession;
use crate::errors::DocxTableError;
use crate::security::resolve_document_path;
use anyhow::Result;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub type SharedSession = Arc<Mutex<DocumentSession>>;

/// Registry of open documents keyed by canonical path.
///
/// Callers working on the same document serialize on its session mutex;
/// the registry lock is only held while looking sessions up or changing
/// membership.
pub struct AppState {
    config: Arc<ServerConfig>,
    sessions: RwLock<HashMap<PathBuf, SharedSession>>,
}

#[derive(Clone)]
pub struct OpenedSession {
    pub session: SharedSession,
    pub already_open: bool,
}

impl AppState {
    pub fn new(config: Arc<ServerConfig>) -> Self {
        Self {
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> Arc<ServerConfig> {
        self.config.clone()
    }

    pub fn resolve(&self, tool: &'static str, field: &'static str, file_path: &str) -> Result<PathBuf> {
        resolve_document_path(&self.config.workspace_root, file_path, tool, field)
    }

    /// Display form of a session key, relative to the workspace root when
    /// possible.
    pub fn display_path(&self, path: &Path) -> String {
        let root = self
            .config
            .workspace_root
            .canonicalize()
            .unwrap_or_else(|_| self.config.workspace_root.clone());
        path.strip_prefix(&root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    pub fn is_open(&self, path: &Path) -> bool {
        self.sessions.read().contains_key(path)
    }

    /// Return the open session for `path`, loading it from disk (or starting
    /// a blank document when `create` is set) if needed.
    pub fn open(&self, path: &Path, create: bool) -> Result<OpenedSession> {
        if let Some(session) = self.sessions.read().get(path) {
            return Ok(OpenedSession {
                session: session.clone(),
                already_open: true,
            });
        }

        self.ensure_capacity(path)?;

        let session = if path.exists() {
            DocumentSession::open(path, self.config.max_file_size_bytes)?
        } else if create {
            tracing::info!(path = %path.display(), "creating new document");
            DocumentSession::create()
        } else {
            return Err(DocxTableError::DocumentNotFound(path.to_path_buf()).into());
        };

        let mut sessions = self.sessions.write();
        // Another caller may have opened the same path while this one loaded.
        if let Some(existing) = sessions.get(path) {
            return Ok(OpenedSession {
                session: existing.clone(),
                already_open: true,
            });
        }
        if sessions.len() >= self.config.max_open_documents {
            return Err(DocxTableError::TooManyOpenDocuments {
                path: path.to_path_buf(),
                limit: self.config.max_open_documents,
            }
            .into());
        }
        let session = Arc::new(Mutex::new(session));
        sessions.insert(path.to_path_buf(), session.clone());
        Ok(OpenedSession {
            session,
            already_open: false,
        })
    }

    fn ensure_capacity(&self, path: &Path) -> Result<(), DocxTableError> {
        if self.sessions.read().len() >= self.config.max_open_documents {
            return Err(DocxTableError::TooManyOpenDocuments {
                path: path.to_path_buf(),
                limit: self.config.max_open_documents,
            });
        }
        Ok(())
    }

    pub fn session(&self, path: &Path) -> Result<SharedSession, DocxTableError> {
        self.sessions
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| DocxTableError::DocumentNotOpen(path.to_path_buf()))
    }

    /// Check that `session` may be registered under `path`: the path is
    /// free (within capacity) or already maps to this very session.
    pub fn ensure_aliasable(
        &self,
        path: &Path,
        session: &SharedSession,
    ) -> Result<(), DocxTableError> {
        check_alias(
            &self.sessions.read(),
            path,
            session,
            self.config.max_open_documents,
        )
    }

    /// Register `session` under an additional path, as after a save-as. The
    /// old key keeps pointing at the same session. A different session
    /// already open under `path` is never replaced.
    pub fn alias(&self, path: &Path, session: SharedSession) -> Result<(), DocxTableError> {
        let mut sessions = self.sessions.write();
        check_alias(&sessions, path, &session, self.config.max_open_documents)?;
        sessions.insert(path.to_path_buf(), session);
        Ok(())
    }

    pub fn close(&self, path: &Path) -> Option<SharedSession> {
        self.sessions.write().remove(path)
    }

    /// Open sessions sorted by path.
    pub fn open_sessions(&self) -> Vec<(PathBuf, SharedSession)> {
        let mut entries: Vec<_> = self
            .sessions
            .read()
            .iter()
            .map(|(path, session)| (path.clone(), session.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

fn check_alias(
    sessions: &HashMap<PathBuf, SharedSession>,
    path: &Path,
    session: &SharedSession,
    limit: usize,
) -> Result<(), DocxTableError> {
    match sessions.get(path) {
        Some(existing) if Arc::ptr_eq(existing, session) => Ok(()),
        Some(_) => Err(DocxTableError::DocumentAlreadyOpen(path.to_path_buf())),
        None if sessions.len() >= limit => Err(DocxTableError::TooManyOpenDocuments {
            path: path.to_path_buf(),
            limit,
        }),
        None => Ok(()),
    }
}
