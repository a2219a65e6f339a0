#![allow(dead_code)]

pub mod builders;
pub mod fakes;
pub mod mcp;

use docx_rs::Docx;
use docx_table_mcp::config::ServerConfig;
use docx_table_mcp::state::AppState;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub struct TestWorkspace {
    _tempdir: TempDir,
    root: PathBuf,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    pub fn new() -> Self {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let root = tempdir.path().canonicalize().expect("canonical tempdir");
        Self {
            _tempdir: tempdir,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn write_docx(&self, relative: &str, docx: Docx) -> PathBuf {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        let file = File::create(&path).expect("create docx file");
        docx.build().pack(file).expect("pack docx");
        path
    }

    pub fn config(&self) -> ServerConfig {
        ServerConfig::for_workspace(self.root.clone())
    }

    pub fn config_with<F>(&self, configure: F) -> ServerConfig
    where
        F: FnOnce(&mut ServerConfig),
    {
        let mut config = self.config();
        configure(&mut config);
        config
    }

    pub fn app_state(&self) -> Arc<AppState> {
        app_state_with_config(self.config())
    }
}

pub fn app_state_with_config(config: ServerConfig) -> Arc<AppState> {
    Arc::new(AppState::new(Arc::new(config)))
}

pub fn read_back(path: &Path) -> Docx {
    let bytes = fs::read(path).expect("read saved docx");
    docx_rs::read_docx(&bytes).expect("saved docx parses")
}
