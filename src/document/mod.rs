pub mod edit;
pub mod markup;

use crate::errors::DocxTableError;
use anyhow::{Context, Result, anyhow};
use docx_rs::{Docx, DocumentChild, Table};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// One open document. Every mutation goes through `&mut self`, so callers
/// hold the session lock for the duration of an edit.
pub struct DocumentSession {
    docx: Docx,
    is_new: bool,
    dirty: bool,
}

#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub path: PathBuf,
    pub bytes_written: u64,
    pub fingerprint: String,
}

/// Where a new table lands among the document body's block elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Beginning,
    End,
    AfterParagraph(usize),
}

impl DocumentSession {
    pub fn open(path: &Path, max_bytes: Option<u64>) -> Result<Self> {
        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(DocxTableError::DocumentNotFound(path.to_path_buf()).into());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to stat {}", path.display()));
            }
        };
        anyhow::ensure!(metadata.is_file(), "{} is not a file", path.display());
        if let Some(limit) = max_bytes
            && metadata.len() > limit
        {
            return Err(DocxTableError::FileTooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                limit,
            }
            .into());
        }

        let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let docx = docx_rs::read_docx(&bytes)
            .map_err(|err| anyhow!("failed to parse {} as .docx: {err}", path.display()))?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "document loaded");
        Ok(Self {
            docx,
            is_new: false,
            dirty: false,
        })
    }

    /// A blank document that exists only in memory until saved.
    pub fn create() -> Self {
        Self {
            docx: Docx::new(),
            is_new: true,
            dirty: true,
        }
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn paragraph_count(&self) -> usize {
        self.docx
            .document
            .children
            .iter()
            .filter(|child| matches!(child, DocumentChild::Paragraph(_)))
            .count()
    }

    pub fn tables(&self) -> Vec<&Table> {
        self.docx
            .document
            .children
            .iter()
            .filter_map(|child| match child {
                DocumentChild::Table(table) => {
                    let table: &Table = table;
                    Some(table)
                }
                _ => None,
            })
            .collect()
    }

    pub fn table_count(&self) -> usize {
        self.tables().len()
    }

    pub fn table(&self, index: usize) -> Result<&Table, DocxTableError> {
        let tables = self.tables();
        let count = tables.len();
        tables
            .into_iter()
            .nth(index)
            .ok_or(DocxTableError::TableIndexOutOfRange { index, count })
    }

    /// Mutable access to a table; marks the document as modified.
    pub fn table_mut(&mut self, index: usize) -> Result<&mut Table, DocxTableError> {
        let count = self.table_count();
        let table = self
            .docx
            .document
            .children
            .iter_mut()
            .filter_map(|child| match child {
                DocumentChild::Table(table) => {
                    let table: &mut Table = table;
                    Some(table)
                }
                _ => None,
            })
            .nth(index)
            .ok_or(DocxTableError::TableIndexOutOfRange { index, count })?;
        self.dirty = true;
        Ok(table)
    }

    /// Position in the body of the `ordinal`-th element matching `pred`.
    fn child_position(&self, ordinal: usize, pred: fn(&DocumentChild) -> bool) -> Option<usize> {
        self.docx
            .document
            .children
            .iter()
            .enumerate()
            .filter(|(_, child)| pred(child))
            .nth(ordinal)
            .map(|(position, _)| position)
    }

    /// Insert `table` and return its index among the document's tables.
    pub fn insert_table(&mut self, table: Table, placement: Placement) -> Result<usize> {
        let position = match placement {
            Placement::Beginning => 0,
            Placement::End => self.docx.document.children.len(),
            Placement::AfterParagraph(index) => {
                let count = self.paragraph_count();
                self.child_position(index, |child| matches!(child, DocumentChild::Paragraph(_)))
                    .map(|position| position + 1)
                    .ok_or(DocxTableError::ParagraphOutOfRange { index, count })?
            }
        };

        let docx = std::mem::replace(&mut self.docx, Docx::new());
        self.docx = docx.add_table(table);
        let children = &mut self.docx.document.children;
        if let Some(inserted) = children.pop() {
            let position = position.min(children.len());
            children.insert(position, inserted);
        }
        self.dirty = true;

        Ok(self.docx.document.children[..position]
            .iter()
            .filter(|child| matches!(child, DocumentChild::Table(_)))
            .count())
    }

    pub fn remove_table(&mut self, index: usize) -> Result<(), DocxTableError> {
        let count = self.table_count();
        let position = self
            .child_position(index, |child| matches!(child, DocumentChild::Table(_)))
            .ok_or(DocxTableError::TableIndexOutOfRange { index, count })?;
        self.docx.document.children.remove(position);
        self.dirty = true;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.docx
            .clone()
            .build()
            .pack(&mut buffer)
            .map_err(|err| anyhow!("failed to serialize document: {err}"))?;
        Ok(buffer.into_inner())
    }

    /// Write the document to `target` through a temp file in the same
    /// directory followed by a rename.
    pub fn save_to(&mut self, target: &Path) -> Result<SaveOutcome> {
        let bytes = self.to_bytes()?;
        let parent = target
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;

        let mut temp = NamedTempFile::new_in(parent)
            .with_context(|| format!("failed to create temp file in {}", parent.display()))?;
        temp.write_all(&bytes)?;
        temp.as_file().sync_all()?;
        temp.persist(target)
            .map_err(|err| anyhow!("failed to replace {}: {}", target.display(), err.error))?;

        self.dirty = false;
        self.is_new = false;
        tracing::info!(path = %target.display(), bytes = bytes.len(), "document saved");

        Ok(SaveOutcome {
            path: target.to_path_buf(),
            bytes_written: bytes.len() as u64,
            fingerprint: fingerprint(&bytes),
        })
    }
}

pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    format!("{digest:x}")
}
