use crate::errors::InvalidParamsError;
use anyhow::{Result, anyhow};
use std::path::{Component, Path, PathBuf};

/// Resolve a caller-supplied document path to the canonical form used as the
/// session key, refusing anything that lands outside `workspace_root`.
///
/// Symlinks are followed for existing files. A file that does not exist yet
/// is resolved through its parent directory, which must exist.
pub fn resolve_document_path(
    workspace_root: &Path,
    requested: &str,
    tool: &'static str,
    field: &'static str,
) -> Result<PathBuf> {
    let trimmed = requested.trim();
    if trimmed.is_empty() {
        return Err(InvalidParamsError::new(tool, format!("{field} must not be empty"))
            .with_path(field)
            .into());
    }

    let root = workspace_root
        .canonicalize()
        .map_err(|e| anyhow!("failed to canonicalize workspace root {}: {e}", workspace_root.display()))?;

    let requested = Path::new(trimmed);
    let joined = if requested.is_absolute() {
        requested.to_path_buf()
    } else {
        root.join(requested)
    };
    let joined = lexically_normalize(&joined);

    let resolved = if joined.exists() {
        joined.canonicalize().map_err(|e| {
            InvalidParamsError::new(tool, format!("{field} could not be resolved: {e}"))
                .with_path(field)
        })?
    } else {
        let (Some(parent), Some(file_name)) = (joined.parent(), joined.file_name()) else {
            return Err(InvalidParamsError::new(tool, format!("{field} must name a file"))
                .with_path(field)
                .into());
        };
        let parent = parent.canonicalize().map_err(|e| {
            InvalidParamsError::new(
                tool,
                format!("{field} parent directory {} is not accessible: {e}", parent.display()),
            )
            .with_path(field)
        })?;
        parent.join(file_name)
    };

    if !resolved.starts_with(&root) {
        return Err(InvalidParamsError::new(
            tool,
            format!(
                "{field} '{}' is outside the workspace root '{}'",
                resolved.display(),
                root.display()
            ),
        )
        .with_path(field)
        .into());
    }

    Ok(resolved)
}

fn lexically_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_resolve_under_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = resolve_document_path(dir.path(), "report.docx", "t", "file_path").unwrap();
        assert_eq!(resolved, dir.path().canonicalize().unwrap().join("report.docx"));

        let dotted =
            resolve_document_path(dir.path(), "./a/../report.docx", "t", "file_path").unwrap();
        assert_eq!(dotted, resolved);
    }

    #[test]
    fn escaping_the_root_is_invalid_params() {
        let dir = tempfile::tempdir().unwrap();
        let inner = dir.path().join("inner");
        std::fs::create_dir(&inner).unwrap();
        let err = resolve_document_path(&inner, "../outside.docx", "open_document", "file_path")
            .unwrap_err();
        let inv = err.downcast_ref::<InvalidParamsError>().expect("typed");
        assert_eq!(inv.path(), Some("file_path"));
    }
}
