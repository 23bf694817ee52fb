//! # Artifact Output
//!
//! Writes the remapped content type for one target stack to
//! `<root>/<stack name>_<stack key>/<content type uid>.json`. The file holds
//! `{title, uid, schema}` and replaces any earlier artifact at that path.
//!
//! Directory names keep the stack name as written, spaces included. Only
//! characters that would split the path or are rejected by common
//! filesystems are replaced.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::model::{ContentType, Stack};

/// Serialization style of the artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Compact,
    Pretty,
}

/// Make a single path component safe for the filesystem.
pub fn sanitize_component(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' => '-',
            ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// Directory for a target stack's artifacts, relative to the output root.
pub fn target_dir_name(stack: &Stack) -> String {
    sanitize_component(&format!("{}_{}", stack.name, stack.key))
}

/// Full path of the artifact for `content_type_uid` in `stack`.
pub fn artifact_path(root: &Path, stack: &Stack, content_type_uid: &str) -> PathBuf {
    root.join(target_dir_name(stack))
        .join(format!("{}.json", sanitize_component(content_type_uid)))
}

/// Write `content_type` for `stack` under `root` and return the file path.
pub fn write(
    root: &Path,
    stack: &Stack,
    content_type_uid: &str,
    content_type: &ContentType,
    format: Format,
) -> Result<PathBuf> {
    let path = artifact_path(root, stack, content_type_uid);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| Error::Filesystem {
            message: format!("Failed to create directory '{}': {}", dir.display(), e),
        })?;
    }

    let body = match format {
        Format::Compact => serde_json::to_string(content_type)?,
        Format::Pretty => serde_json::to_string_pretty(content_type)?,
    };
    fs::write(&path, body).map_err(|e| Error::Filesystem {
        message: format!("Failed to write file '{}': {}", path.display(), e),
    })?;
    Ok(path)
}
