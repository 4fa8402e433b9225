//! Workspace store
//!
//! Manages the on-disk directory tree per project: creation under the
//! configured projects root, existence checks, and applying agent file
//! mutations. Version control on top of the directory is the git
//! adapter's concern.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

use crate::error::AppError;
use crate::models::FileUpdate;

/// File name of the append-only memory log inside every workspace.
pub const MEMORY_FILE: &str = "memory.md";

/// File name of the human-readable readme written at bootstrap.
pub const README_FILE: &str = "README.md";

/// Creates and mutates workspace directories under a single root.
pub struct WorkspaceStore {
    root: PathBuf,
}

impl WorkspaceStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the workspace directory for a validated slug.
    ///
    /// Parents are created first; the leaf is created with `create_dir`,
    /// whose kernel-level exclusivity makes concurrent creates of the same
    /// slug yield exactly one winner. An existing directory maps to
    /// `ProjectExists`.
    pub fn create(&self, slug: &str) -> Result<PathBuf, AppError> {
        fs::create_dir_all(&self.root)?;

        let path = self.root.join(slug);
        match fs::create_dir(&path) {
            Ok(()) => Ok(path),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(AppError::ProjectExists),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Whether a registered workspace path still exists as a directory.
    /// Checked before any mutation so a vanished directory surfaces as
    /// `WorkspaceMissing` rather than a generic I/O error mid-write.
    pub fn resolve(&self, path: &Path) -> bool {
        path.is_dir()
    }

    /// Write the baseline files of a fresh workspace: the readme and an
    /// empty-section memory log.
    pub fn write_bootstrap_files(&self, path: &Path, slug: &str) -> Result<(), AppError> {
        fs::write(path.join(README_FILE), format!("# {}\n", slug))?;
        fs::write(path.join(MEMORY_FILE), "# Memory\n")?;
        Ok(())
    }

    /// Apply one agent output to the workspace: overwrite each target file
    /// (creating parent directories as needed), then append the memory
    /// section to the memory log.
    ///
    /// Every mutation path is resolved and checked against the workspace
    /// root before the first byte is written, so a traversal attempt in any
    /// entry rejects the whole batch with `PathEscape`.
    pub fn apply_mutations(
        &self,
        path: &Path,
        files: &[FileUpdate],
        memory_update: &str,
    ) -> Result<(), AppError> {
        let mut targets = Vec::with_capacity(files.len());
        for file in files {
            targets.push(safe_join(path, &file.path)?);
        }

        for (file, target) in files.iter().zip(&targets) {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(target, &file.content)?;
            log::debug!("Wrote {} ({} bytes)", file.path, file.content.len());
        }

        let mut memory = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.join(MEMORY_FILE))?;
        memory.write_all(memory_update.as_bytes())?;

        Ok(())
    }
}

/// Join an agent-supplied relative path onto the workspace root.
///
/// The check is purely lexical: absolute paths and any `..` (or
/// prefix/root) component are rejected, so no mutation can resolve outside
/// the workspace even through directories that don't exist yet.
fn safe_join(root: &Path, relative: &str) -> Result<PathBuf, AppError> {
    let rel = Path::new(relative);
    if rel.as_os_str().is_empty() || rel.is_absolute() {
        return Err(AppError::PathEscape(relative.to_string()));
    }
    for component in rel.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => return Err(AppError::PathEscape(relative.to_string())),
        }
    }
    Ok(root.join(rel))
}
