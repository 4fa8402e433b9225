//! Application configuration
//!
//! Built once in `main` from CLI flags (with environment fallbacks) and
//! injected into each component. No other module reads the environment.

use std::io;
use std::path::PathBuf;

/// Runtime configuration for the server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory under which every project workspace lives.
    pub projects_root: PathBuf,
    /// Location of the SQLite project registry.
    pub db_path: PathBuf,
}

impl AppConfig {
    pub fn new(projects_root: PathBuf, db_path: PathBuf) -> Self {
        Self {
            projects_root,
            db_path,
        }
    }

    /// Default workspace root: `~/atelier-projects` (current directory as a
    /// last resort when no home directory can be resolved).
    pub fn default_projects_root() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("atelier-projects")
    }

    /// Default registry location: `~/.atelier/db.sqlite3`.
    pub fn default_db_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".atelier")
            .join("db.sqlite3")
    }

    /// Create the projects root and the registry's parent directory.
    pub fn ensure_dirs(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.projects_root)?;
        if let Some(parent) = self.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_dirs_creates_missing_parents() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::new(
            temp_dir.path().join("projects"),
            temp_dir.path().join("state").join("db.sqlite3"),
        );

        config.ensure_dirs().unwrap();

        assert!(config.projects_root.is_dir());
        assert!(temp_dir.path().join("state").is_dir());
    }

    #[test]
    fn test_defaults_are_home_relative() {
        let root = AppConfig::default_projects_root();
        assert!(root.ends_with("atelier-projects"));

        let db = AppConfig::default_db_path();
        assert!(db.ends_with(".atelier/db.sqlite3"));
    }
}
