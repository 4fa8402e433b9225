//! Project registry
//!
//! Durable mapping from project identity to workspace location, stored in
//! a single SQLite table. Slug uniqueness is enforced by the UNIQUE
//! constraint itself, so two racing creates of the same slug are decided
//! by the storage layer, never by a check-then-insert in application code.
//!
//! The registry is created-once/never-updated: there is no update or
//! delete operation.

use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::Project;

pub struct ProjectRegistry {
    conn: Mutex<Connection>,
}

impl ProjectRegistry {
    /// Open (creating if needed) the registry database at `db_path` and
    /// install the schema.
    pub fn open(db_path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS projects (
                id         TEXT PRIMARY KEY,
                slug       TEXT NOT NULL UNIQUE,
                path       TEXT NOT NULL,
                created_at TEXT NOT NULL
            );",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory registry, used by tests.
    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS projects (
                id         TEXT PRIMARY KEY,
                slug       TEXT NOT NULL UNIQUE,
                path       TEXT NOT NULL,
                created_at TEXT NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Persist a new project record for an already-bootstrapped workspace.
    ///
    /// Callers must only invoke this after the workspace directory exists
    /// with an initialized repository and its bootstrap commit; the row is
    /// the last thing written. A slug collision maps to `ProjectExists`.
    pub fn create(&self, slug: &str, path: &Path) -> Result<Project, AppError> {
        let project = Project {
            id: new_project_id(),
            slug: slug.to_string(),
            path: path.to_string_lossy().to_string(),
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = self.lock()?;
        let result = conn.execute(
            "INSERT INTO projects (id, slug, path, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![project.id, project.slug, project.path, project.created_at],
        );

        match result {
            Ok(_) => Ok(project),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(AppError::ProjectExists)
            }
            Err(e) => Err(AppError::Registry(e)),
        }
    }

    /// Point lookup by id. `None` when absent.
    pub fn get(&self, id: &str) -> Result<Option<Project>, AppError> {
        let conn = self.lock()?;
        let project = conn
            .query_row(
                "SELECT id, slug, path, created_at FROM projects WHERE id = ?1",
                params![id],
                row_to_project,
            )
            .optional()?;
        Ok(project)
    }

    /// All project records. Ordering is unspecified; callers must not
    /// depend on it beyond listing completeness.
    pub fn list(&self) -> Result<Vec<Project>, AppError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, slug, path, created_at FROM projects")?;
        let rows = stmt.query_map([], row_to_project)?;

        let mut projects = Vec::new();
        for row in rows {
            projects.push(row?);
        }
        Ok(projects)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, AppError> {
        self.conn
            .lock()
            .map_err(|e| AppError::Internal(format!("Registry lock poisoned: {}", e)))
    }
}

/// Typed decode at the registry boundary: explicit column reads, no
/// dynamic row maps.
fn row_to_project(row: &rusqlite::Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        slug: row.get(1)?,
        path: row.get(2)?,
        created_at: row.get(3)?,
    })
}

fn new_project_id() -> String {
    format!(
        "proj_{}",
        &Uuid::new_v4().to_string().replace("-", "")[..12]
    )
}
