//! Shared data models
//!
//! Domain records and HTTP request/response bodies. Field names are the
//! wire contract (snake_case JSON), so no serde renames here.

use serde::{Deserialize, Serialize};

/// A registered project.
///
/// The registry exclusively owns this record; the workspace store and the
/// version control adapter operate on the `path` it carries but hold no
/// reference of their own. Records are created once and never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Opaque unique token, generated at creation, never reused.
    pub id: String,
    /// Human-chosen identifier, unique and immutable once set.
    pub slug: String,
    /// Workspace directory, derived from the slug at creation time but
    /// stored explicitly so later path-scheme changes don't orphan records.
    pub path: String,
    /// Creation time as an RFC 3339 UTC string.
    pub created_at: String,
}

/// Body of `POST /projects`.
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub slug: String,
}

/// Response of `POST /projects`.
#[derive(Debug, Serialize)]
pub struct CreateProjectResponse {
    pub id: String,
    pub slug: String,
    pub path: String,
    pub message: String,
}

/// Body of `POST /projects/{id}/command`.
#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub instruction: String,
}

/// Response of `POST /projects/{id}/command`.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub commit_message: String,
    pub diff: String,
}

/// One file write requested by an agent: full new content for the file at
/// `path` (relative to the workspace root). Full replace, not a diff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileUpdate {
    pub path: String,
    pub content: String,
}

/// Structured output of one agent invocation.
///
/// Consumed immediately by the pipeline and discarded; durability comes
/// only from the files and commit it causes to be written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentOutput {
    /// Commit message for the resulting commit.
    pub commit_message: String,
    /// Ordered file writes to apply.
    pub files: Vec<FileUpdate>,
    /// Section appended to the workspace memory log.
    pub memory_update: String,
}
