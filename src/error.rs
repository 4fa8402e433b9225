//! Application error taxonomy and HTTP mapping
//!
//! Every fault the pipeline can surface is a variant here, so handlers
//! return `Result<_, AppError>` and the HTTP status falls out of the
//! variant instead of being chosen ad hoc at each call site.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::path::PathBuf;
use thiserror::Error;

use crate::git::VcsError;

#[derive(Debug, Error)]
pub enum AppError {
    /// Slug failed validation. Rejected before any side effect.
    #[error("Invalid slug")]
    InvalidSlug,

    /// A project with this slug (or its workspace directory) already exists.
    #[error("Project already exists")]
    ProjectExists,

    /// No project record for the given id.
    #[error("Project not found")]
    ProjectNotFound,

    /// A registry record exists but its backing directory is gone.
    /// Consistency violation between registry and filesystem; reported,
    /// never silently repaired.
    #[error("Workspace directory missing: {0}")]
    WorkspaceMissing(PathBuf),

    /// An agent-supplied mutation path would resolve outside the workspace
    /// root. Nothing is written when this fires.
    #[error("Mutation path escapes workspace root: {0}")]
    PathEscape(String),

    #[error("Version control error: {0}")]
    Vcs(#[from] VcsError),

    #[error("Registry error: {0}")]
    Registry(#[from] rusqlite::Error),

    #[error("Filesystem error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidSlug | AppError::ProjectExists => StatusCode::BAD_REQUEST,
            AppError::ProjectNotFound => StatusCode::NOT_FOUND,
            AppError::WorkspaceMissing(_)
            | AppError::PathEscape(_)
            | AppError::Vcs(_)
            | AppError::Registry(_)
            | AppError::Io(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        }
        let body = Json(serde_json::json!({ "detail": self.to_string() }));
        (status, body).into_response()
    }
}
