//! HTTP route handlers
//!
//! The exact paths and bodies here are the API contract:
//! - `POST /projects` `{slug}` -> 201 `{id, slug, path, message}`
//! - `GET /projects` -> all project records
//! - `GET /projects/{id}` -> HTML project detail page
//! - `POST /projects/{id}/command` `{instruction}` -> `{commit_message, diff}`
//! - `GET /` -> landing page
//!
//! Errors render as `{"detail": <message>}` with the status chosen by
//! [`AppError`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;

use super::ServerAppState;
use crate::error::AppError;
use crate::models::{
    CommandRequest, CommandResponse, CreateProjectRequest, CreateProjectResponse, Project,
};

/// Create a project: validate slug, bootstrap workspace, persist record.
pub async fn create_project(
    State(state): State<ServerAppState>,
    Json(req): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<CreateProjectResponse>), AppError> {
    let project = state.pipeline.bootstrap_project(&req.slug)?;

    Ok((
        StatusCode::CREATED,
        Json(CreateProjectResponse {
            id: project.id,
            slug: project.slug,
            path: project.path,
            message: "Project created successfully".to_string(),
        }),
    ))
}

/// List all registered projects. Order is unspecified.
pub async fn list_projects(
    State(state): State<ServerAppState>,
) -> Result<Json<Vec<Project>>, AppError> {
    Ok(Json(state.pipeline.registry().list()?))
}

/// Rendered project detail page.
pub async fn project_view(
    State(state): State<ServerAppState>,
    Path(project_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let project = state
        .pipeline
        .registry()
        .get(&project_id)?
        .ok_or(AppError::ProjectNotFound)?;

    Ok(Html(render_project_page(&project)))
}

/// Apply one instruction to a project and return the resulting commit
/// message and diff.
pub async fn run_command(
    State(state): State<ServerAppState>,
    Path(project_id): Path<String>,
    Json(req): Json<CommandRequest>,
) -> Result<Json<CommandResponse>, AppError> {
    let (commit_message, diff) = state
        .pipeline
        .run_instruction(&project_id, &req.instruction)
        .await?;

    Ok(Json(CommandResponse {
        commit_message,
        diff,
    }))
}

/// Health check endpoint
pub async fn health_handler() -> &'static str {
    "OK"
}

/// Landing page
pub async fn index_handler() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Atelier</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            max-width: 600px;
            margin: 50px auto;
            padding: 20px;
            background: #1a1a2e;
            color: #eee;
        }
        h1 { color: #4ade80; }
        code {
            background: #2a2a4e;
            padding: 2px 6px;
            border-radius: 4px;
            font-family: 'Monaco', 'Consolas', monospace;
        }
        .endpoint {
            background: #2a2a4e;
            padding: 10px;
            border-radius: 8px;
            margin: 10px 0;
        }
    </style>
</head>
<body>
    <h1>Atelier</h1>
    <p>Scaffold git-backed project workspaces and apply agent instructions as commits.</p>
    <h2>Endpoints</h2>
    <div class="endpoint">
        <strong>POST /projects</strong><br>
        Create a project: <code>{"slug": "my-project"}</code>
    </div>
    <div class="endpoint">
        <strong>GET /projects</strong><br>
        List all projects
    </div>
    <div class="endpoint">
        <strong>GET /projects/{id}</strong><br>
        Project detail page
    </div>
    <div class="endpoint">
        <strong>POST /projects/{id}/command</strong><br>
        Apply an instruction: <code>{"instruction": "add a readme"}</code>
    </div>
</body>
</html>"#,
    )
}

fn render_project_page(project: &Project) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>{slug} - Atelier</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            max-width: 600px;
            margin: 50px auto;
            padding: 20px;
            background: #1a1a2e;
            color: #eee;
        }}
        h1 {{ color: #4ade80; }}
        dt {{ color: #9ca3af; margin-top: 10px; }}
        dd {{ margin: 2px 0 0 0; font-family: 'Monaco', 'Consolas', monospace; }}
        .hint {{
            background: #2a2a4e;
            padding: 10px;
            border-radius: 8px;
            margin-top: 20px;
        }}
    </style>
</head>
<body>
    <h1>{slug}</h1>
    <dl>
        <dt>Id</dt><dd>{id}</dd>
        <dt>Workspace</dt><dd>{path}</dd>
        <dt>Created</dt><dd>{created_at}</dd>
    </dl>
    <div class="hint">
        Send instructions with <code>POST /projects/{id}/command</code>
    </div>
</body>
</html>"#,
        slug = project.slug,
        id = project.id,
        path = project.path,
        created_at = project.created_at,
    )
}
