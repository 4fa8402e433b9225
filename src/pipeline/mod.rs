//! Instruction pipeline
//!
//! Orchestrates the two lifecycle flows that must keep the filesystem,
//! the git history, and the registry in agreement:
//!
//! - `bootstrap_project`: workspace create -> git init -> baseline files
//!   -> bootstrap commit -> registry insert. The registry row is written
//!   last, so a record always implies a fully bootstrapped workspace.
//! - `run_instruction`: registry lookup -> workspace check -> agent ->
//!   apply mutations -> commit -> best-effort diff.
//!
//! Runs against the same workspace are serialized behind a per-project
//! lock; distinct projects proceed fully in parallel.

use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use crate::agent::InstructionAgent;
use crate::error::AppError;
use crate::git::{GitWorkspace, VcsError};
use crate::models::Project;
use crate::registry::ProjectRegistry;
use crate::workspace::WorkspaceStore;

/// Message of the first commit in every workspace.
pub const BOOTSTRAP_COMMIT_MESSAGE: &str = "Initial bootstrap";

/// Slugs start with a letter or underscore, followed by letters, digits,
/// underscores, or hyphens.
fn slug_regex() -> &'static Regex {
    static SLUG_RE: OnceLock<Regex> = OnceLock::new();
    SLUG_RE.get_or_init(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_-]*$").unwrap())
}

pub fn is_valid_slug(slug: &str) -> bool {
    slug_regex().is_match(slug)
}

pub struct InstructionPipeline {
    workspace: WorkspaceStore,
    registry: Arc<ProjectRegistry>,
    agent: Box<dyn InstructionAgent>,
    /// One mutex per project id, held across steps 2-6 of a run.
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl InstructionPipeline {
    pub fn new(
        workspace: WorkspaceStore,
        registry: Arc<ProjectRegistry>,
        agent: Box<dyn InstructionAgent>,
    ) -> Self {
        Self {
            workspace,
            registry,
            agent,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &ProjectRegistry {
        &self.registry
    }

    /// Create a project: validate the slug, bootstrap its workspace, then
    /// persist the registry record.
    ///
    /// Validation happens before any side effect. A failure after the
    /// directory is created leaves an orphaned directory with no registry
    /// record; no compensating cleanup is attempted (logged for manual
    /// cleanup instead).
    pub fn bootstrap_project(&self, slug: &str) -> Result<Project, AppError> {
        if !is_valid_slug(slug) {
            return Err(AppError::InvalidSlug);
        }

        let path = self.workspace.create(slug)?;

        if let Err(e) = self.bootstrap_workspace(&path, slug) {
            log::warn!(
                "Bootstrap failed for '{}', orphaned directory left at {}: {}",
                slug,
                path.display(),
                e
            );
            return Err(e);
        }

        // Workspace is fully bootstrapped; the record write comes last.
        let project = match self.registry.create(slug, &path) {
            Ok(project) => project,
            Err(e) => {
                log::warn!(
                    "Registry insert failed for '{}', orphaned directory left at {}: {}",
                    slug,
                    path.display(),
                    e
                );
                return Err(e);
            }
        };
        log::info!("Created project '{}' ({}) at {}", slug, project.id, project.path);
        Ok(project)
    }

    /// Apply one instruction to a project and return the commit message
    /// and the rendered diff of the resulting commit.
    pub async fn run_instruction(
        &self,
        project_id: &str,
        instruction: &str,
    ) -> Result<(String, String), AppError> {
        // 1. Lookup. Unknown ids fail here, before any side effect.
        let project = self
            .registry
            .get(project_id)?
            .ok_or(AppError::ProjectNotFound)?;
        let path = PathBuf::from(&project.path);

        let lock = self.lock_for(project_id);
        let _guard = lock.lock().await;

        // 2. A registered workspace whose directory vanished is a
        // registry/filesystem inconsistency; report it, don't repair it.
        if !self.workspace.resolve(&path) {
            return Err(AppError::WorkspaceMissing(path));
        }

        // 3. Agent invocation is a pure transform.
        let output = self.agent.invoke(instruction);
        log::debug!(
            "Agent produced {} file(s) for project '{}'",
            output.files.len(),
            project.slug
        );

        // 4. File writes + memory log append.
        self.workspace
            .apply_mutations(&path, &output.files, &output.memory_update)?;

        // 5. Commit. On failure the working tree keeps the uncommitted
        // changes; the next successful commit absorbs them.
        let git = GitWorkspace::open(&path)?;
        let commit_id = git.commit_all(&output.commit_message)?;
        log::info!("Committed {} on project '{}'", commit_id, project.slug);

        // 6. Diff rendering is best-effort and never fails the run.
        let diff = git.show_latest();

        Ok((output.commit_message, diff))
    }

    fn bootstrap_workspace(&self, path: &Path, slug: &str) -> Result<(), AppError> {
        let git = GitWorkspace::init(path)?;
        self.workspace.write_bootstrap_files(path, slug)?;

        match git.commit_all(BOOTSTRAP_COMMIT_MESSAGE) {
            Ok(_) => Ok(()),
            // Bootstrap just wrote fresh files; a clean tree here means
            // the sequence is broken and would leave an initialized
            // repository with no commit.
            Err(VcsError::NothingToCommit) => Err(AppError::Internal(
                "bootstrap commit found a clean tree".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    fn lock_for(&self, project_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.entry(project_id.to_string()).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::StubAgent;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn setup_pipeline() -> (TempDir, Arc<InstructionPipeline>) {
        let temp_dir = TempDir::new().unwrap();
        let registry =
            Arc::new(ProjectRegistry::open(&temp_dir.path().join("db.sqlite3")).unwrap());
        let workspace = WorkspaceStore::new(temp_dir.path().join("projects"));
        let pipeline = Arc::new(InstructionPipeline::new(
            workspace,
            registry,
            Box::new(StubAgent),
        ));
        (temp_dir, pipeline)
    }

    #[test]
    fn test_slug_validation() {
        assert!(is_valid_slug("demo"));
        assert!(is_valid_slug("_private"));
        assert!(is_valid_slug("my-app_2"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("2fast"));
        assert!(!is_valid_slug("has space"));
        assert!(!is_valid_slug("dot.dot"));
        assert!(!is_valid_slug("../escape"));
    }

    #[test]
    fn test_bootstrap_creates_workspace_with_one_commit() {
        let (_temp_dir, pipeline) = setup_pipeline();

        let project = pipeline.bootstrap_project("demo").unwrap();
        let path = PathBuf::from(&project.path);

        assert!(path.is_dir());
        assert_eq!(
            fs::read_to_string(path.join("README.md")).unwrap(),
            "# demo\n"
        );
        assert_eq!(
            fs::read_to_string(path.join("memory.md")).unwrap(),
            "# Memory\n"
        );

        let git = GitWorkspace::open(&path).unwrap();
        assert_eq!(git.commit_count().unwrap(), 1);
    }

    #[test]
    fn test_bootstrap_rejects_invalid_slug_without_side_effects() {
        let (temp_dir, pipeline) = setup_pipeline();

        let err = pipeline.bootstrap_project("not a slug").unwrap_err();
        assert!(matches!(err, AppError::InvalidSlug));

        assert!(!temp_dir.path().join("projects").join("not a slug").exists());
        assert!(pipeline.registry().list().unwrap().is_empty());
    }

    #[test]
    fn test_bootstrap_duplicate_slug_conflicts_and_registry_unchanged() {
        let (_temp_dir, pipeline) = setup_pipeline();

        pipeline.bootstrap_project("demo").unwrap();
        let before: Vec<String> = pipeline
            .registry()
            .list()
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();

        let err = pipeline.bootstrap_project("demo").unwrap_err();
        assert!(matches!(err, AppError::ProjectExists));

        let after: Vec<String> = pipeline
            .registry()
            .list()
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_concurrent_creates_of_same_slug_one_winner() {
        let (_temp_dir, pipeline) = setup_pipeline();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let pipeline = pipeline.clone();
            handles.push(std::thread::spawn(move || {
                pipeline.bootstrap_project("raced").is_ok()
            }));
        }

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|created| *created)
            .count();
        assert_eq!(successes, 1);
        assert_eq!(pipeline.registry().list().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_run_unknown_project_is_not_found() {
        let (temp_dir, pipeline) = setup_pipeline();

        let err = pipeline
            .run_instruction("proj_missing", "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ProjectNotFound));

        // No filesystem mutation happened: the projects root was never
        // even created.
        assert!(!temp_dir.path().join("projects").exists());
    }

    #[tokio::test]
    async fn test_run_applies_instruction_and_commits() {
        let (_temp_dir, pipeline) = setup_pipeline();
        let project = pipeline.bootstrap_project("demo").unwrap();

        let (commit_message, diff) = pipeline
            .run_instruction(&project.id, "hello")
            .await
            .unwrap();

        assert!(!commit_message.is_empty());
        assert!(diff.contains("dummy.txt"));
        assert!(diff.contains("hello"));

        let path = PathBuf::from(&project.path);
        let git = GitWorkspace::open(&path).unwrap();
        assert_eq!(git.commit_count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_two_runs_grow_history_and_memory_in_order() {
        let (_temp_dir, pipeline) = setup_pipeline();
        let project = pipeline.bootstrap_project("demo").unwrap();

        let (_, first_diff) = pipeline
            .run_instruction(&project.id, "first instruction")
            .await
            .unwrap();
        let (_, second_diff) = pipeline
            .run_instruction(&project.id, "second instruction")
            .await
            .unwrap();

        let path = PathBuf::from(&project.path);
        let git = GitWorkspace::open(&path).unwrap();
        assert_eq!(git.commit_count().unwrap(), 3);

        // Each diff reflects only its own invocation's changes: the second
        // patch adds the second instruction (removing the first is part of
        // overwriting dummy.txt) and never re-adds the first.
        assert!(first_diff.contains("+Instruction: first instruction"));
        assert!(second_diff.contains("+Instruction: second instruction"));
        assert!(!second_diff.contains("+Instruction: first instruction"));

        // Memory log holds both sections, in order.
        let memory = fs::read_to_string(path.join("memory.md")).unwrap();
        let first_pos = memory.find("Instruction: first instruction").unwrap();
        let second_pos = memory.find("Instruction: second instruction").unwrap();
        assert!(first_pos < second_pos);
        assert_eq!(memory.matches("## ").count(), 2);
    }

    #[tokio::test]
    async fn test_run_against_vanished_workspace_is_reported() {
        let (_temp_dir, pipeline) = setup_pipeline();
        let project = pipeline.bootstrap_project("demo").unwrap();

        fs::remove_dir_all(&project.path).unwrap();

        let err = pipeline
            .run_instruction(&project.id, "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::WorkspaceMissing(_)));
    }
}
